//! Retrieval with lazy promotion.
//!
//! A canonical miss consults the ownership oracle once. When the name
//! turns out to be registered, the owner's speculative blob (if any) is
//! promoted into the canonical slot and every speculative slot for the
//! name is purged: a registered name invalidates all outstanding
//! speculative guesses, whether or not one of them won.

use namepic_ethereum::{ChainProfile, ResolveOwnership};
use namepic_store::{AvatarStore, ObjectKey, StoredAvatar};

use crate::handler::{ErrorKind, Result};

/// Tracing target for retrieval and promotion.
const TRACING_TARGET: &str = "namepic::service::promote";

/// Keys fetched per page while purging speculative slots.
const PURGE_PAGE_SIZE: usize = 1000;

fn not_found(name: &str, network: &str) -> crate::handler::Error {
    ErrorKind::NotFound.with_message(format!("{name} not found on {network}"))
}

/// Retrieves the avatar for a name, promoting on a canonical miss.
pub async fn retrieve(
    store: &AvatarStore,
    oracle: &dyn ResolveOwnership,
    chain: &ChainProfile,
    name: &str,
) -> Result<StoredAvatar> {
    let canonical = ObjectKey::canonical(&chain.network, name);

    if let Some(avatar) = store.get(&canonical).await? {
        if avatar.is_jpeg() {
            return Ok(avatar);
        }
        // A canonical blob that is not a jpeg is never served and does
        // not trigger promotion.
        return Err(not_found(name, &chain.network));
    }

    let record = oracle.resolve(chain, name).await?;
    let Some(owner) = record.owner.filter(|_| !record.available) else {
        return Err(not_found(name, &chain.network));
    };

    let speculative = ObjectKey::speculative(&chain.network, name, owner);
    let promoted = store.get(&speculative).await?;

    // The name is registered, so every speculative guess for it is
    // stale. This runs whether or not the owner's slot held a blob.
    purge_speculative(store, &chain.network, name).await?;

    let Some(avatar) = promoted else {
        return Err(not_found(name, &chain.network));
    };

    tracing::info!(
        target: TRACING_TARGET,
        network = %chain.network,
        name = %name,
        owner = %owner,
        size = avatar.size(),
        "Promoting speculative avatar to canonical slot"
    );

    // One storage read feeds both the response and the canonical copy;
    // the Bytes clone is the fan-out.
    store
        .put(&canonical, avatar.bytes.clone(), "image/jpeg")
        .await?;

    Ok(avatar)
}

/// Deletes every speculative slot under the name's prefix, page by
/// page. Not atomic with the ownership read that triggered it; a
/// late-arriving speculative upload may survive one pass and is caught
/// by the next retrieval.
async fn purge_speculative(store: &AvatarStore, network: &str, name: &str) -> Result<()> {
    let prefix = ObjectKey::speculative_prefix(network, name);

    let mut cursor: Option<String> = None;
    let mut purged = 0usize;
    loop {
        let page = store
            .list_page(&prefix, cursor.as_deref(), PURGE_PAGE_SIZE)
            .await?;
        if page.keys.is_empty() {
            break;
        }

        purged += page.keys.len();
        store.delete_many(&page.keys).await?;

        if !page.truncated {
            break;
        }
        cursor = page.cursor;
    }

    if purged > 0 {
        tracing::debug!(
            target: TRACING_TARGET,
            network = %network,
            name = %name,
            purged,
            "Purged speculative slots"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use namepic_ethereum::mock::MockOracle;
    use namepic_ethereum::{Address, ChainRegistry, NameRecord};

    use super::*;

    fn chain() -> ChainProfile {
        ChainRegistry::default().lookup("mainnet").unwrap().clone()
    }

    fn jpeg_bytes(marker: u8) -> Bytes {
        Bytes::from(vec![0xFF, 0xD8, 0xFF, marker])
    }

    fn addr(last: u8) -> Address {
        let mut bytes = [0u8; 20];
        bytes[19] = last;
        Address::new(bytes)
    }

    #[tokio::test]
    async fn canonical_hit_skips_the_oracle() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();

        let key = ObjectKey::canonical("mainnet", "test.eth");
        store
            .put(&key, jpeg_bytes(1), "image/jpeg")
            .await
            .unwrap();

        let avatar = retrieve(&store, oracle.as_ref(), &chain, "test.eth")
            .await
            .unwrap();

        assert_eq!(avatar.bytes, jpeg_bytes(1));
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn promotion_copies_and_purges() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();
        let owner = addr(0x11);

        // The owner's speculative blob plus stale guesses from others.
        store
            .put(
                &ObjectKey::speculative("mainnet", "test.eth", owner),
                jpeg_bytes(7),
                "image/jpeg",
            )
            .await
            .unwrap();
        for i in 0..3u8 {
            store
                .put(
                    &ObjectKey::speculative("mainnet", "test.eth", addr(0x20 + i)),
                    jpeg_bytes(i),
                    "image/jpeg",
                )
                .await
                .unwrap();
        }

        oracle.push(NameRecord {
            owner: Some(owner),
            available: false,
        });

        let avatar = retrieve(&store, oracle.as_ref(), &chain, "test.eth")
            .await
            .unwrap();
        assert_eq!(avatar.bytes, jpeg_bytes(7));

        // Canonical slot populated from the same read.
        let canonical = store
            .get(&ObjectKey::canonical("mainnet", "test.eth"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(canonical.bytes, jpeg_bytes(7));

        // Every speculative slot is gone.
        let prefix = ObjectKey::speculative_prefix("mainnet", "test.eth");
        let page = store.list_page(&prefix, None, 100).await.unwrap();
        assert!(page.keys.is_empty());
    }

    #[tokio::test]
    async fn purge_runs_even_without_a_matching_speculative_blob() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();

        store
            .put(
                &ObjectKey::speculative("mainnet", "test.eth", addr(0x22)),
                jpeg_bytes(1),
                "image/jpeg",
            )
            .await
            .unwrap();

        // Registered to someone who never uploaded speculatively.
        oracle.push(NameRecord {
            owner: Some(addr(0x11)),
            available: false,
        });

        let error = retrieve(&store, oracle.as_ref(), &chain, "test.eth")
            .await
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);

        let prefix = ObjectKey::speculative_prefix("mainnet", "test.eth");
        let page = store.list_page(&prefix, None, 100).await.unwrap();
        assert!(page.keys.is_empty());
    }

    #[tokio::test]
    async fn second_retrieve_finds_zero_speculative_keys() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();
        let owner = addr(0x11);

        store
            .put(
                &ObjectKey::speculative("mainnet", "test.eth", owner),
                jpeg_bytes(7),
                "image/jpeg",
            )
            .await
            .unwrap();

        oracle.push(NameRecord {
            owner: Some(owner),
            available: false,
        });
        retrieve(&store, oracle.as_ref(), &chain, "test.eth")
            .await
            .unwrap();

        // The second call serves from the canonical slot without
        // another oracle round trip, and nothing speculative remains.
        let avatar = retrieve(&store, oracle.as_ref(), &chain, "test.eth")
            .await
            .unwrap();
        assert_eq!(avatar.bytes, jpeg_bytes(7));
        assert_eq!(oracle.calls().len(), 1);

        let prefix = ObjectKey::speculative_prefix("mainnet", "test.eth");
        let page = store.list_page(&prefix, None, 100).await.unwrap();
        assert!(page.keys.is_empty());
    }

    #[tokio::test]
    async fn unregistered_name_is_not_found_without_writes() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();

        oracle.push(NameRecord {
            owner: None,
            available: true,
        });

        let error = retrieve(&store, oracle.as_ref(), &chain, "test.eth")
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.message(), "test.eth not found on mainnet");

        let canonical = ObjectKey::canonical("mainnet", "test.eth");
        assert!(store.get(&canonical).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_jpeg_canonical_blob_is_not_served() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();

        store
            .put(
                &ObjectKey::canonical("mainnet", "test.eth"),
                Bytes::from_static(b"<html></html>"),
                "text/html",
            )
            .await
            .unwrap();

        let error = retrieve(&store, oracle.as_ref(), &chain, "test.eth")
            .await
            .unwrap_err();

        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert!(oracle.calls().is_empty());
    }

    #[tokio::test]
    async fn purge_clears_many_speculative_slots() {
        let store = AvatarStore::memory().unwrap();
        let oracle = Arc::new(MockOracle::new());
        let chain = chain();
        let owner = addr(0x01);

        for i in 0..124u8 {
            store
                .put(
                    &ObjectKey::speculative("mainnet", "test.eth", addr(i.wrapping_add(1))),
                    jpeg_bytes(i),
                    "image/jpeg",
                )
                .await
                .unwrap();
        }

        oracle.push(NameRecord {
            owner: Some(owner),
            available: false,
        });
        retrieve(&store, oracle.as_ref(), &chain, "test.eth")
            .await
            .unwrap();

        let prefix = ObjectKey::speculative_prefix("mainnet", "test.eth");
        let page = store.list_page(&prefix, None, 1000).await.unwrap();
        assert!(page.keys.is_empty());
    }
}
