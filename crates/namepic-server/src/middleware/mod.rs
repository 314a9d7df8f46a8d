//! Router middleware layers.

mod cors;

pub use cors::{CorsConfig, create_cors_layer};
