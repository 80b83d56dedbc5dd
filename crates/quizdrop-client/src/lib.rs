//! quizdrop-client: form API integrations.
//!
//! Implements the `FormApi` trait over HTTP and in memory, and loads the
//! client configuration.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;

pub use config::{create_api, load_config, ApiConfig, IdStrategy, QuizdropConfig};
pub use error::ApiError;
