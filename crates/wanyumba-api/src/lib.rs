// wanyumba-api: async wire layer for the Wanyumba admin API (HTTP + push channel)

pub mod auth;
pub mod client;
pub mod error;
pub mod push;
pub mod transport;

pub use auth::{CredentialPolicy, MemoryTokenStore, TokenStore};
pub use client::ApiClient;
pub use error::Error;
pub use push::{PushHandle, PushMessage, ReconnectConfig, SiteStatus};
pub use transport::TransportConfig;
