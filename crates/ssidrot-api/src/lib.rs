// ssidrot-api: Async client for the UniFi controller's WLAN configuration API

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;
pub mod wlan;

pub use auth::ControllerPlatform;
pub use client::UnifiClient;
pub use error::Error;
pub use models::WlanConf;
pub use transport::{TlsMode, TransportConfig};
