// ── Controller abstraction ──
//
// The engine only needs four WLAN operations on an authenticated session.
// `UnifiController` implements them over `ssidrot-api`; tests substitute
// an in-memory fake.

use std::future::Future;

use thiserror::Error;
use tracing::{debug, info};

use ssidrot_api::transport::{TlsMode, TransportConfig};
use ssidrot_api::{ControllerPlatform, UnifiClient, WlanConf};

use crate::config::{ControllerConfig, PlatformHint, TlsVerification};

// ── Errors ───────────────────────────────────────────────────────────

/// Failure talking to a controller, independent of the wire protocol.
#[derive(Debug, Clone, Error)]
pub enum ControllerError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("controller unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl From<ssidrot_api::Error> for ControllerError {
    fn from(err: ssidrot_api::Error) -> Self {
        use ssidrot_api::Error as Api;

        match err {
            Api::Authentication { message } => Self::Authentication(message),
            Api::NotFound { resource } => Self::NotFound(resource),
            ref e @ Api::Transport(_) if e.is_not_found() => Self::NotFound(e.to_string()),
            Api::Transport(e) => Self::Unavailable(e.to_string()),
            Api::InvalidUrl(e) => Self::Unavailable(format!("invalid controller URL: {e}")),
            Api::Tls(message) => Self::Unavailable(message),
            Api::Api {
                message,
                status: Some(status),
            } if status >= 500 => Self::Unavailable(message),
            Api::Conflict { message } | Api::Api { message, .. } => Self::Rejected(message),
            Api::Deserialization { message, .. } => {
                Self::Rejected(format!("unexpected response: {message}"))
            }
        }
    }
}

// ── WLAN record ──────────────────────────────────────────────────────

/// A WLAN as the engine sees it: id, broadcast name, and every other
/// controller field carried opaquely for read-modify-write.
#[derive(Debug, Clone, PartialEq)]
pub struct WlanRecord {
    pub id: String,
    pub name: String,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl WlanRecord {
    /// Copy of this record with only the name replaced.
    pub fn renamed(&self, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..self.clone()
        }
    }
}

impl From<WlanConf> for WlanRecord {
    fn from(conf: WlanConf) -> Self {
        Self {
            id: conf.id,
            name: conf.name,
            payload: conf.extra,
        }
    }
}

impl From<WlanRecord> for WlanConf {
    fn from(record: WlanRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            extra: record.payload,
        }
    }
}

// ── Traits ───────────────────────────────────────────────────────────

/// Something that can open an authenticated session with a controller.
pub trait ControllerClient: Send + Sync {
    type Session: WlanSession;

    fn authenticate(&self) -> impl Future<Output = Result<Self::Session, ControllerError>> + Send;
}

/// WLAN operations on an authenticated session.
pub trait WlanSession: Send + Sync {
    fn list_wlans(&self) -> impl Future<Output = Result<Vec<WlanRecord>, ControllerError>> + Send;

    /// `NotFound` if the controller does not know `id`.
    fn get_wlan(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<WlanRecord, ControllerError>> + Send;

    /// Replace the full WLAN record; returns what the controller stored.
    fn update_wlan(
        &self,
        id: &str,
        record: &WlanRecord,
    ) -> impl Future<Output = Result<WlanRecord, ControllerError>> + Send;

    fn logout(&self) -> impl Future<Output = Result<(), ControllerError>> + Send;
}

// ── UniFi implementation ─────────────────────────────────────────────

/// [`ControllerClient`] backed by a real UniFi controller.
#[derive(Debug, Clone)]
pub struct UnifiController {
    config: ControllerConfig,
}

impl UnifiController {
    pub fn new(config: ControllerConfig) -> Self {
        Self { config }
    }

    async fn resolve_platform(
        &self,
        transport: &TransportConfig,
    ) -> Result<ControllerPlatform, ControllerError> {
        match self.config.platform {
            PlatformHint::UnifiOs => Ok(ControllerPlatform::UnifiOs),
            PlatformHint::Classic => Ok(ControllerPlatform::ClassicController),
            PlatformHint::Auto => {
                let http = transport.build_client()?;
                let platform = UnifiClient::detect_platform(&http, &self.config.url).await?;
                debug!(?platform, "detected controller platform");
                Ok(platform)
            }
        }
    }
}

impl ControllerClient for UnifiController {
    type Session = UnifiSession;

    async fn authenticate(&self) -> Result<UnifiSession, ControllerError> {
        let transport = build_transport(&self.config);
        let platform = self.resolve_platform(&transport).await?;

        let client = UnifiClient::new(
            self.config.url.clone(),
            self.config.site.clone(),
            platform,
            &transport,
        )?;
        client
            .login(&self.config.username, &self.config.password)
            .await?;
        info!(url = %self.config.url, site = %self.config.site, "authenticated with controller");

        Ok(UnifiSession { client })
    }
}

/// Authenticated UniFi session.
pub struct UnifiSession {
    client: UnifiClient,
}

impl WlanSession for UnifiSession {
    async fn list_wlans(&self) -> Result<Vec<WlanRecord>, ControllerError> {
        let wlans = self.client.list_wlans().await?;
        Ok(wlans.into_iter().map(WlanRecord::from).collect())
    }

    async fn get_wlan(&self, id: &str) -> Result<WlanRecord, ControllerError> {
        Ok(self.client.get_wlan(id).await?.into())
    }

    async fn update_wlan(
        &self,
        id: &str,
        record: &WlanRecord,
    ) -> Result<WlanRecord, ControllerError> {
        let conf = WlanConf::from(record.clone());
        Ok(self.client.update_wlan(id, &conf).await?.into())
    }

    async fn logout(&self) -> Result<(), ControllerError> {
        Ok(self.client.logout().await?)
    }
}

fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
        cookie_jar: None, // UnifiClient::new adds one
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
