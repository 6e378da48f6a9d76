//! Application settings and the server configuration built from them.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;
use zeroize::Zeroizing;

use teamboard::domain::AdminSecret;
use teamboard::inbound::http::session_config::SessionSettings;
use teamboard::outbound::persistence::{DEFAULT_NAMESPACE, DEFAULT_TIMEOUT, DocumentStoreConfig};
use teamboard::outbound::session::{DEFAULT_SESSION_TTL, MAX_SESSION_TTL};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const MAX_SESSION_TTL_HOURS: i64 = MAX_SESSION_TTL.whole_hours();

/// Settings read from `TEAMBOARD_*` environment variables, configuration
/// files and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "TEAMBOARD")]
pub struct AppSettings {
    /// Interface to bind.
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Document store root. When absent, records live in process memory.
    pub store_url: Option<String>,
    pub store_namespace: Option<String>,
    /// Sent as the `auth` query parameter on every store request.
    pub store_auth_token: Option<String>,
    pub store_timeout_secs: Option<u64>,
    /// Shared secret unlocking the admin identity. Admin login is disabled
    /// without it.
    pub admin_secret: Option<String>,
    pub session_ttl_hours: Option<i64>,
}

/// Reasons the settings cannot be turned into a [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid host {host:?}")]
    InvalidHost { host: String },
    #[error("invalid store url {url:?}: {reason}")]
    InvalidStoreUrl { url: String, reason: String },
    #[error("session ttl must be between 1 and {MAX_SESSION_TTL_HOURS} hours, got {hours}")]
    InvalidSessionTtl { hours: i64 },
    #[error("store timeout must be at least one second")]
    InvalidStoreTimeout,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let ip: IpAddr = host.parse().map_err(|_| SettingsError::InvalidHost {
            host: host.to_owned(),
        })?;
        Ok(SocketAddr::new(ip, self.port.unwrap_or(DEFAULT_PORT)))
    }

    pub fn session_ttl(&self) -> Result<CookieDuration, SettingsError> {
        match self.session_ttl_hours {
            None => Ok(DEFAULT_SESSION_TTL),
            Some(hours) if (1..=MAX_SESSION_TTL_HOURS).contains(&hours) => hours
                .checked_mul(3600)
                .map(CookieDuration::seconds)
                .ok_or(SettingsError::InvalidSessionTtl { hours }),
            Some(hours) => Err(SettingsError::InvalidSessionTtl { hours }),
        }
    }

    /// Remote store settings, or `None` for the in-memory store.
    pub fn document_store(&self) -> Result<Option<DocumentStoreConfig>, SettingsError> {
        let Some(raw) = self.store_url.as_deref() else {
            return Ok(None);
        };
        let base_url = Url::parse(raw).map_err(|err| SettingsError::InvalidStoreUrl {
            url: raw.to_owned(),
            reason: err.to_string(),
        })?;
        let timeout = match self.store_timeout_secs {
            None => DEFAULT_TIMEOUT,
            Some(0) => return Err(SettingsError::InvalidStoreTimeout),
            Some(secs) => Duration::from_secs(secs),
        };
        let mut config = DocumentStoreConfig::new(base_url);
        config.namespace = self
            .store_namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_owned());
        config.auth_token = self.store_auth_token.clone().map(Zeroizing::new);
        config.timeout = timeout;
        Ok(Some(config))
    }

    pub fn admin_secret(&self) -> Option<AdminSecret> {
        self.admin_secret.clone().and_then(AdminSecret::new)
    }
}

/// Everything [`super::create_server`] needs to start listening.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) session_ttl: CookieDuration,
    pub(crate) store: Option<DocumentStoreConfig>,
    pub(crate) admin_secret: Option<AdminSecret>,
}

impl ServerConfig {
    /// Combine cookie settings with the application settings.
    pub fn from_settings(
        settings: &AppSettings,
        session: SessionSettings,
    ) -> Result<Self, SettingsError> {
        let SessionSettings {
            key,
            cookie_secure,
            same_site,
        } = session;
        Ok(Self {
            key,
            cookie_secure,
            same_site,
            bind_addr: settings.bind_addr()?,
            session_ttl: settings.session_ttl()?,
            store: settings.document_store()?,
            admin_secret: settings.admin_secret(),
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    pub fn admin_enabled(&self) -> bool {
        self.admin_secret.is_some()
    }

    pub fn uses_document_store(&self) -> bool {
        self.store.is_some()
    }
}
