//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use donorpath_content::{ContentStore, LoadOptions};
use donorpath_impact::{DonationHandoff, parse_web_url};
use url::Url;

use crate::error::AppError;

/// Idle time after which a journey is ended, in seconds.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 30 * 60;

/// Settings the server reads once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Directory holding `stories.json` and `map-hotspots.json`; bundled
    /// content when unset.
    pub content_dir: Option<PathBuf>,
    /// Fail startup on dangling choices instead of warning.
    pub strict_graph: bool,
    /// Where engagement records are POSTed; logged only when unset.
    pub analytics_endpoint: Option<Url>,
    /// Donation page the hand-off links to.
    pub donate_url: Url,
    /// Journeys with nothing recorded for this long are ended.
    pub session_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 3000,
            content_dir: None,
            strict_graph: true,
            analytics_endpoint: None,
            donate_url: DonationHandoff::default().base_url().clone(),
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

impl ServerConfig {
    /// Reads `HOST`, `PORT`, `CONTENT_DIR`, `CONTENT_STRICT_GRAPH`,
    /// `ANALYTICS_ENDPOINT`, `DONATE_URL` and `SESSION_IDLE_TIMEOUT_SECS`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ServerConfig::from_env`] over an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();
        let set = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match set("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => defaults.port,
        };
        let strict_graph = match set("CONTENT_STRICT_GRAPH") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::Config(format!("CONTENT_STRICT_GRAPH must be true or false, got {raw}"))
            })?,
            None => defaults.strict_graph,
        };
        let analytics_endpoint = set("ANALYTICS_ENDPOINT")
            .map(|raw| require_http_url("ANALYTICS_ENDPOINT", &raw))
            .transpose()?;
        let donate_url = match set("DONATE_URL") {
            Some(raw) => require_http_url("DONATE_URL", &raw)?,
            None => defaults.donate_url,
        };
        let session_idle_timeout = match set("SESSION_IDLE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "SESSION_IDLE_TIMEOUT_SECS must be a positive number of seconds, got {raw}"
                    ))
                })?,
            None => defaults.session_idle_timeout,
        };

        Ok(Self {
            host: set("HOST").unwrap_or(defaults.host),
            port,
            content_dir: set("CONTENT_DIR").map(PathBuf::from),
            strict_graph,
            analytics_endpoint,
            donate_url,
            session_idle_timeout,
        })
    }

    /// The address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `host:port` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// Loads the catalog from `content_dir`, or the bundled one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Content` if the catalog fails to load.
    pub fn load_content(&self) -> Result<ContentStore, AppError> {
        let options = LoadOptions {
            strict_graph: self.strict_graph,
        };
        let store = match &self.content_dir {
            Some(dir) => ContentStore::from_dir(dir, options)?,
            None => ContentStore::bundled(options)?,
        };
        Ok(store)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn require_http_url(key: &str, value: &str) -> Result<Url, AppError> {
    parse_web_url(value).map_err(|e| AppError::Config(format!("{key}: {e}")))
}
