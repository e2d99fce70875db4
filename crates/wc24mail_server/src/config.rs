//! Gateway configuration.
//!
//! Loaded from a JSON file whose keys use PascalCase:
//!
//! ```json
//! {
//!     "Debug": false,
//!     "SupportEmail": "support@example.com",
//!     "BindTo": "0.0.0.0:80",
//!     "SendGridDomain": "mail.example.com",
//!     "SiteDir": "./patch/site",
//!     "AccountsFile": "config/accounts.json"
//! }
//! ```

use crate::error::{ServerError, ServerResult};
use crate::store::DEFAULT_ACCOUNTS_PATH;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";

/// Configuration for the mail gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GatewayConfig {
    /// Verbose logging, including authentication failures.
    #[serde(default)]
    pub debug: bool,
    /// Contact address shown to users when patching fails.
    #[serde(default)]
    pub support_email: String,
    /// Address to bind to.
    #[serde(default = "default_bind_addr")]
    pub bind_to: SocketAddr,
    /// Domain that inbound mail is addressed to.
    #[serde(rename = "SendGridDomain", default)]
    pub mail_domain: Option<String>,
    /// Directory holding the static patcher site.
    #[serde(default = "default_site_dir")]
    pub site_dir: PathBuf,
    /// Error-reporting DSN, if any.
    #[serde(rename = "RavenDSN", default)]
    pub raven_dsn: Option<String>,
    /// JSON file holding registered accounts.
    #[serde(default = "default_accounts_file")]
    pub accounts_file: PathBuf,
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_site_dir() -> PathBuf {
    PathBuf::from("./patch/site")
}

fn default_accounts_file() -> PathBuf {
    PathBuf::from(DEFAULT_ACCOUNTS_PATH)
}

impl GatewayConfig {
    /// Creates a configuration bound to the given address.
    pub fn new(bind_to: SocketAddr) -> Self {
        Self {
            debug: false,
            support_email: String::new(),
            bind_to,
            mail_domain: None,
            site_dir: default_site_dir(),
            raven_dsn: None,
            accounts_file: default_accounts_file(),
        }
    }

    /// Reads the configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("unable to read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    /// Parses the configuration from JSON text.
    pub fn from_json(raw: &str) -> ServerResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        if config.support_email.is_empty() {
            tracing::warn!("no SupportEmail configured; patch errors will not show a contact");
        }
        Ok(config)
    }

    /// Enables or disables debug mode.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Sets the support contact address.
    pub fn with_support_email(mut self, email: impl Into<String>) -> Self {
        self.support_email = email.into();
        self
    }

    /// Sets the bind address.
    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_to = addr;
        self
    }

    /// Sets the static site directory.
    pub fn with_site_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.site_dir = dir.into();
        self
    }

    /// Sets the account file.
    pub fn with_accounts_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.accounts_file = path.into();
        self
    }

    /// Sets the inbound mail domain.
    pub fn with_mail_domain(mut self, domain: impl Into<String>) -> Self {
        self.mail_domain = Some(domain.into());
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::new(default_bind_addr())
    }
}
