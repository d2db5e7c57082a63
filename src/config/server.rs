use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Server settings. Every field may be omitted from the TOML file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// `tracing` filter directives, e.g. "corkboard=debug,tower_http=info".
    /// `RUST_LOG` still applies on top of this.
    pub log_filter: Option<String>,
    /// How many recent audit entries per board the activity feed returns.
    pub activity_preview: usize,
}

impl ServerConfig {
    /// Reads a TOML config file. A missing path yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;

        if config.activity_preview == 0 {
            return Err(Error::Config(
                "activity_preview must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> std::result::Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("corkboard.db")
    }

    #[must_use]
    pub fn admin_token_path(&self) -> PathBuf {
        self.data_dir.join(".admin_token")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            log_filter: None,
            activity_preview: 2,
        }
    }
}
