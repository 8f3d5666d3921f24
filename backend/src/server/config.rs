//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `RIDEMATCH_*` environment variables, or a
//! configuration file, with the fallbacks below when unset.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use ridematch::inbound::ws::state::AllowedOrigins;
use ridematch::outbound::DEFAULT_AVERAGE_SPEED_KMH;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_ORACLE_TIMEOUT_MS: u64 = 2_000;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Raw settings as supplied by the operator.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RIDEMATCH")]
pub struct ServerSettings {
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Upper bound for a single segment oracle call, in milliseconds.
    pub oracle_timeout_ms: Option<u64>,
    /// Average speed the geometric oracle uses to price segments.
    pub average_speed_kmh: Option<f64>,
    /// Comma-separated origins allowed to open `/ws`.
    pub allowed_origins: Option<String>,
}

/// Settings resolved into the types the server needs.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) oracle_timeout: Duration,
    pub(crate) average_speed_kmh: f64,
    pub(crate) allowed_origins: AllowedOrigins,
}

impl TryFrom<ServerSettings> for ServerConfig {
    type Error = std::io::Error;

    fn try_from(settings: ServerSettings) -> Result<Self, Self::Error> {
        let raw_addr = settings.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        let bind_addr = raw_addr.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind address {raw_addr}: {err}"),
            )
        })?;
        let origins = settings
            .allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS);
        Ok(Self {
            bind_addr,
            oracle_timeout: Duration::from_millis(
                settings
                    .oracle_timeout_ms
                    .unwrap_or(DEFAULT_ORACLE_TIMEOUT_MS),
            ),
            average_speed_kmh: settings
                .average_speed_kmh
                .unwrap_or(DEFAULT_AVERAGE_SPEED_KMH),
            allowed_origins: AllowedOrigins::parse(
                origins.split(',').map(str::trim).filter(|s| !s.is_empty()),
            ),
        })
    }
}
