//! Overlay HTTP server lifecycle.

use std::net::SocketAddr;
use std::sync::Arc;

use streamgarden_core::config::ServerSection;
use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Where the overlay server listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host address (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl ServerConfig {
    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if host and port do not form an address.
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        let raw = format!("{}:{}", self.host, self.port);
        raw.parse()
            .map_err(|e| ServerError::Bind(format!("invalid address {raw}: {e}")))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerSection::default().into()
    }
}

impl From<ServerSection> for ServerConfig {
    fn from(section: ServerSection) -> Self {
        Self {
            host: section.host,
            port: section.port,
        }
    }
}

/// Bind and serve until the process ends.
///
/// # Errors
///
/// Returns [`ServerError`] if the listener cannot bind or serving fails.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let addr = config.addr()?;
    let router = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {addr}: {e}")))?;

    info!(%addr, "overlay server listening");

    axum::serve(listener, router)
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))
}

/// Errors from starting or running the overlay server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the address.
    #[error("bind error: {0}")]
    Bind(String),

    /// Fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_comes_from_the_server_section() {
        let config = ServerConfig::from(ServerSection {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        });
        let expected = SocketAddr::from(([127, 0, 0, 1], 3000));
        assert_eq!(config.addr().ok(), Some(expected));
    }

    #[test]
    fn malformed_host_is_a_bind_error() {
        let config = ServerConfig {
            host: "not a host".to_owned(),
            port: 3000,
        };
        assert!(matches!(config.addr(), Err(ServerError::Bind(_))));
    }
}
