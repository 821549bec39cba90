//! Ambient: config, component C12.

use std::sync::Arc;
use std::time::Duration;

const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for `client::connect`.
#[derive(Clone)]
pub struct ClientConfig {
    pub handshake_timeout: Duration,
    /// PEM-encoded extra root certificates to trust, in addition to
    /// `webpki-roots`, when dialing a `wss://` URL.
    pub extra_root_certs_pem: Option<Vec<u8>>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            extra_root_certs_pem: None,
        }
    }
}

/// Configuration for `server::accept`/`server::bind`.
#[derive(Clone)]
pub struct ServerConfig {
    pub handshake_timeout: Duration,
    /// Present only when the server should terminate TLS itself.
    pub tls_config: Option<Arc<rustls::ServerConfig>>,
}

impl ServerConfig {
    pub fn new() -> Self {
        Self {
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
            tls_config: None,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("handshake_timeout", &self.handshake_timeout)
            .field("extra_root_certs_pem", &self.extra_root_certs_pem.is_some())
            .finish()
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("handshake_timeout", &self.handshake_timeout)
            .field("tls_config", &self.tls_config.is_some())
            .finish()
    }
}
