use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

pub const ENV_LISTEN: &str = "CLASSROOM_LISTEN";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "CLASSROOM_REQUEST_TIMEOUT_SECS";
pub const ENV_SERVER_URL: &str = "CLASSROOM_URL";

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    /// Requests still running after this long are answered with 408.
    pub request_timeout: Duration,
    pub enable_cors: bool,
    /// Emit log lines as JSON objects instead of plain text.
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            enable_cors: true,
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Loopback on an OS-assigned port.
    pub fn ephemeral() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            ..Self::default()
        }
    }
}
