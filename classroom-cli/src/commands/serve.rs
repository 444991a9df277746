//! `classroom serve`: run the HTTP server until Ctrl-C or SIGTERM.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use classroom_server::config::{DEFAULT_LISTEN, ENV_LISTEN, ENV_REQUEST_TIMEOUT_SECS};
use classroom_server::{start_blocking, ServerConfig};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on.
    #[arg(long, env = ENV_LISTEN, default_value = DEFAULT_LISTEN)]
    pub listen: SocketAddr,

    /// Seconds before a request is answered with 408.
    #[arg(long, env = ENV_REQUEST_TIMEOUT_SECS, default_value_t = 5)]
    pub request_timeout_secs: u64,

    /// Do not send CORS headers.
    #[arg(long)]
    pub no_cors: bool,

    /// Log JSON lines instead of plain text.
    #[arg(long)]
    pub log_json: bool,
}

impl ServeArgs {
    pub fn config(&self) -> ServerConfig {
        ServerConfig {
            listen_addr: self.listen,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            enable_cors: !self.no_cors,
            log_json: self.log_json,
        }
    }

    pub fn run(self) -> Result<()> {
        let config = self.config();
        start_blocking(config).context("server exited with error")
    }
}
