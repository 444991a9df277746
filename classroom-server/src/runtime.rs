use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use classroom_core::Registry;

use crate::api::{router, AppState};
use crate::config::ServerConfig;
use crate::error::{io_err, ServerError};

/// A bound HTTP listener plus the registry it serves.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    registry: Arc<Registry>,
}

impl Server {
    /// Bind `config.listen_addr` with a fresh, empty registry.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        Self::bind_with(config, Arc::new(Registry::new())).await
    }

    pub async fn bind_with(
        config: ServerConfig,
        registry: Arc<Registry>,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(config.listen_addr)
            .await
            .map_err(|e| io_err(format!("bind {}", config.listen_addr), e))?;
        Ok(Self {
            listener,
            config,
            registry,
        })
    }

    /// The address actually bound; resolves port 0 to the assigned port.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| io_err("listener local address", e))
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        let app = router(AppState::new(self.registry), &self.config);

        tracing::info!(
            %addr,
            request_timeout_ms = self.config.request_timeout.as_millis() as u64,
            cors = self.config.enable_cors,
            "classroom server listening"
        );
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| io_err(format!("serve {addr}"), e))?;
        tracing::info!("classroom server stopped");
        Ok(())
    }

    /// Serve until Ctrl-C or SIGTERM.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_until(shutdown_signal()).await
    }
}

/// Entry point for `classroom serve`: tracing, a multi-threaded runtime and
/// a server that stops on Ctrl-C or SIGTERM.
pub fn start_blocking(config: ServerConfig) -> Result<(), ServerError> {
    init_tracing(config.log_json);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(async move { Server::bind(config).await?.run().await })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

fn init_tracing(json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    } else {
        let _ = fmt().with_env_filter(filter).with_target(false).try_init();
    }
}
