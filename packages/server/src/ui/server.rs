//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{
    handler::{
        create_conversation, get_conversations, get_messages, get_presence, health_check,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Bind or serve failure
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// The messaging hub server
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket_handler))
            .route("/api/health", get(health_check))
            .route("/api/users/{user_id}/presence", get(get_presence))
            .route(
                "/api/conversations",
                get(get_conversations).post(create_conversation),
            )
            .route(
                "/api/conversations/{conversation_id}/messages",
                get(get_messages),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the hub until Ctrl+C or SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// On shutdown every connection is cancelled, then connection tasks are
    /// given `shutdown_grace` to finish.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        tracing::info!("Messaging hub listening on {}", local_addr);
        tracing::info!("Connect to: ws://{}/ws", local_addr);

        let root = self.state.shutdown.clone();
        let result = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                shutdown.await;
                // upgrade 済みの接続はここで止めないと graceful shutdown が完了しない
                root.cancel();
            })
            .await;

        self.drain().await;
        tracing::info!("Server shutdown complete");

        result.map_err(ServerError::from)
    }

    async fn drain(&self) {
        self.state.shutdown.cancel();
        tracing::info!(
            open = self.state.registry.connection_count(),
            "Closing connections"
        );
        let closed = self.state.registry.close_all();
        self.state.tracker.close();

        let grace = self.state.config.shutdown_grace;
        if tokio::time::timeout(grace, self.state.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                remaining = self.state.tracker.len(),
                "Connection tasks did not finish within {:?}",
                grace
            );
        } else {
            tracing::info!(closed, "All connections drained");
        }
    }
}
