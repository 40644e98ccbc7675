//! HTTP server for the task API.
//!
//! Builds the axum router and runs it with graceful shutdown.

use axum::{
    Json, Router,
    routing::{get, put},
};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::tasks;
use crate::db::Database;
use crate::error::ApiResult;

/// Name reported by the root endpoint.
pub const SERVICE_NAME: &str = "Task Manager API";

/// API version reported by the root endpoint.
pub const API_VERSION: &str = "1.0";

/// Router state shared across handlers.
///
/// Holds only the database location; connections are opened per request.
#[derive(Clone)]
pub struct ApiServer {
    db: Arc<Database>,
}

impl ApiServer {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Run one store operation on the blocking pool.
    pub async fn run<F, T>(&self, op: F) -> ApiResult<T>
    where
        F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let result = tokio::task::spawn_blocking(move || op(&db)).await?;
        Ok(result?)
    }
}

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
    version: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME,
        version: API_VERSION,
    })
}

/// Liveness only; does not touch the database.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Local::now()
            .format("%Y-%m-%dT%H:%M:%S%.6f")
            .to_string(),
    })
}

/// Build the router with all routes.
pub fn build_router(db: Arc<Database>) -> Router {
    // Any origin, any method, any header
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route("/tasks/", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/tasks/{task_id}",
            get(tasks::get_task).delete(tasks::delete_task),
        )
        .route("/tasks/{task_id}/complete", put(tasks::complete_task))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ApiServer::new(db))
}

/// Handle for a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve until `signal` resolves, then shut down gracefully.
    ///
    /// Returns early if the server stops on its own.
    pub async fn run_until<F>(mut self, signal: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = &mut self.task => {
                result??;
                return Ok(());
            }
            _ = signal => {}
        }
        self.shutdown().await
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) -> anyhow::Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task.await??;
        info!("Server stopped");
        Ok(())
    }
}

/// Bind `host:port` and start serving in the background.
///
/// Port 0 picks a free port; see [`ServerHandle::local_addr`].
pub async fn start_server(db: Arc<Database>, host: &str, port: u16) -> anyhow::Result<ServerHandle> {
    let app = build_router(db);

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;

    info!("Task API listening on http://{}", addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Server shutting down");
            })
            .await
    });

    Ok(ServerHandle {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
