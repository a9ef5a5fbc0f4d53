//! The External API Facade: a thin `axum` router over the orchestrator's
//! read/build/secret operations. Every handler constructs a fresh
//! [`stackctl_orchestrator::Orchestrator`] per request — there is no
//! process-wide shared instance (see `stackctl_orchestrator::context`).

pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;

use std::net::SocketAddr;

/// Bind and serve the facade on `host:port` until the process is killed.
pub async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    let app = router();
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!(%addr, "serving stackctl API");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
