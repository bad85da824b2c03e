//! Request admission: every request waits on a store liveness probe.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use bookshelf_kernel::HealthProbe;

use crate::error::AppError;

/// Shared handle to the probe consulted before each request.
pub type SharedProbe = Arc<dyn HealthProbe>;

/// Request extension set once the probe has admitted the request.
#[derive(Clone, Copy, Debug)]
pub struct LiveStore;

/// Middleware wrapping the whole router. Runs the probe and only forwards
/// the request when it succeeds; otherwise answers 503 without touching the
/// handler.
pub async fn require_live_store(
    State(probe): State<SharedProbe>,
    mut request: Request,
    next: Next,
) -> Response {
    match probe.ping().await {
        Ok(()) => {
            request.extensions_mut().insert(LiveStore);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                error = %format!("{err:#}"),
                "store liveness probe failed; refusing request"
            );
            AppError::store_unavailable(format!("store is unavailable: {err}")).into_response()
        }
    }
}
