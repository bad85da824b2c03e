//! HTTP server facade for Bookshelf: router assembly, error mapping, and the
//! liveness request pipeline.

use anyhow::Context;
use axum::{routing::get, Router};

use bookshelf_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod pipeline;
pub mod router;

pub use error::AppError;
pub use pipeline::{LiveStore, SharedProbe};
use router::RouterBuilder;

/// Serve until `shutdown` resolves.
pub async fn start_server<F>(
    router: Router,
    settings: &Settings,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let address = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {address}"))?;

    tracing::info!("HTTP server listening on http://{}", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main router: module routes, health check, and OpenAPI document,
/// wrapped by the liveness gate and the tower-http middleware stack.
pub fn build_router(registry: &ModuleRegistry, settings: &Settings, probe: SharedProbe) -> Router {
    let mut router_builder = RouterBuilder::new().route("/healthz", get(health_check));

    for module in registry.modules() {
        let base_path = module.base_path();
        tracing::info!(module = module.name(), "mounting module routes under {}", base_path);
        router_builder = router_builder.mount_module(&base_path, module.routes());
    }

    router_builder
        .with_openapi(registry)
        .with_liveness(probe)
        .with_timeout(settings.server.request_timeout_ms)
        .with_cors()
        .with_tracing()
        .with_request_id()
        .build()
}

/// Only reachable once the liveness gate has admitted the request
async fn health_check() -> &'static str {
    "ok"
}
