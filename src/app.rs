use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use bookshelf_classify::ClassifyClient;
use bookshelf_db::{BookStore, SqliteBookStore};
use bookshelf_http::SharedProbe;
use bookshelf_kernel::{settings::Settings, HealthProbe, InitCtx, ModuleRegistry};

use crate::modules::{self, books::BooksState};

/// Registry holding every application module, built from explicit
/// dependencies.
pub fn build_registry(store: Arc<dyn BookStore>, classify: ClassifyClient) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, BooksState { store, classify });
    registry
}

/// Registry plus the full router. The store doubles as the liveness probe.
pub fn build_app<S>(
    settings: &Settings,
    store: Arc<S>,
    classify: ClassifyClient,
) -> (ModuleRegistry, Router)
where
    S: BookStore + HealthProbe + 'static,
{
    let probe: SharedProbe = store.clone();
    let registry = build_registry(store, classify);
    let router = bookshelf_http::build_router(&registry, settings, probe);
    (registry, router)
}

/// Apply pending migrations contributed by the registered modules.
pub async fn migrate(store: &SqliteBookStore, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let applied = store
        .apply_migrations(registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;

    tracing::info!(applied, "migrations complete");
    Ok(applied)
}

/// Open the store, run the module lifecycle, and serve until Ctrl-C.
pub async fn serve(settings: Settings) -> anyhow::Result<()> {
    let store = Arc::new(
        SqliteBookStore::open(&settings.database)
            .with_context(|| format!("failed to open database '{}'", settings.database.path))?,
    );
    let classify = ClassifyClient::new(&settings.classify).context("failed to build classify client")?;

    let (registry, router) = build_app(&settings, store.clone(), classify);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    if settings.database.run_migrations {
        migrate(&store, &registry).await?;
    }
    registry.start_modules(&ctx).await?;

    bookshelf_http::start_server(router, &settings, shutdown_signal()).await?;

    registry.stop_modules().await?;
    tracing::info!("bookshelf stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
