use async_trait::async_trait;

/// Connectivity check used to admit requests.
///
/// Implemented by backing stores; the HTTP pipeline calls [`HealthProbe::ping`]
/// before every request and refuses service when it fails.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> anyhow::Result<()>;
}
