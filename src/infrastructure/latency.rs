use async_trait::async_trait;
use std::time::Duration;

/// Delay awaited before every data store operation.
///
/// Production uses [`NoLatency`]; [`FixedLatency`] makes slow storage
/// reproducible while working on loading states.
#[async_trait]
pub trait LatencyStrategy: Send + Sync {
    async fn delay(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoLatency;

#[async_trait]
impl LatencyStrategy for NoLatency {
    async fn delay(&self) {}
}

#[derive(Debug, Clone, Copy)]
pub struct FixedLatency(pub Duration);

#[async_trait]
impl LatencyStrategy for FixedLatency {
    async fn delay(&self) {
        tokio::time::sleep(self.0).await;
    }
}
