//! Outbound notifications. Delivery is best-effort.

use async_trait::async_trait;
use tracing::{info, warn};

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> anyhow::Result<()>;
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> anyhow::Result<()> {
        info!(target: "notify", "{message}");
        Ok(())
    }
}

/// Send and swallow the failure; a broken sink never aborts the caller.
pub async fn notify(notifier: &dyn Notifier, message: &str) {
    if let Err(e) = notifier.send(message).await {
        warn!("notification dropped: {e:#}");
    }
}
