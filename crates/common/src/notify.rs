use async_trait::async_trait;

use crate::{BuyAlert, Result};

/// Delivery channel for BUY alerts.
///
/// Formatting and any derived levels (target, stop-loss) belong to the
/// implementation; the scanner only hands over symbol and entry price.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_buy(&self, alert: &BuyAlert) -> Result<()>;
}
