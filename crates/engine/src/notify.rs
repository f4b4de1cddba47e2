use async_trait::async_trait;
use tracing::info;

use common::{BuyAlert, Notifier, Result};

/// Writes BUY alerts to the log. Used when no Telegram chat is configured.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_buy(&self, alert: &BuyAlert) -> Result<()> {
        info!(symbol = %alert.symbol, entry = alert.entry_price, "BUY signal");
        Ok(())
    }
}
