use async_trait::async_trait;

use crate::{Bar, Result};

/// Abstraction over the market-data collaborator.
///
/// `BinanceFuturesClient` in `crates/engine` implements this against the
/// USDT-M futures REST API. Tests substitute in-memory sources.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// The instrument universe to scan.
    async fn symbols(&self) -> Result<Vec<String>>;

    /// Most recent `limit` bars for `symbol` at `interval` (e.g. "15m"), oldest first.
    async fn klines(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Bar>>;
}
