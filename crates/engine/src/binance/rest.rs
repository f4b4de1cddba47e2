use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use common::{Bar, Error, MarketDataSource, Result};

/// Public REST client for Binance USDT-M futures. Read-only, no API key needed.
pub struct BinanceFuturesClient {
    base_url: String,
    http: Client,
}

impl BinanceFuturesClient {
    /// `timeout` bounds every request; a stalled symbol fails on its own.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn public_get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}

#[async_trait]
impl MarketDataSource for BinanceFuturesClient {
    async fn symbols(&self) -> Result<Vec<String>> {
        let body = self.public_get("/fapi/v1/exchangeInfo", &[]).await?;
        let symbols = parse_symbols(&body)?;
        debug!(count = symbols.len(), "Fetched USDT perpetual universe");
        Ok(symbols)
    }

    async fn klines(&self, symbol: &str, interval: &str, limit: u16) -> Result<Vec<Bar>> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        let body = self.public_get("/fapi/v1/klines", &query).await?;
        parse_klines(&body)
    }
}

/// USDT-quoted perpetual contracts from an `exchangeInfo` payload.
pub fn parse_symbols(body: &str) -> Result<Vec<String>> {
    let info: ExchangeInfo = serde_json::from_str(body)?;
    Ok(info
        .symbols
        .into_iter()
        .filter(|s| s.contract_type == "PERPETUAL" && s.quote_asset == "USDT")
        .map(|s| s.symbol)
        .collect())
}

/// Bars from a `klines` payload: rows of
/// `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
pub fn parse_klines(body: &str) -> Result<Vec<Bar>> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body)?;
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            parse_kline_row(row).ok_or_else(|| {
                Error::Exchange(format!("malformed kline row {i}: {}", Value::Array(row.clone())))
            })
        })
        .collect()
}

fn parse_kline_row(row: &[Value]) -> Option<Bar> {
    let open_ms = row.first()?.as_i64()?;
    let decimal = |idx: usize| -> Option<f64> { row.get(idx)?.as_str()?.parse().ok() };

    Some(Bar {
        timestamp: DateTime::from_timestamp_millis(open_ms)?,
        open: decimal(1)?,
        high: decimal(2)?,
        low: decimal(3)?,
        close: decimal(4)?,
        volume: decimal(5)?,
    })
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    #[serde(default)]
    contract_type: String,
    #[serde(default)]
    quote_asset: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_usdt_perpetuals() {
        let body = r#"{"symbols":[
            {"symbol":"BTCUSDT","contractType":"PERPETUAL","quoteAsset":"USDT","status":"TRADING"},
            {"symbol":"BTCUSDT_240628","contractType":"CURRENT_QUARTER","quoteAsset":"USDT"},
            {"symbol":"ETHBUSD","contractType":"PERPETUAL","quoteAsset":"BUSD"},
            {"symbol":"SOLUSDT","contractType":"PERPETUAL","quoteAsset":"USDT"}
        ]}"#;
        assert_eq!(parse_symbols(body).unwrap(), vec!["BTCUSDT", "SOLUSDT"]);
    }

    #[test]
    fn parses_kline_rows() {
        let body = r#"[
            [1700000000000,"36500.1","36600.0","36450.5","36580.2","1234.567",1700000899999,"0",100,"0","0","0"],
            [1700000900000,"36580.2","36700.0","36500.0","36690.0","987.0",1700001799999,"0",90,"0","0","0"]
        ]"#;
        let bars = parse_klines(body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(bars[0].close, 36580.2);
        assert_eq!(bars[1].volume, 987.0);
    }

    #[test]
    fn forming_candle_is_kept_as_last_bar() {
        // Close time of the second row lies far in the future: the candle is still open.
        let body = r#"[
            [1700000000000,"1.10","1.20","1.00","1.15","500",1700000899999,"0",40,"0","0","0"],
            [1700000900000,"1.15","1.18","1.12","1.17","25",4102444799999,"0",3,"0","0","0"]
        ]"#;
        let bars = parse_klines(body).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 1.17);
        assert_eq!(bars[1].volume, 25.0);
    }

    #[test]
    fn empty_kline_payload_is_empty() {
        assert!(parse_klines("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_row_with_non_numeric_price() {
        let body = r#"[[1700000000000,"abc","1","1","1","1"]]"#;
        assert!(matches!(parse_klines(body), Err(Error::Exchange(_))));
    }

    #[test]
    fn error_payload_is_json_error() {
        let body = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
        assert!(matches!(parse_klines(body), Err(Error::Json(_))));
    }
}
