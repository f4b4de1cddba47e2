use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use common::{
    BuyAlert, Classification, MarketDataSource, Notifier, PriceSeries, Result, SignalHistoryEntry,
};
use strategy::{IndicatorEngine, IndicatorFrame, SignalRule};

use crate::history::SignalHistory;

/// Kline request parameters and fan-out width for one scan cycle.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Kline interval, e.g. "15m".
    pub interval: String,
    /// Bars fetched per instrument.
    pub limit: u16,
    /// Maximum instruments fetched and evaluated at once.
    pub concurrency: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            interval: "15m".to_string(),
            limit: 100,
            concurrency: 8,
        }
    }
}

/// Evaluation of one instrument in one cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub symbol: String,
    #[serde(flatten)]
    pub classification: Classification,
    pub evaluated_at: DateTime<Utc>,
    pub frames: Vec<IndicatorFrame>,
}

impl ScanResult {
    pub fn latest_frame(&self) -> Option<&IndicatorFrame> {
        self.frames.last()
    }
}

/// An instrument whose data could not be fetched or validated.
#[derive(Debug, Clone, Serialize)]
pub struct ScanFailure {
    pub symbol: String,
    pub error: String,
}

/// Everything one scan cycle produced, in universe order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub results: Vec<ScanResult>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    fn empty(started_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            results: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn buys(&self) -> impl Iterator<Item = &ScanResult> {
        self.results.iter().filter(|r| r.classification.is_buy())
    }

    pub fn buy_count(&self) -> usize {
        self.buys().count()
    }

    pub fn result(&self, symbol: &str) -> Option<&ScanResult> {
        self.results.iter().find(|r| r.symbol.eq_ignore_ascii_case(symbol))
    }
}

/// Runs one scan cycle across the whole instrument universe.
///
/// Fetching is concurrent and bounded; indicator computation and rule
/// evaluation are pure. BUY alerts and history entries are written once
/// every instrument has been evaluated.
pub struct Scanner {
    source: Arc<dyn MarketDataSource>,
    notifier: Arc<dyn Notifier>,
    rule: Arc<dyn SignalRule>,
    engine: IndicatorEngine,
    history: Arc<RwLock<SignalHistory>>,
    settings: ScanSettings,
}

impl Scanner {
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        notifier: Arc<dyn Notifier>,
        rule: Arc<dyn SignalRule>,
        history: Arc<RwLock<SignalHistory>>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            source,
            notifier,
            rule,
            engine: IndicatorEngine::new(),
            history,
            settings,
        }
    }

    pub fn history(&self) -> Arc<RwLock<SignalHistory>> {
        self.history.clone()
    }

    /// Compute frames and classify one validated series.
    pub fn evaluate(&self, series: &PriceSeries) -> ScanResult {
        let frames = self.engine.compute(series);
        let classification = self.rule.evaluate(&frames);
        ScanResult {
            symbol: series.symbol().to_string(),
            classification,
            evaluated_at: Utc::now(),
            frames,
        }
    }

    /// One full cycle. Never fails as a whole: a universe fetch error yields an
    /// empty report, per-instrument errors land in `failures`.
    pub async fn run_cycle(&self) -> ScanReport {
        let started_at = Utc::now();

        let symbols = match self.source.symbols().await {
            Ok(symbols) => symbols,
            Err(e) => {
                error!(error = %e, "Failed to fetch instrument universe — skipping cycle");
                return ScanReport::empty(started_at);
            }
        };
        info!(symbols = symbols.len(), rule = self.rule.name(), "Scan cycle started");

        let outcomes: Vec<(String, Result<Option<ScanResult>>)> = stream::iter(symbols)
            .map(|symbol| async move {
                let outcome = self.scan_symbol(&symbol).await;
                (symbol, outcome)
            })
            .buffered(self.settings.concurrency.max(1))
            .collect()
            .await;

        let mut results = Vec::with_capacity(outcomes.len());
        let mut failures = Vec::new();
        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(Some(result)) => results.push(result),
                Ok(None) => warn!(symbol = %symbol, "No klines returned — skipped"),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Instrument evaluation failed");
                    failures.push(ScanFailure {
                        symbol,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.dispatch_alerts(&results).await;
        self.record_history(&results).await;

        let report = ScanReport {
            id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            results,
            failures,
        };
        info!(
            cycle = %report.id,
            evaluated = report.results.len(),
            buys = report.buy_count(),
            failures = report.failures.len(),
            elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
            "Scan cycle finished"
        );
        report
    }

    async fn scan_symbol(&self, symbol: &str) -> Result<Option<ScanResult>> {
        let bars = self
            .source
            .klines(symbol, &self.settings.interval, self.settings.limit)
            .await?;
        if bars.is_empty() {
            return Ok(None);
        }
        let series = PriceSeries::new(symbol, bars)?;
        Ok(Some(self.evaluate(&series)))
    }

    async fn dispatch_alerts(&self, results: &[ScanResult]) {
        for result in results {
            let Classification::Buy { entry_price } = result.classification else {
                continue;
            };
            let alert = BuyAlert {
                symbol: result.symbol.clone(),
                entry_price,
                timestamp: result.evaluated_at,
            };
            if let Err(e) = self.notifier.notify_buy(&alert).await {
                error!(symbol = %alert.symbol, error = %e, "Failed to deliver BUY alert");
            }
        }
    }

    async fn record_history(&self, results: &[ScanResult]) {
        let entries = results.iter().map(|r| SignalHistoryEntry {
            time: r.evaluated_at,
            symbol: r.symbol.clone(),
            classification: r.classification,
        });
        self.history.write().await.extend(entries);
    }
}
