use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::RwLock;

use common::{
    Bar, BuyAlert, Classification, Error, MarketDataSource, Notifier, Result, ScanCommand,
    ScannerState,
};
use engine::{ScanLoop, ScanSettings, Scanner, SignalHistory};
use strategy::MaCrossoverRule;

/// In-memory market: symbol → canned kline response.
struct FakeMarket {
    universe: Result<Vec<String>, String>,
    klines: HashMap<String, Result<Vec<Bar>, String>>,
}

#[async_trait]
impl MarketDataSource for FakeMarket {
    async fn symbols(&self) -> Result<Vec<String>> {
        self.universe.clone().map_err(Error::Exchange)
    }

    async fn klines(&self, symbol: &str, _interval: &str, _limit: u16) -> Result<Vec<Bar>> {
        match self.klines.get(symbol) {
            Some(Ok(bars)) => Ok(bars.clone()),
            Some(Err(msg)) => Err(Error::Http(msg.clone())),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    alerts: Mutex<Vec<BuyAlert>>,
    fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_buy(&self, alert: &BuyAlert) -> Result<()> {
        self.alerts.lock().unwrap().push(alert.clone());
        if self.fail {
            return Err(Error::Notify("chat unreachable".into()));
        }
        Ok(())
    }
}

fn bars(closes: &[f64], volumes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| Bar {
            timestamp: Utc.timestamp_opt(1_700_000_000 + i as i64 * 900, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume,
        })
        .collect()
}

fn breakout_bars() -> Vec<Bar> {
    let mut closes = vec![100.0; 93];
    closes.extend([99.0; 6]);
    closes.push(110.0);
    let mut volumes = vec![100.0; 99];
    volumes.push(200.0);
    bars(&closes, &volumes)
}

fn flat_bars() -> Vec<Bar> {
    bars(&[50.0; 100], &[10.0; 100])
}

fn duplicated_bars() -> Vec<Bar> {
    let mut b = flat_bars();
    b[10].timestamp = b[9].timestamp;
    b
}

fn market() -> FakeMarket {
    let mut klines = HashMap::new();
    klines.insert("BRKUSDT".to_string(), Ok(breakout_bars()));
    klines.insert("FLATUSDT".to_string(), Ok(flat_bars()));
    klines.insert("DUPUSDT".to_string(), Ok(duplicated_bars()));
    klines.insert("DOWNUSDT".to_string(), Err("timed out".to_string()));
    FakeMarket {
        universe: Ok(vec![
            "FLATUSDT".into(),
            "DUPUSDT".into(),
            "BRKUSDT".into(),
            "DOWNUSDT".into(),
            "EMPTYUSDT".into(),
        ]),
        klines,
    }
}

fn scanner(
    source: FakeMarket,
    notifier: Arc<RecordingNotifier>,
    history: Arc<RwLock<SignalHistory>>,
) -> Scanner {
    Scanner::new(
        Arc::new(source),
        notifier,
        Arc::new(MaCrossoverRule::default()),
        history,
        ScanSettings {
            concurrency: 2,
            ..ScanSettings::default()
        },
    )
}

#[tokio::test]
async fn cycle_classifies_notifies_and_isolates_failures() {
    let notifier = Arc::new(RecordingNotifier::default());
    let history = Arc::new(RwLock::new(SignalHistory::new(100)));
    let report = scanner(market(), notifier.clone(), history.clone())
        .run_cycle()
        .await;

    let symbols: Vec<&str> = report.results.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["FLATUSDT", "BRKUSDT"]);
    assert_eq!(report.results[0].classification, Classification::Hold);
    assert_eq!(
        report.results[1].classification,
        Classification::Buy { entry_price: 110.0 }
    );
    assert_eq!(report.results[1].frames.len(), 100);
    assert_eq!(report.buy_count(), 1);

    let failed: Vec<&str> = report.failures.iter().map(|f| f.symbol.as_str()).collect();
    assert_eq!(failed, vec!["DUPUSDT", "DOWNUSDT"]);
    assert!(report.failures[0].error.contains("duplicate timestamp"));

    let alerts = notifier.alerts.lock().unwrap().clone();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].symbol, "BRKUSDT");
    assert_eq!(alerts[0].entry_price, 110.0);

    let logged = history.read().await.recent(10);
    assert_eq!(logged.len(), 2);
    assert_eq!(logged[1].symbol, "BRKUSDT");
    assert!(logged[1].classification.is_buy());
}

#[tokio::test]
async fn notifier_failure_does_not_abort_cycle() {
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..RecordingNotifier::default()
    });
    let history = Arc::new(RwLock::new(SignalHistory::new(100)));
    let report = scanner(market(), notifier.clone(), history.clone())
        .run_cycle()
        .await;

    assert_eq!(report.buy_count(), 1);
    assert_eq!(notifier.alerts.lock().unwrap().len(), 1);
    assert_eq!(history.read().await.len(), 2);
}

#[tokio::test]
async fn universe_failure_yields_empty_report() {
    let source = FakeMarket {
        universe: Err("HTTP 418".into()),
        klines: HashMap::new(),
    };
    let notifier = Arc::new(RecordingNotifier::default());
    let history = Arc::new(RwLock::new(SignalHistory::new(100)));
    let report = scanner(source, notifier, history.clone()).run_cycle().await;

    assert!(report.results.is_empty());
    assert!(report.failures.is_empty());
    assert!(history.read().await.is_empty());
}

#[tokio::test]
async fn history_is_capped_across_cycles() {
    let notifier = Arc::new(RecordingNotifier::default());
    let history = Arc::new(RwLock::new(SignalHistory::new(3)));
    let scanner = scanner(market(), notifier, history.clone());

    scanner.run_cycle().await;
    scanner.run_cycle().await;

    let logged = history.read().await.recent(100);
    assert_eq!(logged.len(), 3);
    let symbols: Vec<&str> = logged.iter().map(|e| e.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BRKUSDT", "FLATUSDT", "BRKUSDT"]);
}

#[tokio::test]
async fn scan_loop_publishes_reports_and_obeys_commands() {
    let notifier = Arc::new(RecordingNotifier::default());
    let history = Arc::new(RwLock::new(SignalHistory::new(100)));
    let (scan_loop, handle) = ScanLoop::new(
        scanner(market(), notifier.clone(), history),
        Duration::from_secs(3600),
    );
    let task = tokio::spawn(scan_loop.run());

    // The first tick fires immediately.
    let mut report = None;
    for _ in 0..200 {
        if let Some(r) = handle.latest_report().await {
            report = Some(r);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let first = report.expect("initial scan should publish a report");
    assert_eq!(first.buy_count(), 1);

    handle.send(ScanCommand::Pause).await;
    handle.send(ScanCommand::ScanNow).await;
    for _ in 0..200 {
        let done = handle
            .latest_report()
            .await
            .map(|r| r.id != first.id)
            .unwrap_or(false);
        if done && handle.state().await == ScannerState::Paused {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(handle.state().await, ScannerState::Paused);
    assert_ne!(handle.latest_report().await.unwrap().id, first.id);
    assert_eq!(handle.recent_history(100).await.len(), 4);

    handle.send(ScanCommand::Resume).await;
    handle.send(ScanCommand::Shutdown).await;
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("scan loop should stop")
        .unwrap();
    assert_eq!(handle.state().await, ScannerState::Idle);
}
