use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use common::{ScanCommand, ScannerState, SignalHistoryEntry};

use crate::history::SignalHistory;
use crate::scanner::{ScanReport, Scanner};

/// Cloneable handle passed to other crates (Telegram, API).
#[derive(Clone)]
pub struct ScannerHandle {
    command_tx: mpsc::Sender<ScanCommand>,
    state: Arc<RwLock<ScannerState>>,
    latest: Arc<RwLock<Option<Arc<ScanReport>>>>,
    history: Arc<RwLock<SignalHistory>>,
}

impl ScannerHandle {
    pub async fn send(&self, cmd: ScanCommand) {
        if self.command_tx.send(cmd).await.is_err() {
            warn!(command = ?cmd, "Scan loop is gone — command dropped");
        }
    }

    pub async fn state(&self) -> ScannerState {
        *self.state.read().await
    }

    /// The most recently completed cycle, if any.
    pub async fn latest_report(&self) -> Option<Arc<ScanReport>> {
        self.latest.read().await.clone()
    }

    /// At most `limit` newest history entries, oldest first.
    pub async fn recent_history(&self, limit: usize) -> Vec<SignalHistoryEntry> {
        self.history.read().await.recent(limit)
    }
}

/// Drives scan cycles: one at startup, then one per `interval`, plus
/// on-demand cycles via [`ScanCommand::ScanNow`].
pub struct ScanLoop {
    scanner: Scanner,
    interval: Duration,
    paused: bool,
    state: Arc<RwLock<ScannerState>>,
    latest: Arc<RwLock<Option<Arc<ScanReport>>>>,
    command_rx: mpsc::Receiver<ScanCommand>,
}

impl ScanLoop {
    pub fn new(scanner: Scanner, interval: Duration) -> (Self, ScannerHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);
        let state = Arc::new(RwLock::new(ScannerState::Idle));
        let latest = Arc::new(RwLock::new(None));

        let handle = ScannerHandle {
            command_tx,
            state: state.clone(),
            latest: latest.clone(),
            history: scanner.history(),
        };

        let scan_loop = ScanLoop {
            scanner,
            interval,
            paused: false,
            state,
            latest,
            command_rx,
        };

        (scan_loop, handle)
    }

    /// Run until `Shutdown` arrives or every handle is dropped.
    /// Call from `tokio::spawn`.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Scan loop started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.paused {
                        debug!("Scheduled scan skipped — scanner paused");
                        continue;
                    }
                    self.scan().await;
                }
                cmd = self.command_rx.recv() => match cmd {
                    Some(ScanCommand::ScanNow) => {
                        info!("On-demand scan requested");
                        self.scan().await;
                    }
                    Some(ScanCommand::Pause) => {
                        if !self.paused {
                            info!("Scanner paused — scheduled scans suppressed");
                            self.paused = true;
                            *self.state.write().await = ScannerState::Paused;
                        }
                    }
                    Some(ScanCommand::Resume) => {
                        if self.paused {
                            info!("Scanner resumed");
                            self.paused = false;
                            *self.state.write().await = ScannerState::Idle;
                        }
                    }
                    Some(ScanCommand::Shutdown) => {
                        info!("Scan loop shutting down");
                        break;
                    }
                    None => {
                        warn!("Scan command channel closed — shutting down");
                        break;
                    }
                },
            }
        }
    }

    async fn scan(&mut self) {
        *self.state.write().await = ScannerState::Scanning;
        let report = self.scanner.run_cycle().await;
        *self.latest.write().await = Some(Arc::new(report));
        *self.state.write().await = if self.paused {
            ScannerState::Paused
        } else {
            ScannerState::Idle
        };
    }
}
