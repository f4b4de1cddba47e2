use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of evaluating the buy rule on the latest bar of a series.
///
/// Serialized as `{"signal":"BUY","entry_price":..}` or `{"signal":"HOLD"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "UPPERCASE")]
pub enum Classification {
    Buy { entry_price: f64 },
    Hold,
}

impl Classification {
    pub fn is_buy(&self) -> bool {
        matches!(self, Classification::Buy { .. })
    }

    pub fn entry_price(&self) -> Option<f64> {
        match self {
            Classification::Buy { entry_price } => Some(*entry_price),
            Classification::Hold => None,
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Buy { .. } => write!(f, "BUY"),
            Classification::Hold => write!(f, "HOLD"),
        }
    }
}

/// One line of the scan history log. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalHistoryEntry {
    /// When the instrument was evaluated (not the bar time).
    pub time: DateTime<Utc>,
    pub symbol: String,
    #[serde(flatten)]
    pub classification: Classification,
}

/// Payload handed to a [`crate::Notifier`] for every BUY classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuyAlert {
    pub symbol: String,
    pub entry_price: f64,
    pub timestamp: DateTime<Utc>,
}

/// Current state of the periodic scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScannerState {
    #[default]
    Idle,
    Scanning,
    Paused,
}

impl std::fmt::Display for ScannerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScannerState::Idle => write!(f, "idle"),
            ScannerState::Scanning => write!(f, "scanning"),
            ScannerState::Paused => write!(f, "paused"),
        }
    }
}

/// Commands sent to the scan loop via its command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanCommand {
    ScanNow,
    Pause,
    Resume,
    Shutdown,
}
