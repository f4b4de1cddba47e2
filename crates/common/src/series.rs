use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One OHLCV sample for a fixed sampling interval (one kline; the newest may
/// still be forming).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Open time of the interval.
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Why a batch of raw bars was refused by [`PriceSeries::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesDefect {
    DuplicateTimestamp { index: usize },
    NonMonotonicTimestamp { index: usize },
    InvalidPrice { index: usize },
    InvalidVolume { index: usize },
}

impl std::fmt::Display for SeriesDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeriesDefect::DuplicateTimestamp { index } => {
                write!(f, "duplicate timestamp at bar {index}")
            }
            SeriesDefect::NonMonotonicTimestamp { index } => {
                write!(f, "timestamp goes backwards at bar {index}")
            }
            SeriesDefect::InvalidPrice { index } => {
                write!(f, "non-positive or non-finite price at bar {index}")
            }
            SeriesDefect::InvalidVolume { index } => {
                write!(f, "negative or non-finite volume at bar {index}")
            }
        }
    }
}

/// Time-ordered bars for one instrument.
///
/// Construction is the only validation point: a `PriceSeries` always holds
/// strictly increasing timestamps, positive finite prices and non-negative
/// finite volumes. Everything downstream relies on that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self> {
        let symbol = symbol.into();
        if let Some(defect) = find_defect(&bars) {
            return Err(Error::MalformedSeries { symbol, defect });
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

fn find_defect(bars: &[Bar]) -> Option<SeriesDefect> {
    for (index, bar) in bars.iter().enumerate() {
        let prices = [bar.open, bar.high, bar.low, bar.close];
        if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
            return Some(SeriesDefect::InvalidPrice { index });
        }
        if !bar.volume.is_finite() || bar.volume < 0.0 {
            return Some(SeriesDefect::InvalidVolume { index });
        }
        if index > 0 {
            let prev = bars[index - 1].timestamp;
            if bar.timestamp == prev {
                return Some(SeriesDefect::DuplicateTimestamp { index });
            }
            if bar.timestamp < prev {
                return Some(SeriesDefect::NonMonotonicTimestamp { index });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(minute: i64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.timestamp_opt(1_700_000_000 + minute * 60, 0).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn accepts_strictly_increasing_bars() {
        let series = PriceSeries::new("BTCUSDT", vec![bar(0, 1.0), bar(1, 2.0), bar(5, 3.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.symbol(), "BTCUSDT");
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn accepts_empty_series() {
        let series = PriceSeries::new("ETHUSDT", Vec::new()).unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let err = PriceSeries::new("BTCUSDT", vec![bar(0, 1.0), bar(1, 2.0), bar(1, 2.5)]).unwrap_err();
        match err {
            Error::MalformedSeries { symbol, defect } => {
                assert_eq!(symbol, "BTCUSDT");
                assert_eq!(defect, SeriesDefect::DuplicateTimestamp { index: 2 });
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_backwards_timestamp() {
        let err = PriceSeries::new("BTCUSDT", vec![bar(3, 1.0), bar(2, 2.0)]).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedSeries {
                defect: SeriesDefect::NonMonotonicTimestamp { index: 1 },
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_finite_close() {
        let mut bad = bar(1, 2.0);
        bad.close = f64::NAN;
        let err = PriceSeries::new("BTCUSDT", vec![bar(0, 1.0), bad]).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedSeries {
                defect: SeriesDefect::InvalidPrice { index: 1 },
                ..
            }
        ));
    }

    #[test]
    fn rejects_negative_volume_but_allows_zero() {
        let mut zero = bar(0, 1.0);
        zero.volume = 0.0;
        assert!(PriceSeries::new("X", vec![zero]).is_ok());

        let mut negative = bar(0, 1.0);
        negative.volume = -1.0;
        let err = PriceSeries::new("X", vec![negative]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed series for X: negative or non-finite volume at bar 0"
        );
    }
}
