use common::Classification;

use crate::config::{RuleConfig, TrendFilter};
use crate::frame::IndicatorFrame;
use crate::SignalRule;

/// The four checks of the MA-crossover buy rule for one pair of frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditions {
    /// MA7 crossed MA25 from below on the latest bar.
    pub ma_cross: bool,
    /// MA25 rising, and above MA99 unless the relaxed filter is configured.
    pub trend: bool,
    /// RSI above threshold, or a fresh MACD bullish cross.
    pub momentum: bool,
    /// Volume grew versus the previous bar.
    pub volume: bool,
}

impl Conditions {
    pub fn all(&self) -> bool {
        self.ma_cross && self.trend && self.momentum && self.volume
    }
}

/// BUY when MA7 crosses above MA25 with trend, momentum and volume confirmation.
#[derive(Debug, Clone, Default)]
pub struct MaCrossoverRule {
    config: RuleConfig,
}

impl MaCrossoverRule {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Evaluate every condition on `prev` → `latest`. Any undefined operand
    /// makes its comparison false.
    pub fn conditions(&self, prev: &IndicatorFrame, latest: &IndicatorFrame) -> Conditions {
        let ma_cross = lt(prev.ma7, prev.ma25) && gt(latest.ma7, latest.ma25);

        let rising = gt(latest.ma25, prev.ma25);
        let trend = match self.config.trend_filter {
            TrendFilter::Rising => rising,
            TrendFilter::RisingAboveMa99 => rising && gt(latest.ma25, latest.ma99),
        };

        let rsi_strong = gt(latest.rsi14, Some(self.config.rsi_threshold));
        let macd_cross = prev.macd < prev.macd_signal && latest.macd > latest.macd_signal;
        let momentum = rsi_strong || macd_cross;

        let volume = gt(latest.vol_change, Some(0.0));

        Conditions {
            ma_cross,
            trend,
            momentum,
            volume,
        }
    }
}

impl SignalRule for MaCrossoverRule {
    fn name(&self) -> &str {
        "ma-crossover"
    }

    fn evaluate(&self, frames: &[IndicatorFrame]) -> Classification {
        if frames.len() < self.config.min_history.max(2) {
            return Classification::Hold;
        }
        let latest = &frames[frames.len() - 1];
        let prev = &frames[frames.len() - 2];

        if self.conditions(prev, latest).all() {
            Classification::Buy {
                entry_price: latest.bar.close,
            }
        } else {
            Classification::Hold
        }
    }
}

fn gt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

fn lt(a: Option<f64>, b: Option<f64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a < b)
}
