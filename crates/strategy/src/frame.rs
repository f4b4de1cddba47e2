use serde::Serialize;

use common::{Bar, PriceSeries};

use crate::indicators::{volume_change, MacdIndicator, RsiIndicator, SmaIndicator};

/// One bar plus every indicator derived from it and the bars before it.
///
/// `None` means "not enough history yet", never "computed as NaN".
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorFrame {
    #[serde(flatten)]
    pub bar: Bar,
    pub ma7: Option<f64>,
    pub ma25: Option<f64>,
    pub ma99: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: f64,
    pub macd_signal: f64,
    pub vol_change: Option<f64>,
}

/// Computes the fixed indicator set (MA 7/25/99, RSI 14, MACD 12/26/9,
/// volume change) over a whole series.
///
/// Stateless: every call recomputes from scratch and the frame at index `i`
/// only depends on bars `0..=i`.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    ma7: SmaIndicator,
    ma25: SmaIndicator,
    ma99: SmaIndicator,
    rsi: RsiIndicator,
    macd: MacdIndicator,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self {
            ma7: SmaIndicator::new(7),
            ma25: SmaIndicator::new(25),
            ma99: SmaIndicator::new(99),
            rsi: RsiIndicator::new(14),
            macd: MacdIndicator::new(12, 26, 9),
        }
    }
}

impl IndicatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// One frame per bar, same order as the series.
    pub fn compute(&self, series: &PriceSeries) -> Vec<IndicatorFrame> {
        let closes = series.closes();
        let ma7 = self.ma7.series(&closes);
        let ma25 = self.ma25.series(&closes);
        let ma99 = self.ma99.series(&closes);
        let rsi = self.rsi.series(&closes);
        let macd = self.macd.series(&closes);
        let vol = volume_change(&series.volumes());

        series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorFrame {
                bar: *bar,
                ma7: ma7[i],
                ma25: ma25[i],
                ma99: ma99[i],
                rsi14: rsi[i],
                macd: macd[i].macd,
                macd_signal: macd[i].signal,
                vol_change: vol[i],
            })
            .collect()
    }
}
