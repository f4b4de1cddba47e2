/// MACD (Moving Average Convergence/Divergence) indicator.
///
/// MACD line = EMA(fast) − EMA(slow), signal = EMA(macd_line, signal_period).
/// Every EMA is seeded with its first input, so values exist from the first
/// bar onward and converge as history accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// MACD line and its signal line at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast < slow, "MACD fast period must be less than slow period");
        assert!(signal >= 1, "MACD signal period must be >= 1");
        Self { fast, slow, signal }
    }

    /// One point per input close, oldest first.
    pub fn series(&self, closes: &[f64]) -> Vec<MacdPoint> {
        let fast = ema_series(closes, self.fast);
        let slow = ema_series(closes, self.slow);
        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal_line = ema_series(&macd_line, self.signal);

        macd_line
            .into_iter()
            .zip(signal_line)
            .map(|(macd, signal)| MacdPoint { macd, signal })
            .collect()
    }
}

/// Exponential moving average with smoothing factor `2 / (period + 1)`.
///
/// The first output equals the first input; afterwards
/// `ema[i] = value[i] * k + ema[i - 1] * (1 - k)`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let next = match prev {
            None => value,
            Some(ema) => value * k + ema * (1.0 - k),
        };
        out.push(next);
        prev = Some(next);
    }
    out
}
