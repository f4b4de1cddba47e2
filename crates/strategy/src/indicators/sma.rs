/// Simple moving average of close prices over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaIndicator {
    pub period: usize,
}

impl SmaIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self { period }
    }

    /// One value per input, oldest first.
    /// `None` until `period` values are available (index < period - 1).
    /// A constant window yields its value exactly, so flat runs never
    /// split MAs of different periods by rounding.
    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        (0..closes.len())
            .map(|i| {
                if i + 1 < self.period {
                    return None;
                }
                let window = &closes[i + 1 - self.period..=i];
                let first = window[0];
                if window.iter().all(|&v| v == first) {
                    return Some(first);
                }
                Some(window.iter().sum::<f64>() / self.period as f64)
            })
            .collect()
    }
}
