/// RSI (Relative Strength Index) indicator.
///
/// Uses a simple rolling mean of gains and losses over the last `period`
/// close-to-close changes (not Wilder smoothing). The first value appears at
/// index `period`, once `period` changes exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period }
    }

    /// One value per input close, oldest first.
    ///
    /// A window without losses reports 100, including a perfectly flat window.
    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if closes.len() <= self.period {
            return out;
        }

        // changes[j] is the delta arriving with bar j + 1
        let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

        for (i, slot) in out.iter_mut().enumerate().skip(self.period) {
            let window = &changes[i - self.period..i];
            let avg_gain = window.iter().map(|c| c.max(0.0)).sum::<f64>() / self.period as f64;
            let avg_loss = window.iter().map(|c| (-c).max(0.0)).sum::<f64>() / self.period as f64;
            *slot = Some(rsi_from_averages(avg_gain, avg_loss));
        }
        out
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_undefined_until_period_changes_exist() {
        let rsi = RsiIndicator::new(14);
        // 14 values carry only 13 changes
        assert!(rsi.series(&[100.0; 14]).iter().all(Option::is_none));

        let values = rsi.series(&[100.0; 15]);
        assert!(values[..14].iter().all(Option::is_none));
        assert!(values[14].is_some());
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let rsi = RsiIndicator::new(3);
        let values = rsi.series(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        assert_eq!(values[3], Some(100.0));
        assert_eq!(values[4], Some(100.0));
    }

    #[test]
    fn rsi_flat_window_returns_100() {
        let rsi = RsiIndicator::new(3);
        let values = rsi.series(&[7.0; 6]);
        assert_eq!(values[5], Some(100.0));
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let rsi = RsiIndicator::new(3);
        let values = rsi.series(&[14.0, 13.0, 12.0, 11.0, 10.0]);
        let v = values[4].unwrap();
        assert!(v.abs() < 1e-12, "Expected ~0, got {v}");
    }

    #[test]
    fn rsi_known_value() {
        // Changes +2, -1, +2 -> avg gain 4/3, avg loss 1/3 -> RS 4 -> RSI 80
        let rsi = RsiIndicator::new(3);
        let values = rsi.series(&[10.0, 12.0, 11.0, 13.0]);
        let v = values[3].unwrap();
        assert!((v - 80.0).abs() < 1e-9, "Expected 80, got {v}");
    }

    #[test]
    fn rsi_window_rolls_off_old_changes() {
        // Window for the last bar holds only the -1, -1, +1 changes
        let rsi = RsiIndicator::new(3);
        let values = rsi.series(&[10.0, 20.0, 19.0, 18.0, 19.0]);
        let v = values[4].unwrap();
        assert!((v - 100.0 / 3.0).abs() < 1e-9, "Expected 33.33, got {v}");
    }

    #[test]
    fn rsi_stays_in_range_on_mixed_series() {
        let rsi = RsiIndicator::new(14);
        let prices = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.15, 43.61, 44.33, 44.83, 45.10,
            45.15, 44.34, 44.09, 44.50, 43.90,
        ];
        for v in rsi.series(&prices).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI out of range: {v}");
        }
    }
}
