pub mod config;
pub mod frame;
pub mod indicators;
pub mod rule;

pub use config::{RuleConfig, TrendFilter};
pub use frame::{IndicatorEngine, IndicatorFrame};
pub use rule::{Conditions, MaCrossoverRule};

use common::Classification;

/// All buy-rule implementations must satisfy this trait.
///
/// Implementations are pure: no I/O, no clock, no interior state.
pub trait SignalRule: Send + Sync {
    /// Human-readable name shown in logs and dashboard.
    fn name(&self) -> &str;

    /// Classify the latest frame of a series, oldest frame first.
    fn evaluate(&self, frames: &[IndicatorFrame]) -> Classification;
}
