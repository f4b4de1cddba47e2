pub mod macd;
pub mod rsi;
pub mod sma;
pub mod volume;

pub use macd::{ema_series, MacdIndicator, MacdPoint};
pub use rsi::RsiIndicator;
pub use sma::SmaIndicator;
pub use volume::volume_change;
