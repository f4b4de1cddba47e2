pub mod config;
pub mod error;
pub mod market;
pub mod notify;
pub mod series;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use market::MarketDataSource;
pub use notify::Notifier;
pub use series::{Bar, PriceSeries, SeriesDefect};
pub use types::*;
