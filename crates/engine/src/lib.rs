pub mod binance;
pub mod history;
pub mod lifecycle;
pub mod notify;
pub mod scanner;

pub use binance::BinanceFuturesClient;
pub use history::SignalHistory;
pub use lifecycle::{ScanLoop, ScannerHandle};
pub use notify::LogNotifier;
pub use scanner::{ScanFailure, ScanReport, ScanResult, ScanSettings, Scanner};
