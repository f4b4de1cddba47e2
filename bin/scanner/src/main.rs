use std::sync::Arc;

use anyhow::Context;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use common::{Config, MarketDataSource, Notifier, ScanCommand};
use engine::{BinanceFuturesClient, LogNotifier, ScanLoop, ScanSettings, Scanner, SignalHistory};
use strategy::{MaCrossoverRule, RuleConfig, SignalRule};
use telegram_ctrl::{start_bot, AlertLevels, BotDeps, TelegramNotifier};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env().context("loading configuration")?;
    let rules = RuleConfig::load_or_default(&cfg.rules_config_path)
        .with_context(|| format!("loading rule config from '{}'", cfg.rules_config_path))?;
    info!(
        interval = %cfg.kline_interval,
        limit = cfg.kline_limit,
        every_secs = cfg.scan_interval.as_secs(),
        trend_filter = ?rules.trend_filter,
        "MA Scanner starting"
    );

    // ── Collaborators ─────────────────────────────────────────────────────────
    let source: Arc<dyn MarketDataSource> = Arc::new(
        BinanceFuturesClient::new(&cfg.binance_base_url, cfg.http_timeout)
            .context("building Binance client")?,
    );

    let notifier: Arc<dyn Notifier> = match &cfg.telegram_token {
        Some(token) if cfg.telegram_enabled() => {
            info!(chats = cfg.telegram_chat_ids.len(), "Telegram alerts enabled");
            Arc::new(TelegramNotifier::new(
                token.clone(),
                &cfg.telegram_chat_ids,
                AlertLevels {
                    target_pct: cfg.alert_target_pct,
                    stop_loss_pct: cfg.alert_stop_loss_pct,
                },
            ))
        }
        _ => {
            warn!("TELEGRAM_TOKEN / TELEGRAM_CHAT_IDS not set — BUY alerts go to the log only");
            Arc::new(LogNotifier)
        }
    };

    let rule: Arc<dyn SignalRule> = Arc::new(MaCrossoverRule::new(rules));
    let history = Arc::new(RwLock::new(SignalHistory::new(cfg.history_capacity)));

    // ── Scanner ───────────────────────────────────────────────────────────────
    let scanner = Scanner::new(
        source,
        notifier,
        rule,
        history,
        ScanSettings {
            interval: cfg.kline_interval.clone(),
            limit: cfg.kline_limit,
            concurrency: cfg.scan_concurrency,
        },
    );
    let (scan_loop, handle) = ScanLoop::new(scanner, cfg.scan_interval);

    // ── Spawn all tasks ───────────────────────────────────────────────────────
    let scan_task = tokio::spawn(scan_loop.run());

    if let (Some(token), true) = (cfg.telegram_token.clone(), cfg.telegram_enabled()) {
        let deps = BotDeps {
            scanner: handle.clone(),
            allowed_chat_ids: Arc::new(cfg.telegram_chat_ids.clone()),
        };
        tokio::spawn(start_bot(token, deps));
    }

    let api_state = api::AppState {
        scanner: handle.clone(),
    };
    let port = cfg.dashboard_port;
    tokio::spawn(async move {
        if let Err(e) = api::serve(api_state, port).await {
            error!(error = %e, "Dashboard server stopped");
        }
    });

    info!("All subsystems started. Waiting for shutdown signal.");
    tokio::signal::ctrl_c()
        .await
        .context("listening for shutdown signal")?;
    info!("Shutdown signal received. Exiting.");

    handle.send(ScanCommand::Shutdown).await;
    if let Err(e) = scan_task.await {
        error!(error = %e, "Scan loop task failed");
    }
    Ok(())
}
