use std::sync::Arc;

use teloxide::{dispatching::UpdateHandler, prelude::*, utils::command::BotCommands};
use tracing::{info, warn};

use common::{ScanCommand, ScannerState};
use engine::{ScanReport, ScannerHandle};

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Dependencies injected into every handler via `dptree`.
#[derive(Clone)]
pub struct BotDeps {
    pub scanner: ScannerHandle,
    pub allowed_chat_ids: Arc<Vec<i64>>,
}

/// Telegram bot commands exposed to the operator.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "MA Scanner commands:")]
pub enum Command {
    #[command(description = "Show scanner state and last cycle summary")]
    Status,
    #[command(description = "Run a scan cycle now")]
    Scan,
    #[command(description = "Pause scheduled scans")]
    Pause,
    #[command(description = "Resume scheduled scans")]
    Resume,
    #[command(description = "List BUY signals from the last cycle")]
    Signals,
}

/// Start the Telegram bot in long-polling mode.
pub async fn start_bot(token: String, deps: BotDeps) {
    let bot = Bot::new(token);
    let deps = Arc::new(deps);

    info!("Telegram bot starting (long-polling)");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![deps])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Status].endpoint(handle_status))
        .branch(case![Command::Scan].endpoint(handle_scan))
        .branch(case![Command::Pause].endpoint(handle_pause))
        .branch(case![Command::Resume].endpoint(handle_resume))
        .branch(case![Command::Signals].endpoint(handle_signals));

    Update::filter_message()
        .filter_async(auth_filter)
        .branch(command_handler)
}

/// Silently drop messages from chats not in the allowed list.
async fn auth_filter(msg: Message, deps: Arc<BotDeps>) -> bool {
    let chat_id = msg.chat.id.0;
    let allowed = deps.allowed_chat_ids.contains(&chat_id);
    if !allowed {
        warn!(chat_id, "Unauthorized Telegram access attempt");
    }
    allowed
}

async fn handle_status(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let state = deps.scanner.state().await;
    let report = deps.scanner.latest_report().await;
    bot.send_message(msg.chat.id, format_status(state, report.as_deref()))
        .await?;
    Ok(())
}

async fn handle_scan(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    if deps.scanner.state().await == ScannerState::Scanning {
        bot.send_message(msg.chat.id, "A scan is already running.").await?;
    } else {
        deps.scanner.send(ScanCommand::ScanNow).await;
        bot.send_message(msg.chat.id, "Scan queued.").await?;
    }
    Ok(())
}

async fn handle_pause(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    if deps.scanner.state().await == ScannerState::Paused {
        bot.send_message(msg.chat.id, "Scanner is already paused.").await?;
    } else {
        deps.scanner.send(ScanCommand::Pause).await;
        bot.send_message(msg.chat.id, "Scheduled scans paused.").await?;
    }
    Ok(())
}

async fn handle_resume(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    if deps.scanner.state().await != ScannerState::Paused {
        bot.send_message(msg.chat.id, "Scanner is not paused.").await?;
    } else {
        deps.scanner.send(ScanCommand::Resume).await;
        bot.send_message(msg.chat.id, "Scheduled scans resumed.").await?;
    }
    Ok(())
}

async fn handle_signals(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let report = deps.scanner.latest_report().await;
    bot.send_message(msg.chat.id, format_signals(report.as_deref()))
        .await?;
    Ok(())
}

pub fn format_status(state: ScannerState, report: Option<&ScanReport>) -> String {
    match report {
        None => format!("MA Scanner Status\nScanner: {state}\nNo scan completed yet."),
        Some(r) => format!(
            "MA Scanner Status\n\
             Scanner: {state}\n\
             Last scan: {} UTC\n\
             Evaluated: {}\n\
             BUY: {}\n\
             Failed: {}",
            r.finished_at.format("%Y-%m-%d %H:%M"),
            r.results.len(),
            r.buy_count(),
            r.failures.len(),
        ),
    }
}

pub fn format_signals(report: Option<&ScanReport>) -> String {
    let Some(report) = report else {
        return "No scan completed yet.".to_string();
    };
    let lines: Vec<String> = report
        .buys()
        .filter_map(|r| {
            r.classification
                .entry_price()
                .map(|price| format!("• {} @ {price}", r.symbol))
        })
        .collect();
    if lines.is_empty() {
        "No BUY signals in the last scan.".to_string()
    } else {
        format!("BUY signals ({}):\n{}", lines.len(), lines.join("\n"))
    }
}
