use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{info, warn};

use common::{BuyAlert, Error, Notifier, Result};

/// Take-profit and stop-loss distances quoted in every BUY alert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertLevels {
    /// Fraction above entry, e.g. 0.02 for +2%.
    pub target_pct: f64,
    /// Fraction below entry, e.g. 0.01 for −1%.
    pub stop_loss_pct: f64,
}

impl AlertLevels {
    pub fn target(&self, entry: f64) -> f64 {
        entry * (1.0 + self.target_pct)
    }

    pub fn stop_loss(&self, entry: f64) -> f64 {
        entry * (1.0 - self.stop_loss_pct)
    }
}

/// Delivers BUY alerts as HTML messages to every configured chat.
pub struct TelegramNotifier {
    bot: Bot,
    chat_ids: Vec<ChatId>,
    levels: AlertLevels,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_ids: &[i64], levels: AlertLevels) -> Self {
        Self {
            bot: Bot::new(token),
            chat_ids: chat_ids.iter().map(|&id| ChatId(id)).collect(),
            levels,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    /// Succeeds when at least one chat received the message.
    async fn notify_buy(&self, alert: &BuyAlert) -> Result<()> {
        let text = format_buy_alert(alert, &self.levels);
        let mut delivered = 0usize;

        for &chat_id in &self.chat_ids {
            match self
                .bot
                .send_message(chat_id, text.clone())
                .parse_mode(ParseMode::Html)
                .await
            {
                Ok(_) => delivered += 1,
                Err(e) => warn!(chat_id = ?chat_id, error = %e, "Failed to send Telegram alert"),
            }
        }

        if delivered == 0 {
            return Err(Error::Notify(format!(
                "BUY alert for {} reached none of {} chats",
                alert.symbol,
                self.chat_ids.len()
            )));
        }
        info!(symbol = %alert.symbol, chats = delivered, "BUY alert sent");
        Ok(())
    }
}

/// HTML body of a BUY alert.
pub fn format_buy_alert(alert: &BuyAlert, levels: &AlertLevels) -> String {
    let entry = alert.entry_price;
    format!(
        "🔥 Binance MA Scanner BUY signal on <b>{symbol}</b>\n\
         Entry: {entry}\n\
         Target: {target:.6} (+{target_pct:.1}%)\n\
         Stop-loss: {stop:.6} (−{stop_pct:.1}%)\n\
         <i>{time} UTC</i>",
        symbol = escape_html(&alert.symbol),
        target = levels.target(entry),
        target_pct = levels.target_pct * 100.0,
        stop = levels.stop_loss(entry),
        stop_pct = levels.stop_loss_pct * 100.0,
        time = alert.timestamp.format("%Y-%m-%d %H:%M"),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
