//! # notify::telegram — Telegram Bot API `sendMessage`

use serde_json::json;
use tracing::{debug, info};

use super::{ensure_success, split_message, Delivery};
use crate::{config::TelegramConfig, error::NotifyError};

/// Maximum `text` length accepted by `sendMessage`.
pub const TELEGRAM_LIMIT: usize = 4096;

pub async fn notify_telegram(
    client: &reqwest::Client,
    config: Option<&TelegramConfig>,
    message: &str,
) -> Result<Delivery, NotifyError> {
    let Some(config) = config else {
        debug!("Telegram bot token or chat id not configured — skipping");
        return Ok(Delivery::Skipped);
    };

    let url = format!("{}/bot{}/sendMessage", config.api_base, config.bot_token);
    let text = to_legacy_markdown(message);
    let parts = split_message(&text, TELEGRAM_LIMIT);

    for part in &parts {
        let resp = client
            .post(&url)
            .json(&json!({
                "chat_id":    config.chat_id,
                "text":       part,
                "parse_mode": "Markdown",
            }))
            .send()
            .await?;
        ensure_success("telegram", resp).await?;
    }

    info!(chat_id = %config.chat_id, parts = parts.len(), "Telegram notification sent");
    Ok(Delivery::Sent { parts: parts.len() })
}

/// Telegram's legacy Markdown marks bold with a single `*`.
fn to_legacy_markdown(message: &str) -> String {
    message.replace("**", "*")
}
