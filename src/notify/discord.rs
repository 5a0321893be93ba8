//! # notify::discord — Discord webhook

use serde_json::json;
use tracing::{debug, info};

use super::{ensure_success, split_message, Delivery};
use crate::{config::DiscordConfig, error::NotifyError};

/// Discord rejects `content` longer than this.
pub const DISCORD_LIMIT: usize = 2000;

/// POST `{"content": message}` to the webhook, split if over the limit.
pub async fn notify_discord(
    client: &reqwest::Client,
    config: Option<&DiscordConfig>,
    message: &str,
) -> Result<Delivery, NotifyError> {
    let Some(config) = config else {
        debug!("No Discord webhook configured — skipping");
        return Ok(Delivery::Skipped);
    };

    let parts = split_message(message, DISCORD_LIMIT);
    for part in &parts {
        let resp = client
            .post(&config.webhook_url)
            .json(&json!({ "content": part }))
            .send()
            .await?;
        ensure_success("discord", resp).await?;
    }

    info!(parts = parts.len(), "Discord notification sent");
    Ok(Delivery::Sent { parts: parts.len() })
}
