//! # notify — Deliver the report to chat webhooks
//!
//! Each target is independent and best-effort: no retries, and a failure on
//! one never stops the other. Unconfigured targets make no network call.

mod discord;
mod telegram;

pub use discord::notify_discord;
pub use telegram::notify_telegram;

use crate::error::NotifyError;

/// What happened to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Posted as `parts` consecutive messages.
    Sent { parts: usize },
    /// Target not configured.
    Skipped,
}

/// Split `message` into chunks of at most `limit` characters, breaking on line
/// boundaries. A single line longer than `limit` is cut mid-line.
pub fn split_message(message: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in message.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > limit && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > limit {
            let chars: Vec<char> = line.chars().collect();
            for chunk in chars.chunks(limit) {
                if chunk.len() == limit {
                    parts.push(chunk.iter().collect());
                } else {
                    current = chunk.iter().collect();
                    current_len = chunk.len();
                }
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
        .into_iter()
        .map(|p| p.trim_end_matches('\n').to_string())
        .filter(|p| !p.trim().is_empty())
        .collect()
}

async fn ensure_success(channel: &'static str, resp: reqwest::Response) -> Result<(), NotifyError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(NotifyError::Rejected { channel, status, body })
}
