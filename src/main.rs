//! # IBKR Pulse — Daily Positions Digest
//!
//! One-shot reporter, meant to be run from cron or a systemd timer.
//!
//! ## Flow
//! ```text
//!   1. Load config (.env + environment)
//!   2. Authenticate against the IBKR Client Portal gateway
//!   3. GET positions + account summary   (or the demo dataset)
//!   4. Format the Markdown report
//!   5. Print it to stdout
//!   6. POST → Discord webhook, POST → Telegram sendMessage
//! ```
//!
//! ## Environment Variables
//!
//! | Variable                    | Default                         | Description                         |
//! |-----------------------------|---------------------------------|-------------------------------------|
//! | `IBKR_BASE_URL`             | `https://localhost:5000/v1/api` | Gateway base URL                    |
//! | `IBKR_ACCOUNT_ID`           | —                               | Account id (unset = session scope)  |
//! | `IBKR_API_KEY`              | —                               | Bearer-token auth                   |
//! | `IBKR_USERNAME`/`_PASSWORD` | —                               | Session-login auth                  |
//! | `IBKR_ACCEPT_INVALID_CERTS` | `false`                         | Trust the gateway's self-signed cert|
//! | `HTTP_TIMEOUT_SECS`         | `10`                            | Per-request timeout                 |
//! | `DISCORD_WEBHOOK`           | —                               | Discord webhook URL                 |
//! | `TELEGRAM_BOT_TOKEN`        | —                               | Telegram bot token                  |
//! | `TELEGRAM_CHAT_ID`          | —                               | Telegram chat id                    |
//! | `TELEGRAM_API_BASE`         | `https://api.telegram.org`      | Bot API root                        |
//! | `DEMO_MODE`                 | `false`                         | Use the fixed demo dataset          |
//! | `RUST_LOG`                  | `ibkr_pulse=info`               | Tracing filter                      |
//!
//! Only a bad configuration exits non-zero. Gateway and webhook failures are
//! logged and the run carries on.

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod broker;
mod config;
mod demo;
mod error;
mod format;
mod models;
mod notify;

use broker::BrokerClient;
use config::Config;
use error::BrokerError;
use models::{AccountInfo, Position};
use notify::{notify_discord, notify_telegram, Delivery};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // stdout is reserved for the report itself
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env()
            .add_directive("ibkr_pulse=info".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .init();

    let config = Config::from_env().context("Failed to load config")?;

    info!(
        demo     = config.demo_mode,
        auth     = %config.broker.as_ref().map(|b| b.auth.to_string()).unwrap_or_else(|| "none".into()),
        discord  = config.discord.is_some(),
        telegram = config.telegram.is_some(),
        timeout  = ?config.request_timeout,
        "Starting IBKR daily positions report"
    );

    // ── 1. Snapshot ───────────────────────────────────────────────────────────
    let (positions, account) = if config.demo_mode {
        warn!("DEMO_MODE enabled — using the fixed demo dataset");
        (broker::keep_open(demo::demo_positions()), demo::demo_account())
    } else {
        match &config.broker {
            Some(broker_config) => {
                load_snapshot(BrokerClient::new(broker_config, config.request_timeout)).await
            }
            None => (Vec::new(), AccountInfo::default()),
        }
    };

    // ── 2. Format + print ─────────────────────────────────────────────────────
    let message = format::format_message(&positions, &account, &chrono::Local::now());
    println!("{message}");

    // ── 3. Notify (independent, best-effort) ─────────────────────────────────
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    log_delivery("discord", notify_discord(&client, config.discord.as_ref(), &message).await);
    log_delivery("telegram", notify_telegram(&client, config.telegram.as_ref(), &message).await);

    info!("Done");
    Ok(())
}

/// Fetch positions and account summary. Every failure degrades to empty data;
/// the two fetches fail independently of each other.
async fn load_snapshot(broker: Result<BrokerClient, BrokerError>) -> (Vec<Position>, AccountInfo) {
    let broker = match broker {
        Ok(broker) => broker,
        Err(e) => {
            error!(error = %e, "❌ Could not build gateway client — reporting empty data");
            return (Vec::new(), AccountInfo::default());
        }
    };

    if let Err(e) = broker.authenticate().await {
        error!(error = %e, "❌ Gateway authentication failed — reporting empty data");
        return (Vec::new(), AccountInfo::default());
    }

    let positions = broker.fetch_positions().await.unwrap_or_else(|e| {
        error!(error = %e, "Error getting positions");
        Vec::new()
    });

    let account = broker.fetch_account_summary().await.unwrap_or_else(|e| {
        error!(error = %e, "Error getting account summary");
        AccountInfo::default()
    });

    info!(positions = positions.len(), has_summary = !account.is_empty(), "Gateway snapshot loaded");
    (positions, account)
}

fn log_delivery(channel: &str, outcome: Result<Delivery, error::NotifyError>) {
    match outcome {
        Ok(Delivery::Sent { parts }) => info!(channel, parts, "✅ Report delivered"),
        Ok(Delivery::Skipped) => info!(channel, "No target configured"),
        Err(e) => warn!(channel, error = %e, "⚠️ Delivery failed"),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
