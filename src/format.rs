//! # format — Build the status message
//!
//! Pure: no I/O, and the clock reading is passed in, so identical inputs
//! always produce identical output. The Markdown subset used here renders in
//! both Discord and Telegram (`parse_mode = Markdown`).

use std::fmt::Display;

use chrono::{DateTime, TimeZone};

use crate::models::{AccountInfo, Position};

pub const HEADER: &str = "📊 **IBKR Daily Positions Update**";
pub const NO_POSITIONS: &str = "No open positions found.";
pub const GAIN: &str = "🟢";
pub const LOSS: &str = "🔴";

/// Render one account snapshot.
pub fn format_message<Tz>(
    positions: &[Position],
    account: &AccountInfo,
    generated_at: &DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut message = format!("{HEADER}\n");
    message.push_str(&format!("_{}_\n\n", generated_at.format("%Y-%m-%d %H:%M %Z")));

    if !account.is_empty() {
        let pnl = account.unrealized_pnl.unwrap_or(0.0);
        message.push_str(&format!(
            "**Account:** {}\n",
            format_usd(account.net_liquidation.unwrap_or(0.0))
        ));
        message.push_str(&format!(
            "**Cash:** {}\n",
            format_usd(account.cash_balance.unwrap_or(0.0))
        ));
        message.push_str(&format!(
            "{} **Daily P&L:** {}\n\n",
            indicator(pnl),
            format_signed_usd(pnl)
        ));
    }

    if positions.is_empty() {
        message.push_str(NO_POSITIONS);
        return message;
    }

    message.push_str("**Open Positions:**\n");

    for pos in positions {
        let pnl = pos.pnl();
        message.push_str(&format!("\n{} **{}**\n", indicator(pnl), pos.symbol));
        message.push_str(&format!("   Shares: {}\n", pos.quantity));
        message.push_str(&format!("   Value: {}\n", format_usd(pos.market_value)));
        message.push_str(&format!("   P&L: {}\n", format_signed_usd(pnl)));
    }

    message
}

/// Non-negative figures get [`GAIN`], negative ones [`LOSS`].
#[inline]
pub fn indicator(value: f64) -> &'static str {
    if value >= 0.0 {
        GAIN
    } else {
        LOSS
    }
}

/// Dollar amount with thousands separators and two decimals, e.g. `$50,000.00`
/// or `-$1,234.50`.
pub fn format_usd(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    // -0.004 rounds to 0.00; don't print it as a loss
    let negative = value < 0.0 && fixed != "0.00";
    let sign = if negative { "-" } else { "" };

    format!("{sign}${}.{cents}", group_thousands(whole))
}

/// Like [`format_usd`] but always signed: `+$250.00`, `-$120.00`.
pub fn format_signed_usd(value: f64) -> String {
    let plain = format_usd(value);
    if plain.starts_with('-') {
        plain
    } else {
        format!("+{plain}")
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ─── Tests ────────────────────────────────────────────────────────────────────
