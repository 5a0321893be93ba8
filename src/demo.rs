//! # demo — Fixed dataset for manual runs
//!
//! Used instead of the gateway when `DEMO_MODE=true`, so the formatter and
//! webhooks can be checked without a logged-in IBKR gateway.

use crate::models::{AccountInfo, Position};

/// Passed through the same zero-quantity filter as live data, so the
/// closed SPY line never shows up.
pub fn demo_positions() -> Vec<Position> {
    vec![
        Position {
            symbol:         "AAPL".into(),
            quantity:       100.0,
            market_value:   17500.0,
            cost_basis:     None,
            unrealized_pnl: Some(250.0),
        },
        Position {
            symbol:         "TSLA".into(),
            quantity:       50.0,
            market_value:   12000.0,
            cost_basis:     None,
            unrealized_pnl: Some(-120.0),
        },
        Position {
            symbol:         "NVDA".into(),
            quantity:       25.0,
            market_value:   3000.0,
            cost_basis:     Some(2550.0),
            unrealized_pnl: None,
        },
        Position {
            symbol:         "SPY".into(),
            quantity:       0.0,
            market_value:   0.0,
            cost_basis:     None,
            unrealized_pnl: None,
        },
    ]
}

pub fn demo_account() -> AccountInfo {
    AccountInfo {
        net_liquidation: Some(50000.0),
        cash_balance:    Some(10000.0),
        unrealized_pnl:  Some(580.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{broker::keep_open, format::format_message};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_demo_report() {
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 9, 30, 0).unwrap();
        let msg = format_message(&keep_open(demo_positions()), &demo_account(), &now);

        assert!(msg.contains("**Account:** $50,000.00"));
        assert!(msg.contains("🟢 **AAPL**"));
        assert!(msg.contains("🔴 **TSLA**"));
        assert!(msg.contains("   P&L: +$450.00"));
        assert!(!msg.contains("SPY"));
    }
}
