//! # models::account
//!
//! Account summary from `GET /portfolio/{account}/summary`.
//!
//! Accepts both the flat shape (`NetLiquidation: 50000`) and the gateway's
//! lowercase keyed entries (`netliquidation: { amount: 50000 }`).

use serde::Deserialize;

use super::number::lenient_f64;

#[derive(Debug, Default, Deserialize)]
struct GatewaySummary {
    #[serde(default, rename = "NetLiquidation", deserialize_with = "lenient_f64")]
    net_liquidation:       Option<f64>,
    #[serde(default, rename = "netliquidation", deserialize_with = "lenient_f64")]
    net_liquidation_lower: Option<f64>,

    #[serde(default, rename = "CashBalance", deserialize_with = "lenient_f64")]
    cash_balance:          Option<f64>,
    #[serde(default, rename = "totalcashvalue", deserialize_with = "lenient_f64")]
    total_cash_value:      Option<f64>,

    #[serde(default, rename = "UnrealizedPnL", deserialize_with = "lenient_f64")]
    unrealized_pnl:        Option<f64>,
    #[serde(default, rename = "unrealizedpnl", deserialize_with = "lenient_f64")]
    unrealized_pnl_lower:  Option<f64>,
}

/// Account-level figures. All optional: an empty summary is a valid result.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "GatewaySummary")]
pub struct AccountInfo {
    pub net_liquidation: Option<f64>,
    pub cash_balance:    Option<f64>,
    pub unrealized_pnl:  Option<f64>,
}

impl From<GatewaySummary> for AccountInfo {
    fn from(raw: GatewaySummary) -> Self {
        Self {
            net_liquidation: raw.net_liquidation.or(raw.net_liquidation_lower),
            cash_balance:    raw.cash_balance.or(raw.total_cash_value),
            unrealized_pnl:  raw.unrealized_pnl.or(raw.unrealized_pnl_lower),
        }
    }
}

impl AccountInfo {
    pub fn is_empty(&self) -> bool {
        self.net_liquidation.is_none() && self.cash_balance.is_none() && self.unrealized_pnl.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_summary() {
        let info: AccountInfo = serde_json::from_value(json!({
            "NetLiquidation": 50000, "CashBalance": "10000", "UnrealizedPnL": 580
        }))
        .unwrap();
        assert_eq!(info.net_liquidation, Some(50000.0));
        assert_eq!(info.cash_balance, Some(10000.0));
        assert_eq!(info.unrealized_pnl, Some(580.0));
        assert!(!info.is_empty());
    }

    #[test]
    fn test_gateway_keyed_summary() {
        let info: AccountInfo = serde_json::from_value(json!({
            "netliquidation": { "amount": 50000.0, "currency": "USD" },
            "totalcashvalue": { "amount": 10000.0, "currency": "USD" },
            "unrealizedpnl":  { "amount": -42.0,   "currency": "USD" },
            "accountready":   { "value": "true" }
        }))
        .unwrap();
        assert_eq!(info.net_liquidation, Some(50000.0));
        assert_eq!(info.cash_balance, Some(10000.0));
        assert_eq!(info.unrealized_pnl, Some(-42.0));
    }

    #[test]
    fn test_empty_summary() {
        let info: AccountInfo = serde_json::from_value(json!({})).unwrap();
        assert!(info.is_empty());
        assert_eq!(info, AccountInfo::default());
    }
}
