//! # models::position
//!
//! An open position as reported by `GET /portfolio/{account}/positions`.

use serde::Deserialize;
use serde_json::Value;

use super::number::{lenient_f64, text_from_value};

/// Wire shape. Field names vary between gateway builds, so every candidate
/// is decoded separately and merged in [`Position::from`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayPosition {
    #[serde(default)]
    symbol:         Option<Value>,
    #[serde(default)]
    ticker:         Option<Value>,
    #[serde(default)]
    contract_desc:  Option<Value>,
    #[serde(default)]
    conid:          Option<Value>,

    #[serde(default, deserialize_with = "lenient_f64")]
    position:       Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    market_value:   Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    mkt_value:      Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    cost_basis:     Option<f64>,

    #[serde(default, rename = "unrealizedPnL", deserialize_with = "lenient_f64")]
    unrealized_pnl: Option<f64>,
    #[serde(default, rename = "unrealizedPnl", deserialize_with = "lenient_f64")]
    unrealized_pnl_lower: Option<f64>,
}

/// One holding in the account snapshot. Transient: fetched fresh every run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "GatewayPosition")]
pub struct Position {
    pub symbol:         String,
    /// Signed share count; negative for shorts
    pub quantity:       f64,
    pub market_value:   f64,
    /// Total cost of the holding, when the gateway reports it
    pub cost_basis:     Option<f64>,
    pub unrealized_pnl: Option<f64>,
}

impl From<GatewayPosition> for Position {
    fn from(raw: GatewayPosition) -> Self {
        // conid last: a bare contract id is the least readable label
        let symbol = [&raw.symbol, &raw.ticker, &raw.contract_desc, &raw.conid]
            .into_iter()
            .flatten()
            .find_map(text_from_value)
            .unwrap_or_else(|| "Unknown".to_string());

        Self {
            symbol,
            quantity:       raw.position.unwrap_or(0.0),
            market_value:   raw.market_value.or(raw.mkt_value).unwrap_or(0.0),
            cost_basis:     raw.cost_basis,
            unrealized_pnl: raw.unrealized_pnl.or(raw.unrealized_pnl_lower),
        }
    }
}

impl Position {
    /// Decode one element of the positions array. Anything that is not a JSON
    /// object yields `None`; inside an object every field is lenient.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// `market_value − cost_basis` when a cost basis is known, otherwise the
    /// gateway's own unrealized P&L, otherwise zero.
    pub fn pnl(&self) -> f64 {
        let pnl = match self.cost_basis {
            Some(cost) => self.market_value - cost,
            None => self.unrealized_pnl.unwrap_or(0.0),
        };
        // huge finite inputs can still overflow the subtraction
        if pnl.is_finite() { pnl } else { 0.0 }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.quantity != 0.0
    }
}
