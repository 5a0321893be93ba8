//! # broker — IBKR Client Portal gateway client
//!
//! Two authentication strategies share one client:
//! * `ApiKey`  — every request carries `Authorization: Bearer <key>`.
//! * `Session` — `POST /sso/login` once; the cookie store replays the session
//!   cookie on every later request.
//!
//! All calls return `Result`; the caller decides whether a failure means
//! "empty data" (it always does in `main`).

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{
    config::{BrokerAuth, BrokerConfig},
    error::BrokerError,
    models::{AccountInfo, Position},
};

pub struct BrokerClient {
    http:   reqwest::Client,
    config: BrokerConfig,
}

impl BrokerClient {
    pub fn new(config: &BrokerConfig, timeout: Duration) -> Result<Self, BrokerError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, config: config.clone() })
    }

    /// Establish credentials for the following GETs. A no-op in API-key mode.
    pub async fn authenticate(&self) -> Result<(), BrokerError> {
        let BrokerAuth::Session { username, password } = &self.config.auth else {
            return Ok(());
        };

        let url = format!("{}/sso/login", self.config.base_url);
        debug!(url = %url, username = %username, "Logging in to gateway...");

        let resp = self
            .http
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(BrokerError::Auth(format!("HTTP {status}: {body}")));
        }

        info!(username = %username, "🔑 Gateway session established");
        Ok(())
    }

    /// Open positions, with zero-quantity lines removed.
    pub async fn fetch_positions(&self) -> Result<Vec<Position>, BrokerError> {
        let endpoint = self.portfolio_path("positions");
        let raw: Vec<Value> = self.get_json(&endpoint).await?;

        let total = raw.len();
        let positions: Vec<Position> = raw
            .iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let pos = Position::from_value(value);
                if pos.is_none() {
                    warn!(index, entry = %value, "Skipping malformed position entry");
                }
                pos
            })
            .collect();

        let open = keep_open(positions);
        debug!(total, open = open.len(), "Positions fetched");

        Ok(open)
    }

    pub async fn fetch_account_summary(&self) -> Result<AccountInfo, BrokerError> {
        let endpoint = self.portfolio_path("summary");
        self.get_json(&endpoint).await
    }

    // ─── Internals ────────────────────────────────────────────────────────────

    fn portfolio_path(&self, leaf: &str) -> String {
        match &self.config.account_id {
            Some(account) => format!("/portfolio/{account}/{leaf}"),
            None => format!("/portfolio/{leaf}"),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, BrokerError> {
        let url = format!("{}{endpoint}", self.config.base_url);

        let request = match &self.config.auth {
            BrokerAuth::ApiKey(key) => self.http.get(&url).bearer_auth(key),
            BrokerAuth::Session { .. } => self.http.get(&url),
        };

        let resp = request.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            warn!(%status, endpoint, body = %body, "Gateway returned an error");
            return Err(BrokerError::Status {
                endpoint: endpoint.to_string(),
                status,
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| BrokerError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

/// Drop positions whose quantity is zero (closed today, or unparseable).
pub fn keep_open(positions: Vec<Position>) -> Vec<Position> {
    positions.into_iter().filter(Position::is_open).collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn api_key_config(base_url: String, account: Option<&str>) -> BrokerConfig {
        BrokerConfig {
            base_url,
            account_id: account.map(str::to_string),
            auth: BrokerAuth::ApiKey("test-key".into()),
            accept_invalid_certs: false,
        }
    }

    fn session_config(base_url: String) -> BrokerConfig {
        BrokerConfig {
            base_url,
            account_id: None,
            auth: BrokerAuth::Session { username: "trader".into(), password: "hunter2".into() },
            accept_invalid_certs: false,
        }
    }

    fn client(config: &BrokerConfig) -> BrokerClient {
        BrokerClient::new(config, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_positions_filtered_and_bearer_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/portfolio/U123/positions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"symbol": "AAPL", "position": 100, "marketValue": 17500, "unrealizedPnL": 250},
                    {"symbol": "MSFT", "position": 0,   "marketValue": 0},
                    {"symbol": "TSLA", "position": "-5", "marketValue": -1200, "costBasis": -1100},
                    {"symbol": "JUNK", "position": "n/a"}
                ]"#,
            )
            .create_async()
            .await;

        let broker = client(&api_key_config(server.url(), Some("U123")));
        broker.authenticate().await.unwrap();
        let positions = broker.fetch_positions().await.unwrap();

        mock.assert_async().await;
        let symbols: Vec<&str> = positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "TSLA"]);
        assert!(positions.iter().all(|p| p.quantity != 0.0));
    }

    #[tokio::test]
    async fn test_bad_entries_do_not_drop_the_rest() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/portfolio/U123/positions")
            .with_status(200)
            .with_body(
                r#"[
                    {"symbol": "AAPL", "position": 100, "marketValue": 17500, "unrealizedPnL": 250},
                    {"symbol": 7203, "position": 5, "marketValue": 1000},
                    null,
                    "garbage",
                    {"symbol": ["x"], "contractDesc": "SONY", "position": "2", "mktValue": "300"}
                ]"#,
            )
            .create_async()
            .await;

        let broker = client(&api_key_config(server.url(), Some("U123")));
        let positions = broker.fetch_positions().await.unwrap();

        let symbols: Vec<&str> = positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "7203", "SONY"]);
        assert_eq!(positions[2].market_value, 300.0);
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/portfolio/U123/positions")
            .with_status(401)
            .with_body("not authenticated")
            .create_async()
            .await;

        let broker = client(&api_key_config(server.url(), Some("U123")));
        let err = broker.fetch_positions().await.unwrap_err();

        match err {
            BrokerError::Status { status, body, endpoint } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "not authenticated");
                assert_eq!(endpoint, "/portfolio/U123/positions");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_summary_decoded() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/portfolio/U123/summary")
            .with_status(200)
            .with_body(r#"{"NetLiquidation": 50000, "CashBalance": 10000, "UnrealizedPnL": 580}"#)
            .create_async()
            .await;

        let broker = client(&api_key_config(server.url(), Some("U123")));
        let info = broker.fetch_account_summary().await.unwrap();
        assert_eq!(info.net_liquidation, Some(50000.0));
        assert_eq!(info.cash_balance, Some(10000.0));
        assert_eq!(info.unrealized_pnl, Some(580.0));
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/portfolio/U123/positions")
            .with_status(200)
            .with_body("<html>gateway starting</html>")
            .create_async()
            .await;

        let broker = client(&api_key_config(server.url(), Some("U123")));
        let err = broker.fetch_positions().await.unwrap_err();
        assert!(matches!(err, BrokerError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_session_login_cookie_reused() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/sso/login")
            .match_body(Matcher::Json(json!({ "username": "trader", "password": "hunter2" })))
            .with_status(200)
            .with_header("set-cookie", "SESSION=abc123; Path=/")
            .with_body(r#"{"authenticated": true}"#)
            .create_async()
            .await;
        let positions = server
            .mock("GET", "/portfolio/positions")
            .match_header("cookie", "SESSION=abc123")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body(r#"[{"symbol": "AAPL", "position": 1, "marketValue": 175}]"#)
            .create_async()
            .await;
        let summary = server
            .mock("GET", "/portfolio/summary")
            .match_header("cookie", "SESSION=abc123")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let broker = client(&session_config(server.url()));
        broker.authenticate().await.unwrap();
        let fetched = broker.fetch_positions().await.unwrap();
        let info = broker.fetch_account_summary().await.unwrap();

        login.assert_async().await;
        positions.assert_async().await;
        summary.assert_async().await;
        assert_eq!(fetched.len(), 1);
        assert!(info.is_empty());
    }

    #[tokio::test]
    async fn test_session_login_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _login = server
            .mock("POST", "/sso/login")
            .with_status(403)
            .with_body("bad credentials")
            .create_async()
            .await;

        let broker = client(&session_config(server.url()));
        let err = broker.authenticate().await.unwrap_err();
        assert!(matches!(err, BrokerError::Auth(ref msg) if msg.contains("bad credentials")));
    }

    #[tokio::test]
    async fn test_api_key_mode_skips_login() {
        let mut server = mockito::Server::new_async().await;
        let login = server.mock("POST", "/sso/login").expect(0).create_async().await;

        let broker = client(&api_key_config(server.url(), None));
        broker.authenticate().await.unwrap();
        login.assert_async().await;
    }

    #[test]
    fn test_keep_open() {
        let pos = |q: f64| Position {
            symbol: "X".into(),
            quantity: q,
            market_value: 0.0,
            cost_basis: None,
            unrealized_pnl: None,
        };
        let kept = keep_open(vec![pos(0.0), pos(-3.0), pos(0.5), pos(-0.0)]);
        assert_eq!(kept.iter().map(|p| p.quantity).collect::<Vec<_>>(), [-3.0, 0.5]);
    }
}
