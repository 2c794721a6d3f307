use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use common::{Error, ForwardCurve, ForwardCurveProvider, Result};

/// Access tokens are refreshed a little before the upstream 24h expiry.
const TOKEN_TTL_HOURS: i64 = 23;

struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

/// REST client for the NGI forward-curve datafeed.
///
/// Authenticates with an account email and API key, caches the bearer
/// token, and re-authenticates once when the datafeed answers 401.
pub struct NgiClient {
    base_url: String,
    email: String,
    api_key: String,
    http: Client,
    token: Mutex<Option<AccessToken>>,
}

impl NgiClient {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            api_key: api_key.into(),
            http,
            token: Mutex::new(None),
        })
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Utc::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }
        let fresh = self.authenticate().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn forget_token(&self) {
        *self.token.lock().await = None;
    }

    async fn authenticate(&self) -> Result<AccessToken> {
        let url = format!("{}/auth", self.base_url);
        debug!("Requesting NGI access token");
        let resp = self
            .http
            .post(&url)
            .json(&json!({ "email": self.email, "password": self.api_key }))
            .send()
            .await
            .map_err(|e| Error::ProviderUnavailable(format!("authentication request failed: {e}")))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(Error::ProviderUnavailable(format!(
                "authentication rejected: HTTP {status}"
            )));
        }
        let body: AuthResponse = resp
            .json()
            .await
            .map_err(|e| Error::ProviderUnavailable(format!("invalid auth response: {e}")))?;
        let value = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::ProviderUnavailable("auth response has no access_token".into()))?;

        info!("Authenticated with NGI datafeed");
        Ok(AccessToken {
            value,
            expires_at: Utc::now() + chrono::Duration::hours(TOKEN_TTL_HOURS),
        })
    }

    async fn datafeed(&self, issue_date: NaiveDate) -> Result<Datafeed> {
        let mut retried = false;
        loop {
            let token = self.access_token().await?;
            let resp = self
                .http
                .get(format!("{}/forwardDatafeed.json", self.base_url))
                .bearer_auth(&token)
                .header("Accept", "application/json")
                .query(&[("issue_date", issue_date.to_string())])
                .send()
                .await
                .map_err(|e| Error::ProviderUnavailable(e.to_string()))?;

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED && !retried {
                warn!("NGI token rejected; re-authenticating");
                self.forget_token().await;
                retried = true;
                continue;
            }

            let body = resp
                .text()
                .await
                .map_err(|e| Error::ProviderUnavailable(e.to_string()))?;

            if status == StatusCode::NOT_FOUND {
                return Err(Error::NoCurveData(format!(
                    "no forward curve published for {issue_date} (weekend/holiday)"
                )));
            }
            if !status.is_success() {
                return Err(Error::ProviderUnavailable(format!("HTTP {status}: {body}")));
            }
            return parse_datafeed(&body);
        }
    }
}

#[async_trait]
impl ForwardCurveProvider for NgiClient {
    async fn forward_curve(&self, issue_date: NaiveDate, location: &str) -> Result<ForwardCurve> {
        let feed = self.datafeed(issue_date).await?;
        let entry = feed
            .data
            .unwrap_or_default()
            .into_values()
            .find(|l| l.location == location)
            .ok_or_else(|| {
                Error::NoCurveData(format!("location \"{location}\" not found on {issue_date}"))
            })?;

        debug!(%location, %issue_date, contracts = entry.contracts.len(), "Forward curve received");
        Ok(ForwardCurve {
            issue_date,
            location: location.to_string(),
            contracts: entry.contracts,
            fixed_prices: entry.fixed_prices,
            basis_prices: entry.basis_prices,
        })
    }
}

fn parse_datafeed(body: &str) -> Result<Datafeed> {
    let feed: Datafeed = serde_json::from_str(body)
        .map_err(|e| Error::ProviderUnavailable(format!("invalid datafeed JSON: {e}")))?;
    if feed.data.as_ref().map_or(true, BTreeMap::is_empty) {
        return Err(Error::NoCurveData("datafeed has no data".into()));
    }
    Ok(feed)
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct Datafeed {
    data: Option<BTreeMap<String, DatafeedLocation>>,
}

#[derive(Deserialize)]
struct DatafeedLocation {
    #[serde(rename = "Location", default)]
    location: String,
    #[serde(rename = "Contracts", default)]
    contracts: Vec<String>,
    #[serde(rename = "Fixed Prices", default)]
    fixed_prices: Vec<Option<f64>>,
    #[serde(rename = "Basis Prices", default)]
    basis_prices: Vec<Option<f64>>,
}
