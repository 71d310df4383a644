//! HTTP client for the trust-scoring backend, plus an offline file source.

use crate::models::{AdminDashboard, DashboardStats, SellerDashboard, SellerRecord};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while fetching dashboard data.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} timed out after {seconds}s")]
    Timeout { url: String, seconds: u64 },

    #[error("Cannot connect to dashboard API at {url}")]
    Connect { url: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Dashboard API error {status} for {url}: {detail}")]
    Status {
        url: String,
        status: u16,
        detail: String,
    },

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Seller {seller_id} not found in {}", path.display())]
    SellerNotFound { seller_id: String, path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Client for the dashboard endpoints.
pub struct ApiClient {
    base_url: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_seconds,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ApiError::Timeout {
                        url: url.clone(),
                        seconds: self.timeout_seconds,
                    }
                } else if e.is_connect() {
                    ApiError::Connect {
                        url: self.base_url.clone(),
                    }
                } else {
                    ApiError::Request {
                        url: url.clone(),
                        source: e,
                    }
                }
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| ApiError::Request {
            url: url.clone(),
            source: e,
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                url,
                status: status.as_u16(),
                detail: error_detail(&body, status.canonical_reason()),
            });
        }

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { url, source })
    }

    /// `GET /api/admin/dashboard`: summary stats and every seller.
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ApiError> {
        let dashboard: AdminDashboard = self.get_json("/api/admin/dashboard", &[]).await?;
        info!("Fetched admin dashboard with {} sellers", dashboard.sellers.len());
        Ok(dashboard)
    }

    /// `GET /api/dashboard-stats`.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get_json("/api/dashboard-stats", &[]).await
    }

    /// `GET /api/sellers`. Elements that are not seller objects are dropped.
    pub async fn sellers(&self) -> Result<Vec<SellerRecord>, ApiError> {
        let value: Value = self.get_json("/api/sellers", &[]).await?;
        let sellers = SellerRecord::parse_many(value);
        info!("Fetched {} sellers", sellers.len());
        Ok(sellers)
    }

    /// Stats and sellers for the risk analysis page, fetched concurrently.
    pub async fn risk_data(&self) -> Result<(DashboardStats, Vec<SellerRecord>), ApiError> {
        futures::try_join!(self.dashboard_stats(), self.sellers())
    }

    /// `GET /api/seller/dashboard?seller_id=...`.
    pub async fn seller_dashboard(&self, seller_id: &str) -> Result<SellerDashboard, ApiError> {
        let dashboard: SellerDashboard = self
            .get_json("/api/seller/dashboard", &[("seller_id", seller_id)])
            .await?;
        info!(
            "Fetched seller {} dashboard with {} reviews",
            seller_id,
            dashboard.reviews.len()
        );
        Ok(dashboard)
    }

    /// `GET /api/buyer/{seller_id}`: one seller's public profile.
    pub async fn seller_profile(&self, seller_id: &str) -> Result<SellerRecord, ApiError> {
        let mut record: SellerRecord = self
            .get_json(&format!("/api/buyer/{}", seller_id), &[])
            .await?;
        if record.id.is_empty() {
            record.id = seller_id.to_string();
        }
        info!("Fetched profile of seller {}", record.id);
        Ok(record)
    }
}

/// Pull the backend's `detail` message out of an error body.
fn error_detail(body: &[u8], reason: Option<&str>) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        if let Some(detail) = value.get("detail").and_then(Value::as_str) {
            return detail.to_string();
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        reason.unwrap_or("unknown error").to_string()
    } else {
        text
    }
}

/// Where dashboard data comes from.
pub enum DataSource {
    Api(ApiClient),
    /// A JSON file holding the same shapes the API returns.
    File(PathBuf),
}

impl DataSource {
    /// Short description for log lines.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Api(client) => client.base_url().to_string(),
            DataSource::File(path) => path.display().to_string(),
        }
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ApiError> {
        match self {
            DataSource::Api(client) => client.admin_dashboard().await,
            DataSource::File(path) => admin_dashboard_from_value(read_json(path).await?),
        }
    }

    pub async fn risk_data(&self) -> Result<(DashboardStats, Vec<SellerRecord>), ApiError> {
        match self {
            DataSource::Api(client) => client.risk_data().await,
            DataSource::File(path) => {
                let dashboard = admin_dashboard_from_value(read_json(path).await?)?;
                Ok((dashboard.stats, dashboard.sellers))
            }
        }
    }

    pub async fn seller_dashboard(&self, seller_id: &str) -> Result<SellerDashboard, ApiError> {
        match self {
            DataSource::Api(client) => client.seller_dashboard(seller_id).await,
            DataSource::File(path) => {
                serde_json::from_value(read_json(path).await?).map_err(|source| {
                    ApiError::Parse {
                        path: path.clone(),
                        source,
                    }
                })
            }
        }
    }

    pub async fn seller_profile(&self, seller_id: &str) -> Result<SellerRecord, ApiError> {
        match self {
            DataSource::Api(client) => client.seller_profile(seller_id).await,
            DataSource::File(path) => {
                profile_from_value(read_json(path).await?, seller_id).ok_or_else(|| {
                    ApiError::SellerNotFound {
                        seller_id: seller_id.to_string(),
                        path: path.clone(),
                    }
                })
            }
        }
    }
}

/// Read a JSON document from disk.
pub async fn read_json(path: &Path) -> Result<Value, ApiError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ApiError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&content).map_err(|source| ApiError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Accepts either the admin endpoint's `{stats, sellers}` object or a bare
/// seller array. Missing stats are computed from the sellers.
fn admin_dashboard_from_value(value: Value) -> Result<AdminDashboard, ApiError> {
    if value.is_array() {
        let sellers = SellerRecord::parse_many(value);
        return Ok(AdminDashboard {
            stats: DashboardStats::from_records(&sellers),
            sellers,
        });
    }

    let has_stats = value.get("stats").is_some_and(Value::is_object);
    let mut dashboard: AdminDashboard = serde_json::from_value(value).map_err(|source| {
        ApiError::Decode {
            url: "<file>".to_string(),
            source,
        }
    })?;

    if !has_stats {
        debug!("No stats in input, computing from {} sellers", dashboard.sellers.len());
        dashboard.stats = DashboardStats::from_records(&dashboard.sellers);
    }

    Ok(dashboard)
}

/// Find one seller in a file: a seller array, an admin `{stats, sellers}`
/// object, or a single profile object.
fn profile_from_value(value: Value, seller_id: &str) -> Option<SellerRecord> {
    let sellers = match value {
        Value::Object(mut map) if map.get("sellers").is_some_and(Value::is_array) => {
            map.remove("sellers")?
        }
        Value::Object(map) => {
            let mut record: SellerRecord = serde_json::from_value(Value::Object(map)).ok()?;
            if record.id.is_empty() {
                record.id = seller_id.to_string();
            }
            return (record.id == seller_id).then_some(record);
        }
        other => other,
    };

    SellerRecord::parse_many(sellers)
        .into_iter()
        .find(|r| r.id == seller_id)
}
