//! ML valuation / depreciation service boundary
//!
//! The service is an external HTTP collaborator. [`MlPredictor`] is the seam;
//! [`HttpMlService`] talks to it over JSON.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::MlServiceSettings;
use crate::error::{AdvisorError, UpstreamErrorKind};
use crate::Result;

const SERVICE: &str = "ml-service";

//
// ================= Wire types =================
//

fn default_trim() -> String {
    "Base".to_string()
}

fn default_province() -> String {
    "ON".to_string()
}

fn default_model_year() -> i32 {
    2024
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValuationRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default = "default_trim")]
    pub trim: String,
    #[serde(default = "default_province")]
    pub province: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_price: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationRequest {
    pub make: String,
    pub model: String,
    pub purchase_price: i64,
    #[serde(default = "default_model_year")]
    pub year: i32,
    #[serde(default)]
    pub mileage: u32,
    #[serde(default = "default_province")]
    pub province: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub fair_price: i64,
    pub listing_price: i64,
    /// 0–100, higher is a better deal
    pub deal_score: u8,
    pub price_position: String,
    /// Price interval around the fair price, e.g. "±$1,200"
    pub confidence: String,
    pub price_difference: i64,
    pub percent_difference: f64,
    pub advice: String,
    pub model_confidence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct YearValue {
    pub year: i32,
    pub value: i64,
    pub age: u32,
    pub depreciation_from_new: i64,
    pub percent_retained: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Depreciation {
    pub yearly_values: Vec<i64>,
    pub annual_depreciation_rate: f64,
    #[serde(rename = "resaleValue5Year")]
    pub resale_value_5_year: i64,
    pub total_depreciation: i64,
    pub percent_retained: f64,
    pub retention_rating: String,
    pub advice: String,
    #[serde(default)]
    pub year_breakdown: Vec<YearValue>,
    #[serde(default)]
    pub best_selling_window: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FullAnalysis {
    pub valuation: Valuation,
    pub depreciation: Depreciation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Online,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlStatus {
    pub status: ServiceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    pub endpoint: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MlStatus {
    pub fn is_online(&self) -> bool {
        self.status == ServiceStatus::Online
    }
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    service: Option<String>,
}

//
// ================= Validation =================
//

impl ValuationRequest {
    pub fn validate(&self) -> Result<()> {
        require_text("make", &self.make)?;
        require_text("model", &self.model)?;
        if self.year <= 0 {
            return Err(AdvisorError::validation("year", "year is required"));
        }
        Ok(())
    }
}

impl DepreciationRequest {
    pub fn validate(&self) -> Result<()> {
        require_text("make", &self.make)?;
        require_text("model", &self.model)?;
        if self.purchase_price <= 0 {
            return Err(AdvisorError::validation(
                "purchasePrice",
                "a purchase price greater than 0 is required",
            ));
        }
        Ok(())
    }
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AdvisorError::validation(field, format!("{} is required", field)))
    } else {
        Ok(())
    }
}

//
// ================= Boundary =================
//

/// Prediction service used by the catalog and the ML proxy endpoints
#[async_trait]
pub trait MlPredictor: Send + Sync {
    async fn valuation(&self, req: &ValuationRequest) -> Result<Valuation>;
    async fn depreciation(&self, req: &DepreciationRequest) -> Result<Depreciation>;
    async fn full_analysis(&self, req: &ValuationRequest) -> Result<FullAnalysis>;
    /// Reachability probe; never fails, reports offline instead
    async fn health(&self) -> MlStatus;
}

pub struct HttpMlService {
    client: Client,
    base_url: String,
    health_timeout: Duration,
}

impl HttpMlService {
    pub fn new(settings: &MlServiceSettings) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AdvisorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            health_timeout: settings.health_timeout,
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.base_url, path);
        info!(%url, "Calling ML service");

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("ML service request failed for {}: {}", path, e);
                AdvisorError::upstream(SERVICE, UpstreamErrorKind::from_transport(&e), e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(%status, "ML service returned an error for {}: {}", path, text);
            return Err(AdvisorError::upstream(
                SERVICE,
                UpstreamErrorKind::from_status(status),
                format!("{}: {}", status, text),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            error!("Invalid JSON from ML service for {}: {}", path, e);
            AdvisorError::upstream(SERVICE, UpstreamErrorKind::Unknown, format!("invalid JSON: {}", e))
        })
    }
}

#[async_trait]
impl MlPredictor for HttpMlService {
    async fn valuation(&self, req: &ValuationRequest) -> Result<Valuation> {
        req.validate()?;
        self.post_json("/api/valuation", req).await
    }

    async fn depreciation(&self, req: &DepreciationRequest) -> Result<Depreciation> {
        req.validate()?;
        self.post_json("/api/depreciation", req).await
    }

    async fn full_analysis(&self, req: &ValuationRequest) -> Result<FullAnalysis> {
        req.validate()?;
        self.post_json("/api/full-analysis", req).await
    }

    async fn health(&self) -> MlStatus {
        let url = format!("{}/health", self.base_url);
        let result = self
            .client
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status());

        let timestamp = Utc::now().to_rfc3339();
        match result {
            Ok(response) => {
                let service = response
                    .json::<HealthBody>()
                    .await
                    .ok()
                    .and_then(|b| b.service)
                    .unwrap_or_else(|| "6ixKar ML".to_string());
                MlStatus {
                    status: ServiceStatus::Online,
                    service: Some(service),
                    endpoint: self.base_url.clone(),
                    timestamp,
                    error: None,
                }
            }
            Err(e) => {
                warn!("ML service health check failed: {}", e);
                MlStatus {
                    status: ServiceStatus::Offline,
                    service: None,
                    endpoint: self.base_url.clone(),
                    timestamp,
                    error: Some("ML service not reachable".to_string()),
                }
            }
        }
    }
}
