//! REST API server for the car-buying assistant
//!
//! Exposes the cost calculators, the advisor and the ML service proxy over
//! HTTP. Every handler except `/health` answers with the [`ApiResponse`]
//! envelope.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::advisor::{self, Advisor};
use crate::catalog::{analyze_car, find_car, CAR_CATALOG};
use crate::error::AdvisorError;
use crate::finance::{compare_financing, detailed_insurance_quote, project_budget, MarketEstimator};
use crate::ml::{DepreciationRequest, MlPredictor, ValuationRequest};
use crate::models::{
    BudgetRequest, BudgetResponse, ChatRequest, ChatResponse, FinancingRequest, FinancingResponse,
    InsuranceRequest, MarketRequest, RecommendationRequest,
};
use crate::rates::{CANADIAN_BANKS, CREDIT_TIERS, LOAN_TERMS, PROVINCES};
use crate::winter::{winter_score, WinterFeatures};
use crate::Result;

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Data-carrying response whose `success` follows the outcome
    pub fn report<T: Serialize>(ok: bool, data: T) -> Self {
        Self {
            success: ok,
            ..Self::success(data)
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

/// Map an operation result onto the envelope. Upstream detail is logged and
/// replaced by a user-facing hint.
fn respond<T: Serialize>(operation: &str, result: Result<T>) -> ApiResult {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(e) => {
            let status = e.status_code();
            match &e {
                AdvisorError::Validation { .. } | AdvisorError::NotFound(_) => {
                    warn!(operation, "Rejected request: {}", e)
                }
                _ => error!(operation, "Request failed: {}", e),
            }
            (status, Json(ApiResponse::error(e.user_hint())))
        }
    }
}

fn current_year() -> i32 {
    chrono::Utc::now().year()
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub advisor: Arc<dyn Advisor>,
    pub ml: Arc<dyn MlPredictor>,
    pub market: Arc<MarketEstimator>,
}

impl ApiState {
    pub fn new(advisor: Arc<dyn Advisor>, ml: Arc<dyn MlPredictor>) -> Self {
        Self {
            advisor,
            ml,
            market: Arc::new(MarketEstimator::new()),
        }
    }
}

/// =============================
/// Health & Reference Data
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn reference_data() -> ApiResult {
    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "provinces": PROVINCES,
            "banks": CANADIAN_BANKS,
            "creditTiers": CREDIT_TIERS,
            "loanTerms": LOAN_TERMS,
        }))),
    )
}

/// =============================
/// Calculators
/// =============================

async fn financing_handler(Json(req): Json<FinancingRequest>) -> ApiResult {
    info!(
        car_price = req.car_price,
        term = req.term,
        credit_score = req.credit_score,
        "Financing request"
    );
    let result = compare_financing(&req).map(|c| FinancingResponse::from(&c));
    respond("financing", result)
}

async fn insurance_handler(Json(req): Json<InsuranceRequest>) -> ApiResult {
    info!(province = %req.province, year = req.year, "Insurance request");
    respond("insurance", detailed_insurance_quote(&req, current_year()))
}

async fn budget_handler(Json(req): Json<BudgetRequest>) -> ApiResult {
    info!(province = %req.province, loan_term = req.loan_term, "Budget request");
    let projection = project_budget(&req);
    respond("budget", Ok(BudgetResponse::from(&projection)))
}

async fn market_handler(State(state): State<ApiState>, Json(req): Json<MarketRequest>) -> ApiResult {
    info!(make = %req.make, model = %req.model, year = req.year, "Market estimate request");
    let result = {
        let mut rng = rand::thread_rng();
        state.market.estimate(&req, current_year(), &mut rng)
    };
    respond("market_estimate", result)
}

async fn winter_handler(Json(features): Json<WinterFeatures>) -> ApiResult {
    respond("winter_score", Ok(winter_score(&features)))
}

/// =============================
/// Advisor
/// =============================

async fn chat_handler(State(state): State<ApiState>, Json(req): Json<ChatRequest>) -> ApiResult {
    info!(history = req.history.len(), "Chat request");
    let result = advisor::chat(state.advisor.as_ref(), &req.message, &req.history)
        .await
        .map(|response| ChatResponse { response });
    respond("chat", result)
}

async fn recommendation_handler(
    State(state): State<ApiState>,
    Json(req): Json<RecommendationRequest>,
) -> ApiResult {
    info!(province = %req.province, budget = req.budget, "Recommendation request");
    let result = advisor::recommend(state.advisor.as_ref(), &req)
        .await
        .map(|response| ChatResponse { response });
    respond("recommendation", result)
}

async fn advisor_diagnostic(State(state): State<ApiState>) -> ApiResult {
    let diagnostic = advisor::diagnose(state.advisor.as_ref()).await;
    let ok = diagnostic.is_ok();
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, Json(ApiResponse::report(ok, diagnostic)))
}

/// =============================
/// ML Service Proxy
/// =============================

async fn ml_status(State(state): State<ApiState>) -> ApiResult {
    let status = state.ml.health().await;
    let online = status.is_online();
    let code = if online {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(ApiResponse::report(online, status)))
}

async fn ml_valuation(State(state): State<ApiState>, Json(req): Json<ValuationRequest>) -> ApiResult {
    info!(make = %req.make, model = %req.model, "ML valuation request");
    respond("ml_valuation", state.ml.valuation(&req).await)
}

async fn ml_depreciation(
    State(state): State<ApiState>,
    Json(req): Json<DepreciationRequest>,
) -> ApiResult {
    info!(make = %req.make, model = %req.model, "ML depreciation request");
    respond("ml_depreciation", state.ml.depreciation(&req).await)
}

async fn ml_analysis(State(state): State<ApiState>, Json(req): Json<ValuationRequest>) -> ApiResult {
    info!(make = %req.make, model = %req.model, "ML full analysis request");
    respond("ml_analysis", state.ml.full_analysis(&req).await)
}

/// =============================
/// Catalog
/// =============================

async fn catalog_list() -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(CAR_CATALOG)))
}

async fn catalog_analysis(State(state): State<ApiState>, Path(id): Path<String>) -> ApiResult {
    let Some(car) = find_car(&id) else {
        return respond::<()>(
            "catalog_analysis",
            Err(AdvisorError::NotFound(format!("no catalog car with id '{}'", id))),
        );
    };
    let analysis = analyze_car(state.ml.as_ref(), car).await;
    (StatusCode::OK, Json(ApiResponse::success(analysis)))
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/reference", get(reference_data))
        .route("/api/financing", post(financing_handler))
        .route("/api/insurance", post(insurance_handler))
        .route("/api/budget", post(budget_handler))
        .route("/api/scraper", post(market_handler))
        .route("/api/winter-score", post(winter_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/recommendation", post(recommendation_handler))
        .route("/api/test-gemini", get(advisor_diagnostic))
        .route("/api/ml-status", get(ml_status))
        .route("/api/ml-valuation", post(ml_valuation))
        .route("/api/ml-depreciation", post(ml_depreciation))
        .route("/api/ml-analysis", post(ml_analysis))
        .route("/api/catalog", get(catalog_list))
        .route("/api/catalog/:id/analysis", get(catalog_analysis))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamErrorKind;
    use crate::ml::{Depreciation, FullAnalysis, MlStatus, ServiceStatus, Valuation};
    use crate::models::ChatTurn;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct CannedAdvisor {
        failure: Option<UpstreamErrorKind>,
    }

    #[async_trait]
    impl Advisor for CannedAdvisor {
        async fn reply(&self, message: &str, history: &[ChatTurn]) -> Result<String> {
            match self.failure {
                Some(kind) => Err(AdvisorError::upstream("gemini", kind, "secret upstream detail")),
                None => Ok(format!("{} ({} turns)", message, history.len())),
            }
        }

        async fn complete(&self, _prompt: &str) -> Result<String> {
            match self.failure {
                Some(kind) => Err(AdvisorError::upstream("gemini", kind, "secret upstream detail")),
                None => Ok("Try a Subaru Forester.".to_string()),
            }
        }
    }

    struct StubMl {
        online: bool,
    }

    fn valuation() -> Valuation {
        Valuation {
            fair_price: 30_000,
            listing_price: 28_500,
            deal_score: 71,
            price_position: "5% below market".to_string(),
            confidence: "±$1,200".to_string(),
            price_difference: 1_500,
            percent_difference: 5.0,
            advice: "Good deal!".to_string(),
            model_confidence: "high".to_string(),
        }
    }

    fn depreciation(price: i64) -> Depreciation {
        Depreciation {
            yearly_values: vec![price, price * 8 / 10],
            annual_depreciation_rate: 12.0,
            resale_value_5_year: price / 2,
            total_depreciation: price / 2,
            percent_retained: 50.0,
            retention_rating: "Good".to_string(),
            advice: "Average depreciation.".to_string(),
            year_breakdown: vec![],
            best_selling_window: "5-6 years".to_string(),
        }
    }

    #[async_trait]
    impl MlPredictor for StubMl {
        async fn valuation(&self, req: &ValuationRequest) -> Result<Valuation> {
            if !self.online {
                return Err(AdvisorError::upstream("ml-service", UpstreamErrorKind::Unreachable, "refused"));
            }
            req.validate()?;
            Ok(valuation())
        }

        async fn depreciation(&self, req: &DepreciationRequest) -> Result<Depreciation> {
            req.validate()?;
            Ok(depreciation(req.purchase_price))
        }

        async fn full_analysis(&self, req: &ValuationRequest) -> Result<FullAnalysis> {
            Ok(FullAnalysis {
                valuation: self.valuation(req).await?,
                depreciation: depreciation(30_000),
            })
        }

        async fn health(&self) -> MlStatus {
            MlStatus {
                status: if self.online { ServiceStatus::Online } else { ServiceStatus::Offline },
                service: None,
                endpoint: "http://ml.test".to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                error: None,
            }
        }
    }

    fn router(advisor_failure: Option<UpstreamErrorKind>, ml_online: bool) -> Router {
        create_router(ApiState::new(
            Arc::new(CannedAdvisor {
                failure: advisor_failure,
            }),
            Arc::new(StubMl { online: ml_online }),
        ))
    }

    async fn call(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, ApiResponse) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_financing_scenario() {
        let (status, body) = call(
            router(None, true),
            "POST",
            "/api/financing",
            Some(json!({"carPrice": 30000, "downPayment": 5000, "term": 60, "creditScore": 720})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["apr"], 5.5);
        assert_eq!(data["monthlyPayment"], 478);
        assert_eq!(data["banks"].as_array().unwrap().len(), 5);
        assert!(data["banks"][0]["name"].as_str().unwrap().starts_with("RBC"));
    }

    #[tokio::test]
    async fn test_financing_validation_error() {
        let (status, body) = call(
            router(None, true),
            "POST",
            "/api/financing",
            Some(json!({"carPrice": 30000, "downPayment": 35000, "term": 60, "creditScore": 720})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body.success);
        assert!(body.error.unwrap().contains("downPayment"));
    }

    #[tokio::test]
    async fn test_insurance_unknown_province() {
        let (status, body) = call(
            router(None, true),
            "POST",
            "/api/insurance",
            Some(json!({"make": "Honda", "model": "Civic", "year": 2020, "province": "XX", "age": 30})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.unwrap().contains("province"));
    }

    #[tokio::test]
    async fn test_insurance_rejects_out_of_range_year() {
        for year in [i32::MIN, 1900, 9999] {
            let (status, body) = call(
                router(None, true),
                "POST",
                "/api/insurance",
                Some(json!({"make": "Honda", "model": "Civic", "year": year, "province": "ON", "age": 30})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body.error.unwrap().contains("year"));
        }
    }

    #[tokio::test]
    async fn test_financing_long_term_is_not_free() {
        let (status, body) = call(
            router(None, true),
            "POST",
            "/api/financing",
            Some(json!({"carPrice": 30000, "downPayment": 5000, "term": 1_000_000, "creditScore": 720})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["monthlyPayment"], 115);
        assert!(data["totalInterest"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_budget_defaults() {
        let (status, body) = call(router(None, true), "POST", "/api/budget", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["totalMonthlyCost"], 1023);
        assert_eq!(data["fuel"], 200);
    }

    #[tokio::test]
    async fn test_market_estimate() {
        let (status, body) = call(
            router(None, true),
            "POST",
            "/api/scraper",
            Some(json!({"make": "Toyota", "model": "Corolla", "year": 2019})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["averagePrice"].as_i64().unwrap() % 500, 0);
        assert_eq!(data["provinces"].as_object().unwrap().len(), 13);

        let (status, _) = call(
            router(None, true),
            "POST",
            "/api/scraper",
            Some(json!({"make": "Toyota", "model": "Corolla", "year": 1985})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_trims_history() {
        let history: Vec<Value> = (0..12)
            .map(|i| json!({"role": if i % 2 == 0 { "user" } else { "assistant" }, "content": format!("t{}", i)}))
            .collect();
        let (status, body) = call(
            router(None, true),
            "POST",
            "/api/chat",
            Some(json!({"message": "Lease or buy?", "history": history})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        // last ten turns start with user t2
        assert_eq!(body.data.unwrap()["response"], "Lease or buy? (10 turns)");
    }

    #[tokio::test]
    async fn test_chat_upstream_failure_is_hinted() {
        let (status, body) = call(
            router(Some(UpstreamErrorKind::RateLimited), true),
            "POST",
            "/api/chat",
            Some(json!({"message": "hello"})),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let error = body.error.unwrap();
        assert!(error.contains("quota"));
        assert!(!error.contains("secret"));
    }

    #[tokio::test]
    async fn test_chat_empty_message() {
        let (status, _) = call(router(None, true), "POST", "/api/chat", Some(json!({"message": ""}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ml_status() {
        let (status, body) = call(router(None, true), "GET", "/api/ml-status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.data.unwrap()["status"], "online");

        let (status, body) = call(router(None, false), "GET", "/api/ml-status", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.success);
        assert_eq!(body.data.unwrap()["status"], "offline");
    }

    #[tokio::test]
    async fn test_ml_valuation_offline() {
        let (status, body) = call(
            router(None, false),
            "POST",
            "/api/ml-valuation",
            Some(json!({"make": "Honda", "model": "CR-V", "year": 2022, "mileage": 35000})),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.error.unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn test_catalog_analysis() {
        let (status, body) = call(router(None, true), "GET", "/api/catalog/honda-crv-2022/analysis", None).await;
        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["valuation"]["fairPrice"], 30_000);
        assert_eq!(data["depreciation"]["yearlyValues"][0], 28_500);

        let (status, body) = call(router(None, false), "GET", "/api/catalog/honda-crv-2022/analysis", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.data.unwrap()["error"].is_string());

        let (status, _) = call(router(None, true), "GET", "/api/catalog/nope/analysis", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_advisor_diagnostic() {
        let (status, body) = call(router(None, true), "GET", "/api/test-gemini", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.success);
        assert_eq!(body.data.unwrap()["status"], "success");

        let (status, body) = call(
            router(Some(UpstreamErrorKind::Unauthenticated), true),
            "GET",
            "/api/test-gemini",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.success);
        assert_eq!(body.data.unwrap()["errorKind"], "unauthenticated");
    }

    #[tokio::test]
    async fn test_reference_data() {
        let (status, body) = call(router(None, true), "GET", "/api/reference", None).await;
        assert_eq!(status, StatusCode::OK);
        let data = body.data.unwrap();
        assert_eq!(data["provinces"].as_array().unwrap().len(), 13);
        assert_eq!(data["loanTerms"][4], 60);
        assert_eq!(data["creditTiers"][0]["minScore"], 750);
    }
}
