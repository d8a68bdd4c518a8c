//! Request and response models for the cost calculators and the advisor
//!
//! Wire names are camelCase. Request fields default when absent so that a
//! missing field surfaces as a validation error naming it, not as a
//! deserialization failure.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Round a currency amount to the nearest whole unit for presentation
pub fn round_currency(amount: f64) -> i64 {
    amount.round() as i64
}

/// Round to a multiple of `step` (e.g. nearest 500)
pub fn round_to_step(amount: f64, step: f64) -> i64 {
    ((amount / step).round() * step) as i64
}

//
// ================= Financing =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancingRequest {
    pub car_price: f64,
    pub down_payment: f64,
    pub term: i64,
    pub credit_score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankRate {
    pub name: String,
    pub apr: f64,
    pub monthly_payment: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FinancingResponse {
    pub monthly_payment: i64,
    pub total_interest: i64,
    pub apr: f64,
    pub banks: Vec<BankRate>,
}

//
// ================= Insurance =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InsuranceRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub province: String,
    pub age: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsuranceBreakdown {
    pub liability: i64,
    pub collision: i64,
    pub comprehensive: i64,
}

/// Premium estimate. `annual == monthly * 12`; the breakdown is rounded
/// per component and may differ from `monthly` by a few units.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct InsuranceQuote {
    pub monthly: i64,
    pub annual: i64,
    pub breakdown: InsuranceBreakdown,
}

//
// ================= Budget =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetRequest {
    pub car_price: f64,
    pub down_payment: f64,
    pub interest_rate: f64,
    pub loan_term: i64,
    pub province: String,
}

impl Default for BudgetRequest {
    fn default() -> Self {
        Self {
            car_price: 30_000.0,
            down_payment: 5_000.0,
            interest_rate: 5.5,
            loan_term: 60,
            province: "ON".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub monthly_payment: i64,
    pub total_interest: i64,
    pub insurance: i64,
    pub fuel: i64,
    pub maintenance: i64,
    pub total_monthly_cost: i64,
    pub five_year_total: i64,
    pub recommended_income: i64,
}

//
// ================= Market Estimate =================
//

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketRequest {
    pub make: String,
    pub model: String,
    pub year: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRange {
    pub low: i64,
    pub high: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MarketEstimate {
    pub average_price: i64,
    pub price_range: PriceRange,
    pub listings: u32,
    pub provinces: BTreeMap<String, i64>,
}

//
// ================= Advisor =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationRequest {
    pub budget: f64,
    pub province: String,
    pub requirements: Vec<String>,
}
