//! 6ixKar car-buying assistant
//!
//! Cost calculators for Canadian car buyers plus thin adapters to an LLM
//! advisor and an external ML valuation service:
//! - Loan amortization and bank offer ranking by credit tier
//! - Provincial insurance estimates
//! - Monthly ownership budget
//! - Mock market estimates and winter readiness scoring
//! - REST surface wrapping all of the above

pub mod advisor;
pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod finance;
pub mod gemini;
pub mod ml;
pub mod models;
pub mod rates;
pub mod winter;

pub use error::{AdvisorError, Result};

// Re-export common types
pub use models::*;
