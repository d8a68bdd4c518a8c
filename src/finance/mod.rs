//! Vehicle cost and financing calculations
//!
//! Pure, synchronous functions over the static tables in [`crate::rates`].
//! Nothing here performs I/O or logs.

pub mod amortization;
pub mod budget;
pub mod financing;
pub mod insurance;
pub mod market;

pub use amortization::{amortize, LoanQuote};
pub use budget::{project_budget, BudgetProjection};
pub use financing::{compare_financing, rank_offers, FinancingComparison, LoanRequest, RankedOffer};
pub use insurance::{detailed_insurance_quote, simplified_insurance_monthly};
pub use market::{MarketEstimator, MarketEstimatorConfig};

use crate::error::AdvisorError;
use crate::Result;

/// Oldest model year the calculators accept
pub const EARLIEST_MODEL_YEAR: i32 = 1990;

/// Reject a missing model year or one outside
/// [`EARLIEST_MODEL_YEAR`]..=`current_year + 1`.
pub fn check_model_year(year: i32, current_year: i32) -> Result<()> {
    if year == 0 {
        return Err(AdvisorError::validation("year", "year is required"));
    }
    let latest = current_year.saturating_add(1);
    if year < EARLIEST_MODEL_YEAR || year > latest {
        return Err(AdvisorError::validation(
            "year",
            format!("must be between {} and {}", EARLIEST_MODEL_YEAR, latest),
        ));
    }
    Ok(())
}
