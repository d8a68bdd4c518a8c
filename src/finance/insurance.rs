//! Insurance premium estimates
//!
//! Two named variants exist. [`detailed_insurance_quote`] applies province,
//! driver-age and vehicle-age factors per coverage component and backs the
//! insurance endpoint. [`simplified_insurance_monthly`] applies only the
//! province multiplier to one base figure and backs the budget simulator.

use super::check_model_year;
use crate::error::AdvisorError;
use crate::models::{round_currency, InsuranceBreakdown, InsuranceQuote, InsuranceRequest};
use crate::rates::{
    province, BaseInsuranceRates, BASE_INSURANCE_RATES, DEFAULT_INSURANCE_MULTIPLIER,
    SIMPLIFIED_BASE_INSURANCE,
};
use crate::Result;

/// Driver-age factor: <25 ×1.5, 25–29 ×1.2, 30–54 ×1.0, 55+ ×0.9
pub fn driver_age_factor(age: u32) -> f64 {
    match age {
        0..=24 => 1.5,
        25..=29 => 1.2,
        30..=54 => 1.0,
        _ => 0.9,
    }
}

/// Vehicle-age factor for collision and comprehensive coverage.
/// Model years ahead of the current year count as new.
pub fn vehicle_age_factor(vehicle_age: i32) -> f64 {
    if vehicle_age <= 2 {
        1.3
    } else if vehicle_age <= 5 {
        1.1
    } else if vehicle_age >= 10 {
        0.8
    } else {
        1.0
    }
}

/// Compose the full premium from explicit base rates.
pub fn quote_with_rates(
    base: &BaseInsuranceRates,
    province_multiplier: f64,
    driver_age: u32,
    vehicle_age: i32,
) -> InsuranceQuote {
    let driver = driver_age_factor(driver_age);
    let vehicle = vehicle_age_factor(vehicle_age);

    // liability ignores the vehicle's age
    let liability = base.liability * province_multiplier * driver;
    let collision = base.collision * province_multiplier * driver * vehicle;
    let comprehensive = base.comprehensive * province_multiplier * driver * vehicle;

    let monthly = round_currency(liability + collision + comprehensive);

    InsuranceQuote {
        monthly,
        annual: monthly * 12,
        breakdown: InsuranceBreakdown {
            liability: round_currency(liability),
            collision: round_currency(collision),
            comprehensive: round_currency(comprehensive),
        },
    }
}

/// Detailed premium for a driver and vehicle in a province.
///
/// Only the model year of the vehicle is used numerically.
pub fn detailed_insurance_quote(req: &InsuranceRequest, current_year: i32) -> Result<InsuranceQuote> {
    check_model_year(req.year, current_year)?;
    if req.province.trim().is_empty() {
        return Err(AdvisorError::validation("province", "province is required"));
    }
    let profile = province(&req.province).ok_or_else(|| {
        AdvisorError::validation("province", format!("unknown province code '{}'", req.province))
    })?;

    Ok(quote_with_rates(
        &BASE_INSURANCE_RATES,
        profile.insurance_multiplier,
        req.age,
        current_year - req.year,
    ))
}

/// Budget-simulator premium: one base figure times the province multiplier,
/// unknown provinces fall back to a default multiplier. Unrounded.
pub fn simplified_insurance_monthly(province_code: &str) -> f64 {
    let multiplier = province(province_code)
        .map(|p| p.insurance_multiplier)
        .unwrap_or(DEFAULT_INSURANCE_MULTIPLIER);
    SIMPLIFIED_BASE_INSURANCE * multiplier
}
