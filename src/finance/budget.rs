//! Total cost of ownership projection for the budget simulator

use crate::finance::amortization::amortize;
use crate::finance::insurance::simplified_insurance_monthly;
use crate::models::{round_currency, BudgetRequest, BudgetResponse};
use crate::rates::{
    MONTHLY_FUEL, MONTHLY_MAINTENANCE, OWNERSHIP_HORIZON_MONTHS, RECOMMENDED_COST_RATIO,
};
use serde::Serialize;

/// Term used when the simulator receives a non-positive loan term
pub const DEFAULT_LOAN_TERM: u32 = 60;

/// Unrounded monthly cost components.
///
/// `total_monthly_cost` is the sum of the four monthly components.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProjection {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub insurance: f64,
    pub fuel: f64,
    pub maintenance: f64,
    pub total_monthly_cost: f64,
    pub five_year_total: f64,
    pub recommended_income: f64,
}

/// Project the monthly and five-year cost of a purchase.
///
/// Never fails: negative amounts are clamped, a non-positive term falls back
/// to [`DEFAULT_LOAN_TERM`] and an unknown province uses the default
/// insurance multiplier.
pub fn project_budget(req: &BudgetRequest) -> BudgetProjection {
    let down_payment = req.down_payment.max(0.0);
    let principal = req.car_price - down_payment;
    let rate = req.interest_rate.max(0.0);
    let term = u32::try_from(req.loan_term)
        .ok()
        .filter(|t| *t > 0)
        .unwrap_or(DEFAULT_LOAN_TERM);

    let loan = amortize(principal, rate, term);
    let insurance = simplified_insurance_monthly(&req.province);

    let total_monthly_cost = loan.monthly_payment + insurance + MONTHLY_FUEL + MONTHLY_MAINTENANCE;

    BudgetProjection {
        monthly_payment: loan.monthly_payment,
        total_interest: loan.total_interest,
        insurance,
        fuel: MONTHLY_FUEL,
        maintenance: MONTHLY_MAINTENANCE,
        total_monthly_cost,
        five_year_total: down_payment + total_monthly_cost * OWNERSHIP_HORIZON_MONTHS as f64,
        recommended_income: total_monthly_cost / RECOMMENDED_COST_RATIO,
    }
}

impl From<&BudgetProjection> for BudgetResponse {
    /// Components are rounded individually and the presented total is their
    /// sum, so the aggregation identity also holds for rounded values.
    fn from(p: &BudgetProjection) -> Self {
        let monthly_payment = round_currency(p.monthly_payment);
        let insurance = round_currency(p.insurance);
        let fuel = round_currency(p.fuel);
        let maintenance = round_currency(p.maintenance);

        BudgetResponse {
            monthly_payment,
            total_interest: round_currency(p.total_interest),
            insurance,
            fuel,
            maintenance,
            total_monthly_cost: monthly_payment + insurance + fuel + maintenance,
            five_year_total: round_currency(p.five_year_total),
            recommended_income: round_currency(p.recommended_income),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(car_price: f64, down_payment: f64, rate: f64, term: i64, province: &str) -> BudgetRequest {
        BudgetRequest {
            car_price,
            down_payment,
            interest_rate: rate,
            loan_term: term,
            province: province.to_string(),
        }
    }

    #[test]
    fn test_default_scenario() {
        let projection = project_budget(&BudgetRequest::default());
        let response = BudgetResponse::from(&projection);

        assert_eq!(response.monthly_payment, 478);
        assert_eq!(response.insurance, 195);
        assert_eq!(response.fuel, 200);
        assert_eq!(response.maintenance, 150);
        assert_eq!(response.total_monthly_cost, 1023);
        assert_eq!(
            response.five_year_total,
            round_currency(5_000.0 + projection.total_monthly_cost * 60.0)
        );
        assert_eq!(
            response.recommended_income,
            round_currency(projection.total_monthly_cost / 0.2)
        );
    }

    #[test]
    fn test_total_is_sum_of_components() {
        let cases = [
            request(30_000.0, 5_000.0, 5.5, 60, "ON"),
            request(18_750.0, 0.0, 0.0, 36, "QC"),
            request(64_999.0, 12_345.0, 8.9, 84, "NU"),
            request(10_000.0, 10_000.0, 4.0, 48, "BC"),
            request(22_222.0, 1_111.0, 3.3, 72, "??"),
        ];
        for req in cases {
            let p = project_budget(&req);
            assert_eq!(
                p.total_monthly_cost,
                p.monthly_payment + p.insurance + p.fuel + p.maintenance
            );
            let r = BudgetResponse::from(&p);
            assert_eq!(
                r.total_monthly_cost,
                r.monthly_payment + r.insurance + r.fuel + r.maintenance
            );
        }
    }

    #[test]
    fn test_horizon_ignores_loan_term() {
        let short = project_budget(&request(20_000.0, 0.0, 0.0, 12, "AB"));
        assert_eq!(
            short.five_year_total,
            short.total_monthly_cost * 60.0
        );
    }

    #[test]
    fn test_very_long_term_keeps_payment() {
        let p = project_budget(&request(30_000.0, 5_000.0, 5.5, 1_000_000, "ON"));
        assert!(p.monthly_payment.is_finite());
        assert_eq!(round_currency(p.monthly_payment), 115);
        assert_eq!(BudgetResponse::from(&p).total_monthly_cost, 115 + 195 + 200 + 150);
    }

    #[test]
    fn test_defensive_defaults() {
        let paid_off = project_budget(&request(15_000.0, 20_000.0, 6.0, 60, "ON"));
        assert_eq!(paid_off.monthly_payment, 0.0);
        assert_eq!(paid_off.total_interest, 0.0);

        let no_term = project_budget(&request(30_000.0, 5_000.0, 5.5, 0, "ON"));
        let sixty = project_budget(&request(30_000.0, 5_000.0, 5.5, 60, "ON"));
        assert_eq!(no_term.monthly_payment, sixty.monthly_payment);

        let unknown = project_budget(&request(30_000.0, 5_000.0, 5.5, 60, "XX"));
        assert!((unknown.insurance - 180.0).abs() < 1e-9);
    }
}
