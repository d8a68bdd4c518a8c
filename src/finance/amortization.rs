//! Fixed-payment loan amortization

use serde::Serialize;

/// Computed monthly cost of a loan at one rate. Values are unrounded;
/// callers round when presenting.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuote {
    pub monthly_payment: f64,
    pub total_interest: f64,
    pub apr: f64,
}

impl LoanQuote {
    /// Quote for a purchase that needs no financing
    pub fn zero() -> Self {
        Self {
            monthly_payment: 0.0,
            total_interest: 0.0,
            apr: 0.0,
        }
    }
}

/// Standard amortizing-loan payment.
///
/// A non-positive principal means the down payment covers the price and
/// yields [`LoanQuote::zero`]. A zero rate pays the principal off
/// straight-line. `term_months` must be positive; callers validate it.
pub fn amortize(principal: f64, annual_rate_percent: f64, term_months: u32) -> LoanQuote {
    if principal <= 0.0 || term_months == 0 {
        return LoanQuote::zero();
    }

    let monthly_rate = annual_rate_percent / 100.0 / 12.0;
    let n = term_months as f64;

    // discount form stays finite for long terms where (1+r)^n overflows
    let monthly_payment = if monthly_rate > 0.0 {
        principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-n))
    } else {
        principal / n
    };

    LoanQuote {
        monthly_payment,
        total_interest: monthly_payment * n - principal,
        apr: annual_rate_percent,
    }
}
