//! Lender comparison: one credit-tier surcharge applied to every bank's base
//! rate, each run through the amortization formula, ranked cheapest first.

use crate::error::AdvisorError;
use crate::finance::amortization::{amortize, LoanQuote};
use crate::models::{round_currency, BankRate, FinancingRequest, FinancingResponse};
use crate::rates::{credit_tier, BankOffer, CreditTier, CANADIAN_BANKS};
use crate::Result;

/// A validated financing scenario
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoanRequest {
    pub principal: f64,
    pub term_months: u32,
}

impl LoanRequest {
    /// Validate a purchase and derive the amount to finance.
    pub fn from_purchase(car_price: f64, down_payment: f64, term: i64) -> Result<Self> {
        if car_price.is_nan() || car_price <= 0.0 {
            return Err(AdvisorError::validation(
                "carPrice",
                "a car price greater than 0 is required",
            ));
        }
        if !(0.0..=car_price).contains(&down_payment) {
            return Err(AdvisorError::validation(
                "downPayment",
                format!("must be between 0 and the car price ({})", car_price),
            ));
        }
        if term <= 0 {
            return Err(AdvisorError::validation(
                "term",
                "a loan term of at least 1 month is required",
            ));
        }
        let term_months = u32::try_from(term)
            .map_err(|_| AdvisorError::validation("term", "loan term is too long"))?;

        Ok(Self {
            principal: car_price - down_payment,
            term_months,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedOffer {
    pub bank: BankOffer,
    pub quote: LoanQuote,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinancingComparison {
    pub principal: f64,
    pub tier: &'static CreditTier,
    /// Sorted ascending by monthly payment; empty when nothing is financed
    pub offers: Vec<RankedOffer>,
}

impl FinancingComparison {
    pub fn best(&self) -> Option<&RankedOffer> {
        self.offers.first()
    }
}

/// Rank the given lenders for a loan.
///
/// The sort is stable, so lenders with equal payments keep their list order.
pub fn rank_offers(
    loan: LoanRequest,
    credit_score: i64,
    banks: &[BankOffer],
) -> FinancingComparison {
    let score = u32::try_from(credit_score.max(0)).unwrap_or(u32::MAX);
    let tier = credit_tier(score);

    if loan.principal <= 0.0 {
        return FinancingComparison {
            principal: loan.principal,
            tier,
            offers: Vec::new(),
        };
    }

    let mut offers: Vec<RankedOffer> = banks
        .iter()
        .map(|bank| RankedOffer {
            bank: *bank,
            quote: amortize(
                loan.principal,
                bank.base_apr + tier.apr_adjustment,
                loan.term_months,
            ),
        })
        .collect();

    offers.sort_by(|a, b| a.quote.monthly_payment.total_cmp(&b.quote.monthly_payment));

    FinancingComparison {
        principal: loan.principal,
        tier,
        offers,
    }
}

/// Validate a financing request and compare the Canadian lenders.
pub fn compare_financing(req: &FinancingRequest) -> Result<FinancingComparison> {
    let loan = LoanRequest::from_purchase(req.car_price, req.down_payment, req.term)?;
    Ok(rank_offers(loan, req.credit_score, &CANADIAN_BANKS))
}

fn round_apr(apr: f64) -> f64 {
    (apr * 100.0).round() / 100.0
}

impl From<&FinancingComparison> for FinancingResponse {
    fn from(comparison: &FinancingComparison) -> Self {
        let banks = comparison
            .offers
            .iter()
            .map(|offer| BankRate {
                name: offer.bank.name.to_string(),
                apr: round_apr(offer.quote.apr),
                monthly_payment: round_currency(offer.quote.monthly_payment),
            })
            .collect();

        let best = comparison
            .best()
            .map(|offer| offer.quote)
            .unwrap_or_else(LoanQuote::zero);

        FinancingResponse {
            monthly_payment: round_currency(best.monthly_payment),
            total_interest: round_currency(best.total_interest),
            apr: round_apr(best.apr),
            banks,
        }
    }
}
