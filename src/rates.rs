//! Static reference data: lender rates, credit tiers, provincial insurance
//! multipliers and flat monthly cost estimates.
//!
//! All tables are immutable and shared across requests.

use serde::Serialize;
use std::collections::HashMap;

/// A named lender's base annual rate
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankOffer {
    pub name: &'static str,
    pub base_apr: f64,
}

/// Credit-score bucket with its APR surcharge
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditTier {
    pub name: &'static str,
    pub min_score: u32,
    pub apr_adjustment: f64,
}

/// Jurisdiction-specific insurance multiplier
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceProfile {
    pub code: &'static str,
    pub name: &'static str,
    pub insurance_multiplier: f64,
}

/// Monthly base insurance rates in CAD
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BaseInsuranceRates {
    pub liability: f64,
    pub collision: f64,
    pub comprehensive: f64,
}

pub const CANADIAN_BANKS: [BankOffer; 5] = [
    BankOffer { name: "RBC (Royal Bank of Canada)", base_apr: 4.5 },
    BankOffer { name: "TD Canada Trust", base_apr: 4.75 },
    BankOffer { name: "Scotiabank", base_apr: 4.6 },
    BankOffer { name: "BMO (Bank of Montreal)", base_apr: 4.8 },
    BankOffer { name: "CIBC", base_apr: 4.7 },
];

/// Ordered best to worst; the last tier starts at 0 so every score matches.
pub const CREDIT_TIERS: [CreditTier; 4] = [
    CreditTier { name: "excellent", min_score: 750, apr_adjustment: 0.0 },
    CreditTier { name: "good", min_score: 700, apr_adjustment: 1.0 },
    CreditTier { name: "fair", min_score: 650, apr_adjustment: 2.5 },
    CreditTier { name: "poor", min_score: 0, apr_adjustment: 4.5 },
];

pub const PROVINCES: [ProvinceProfile; 13] = [
    ProvinceProfile { code: "ON", name: "Ontario", insurance_multiplier: 1.3 },
    ProvinceProfile { code: "QC", name: "Quebec", insurance_multiplier: 1.2 },
    ProvinceProfile { code: "BC", name: "British Columbia", insurance_multiplier: 1.5 },
    ProvinceProfile { code: "AB", name: "Alberta", insurance_multiplier: 1.1 },
    ProvinceProfile { code: "MB", name: "Manitoba", insurance_multiplier: 1.25 },
    ProvinceProfile { code: "SK", name: "Saskatchewan", insurance_multiplier: 1.15 },
    ProvinceProfile { code: "NS", name: "Nova Scotia", insurance_multiplier: 1.35 },
    ProvinceProfile { code: "NB", name: "New Brunswick", insurance_multiplier: 1.2 },
    ProvinceProfile { code: "NL", name: "Newfoundland and Labrador", insurance_multiplier: 1.4 },
    ProvinceProfile { code: "PE", name: "Prince Edward Island", insurance_multiplier: 1.3 },
    ProvinceProfile { code: "NT", name: "Northwest Territories", insurance_multiplier: 1.45 },
    ProvinceProfile { code: "YT", name: "Yukon", insurance_multiplier: 1.4 },
    ProvinceProfile { code: "NU", name: "Nunavut", insurance_multiplier: 1.5 },
];

pub const BASE_INSURANCE_RATES: BaseInsuranceRates = BaseInsuranceRates {
    liability: 120.0,
    collision: 150.0,
    comprehensive: 100.0,
};

/// Single base figure used by the budget simulator's simplified insurance path
pub const SIMPLIFIED_BASE_INSURANCE: f64 = 150.0;

/// Multiplier applied when the budget simulator gets an unknown province
pub const DEFAULT_INSURANCE_MULTIPLIER: f64 = 1.2;

pub const MONTHLY_FUEL: f64 = 200.0;
pub const MONTHLY_MAINTENANCE: f64 = 150.0;

/// Share of gross monthly income a car should cost at most
pub const RECOMMENDED_COST_RATIO: f64 = 0.20;

/// Fixed horizon of the total-cost-of-ownership projection
pub const OWNERSHIP_HORIZON_MONTHS: u32 = 60;

pub const LOAN_TERMS: [u32; 7] = [12, 24, 36, 48, 60, 72, 84];

lazy_static::lazy_static! {
    static ref PROVINCE_INDEX: HashMap<&'static str, &'static ProvinceProfile> =
        PROVINCES.iter().map(|p| (p.code, p)).collect();
}

/// Look up a province by its two-letter code (case-insensitive)
pub fn province(code: &str) -> Option<&'static ProvinceProfile> {
    PROVINCE_INDEX
        .get(code.trim().to_ascii_uppercase().as_str())
        .copied()
}

/// Best tier whose minimum the score reaches
pub fn credit_tier(score: u32) -> &'static CreditTier {
    CREDIT_TIERS
        .iter()
        .find(|tier| score >= tier.min_score)
        .unwrap_or(&CREDIT_TIERS[CREDIT_TIERS.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_tier_boundaries() {
        assert_eq!(credit_tier(750).name, "excellent");
        assert_eq!(credit_tier(750).apr_adjustment, 0.0);
        assert_eq!(credit_tier(749).name, "good");
        assert_eq!(credit_tier(700).name, "good");
        assert_eq!(credit_tier(700).apr_adjustment, 1.0);
        assert_eq!(credit_tier(650).name, "fair");
        assert_eq!(credit_tier(649).name, "poor");
        assert_eq!(credit_tier(649).apr_adjustment, 4.5);
        assert_eq!(credit_tier(0).name, "poor");
    }

    #[test]
    fn test_province_lookup() {
        let on = province("ON").unwrap();
        assert_eq!(on.name, "Ontario");
        assert_eq!(on.insurance_multiplier, 1.3);
        assert_eq!(province("bc").unwrap().code, "BC");
        assert!(province("XX").is_none());
        assert!(province("").is_none());
    }

    #[test]
    fn test_tables_are_sane() {
        assert_eq!(PROVINCES.len(), 13);
        assert!(PROVINCES.iter().all(|p| p.insurance_multiplier > 0.0));
        assert!(CREDIT_TIERS.windows(2).all(|w| w[0].min_score > w[1].min_score));
        assert_eq!(CREDIT_TIERS[CREDIT_TIERS.len() - 1].min_score, 0);
    }
}
