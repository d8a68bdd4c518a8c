//! Heuristic market price estimator
//!
//! Produces plausible prices from compounding depreciation, a brand-class
//! multiplier and random jitter. No market data is fetched. This is a demo
//! capability kept separate from the ML valuation service.
//!
//! Randomness comes from the caller: production passes a fresh
//! `rand::thread_rng()`, tests pass a seeded `StdRng` or set `variance` to 0.

use super::check_model_year;
use crate::error::AdvisorError;
use crate::models::{round_to_step, MarketEstimate, MarketRequest, PriceRange};
use crate::rates::PROVINCES;
use crate::Result;
use rand::Rng;
use std::collections::BTreeMap;


const LUXURY_BRANDS: &[&str] = &["bmw", "mercedes", "audi", "lexus", "tesla", "porsche"];
const ECONOMY_BRANDS: &[&str] = &["honda", "toyota", "mazda", "hyundai", "kia"];

#[derive(Debug, Clone)]
pub struct MarketEstimatorConfig {
    /// Price of a new vehicle before brand adjustment
    pub new_car_price: f64,
    /// Yearly retention for the first `early_years`
    pub early_retention: f64,
    pub late_retention: f64,
    pub early_years: i32,
    pub luxury_multiplier: f64,
    pub economy_multiplier: f64,
    /// Half-width of the uniform jitter, 0.1 for ±10%
    pub variance: f64,
    /// Half-open range of the synthetic listing count
    pub listings: (u32, u32),
}

impl Default for MarketEstimatorConfig {
    fn default() -> Self {
        Self {
            new_car_price: 35_000.0,
            early_retention: 0.85,
            late_retention: 0.90,
            early_years: 5,
            luxury_multiplier: 1.4,
            economy_multiplier: 0.85,
            variance: 0.10,
            listings: (20, 70),
        }
    }
}

pub struct MarketEstimator {
    config: MarketEstimatorConfig,
}

impl MarketEstimator {
    pub fn new() -> Self {
        Self {
            config: MarketEstimatorConfig::default(),
        }
    }

    pub fn with_config(config: MarketEstimatorConfig) -> Self {
        Self { config }
    }

    /// Value after compounding yearly depreciation
    pub fn depreciated_price(&self, vehicle_age: i32) -> f64 {
        (0..vehicle_age.max(0)).fold(self.config.new_car_price, |price, year| {
            if year < self.config.early_years {
                price * self.config.early_retention
            } else {
                price * self.config.late_retention
            }
        })
    }

    /// Case-insensitive substring match against known brand lists
    pub fn brand_multiplier(&self, make: &str) -> f64 {
        let make = make.to_lowercase();
        if LUXURY_BRANDS.iter().any(|b| make.contains(b)) {
            self.config.luxury_multiplier
        } else if ECONOMY_BRANDS.iter().any(|b| make.contains(b)) {
            self.config.economy_multiplier
        } else {
            1.0
        }
    }

    pub fn estimate<R: Rng + ?Sized>(
        &self,
        req: &MarketRequest,
        current_year: i32,
        rng: &mut R,
    ) -> Result<MarketEstimate> {
        validate(req, current_year)?;

        let base = self.depreciated_price(current_year - req.year) * self.brand_multiplier(&req.make);

        let jitter = if self.config.variance > 0.0 {
            1.0 + rng.gen_range(-self.config.variance..self.config.variance)
        } else {
            1.0
        };

        let average_price = round_to_step(base * jitter, 500.0);
        let average = average_price as f64;

        let price_range = PriceRange {
            low: round_to_step(average * 0.85, 100.0),
            high: round_to_step(average * 1.15, 100.0),
        };

        let (lo, hi) = self.config.listings;
        let listings = if hi > lo { rng.gen_range(lo..hi) } else { lo };

        let provinces: BTreeMap<String, i64> = PROVINCES
            .iter()
            .map(|p| {
                (
                    p.code.to_string(),
                    round_to_step(average * regional_price_factor(p.code), 100.0),
                )
            })
            .collect();

        Ok(MarketEstimate {
            average_price,
            price_range,
            listings,
            provinces,
        })
    }
}

impl Default for MarketEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Regional used-car price level relative to the national average
pub fn regional_price_factor(code: &str) -> f64 {
    match code {
        "BC" | "ON" => 1.08,
        "QC" => 0.92,
        "AB" | "SK" | "MB" => 0.95,
        _ => 1.0,
    }
}

fn validate(req: &MarketRequest, current_year: i32) -> Result<()> {
    if req.make.trim().is_empty() {
        return Err(AdvisorError::validation("make", "make is required"));
    }
    if req.model.trim().is_empty() {
        return Err(AdvisorError::validation("model", "model is required"));
    }
    check_model_year(req.year, current_year)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn request(make: &str, model: &str, year: i32) -> MarketRequest {
        MarketRequest {
            make: make.to_string(),
            model: model.to_string(),
            year,
        }
    }

    fn no_jitter() -> MarketEstimator {
        MarketEstimator::with_config(MarketEstimatorConfig {
            variance: 0.0,
            ..MarketEstimatorConfig::default()
        })
    }

    #[test]
    fn test_deterministic_without_jitter() {
        let estimator = no_jitter();
        let req = request("Honda", "Civic", 2020);
        let a = estimator.estimate(&req, 2025, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = estimator.estimate(&req, 2025, &mut StdRng::seed_from_u64(99)).unwrap();
        assert_eq!(a.average_price, b.average_price);
        assert_eq!(a.provinces, b.provinces);
    }

    #[test]
    fn test_compounding_depreciation() {
        let estimator = MarketEstimator::new();
        assert_eq!(estimator.depreciated_price(0), 35_000.0);
        let five = 35_000.0 * 0.85f64.powi(5);
        assert!((estimator.depreciated_price(5) - five).abs() < 1e-6);
        let seven = five * 0.9 * 0.9;
        assert!((estimator.depreciated_price(7) - seven).abs() < 1e-6);
        assert_eq!(estimator.depreciated_price(-1), 35_000.0);
    }

    #[test]
    fn test_brand_classes() {
        let estimator = MarketEstimator::new();
        assert_eq!(estimator.brand_multiplier("BMW"), 1.4);
        assert_eq!(estimator.brand_multiplier("mercedes-benz"), 1.4);
        assert_eq!(estimator.brand_multiplier("TOYOTA"), 0.85);
        assert_eq!(estimator.brand_multiplier("Ford"), 1.0);
    }

    #[test]
    fn test_known_price_without_jitter() {
        // 35000 * 0.85 * 0.85 = 25287.5 -> nearest 500 = 25500
        let estimate = no_jitter()
            .estimate(&request("Ford", "Escape", 2023), 2025, &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(estimate.average_price, 25_500);
        assert_eq!(estimate.price_range.low, 21_700);
        assert_eq!(estimate.price_range.high, 29_300);
        assert_eq!(estimate.provinces["ON"], 27_500);
        assert_eq!(estimate.provinces["QC"], 23_500);
        assert_eq!(estimate.provinces["SK"], 24_200);
        assert_eq!(estimate.provinces["NS"], 25_500);
        assert_eq!(estimate.provinces.len(), 13);
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let estimator = MarketEstimator::new();
        let mut rng = StdRng::seed_from_u64(42);
        let req = request("Kia", "Soul", 2019);
        let base = estimator.depreciated_price(6) * 0.85;
        for _ in 0..200 {
            let estimate = estimator.estimate(&req, 2025, &mut rng).unwrap();
            let price = estimate.average_price as f64;
            assert!(price >= base * 0.9 - 250.0 && price <= base * 1.1 + 250.0);
            assert_eq!(estimate.average_price % 500, 0);
            assert!((20..70).contains(&estimate.listings));
        }
    }

    #[test]
    fn test_year_validation() {
        let estimator = MarketEstimator::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(estimator.estimate(&request("Audi", "A4", 1989), 2025, &mut rng).is_err());
        assert!(estimator.estimate(&request("Audi", "A4", 2027), 2025, &mut rng).is_err());
        assert!(estimator.estimate(&request("Audi", "A4", 2026), 2025, &mut rng).is_ok());
        assert!(estimator.estimate(&request("Audi", "A4", 1990), 2025, &mut rng).is_ok());
    }

    #[test]
    fn test_required_fields() {
        let estimator = MarketEstimator::new();
        let mut rng = StdRng::seed_from_u64(0);
        match estimator.estimate(&request(" ", "A4", 2020), 2025, &mut rng) {
            Err(AdvisorError::Validation { field, .. }) => assert_eq!(field, "make"),
            other => panic!("expected validation error, got {:?}", other),
        }
        match estimator.estimate(&request("Audi", "", 2020), 2025, &mut rng) {
            Err(AdvisorError::Validation { field, .. }) => assert_eq!(field, "model"),
            other => panic!("expected validation error, got {:?}", other),
        }
        match estimator.estimate(&request("Audi", "A4", 0), 2025, &mut rng) {
            Err(AdvisorError::Validation { field, .. }) => assert_eq!(field, "year"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
