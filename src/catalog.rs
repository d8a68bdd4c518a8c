//! Demo car catalog and per-car ML analysis

use serde::Serialize;
use tracing::warn;

use crate::ml::{Depreciation, DepreciationRequest, MlPredictor, Valuation, ValuationRequest};

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CarSpec {
    pub id: &'static str,
    pub make: &'static str,
    pub model: &'static str,
    pub year: i32,
    pub mileage: u32,
    pub trim: &'static str,
    pub province: &'static str,
    pub listing_price: Option<i64>,
    /// Falls back to the valuation's fair price when absent
    pub purchase_price: Option<i64>,
}

pub const CAR_CATALOG: [CarSpec; 6] = [
    CarSpec {
        id: "toyota-rav4-2024",
        make: "Toyota",
        model: "RAV4",
        year: 2024,
        mileage: 5_000,
        trim: "XLE",
        province: "ON",
        listing_price: Some(38_500),
        purchase_price: Some(38_500),
    },
    CarSpec {
        id: "honda-crv-2022",
        make: "Honda",
        model: "CR-V",
        year: 2022,
        mileage: 35_000,
        trim: "EX",
        province: "ON",
        listing_price: Some(28_500),
        purchase_price: Some(28_500),
    },
    CarSpec {
        id: "tesla-model3-2023",
        make: "Tesla",
        model: "Model 3",
        year: 2023,
        mileage: 12_000,
        trim: "Long Range",
        province: "BC",
        listing_price: Some(52_000),
        purchase_price: Some(52_000),
    },
    CarSpec {
        id: "ford-f150-2021",
        make: "Ford",
        model: "F-150",
        year: 2021,
        mileage: 45_000,
        trim: "XLT",
        province: "AB",
        listing_price: Some(43_000),
        purchase_price: Some(43_000),
    },
    CarSpec {
        id: "bmw-3series-2022",
        make: "BMW",
        model: "330i",
        year: 2022,
        mileage: 22_000,
        trim: "xDrive",
        province: "QC",
        listing_price: Some(47_000),
        purchase_price: Some(47_000),
    },
    CarSpec {
        id: "subaru-outback-2023",
        make: "Subaru",
        model: "Outback",
        year: 2023,
        mileage: 15_000,
        trim: "Limited",
        province: "MB",
        listing_price: Some(41_000),
        purchase_price: Some(41_000),
    },
];

pub fn find_car(id: &str) -> Option<&'static CarSpec> {
    CAR_CATALOG.iter().find(|car| car.id == id)
}

impl CarSpec {
    pub fn valuation_request(&self) -> ValuationRequest {
        ValuationRequest {
            make: self.make.to_string(),
            model: self.model.to_string(),
            year: self.year,
            mileage: self.mileage,
            trim: self.trim.to_string(),
            province: self.province.to_string(),
            listing_price: self.listing_price,
        }
    }

    pub fn depreciation_request(&self, purchase_price: i64) -> DepreciationRequest {
        DepreciationRequest {
            make: self.make.to_string(),
            model: self.model.to_string(),
            purchase_price,
            year: self.year,
            mileage: self.mileage,
            province: self.province.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CarAnalysis {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation: Option<Valuation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depreciation: Option<Depreciation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Valuation first, then depreciation from the purchase price. A failure in
/// either step is reported on the analysis instead of failing the request.
pub async fn analyze_car(ml: &dyn MlPredictor, car: &CarSpec) -> CarAnalysis {
    let failed = |e: crate::error::AdvisorError| {
        warn!(car = car.id, "Catalog analysis failed: {}", e);
        CarAnalysis {
            id: car.id.to_string(),
            valuation: None,
            depreciation: None,
            error: Some(e.user_hint()),
        }
    };

    let valuation = match ml.valuation(&car.valuation_request()).await {
        Ok(v) => v,
        Err(e) => return failed(e),
    };

    let purchase_price = car.purchase_price.unwrap_or(valuation.fair_price);
    match ml.depreciation(&car.depreciation_request(purchase_price)).await {
        Ok(depreciation) => CarAnalysis {
            id: car.id.to_string(),
            valuation: Some(valuation),
            depreciation: Some(depreciation),
            error: None,
        },
        Err(e) => failed(e),
    }
}
