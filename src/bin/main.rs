use sixkar::{
    finance::{compare_financing, detailed_insurance_quote, project_budget, MarketEstimator},
    models::{BudgetRequest, BudgetResponse, FinancingRequest, FinancingResponse, InsuranceRequest, MarketRequest},
    winter::{winter_score, WinterFeatures},
};
use chrono::Datelike;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("6ixKar cost calculator demo");

    let current_year = chrono::Utc::now().year();

    // Financing
    let financing = FinancingRequest {
        car_price: 30_000.0,
        down_payment: 5_000.0,
        term: 60,
        credit_score: 720,
    };
    let comparison = compare_financing(&financing)?;
    info!(tier = comparison.tier.name, principal = comparison.principal, "Financing comparison");
    println!("\n💰 FINANCING");
    println!("{}", serde_json::to_string_pretty(&FinancingResponse::from(&comparison))?);

    // Insurance
    let insurance = InsuranceRequest {
        make: "Honda".to_string(),
        model: "Civic".to_string(),
        year: 2020,
        province: "ON".to_string(),
        age: 30,
    };
    println!("\n🛡️  INSURANCE (ON, age 30)");
    println!("{}", serde_json::to_string_pretty(&detailed_insurance_quote(&insurance, current_year)?)?);

    // Budget
    let projection = project_budget(&BudgetRequest::default());
    println!("\n📊 MONTHLY BUDGET");
    println!("{}", serde_json::to_string_pretty(&BudgetResponse::from(&projection))?);

    // Market
    let estimator = MarketEstimator::new();
    let market = MarketRequest {
        make: "Toyota".to_string(),
        model: "RAV4".to_string(),
        year: 2021,
    };
    let estimate = estimator.estimate(&market, current_year, &mut rand::thread_rng())?;
    println!("\n🏷️  MARKET ESTIMATE");
    println!("{}", serde_json::to_string_pretty(&estimate)?);

    // Winter
    let features = WinterFeatures {
        has_awd: true,
        ground_clearance: Some(8.4),
        has_heated_seats: true,
        has_remote_start: false,
        has_advanced_traction: true,
    };
    println!("\n❄️  WINTER READINESS");
    println!("{}", serde_json::to_string_pretty(&winter_score(&features))?);

    Ok(())
}
