use sixkar::{
    api::{start_server, ApiState},
    config::Settings,
    gemini::GeminiClient,
    ml::HttpMlService,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("{}", e);
            eprintln!("📌 See .env.example for setup instructions");
            return Err(e.into());
        }
    };

    info!("🚀 6ixKar - API Server");
    info!("📍 Port: {}", settings.port);
    info!("🤖 Gemini model: {}", settings.gemini.model);
    info!("📈 ML service: {}", settings.ml_service.base_url);

    // Create components
    let advisor = GeminiClient::new(&settings.gemini)?;
    info!("🔑 Gemini key: {}", advisor.masked_key());
    let ml = HttpMlService::new(&settings.ml_service)?;

    let state = ApiState::new(Arc::new(advisor), Arc::new(ml));

    info!("📡 Starting API server...");

    // Start API server
    start_server(state, settings.port).await?;

    Ok(())
}
