pub mod cli;
pub mod config;
pub mod error;
pub mod flights;
pub mod itinerary;
pub mod llm;
pub mod models;
pub mod planner;
pub mod render;
pub mod session;

use cli::Args;
use config::credentials::{ default_credentials_path, FileCredentialStore };
use config::prompt;
use flights::proxy::{ AllOriginsProxy, CorsAnywhereProxy, DirectStrategy, ProxyStrategy };
use flights::FlightFetcher;
use llm::chat::default_factory;
use llm::LlmConfig;
use log::{ info, warn };
use planner::TripPlanner;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;

pub fn build_flight_fetcher(args: &Args) -> Result<FlightFetcher, Box<dyn Error + Send + Sync>> {
    let strategies: Vec<Arc<dyn ProxyStrategy>> = if args.direct_flight_search {
        vec![Arc::new(DirectStrategy)]
    } else {
        vec![
            Arc::new(CorsAnywhereProxy::new(args.primary_proxy_url.clone())),
            Arc::new(AllOriginsProxy::new(args.fallback_proxy_url.clone()))
        ]
    };
    FlightFetcher::new(
        &args.flight_search_url,
        strategies,
        Duration::from_millis(args.flight_timeout_ms)
    )
}

pub fn build_planner(args: &Args) -> Result<TripPlanner, Box<dyn Error + Send + Sync>> {
    let credentials_path = args.credentials_path
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(default_credentials_path);
    info!("Credential Store: {}", credentials_path.display());

    let prompt_config = prompt::load_prompts(args.prompts_path.as_deref())?;
    let llm_config = LlmConfig {
        api_key: None,
        completion_model: Some(args.chat_model.clone()),
        base_url: args.chat_base_url.clone(),
    };
    let fetcher = build_flight_fetcher(args)?;
    info!("Flight search strategies: {}", fetcher.strategy_names().join(" → "));

    let mut planner = TripPlanner::new(
        Arc::new(FileCredentialStore::new(credentials_path)),
        default_factory(),
        llm_config,
        prompt_config,
        Arc::new(fetcher)
    );
    if let Err(e) = planner.load_credentials() {
        warn!("Ignoring stored API keys: {}", e);
    }
    Ok(planner)
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Chat Model: {}", args.chat_model);
    info!("Chat Base URL: {:?}", args.chat_base_url);
    info!("Prompts Path: {:?}", args.prompts_path);
    info!("Flight Search URL: {}", args.flight_search_url);
    info!("Direct Flight Search: {}", args.direct_flight_search);
    if !args.direct_flight_search {
        info!("Primary Proxy: {}", args.primary_proxy_url);
        info!("Fallback Proxy: {}", args.fallback_proxy_url);
    }
    info!("Flight Timeout: {}ms", args.flight_timeout_ms);
    info!("-------------------------");

    let mut planner = build_planner(&args)?;
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    session::run_session(&mut planner, stdin, stdout).await
}
