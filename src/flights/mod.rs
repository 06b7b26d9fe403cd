pub mod airport;
pub mod mock;
pub mod proxy;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{ info, warn };
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use self::airport::AirportCode;
use self::proxy::{ AllOriginsProxy, CorsAnywhereProxy, ProxyStrategy };
use crate::error::{ FlightFetchError, StrategyFailure, StrategyFailureKind };
use crate::models::flight::{ FlightQuote, FlightQuoteSet };

pub const DEFAULT_FLIGHT_SEARCH_URL: &str = "https://serpapi.com/search.json";
pub const DEFAULT_FLIGHT_TIMEOUT: Duration = Duration::from_millis(10_000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlightSearch {
    pub departure: AirportCode,
    pub arrival: AirportCode,
    pub date: NaiveDate,
    pub api_key: String,
}

#[async_trait]
pub trait FlightSource: Send + Sync {
    async fn fetch_flights(&self, search: &FlightSearch) -> Result<FlightQuoteSet, FlightFetchError>;
}

/// One-way Google Flights query in USD, English results.
pub fn build_target_url(endpoint: &Url, search: &FlightSearch) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("engine", "google_flights")
        .append_pair("type", "2")
        .append_pair("departure_id", search.departure.as_str())
        .append_pair("arrival_id", search.arrival.as_str())
        .append_pair("outbound_date", &search.date.format("%Y-%m-%d").to_string())
        .append_pair("currency", "USD")
        .append_pair("hl", "en")
        .append_pair("api_key", &search.api_key);
    url
}

fn redact_api_key(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "api_key" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), value)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

/// Tries each proxy strategy in order, each bounded by `timeout`.
pub struct FlightFetcher {
    http: HttpClient,
    endpoint: Url,
    strategies: Vec<Arc<dyn ProxyStrategy>>,
    timeout: Duration,
}

impl FlightFetcher {
    pub fn new(
        endpoint: &str,
        strategies: Vec<Arc<dyn ProxyStrategy>>,
        timeout: Duration
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let endpoint = Url::parse(endpoint).map_err(|e|
            format!("Invalid flight search URL '{}': {}", endpoint, e)
        )?;
        let http = HttpClient::builder().build()?;
        Ok(Self { http, endpoint, strategies, timeout })
    }

    pub fn with_default_proxies(
        endpoint: &str,
        timeout: Duration
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        Self::new(
            endpoint,
            vec![Arc::new(CorsAnywhereProxy::default()), Arc::new(AllOriginsProxy::default())],
            timeout
        )
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    async fn attempt(
        &self,
        strategy: &dyn ProxyStrategy,
        target: &Url
    ) -> Result<JsonValue, StrategyFailureKind> {
        let request = strategy.build_request(&self.http, target);
        // dropping the request future on expiry aborts the connection
        match tokio::time::timeout(self.timeout, send_for_json(request)).await {
            Ok(result) => result,
            Err(_) => Err(StrategyFailureKind::Timeout(self.timeout)),
        }
    }
}

async fn send_for_json(request: reqwest::RequestBuilder) -> Result<JsonValue, StrategyFailureKind> {
    let resp = request
        .send().await
        .map_err(|e| StrategyFailureKind::Transport(e.without_url().to_string()))?;
    let status = resp.status();
    if !status.is_success() {
        return Err(StrategyFailureKind::Status(status.as_u16()));
    }
    resp.json::<JsonValue>().await.map_err(|e| StrategyFailureKind::Decode(e.without_url().to_string()))
}

#[derive(Deserialize)]
struct RawQuoteSet {
    #[serde(default)]
    best_flights: Vec<JsonValue>,
}

/// Decodes quotes one by one so a single malformed entry does not cost the
/// rest of the response. Fails only when `best_flights` itself is unusable.
fn decode_quotes(body: JsonValue) -> Result<FlightQuoteSet, serde_json::Error> {
    let raw: RawQuoteSet = serde_json::from_value(body)?;
    let mut best_flights = Vec::with_capacity(raw.best_flights.len());
    for quote in raw.best_flights {
        match serde_json::from_value::<FlightQuote>(quote) {
            Ok(quote) => best_flights.push(quote),
            Err(e) => warn!("Dropped unreadable flight quote: {}", e),
        }
    }
    Ok(FlightQuoteSet { best_flights })
}

/// Keeps only quotes whose layovers line up with their segments.
fn normalize_quotes(mut set: FlightQuoteSet) -> FlightQuoteSet {
    let before = set.best_flights.len();
    set.best_flights.retain(|q| q.is_consistent());
    let dropped = before - set.best_flights.len();
    if dropped > 0 {
        warn!("Dropped {} flight quote(s) with mismatched segments and layovers", dropped);
    }
    set
}

#[async_trait]
impl FlightSource for FlightFetcher {
    async fn fetch_flights(&self, search: &FlightSearch) -> Result<FlightQuoteSet, FlightFetchError> {
        if self.strategies.is_empty() {
            return Err(FlightFetchError::NoStrategies);
        }
        let target = build_target_url(&self.endpoint, search);
        info!(
            "Fetching flight data for {} to {} on {} via {}",
            search.departure,
            search.arrival,
            search.date,
            redact_api_key(&target)
        );

        let mut failures = Vec::new();
        for strategy in &self.strategies {
            let kind = match self.attempt(strategy.as_ref(), &target).await {
                Ok(body) => {
                    if let Some(provider_error) = body.get("error").filter(|e| !e.is_null()) {
                        warn!("SerpAPI reported an error through {}: {}", strategy.name(), provider_error);
                        return Err(FlightFetchError::Provider(provider_error.clone()));
                    }
                    match decode_quotes(body) {
                        Ok(set) => {
                            info!(
                                "Loaded {} flight quote(s) through {}",
                                set.best_flights.len(),
                                strategy.name()
                            );
                            return Ok(normalize_quotes(set));
                        }
                        Err(e) => StrategyFailureKind::Decode(e.to_string()),
                    }
                }
                Err(kind) => kind,
            };
            warn!("{} proxy method failed ({}), trying next strategy", strategy.name(), kind);
            failures.push(StrategyFailure {
                strategy: strategy.name().to_string(),
                kind,
            });
        }

        Err(FlightFetchError::Exhausted(failures))
    }
}
