#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{ HeaderMap, StatusCode, Uri };
use axum::response::{ IntoResponse, Response };
use axum::{ Json, Router };
use serde_json::{ json, Value };
use std::collections::VecDeque;
use std::error::Error as StdError;
use std::sync::{ Arc, Mutex };
use std::time::Duration;

use wanderlust::config::credentials::{ Credentials, MemoryCredentialStore };
use wanderlust::config::prompt::PromptConfig;
use wanderlust::error::FlightFetchError;
use wanderlust::flights::{ FlightSearch, FlightSource };
use wanderlust::llm::chat::{ ChatClient, ChatClientFactory, CompletionResponse };
use wanderlust::llm::LlmConfig;
use wanderlust::models::flight::FlightQuoteSet;
use wanderlust::models::travel::{ parse_trip_date, TripRequest };
use wanderlust::planner::TripPlanner;

// --- Generative client double ---

pub struct ScriptedChatClient {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedChatClient {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect()
            ),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatClient for ScriptedChatClient {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(CompletionResponse { response: text }),
            Some(Err(msg)) => Err(msg.into()),
            None => Err("no scripted reply left".into()),
        }
    }

    fn get_model(&self) -> String {
        "scripted".to_string()
    }

    fn get_base_url(&self) -> Option<String> {
        None
    }
}

pub struct FactoryLog {
    pub api_keys: Mutex<Vec<Option<String>>>,
}

pub fn scripted_factory(client: Arc<ScriptedChatClient>) -> (ChatClientFactory, Arc<FactoryLog>) {
    let log = Arc::new(FactoryLog { api_keys: Mutex::new(Vec::new()) });
    let log_handle = log.clone();
    let factory: ChatClientFactory = Arc::new(move |config: &LlmConfig| -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
        log_handle.api_keys.lock().unwrap().push(config.api_key.clone());
        Ok(client.clone() as Arc<dyn ChatClient>)
    });
    (factory, log)
}

// --- Flight source double ---

pub struct CountingFlightSource {
    outcome: Mutex<Option<Result<FlightQuoteSet, FlightFetchError>>>,
    pub searches: Mutex<Vec<FlightSearch>>,
}

impl CountingFlightSource {
    pub fn returning(outcome: Result<FlightQuoteSet, FlightFetchError>) -> Arc<Self> {
        Arc::new(Self { outcome: Mutex::new(Some(outcome)), searches: Mutex::new(Vec::new()) })
    }

    pub fn calls(&self) -> usize {
        self.searches.lock().unwrap().len()
    }
}

#[async_trait]
impl FlightSource for CountingFlightSource {
    async fn fetch_flights(&self, search: &FlightSearch) -> Result<FlightQuoteSet, FlightFetchError> {
        self.searches.lock().unwrap().push(search.clone());
        self.outcome
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| Err(FlightFetchError::NoStrategies))
    }
}

// --- Fixtures ---

pub fn live_quote_json() -> Value {
    json!({
        "best_flights": [{
            "flights": [{
                "departure_airport": {"name": "Indira Gandhi International Airport", "id": "DEL", "time": "2025-04-15 06:00"},
                "arrival_airport": {"name": "Noi Bai International Airport", "id": "HAN", "time": "2025-04-15 12:00"},
                "duration": 240,
                "airline": "Vietnam Airlines",
                "flight_number": "VN 912",
                "travel_class": "Economy"
            }],
            "layovers": [],
            "total_duration": 240,
            "price": 310,
            "booking_token": "live-token"
        }]
    })
}

pub fn live_quotes() -> FlightQuoteSet {
    serde_json::from_value(live_quote_json()).unwrap()
}

pub fn trip(include_transportation: bool) -> TripRequest {
    TripRequest::builder("DEL", "HAN")
        .dates(parse_trip_date("2025-04-15").unwrap(), parse_trip_date("2025-04-22").unwrap())
        .budget("$1500")
        .travelers(1)
        .interest("Food")
        .include_transportation(include_transportation)
        .build()
        .unwrap()
}

pub fn credentials(serp: Option<&str>) -> Credentials {
    Credentials {
        gemini_api_key: "gemini-test-key".to_string(),
        serp_api_key: serp.map(str::to_string),
    }
}

pub fn planner_with(
    creds: Credentials,
    chat: Arc<ScriptedChatClient>,
    flights: Arc<dyn FlightSource>
) -> TripPlanner {
    let (factory, _) = scripted_factory(chat);
    let mut planner = TripPlanner::new(
        Arc::new(MemoryCredentialStore::new(creds)),
        factory,
        LlmConfig::default(),
        Arc::new(PromptConfig::default()),
        flights
    );
    planner.load_credentials().unwrap();
    planner
}

// --- Fake proxy servers ---

#[derive(Clone)]
pub enum ProxyBehavior {
    Status(u16),
    Json(Value),
    Text(&'static str),
    Delayed(Duration, Value),
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub uri: String,
    pub requested_with: Option<String>,
}

#[derive(Clone)]
struct ProxyState {
    behavior: ProxyBehavior,
    hits: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct FakeProxy {
    pub base_url: String,
    hits: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeProxy {
    pub fn hits(&self) -> Vec<RecordedRequest> {
        self.hits.lock().unwrap().clone()
    }
}

async fn proxy_handler(State(state): State<ProxyState>, uri: Uri, headers: HeaderMap) -> Response {
    state.hits.lock().unwrap().push(RecordedRequest {
        uri: uri.to_string(),
        requested_with: headers
            .get("x-requested-with")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });
    match state.behavior {
        ProxyBehavior::Status(code) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "proxy refused the request").into_response()
        }
        ProxyBehavior::Json(body) => Json(body).into_response(),
        ProxyBehavior::Text(body) => body.into_response(),
        ProxyBehavior::Delayed(delay, body) => {
            tokio::time::sleep(delay).await;
            Json(body).into_response()
        }
    }
}

pub async fn spawn_proxy(behavior: ProxyBehavior) -> FakeProxy {
    let hits = Arc::new(Mutex::new(Vec::new()));
    let state = ProxyState { behavior, hits: hits.clone() };
    let app = Router::new().fallback(proxy_handler).with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    FakeProxy { base_url: format!("http://{}", addr), hits }
}
