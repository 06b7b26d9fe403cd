use log::{ error, info, warn };
use std::sync::Arc;

use crate::config::credentials::{ CredentialStore, Credentials };
use crate::config::prompt::PromptConfig;
use crate::error::{ FlightFetchError, StrategyFailureKind, TravelError };
use crate::flights::airport::resolve_airport_code;
use crate::flights::mock::mock_flight_data;
use crate::flights::{ FlightSearch, FlightSource };
use crate::itinerary::ItineraryGenerator;
use crate::llm::chat::ChatClientFactory;
use crate::llm::LlmConfig;
use crate::models::chat::ChatTranscript;
use crate::models::flight::FlightQuoteSet;
use crate::models::travel::TripRequest;

const GENERATION_FAILED: &str =
    "Failed to generate travel plan. Please check your API key and try again.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Short user-facing message, shown once and then discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn info(title: &str, description: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, title: title.to_string(), description: description.into() }
    }

    fn error(title: &str, description: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, title: title.to_string(), description: description.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightDataSource {
    Live,
    Mock,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FlightPanel {
    pub quotes: FlightQuoteSet,
    pub source: FlightDataSource,
}

impl FlightPanel {
    fn mock() -> Self {
        Self { quotes: mock_flight_data(), source: FlightDataSource::Mock }
    }
}

#[derive(Clone, Debug)]
pub struct TripResult {
    pub trip: TripRequest,
    pub itinerary: String,
    pub flights: Option<FlightPanel>,
    pub transcript: ChatTranscript,
}

#[derive(Clone, Debug)]
pub enum PlannerState {
    AwaitingCredentials,
    AwaitingTripInput,
    GeneratingItinerary {
        trip: TripRequest,
    },
    FetchingFlights {
        trip: TripRequest,
        itinerary: String,
    },
    DisplayingResult(TripResult),
}

impl PlannerState {
    pub fn label(&self) -> &'static str {
        match self {
            PlannerState::AwaitingCredentials => "awaiting credentials",
            PlannerState::AwaitingTripInput => "awaiting trip input",
            PlannerState::GeneratingItinerary { .. } => "generating itinerary",
            PlannerState::FetchingFlights { .. } => "fetching flights",
            PlannerState::DisplayingResult(_) => "displaying result",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlightErrorKind {
    AccessDenied,
    RateLimited,
    Cors,
    Other,
}

impl FlightErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            FlightErrorKind::AccessDenied =>
                "Access denied by SerpAPI. Check your API key or SerpAPI subscription.",
            FlightErrorKind::RateLimited => "SerpAPI rate limit exceeded. Try again later.",
            FlightErrorKind::Cors => "CORS error when accessing SerpAPI. Using mock data instead.",
            FlightErrorKind::Other => "Could not load flight data. Using mock data instead.",
        }
    }
}

/// Classifies the failure that ended a flight fetch. Status codes decide
/// first. Message text is only read from transport and provider failures:
/// decode and timeout messages carry positions and durations, not causes.
pub fn classify_flight_error(err: &FlightFetchError) -> FlightErrorKind {
    match err {
        FlightFetchError::Provider(payload) => classify_message(&payload.to_string()),
        FlightFetchError::Exhausted(_) =>
            match err.final_failure().map(|f| &f.kind) {
                Some(StrategyFailureKind::Status(403)) => FlightErrorKind::AccessDenied,
                Some(StrategyFailureKind::Status(429)) => FlightErrorKind::RateLimited,
                Some(StrategyFailureKind::Transport(message)) => classify_message(message),
                _ => FlightErrorKind::Other,
            }
        FlightFetchError::NoStrategies => FlightErrorKind::Other,
    }
}

fn classify_message(message: &str) -> FlightErrorKind {
    if message.contains("403") {
        FlightErrorKind::AccessDenied
    } else if message.contains("429") {
        FlightErrorKind::RateLimited
    } else if message.to_ascii_uppercase().contains("CORS") {
        FlightErrorKind::Cors
    } else {
        FlightErrorKind::Other
    }
}

/// Drives one planning session: credentials → trip → itinerary → flights → chat.
pub struct TripPlanner {
    state: PlannerState,
    credentials: Credentials,
    credential_store: Arc<dyn CredentialStore>,
    client_factory: ChatClientFactory,
    llm_config: LlmConfig,
    prompt_config: Arc<PromptConfig>,
    generator: ItineraryGenerator,
    flight_source: Arc<dyn FlightSource>,
    notices: Vec<Notice>,
    error_banner: Option<String>,
}

impl TripPlanner {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        client_factory: ChatClientFactory,
        llm_config: LlmConfig,
        prompt_config: Arc<PromptConfig>,
        flight_source: Arc<dyn FlightSource>
    ) -> Self {
        let generator = ItineraryGenerator::uninitialized(prompt_config.clone());
        Self {
            state: PlannerState::AwaitingCredentials,
            credentials: Credentials::default(),
            credential_store,
            client_factory,
            llm_config,
            prompt_config,
            generator,
            flight_source,
            notices: Vec::new(),
            error_banner: None,
        }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn result(&self) -> Option<&TripResult> {
        match &self.state {
            PlannerState::DisplayingResult(result) => Some(result),
            _ => None,
        }
    }

    /// Reads stored keys once at startup.
    pub fn load_credentials(&mut self) -> Result<(), TravelError> {
        let credentials = self.credential_store.load()?;
        info!(
            "Loaded stored API keys (gemini: {}, serpapi: {})",
            credentials.has_gemini_key(),
            credentials.serp_key().is_some()
        );
        if credentials.has_gemini_key() {
            if let Err(e) = self.init_generator(&credentials) {
                error!("Error initializing Gemini API: {}", e);
            }
        }
        self.credentials = credentials;
        self.refresh_entry_state();
        Ok(())
    }

    pub fn save_credentials(
        &mut self,
        gemini_api_key: &str,
        serp_api_key: Option<&str>
    ) -> Result<(), TravelError> {
        let updated = self.credentials.updated(gemini_api_key, serp_api_key);
        if !updated.has_gemini_key() {
            self.notices.push(Notice::error("Error", "A Gemini API key is required."));
            return Err(TravelError::UninitializedClient);
        }
        if let Err(e) = self.init_generator(&updated) {
            self.notices.push(
                Notice::error("Error", "Could not initialize the Gemini API with the provided key.")
            );
            return Err(e);
        }
        if let Err(e) = self.credential_store.save(&updated) {
            error!("Error saving API keys: {}", e);
            self.notices.push(Notice::error("Error", e.to_string()));
            return Err(e);
        }
        self.credentials = updated;
        self.notices.push(Notice::info("API keys saved", "Your API keys have been saved locally."));
        self.refresh_entry_state();
        Ok(())
    }

    fn init_generator(&mut self, credentials: &Credentials) -> Result<(), TravelError> {
        let config = self.llm_config.with_api_key(&credentials.gemini_api_key);
        let client = (self.client_factory)(&config).map_err(|e|
            TravelError::Generation(e.to_string())
        )?;
        self.generator = ItineraryGenerator::new(Some(client), self.prompt_config.clone());
        Ok(())
    }

    fn refresh_entry_state(&mut self) {
        let ready = self.credentials.has_gemini_key() && self.generator.is_initialized();
        match self.state {
            PlannerState::AwaitingCredentials if ready => {
                self.state = PlannerState::AwaitingTripInput;
            }
            PlannerState::AwaitingTripInput if !ready => {
                self.state = PlannerState::AwaitingCredentials;
            }
            _ => {}
        }
    }

    pub async fn submit_trip(&mut self, trip: TripRequest) -> Result<(), TravelError> {
        match self.state {
            PlannerState::AwaitingTripInput => {}
            PlannerState::AwaitingCredentials => {
                return Err(TravelError::UninitializedClient);
            }
            ref other => {
                return Err(TravelError::InvalidState(other.label()));
            }
        }
        self.error_banner = None;
        self.state = PlannerState::GeneratingItinerary { trip: trip.clone() };

        let itinerary = match self.generator.generate(&trip).await {
            Ok(text) => text,
            Err(e) => {
                error!("Error generating travel plan: {}", e);
                self.error_banner = Some(GENERATION_FAILED.to_string());
                self.notices.push(Notice::error("Error", GENERATION_FAILED));
                self.state = PlannerState::AwaitingTripInput;
                return Err(e);
            }
        };

        let flights = if trip.include_transportation {
            self.state = PlannerState::FetchingFlights {
                trip: trip.clone(),
                itinerary: itinerary.clone(),
            };
            Some(self.load_flights(&trip).await)
        } else {
            None
        };

        self.state = PlannerState::DisplayingResult(TripResult {
            trip,
            itinerary,
            flights,
            transcript: ChatTranscript::new(),
        });
        Ok(())
    }

    /// Never fails: every problem ends in the mock set plus a notice.
    async fn load_flights(&mut self, trip: &TripRequest) -> FlightPanel {
        let api_key = match self.credentials.serp_key() {
            Some(key) => key.to_string(),
            None => {
                self.notices.push(
                    Notice::info("Using mock flight data", "Add a SerpAPI key to fetch real flight data.")
                );
                return FlightPanel::mock();
            }
        };

        let (departure, arrival) = match
            (resolve_airport_code(&trip.source), resolve_airport_code(&trip.destination))
        {
            (Some(departure), Some(arrival)) => (departure, arrival),
            _ => {
                warn!(
                    "No airport code in '{}' or '{}', skipping flight search",
                    trip.source,
                    trip.destination
                );
                self.notices.push(
                    Notice::error(
                        "Airport code needed",
                        "Enter locations as \"City (XXX)\" or a 3-letter airport code to fetch real flights. Using mock data instead."
                    )
                );
                return FlightPanel::mock();
            }
        };

        self.notices.push(
            Notice::info("Fetching flight data", "Getting real flight information for your trip...")
        );
        let search = FlightSearch {
            departure,
            arrival,
            date: trip.start_date,
            api_key,
        };
        match self.flight_source.fetch_flights(&search).await {
            Ok(quotes) => {
                self.notices.push(
                    Notice::info("Success", "Real flight data has been loaded successfully.")
                );
                FlightPanel { quotes, source: FlightDataSource::Live }
            }
            Err(e) => {
                error!("Error fetching flight data: {}", e);
                let kind = classify_flight_error(&e);
                self.notices.push(Notice::error("Error fetching flights", kind.message()));
                FlightPanel::mock()
            }
        }
    }

    /// Asks a follow-up question about the current itinerary. On failure the
    /// transcript is left exactly as it was.
    pub async fn ask(&mut self, question: &str) -> Result<String, TravelError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(TravelError::InvalidState("the question is empty"));
        }
        let itinerary = match &self.state {
            PlannerState::DisplayingResult(result) if !result.itinerary.trim().is_empty() =>
                result.itinerary.clone(),
            other => {
                return Err(TravelError::InvalidState(other.label()));
            }
        };

        match self.generator.answer_follow_up(question, &itinerary).await {
            Ok(answer) => {
                if let PlannerState::DisplayingResult(result) = &mut self.state {
                    result.transcript.push_exchange(question, &answer);
                }
                Ok(answer)
            }
            Err(e) => {
                error!("Error sending follow-up question: {}", e);
                self.notices.push(
                    Notice::error("Error", "Failed to get a response. Please try again.")
                );
                Err(e)
            }
        }
    }

    pub fn start_over(&mut self) -> Result<(), TravelError> {
        match self.state {
            PlannerState::DisplayingResult(_) => {
                info!("Starting over, clearing itinerary and flight data");
                self.state = PlannerState::AwaitingTripInput;
                self.error_banner = None;
                self.refresh_entry_state();
                Ok(())
            }
            ref other => Err(TravelError::InvalidState(other.label())),
        }
    }
}
