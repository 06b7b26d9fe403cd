use serde_json::Value as JsonValue;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TravelError {
    #[error("Gemini API not initialized. Please provide an API key.")]
    UninitializedClient,

    #[error("Failed to generate content: {0}")]
    Generation(String),

    #[error(transparent)]
    FlightFetch(#[from] FlightFetchError),

    #[error("Credential store error: {0}")]
    Credentials(String),

    #[error("Invalid trip request: {0}")]
    InvalidTrip(String),

    #[error("Action not available while {0}")]
    InvalidState(&'static str),
}

#[derive(Debug, Error)]
pub enum FlightFetchError {
    #[error("SerpAPI error: {0}")]
    Provider(JsonValue),

    #[error("All flight proxy strategies failed: {}", join_failures(.0))]
    Exhausted(Vec<StrategyFailure>),

    #[error("No flight proxy strategies configured")]
    NoStrategies,
}

impl FlightFetchError {
    /// The failure that ended the fetch, i.e. the last strategy tried.
    pub fn final_failure(&self) -> Option<&StrategyFailure> {
        match self {
            FlightFetchError::Exhausted(failures) => failures.last(),
            _ => None,
        }
    }
}

fn join_failures(failures: &[StrategyFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy: String,
    pub kind: StrategyFailureKind,
}

impl fmt::Display for StrategyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.strategy, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyFailureKind {
    Timeout(Duration),
    Status(u16),
    Transport(String),
    Decode(String),
}

impl fmt::Display for StrategyFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyFailureKind::Timeout(d) =>
                write!(f, "Request timed out after {}ms", d.as_millis()),
            StrategyFailureKind::Status(code) => write!(f, "HTTP error! status: {}", code),
            StrategyFailureKind::Transport(msg) => write!(f, "transport error: {}", msg),
            StrategyFailureKind::Decode(msg) => write!(f, "invalid response body: {}", msg),
        }
    }
}
