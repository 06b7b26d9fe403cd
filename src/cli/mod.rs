use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Wanderlust AI travel planner", long_about = None)]
pub struct Args {
    // --- Credential Store Args ---
    /// Path of the JSON file holding the Gemini and SerpAPI keys. Defaults to the user config directory.
    #[arg(long, env = "WANDERLUST_CREDENTIALS")]
    pub credentials_path: Option<String>,

    // --- Chat LLM Provider Args ---
    /// Gemini model used for itineraries and follow-up answers
    #[arg(long, env = "CHAT_MODEL", default_value = "gemini-1.5-flash")]
    pub chat_model: String,

    /// Base URL override for the Gemini API
    #[arg(long, env = "CHAT_BASE_URL")] // No default, let the backend pick its endpoint
    pub chat_base_url: Option<String>,

    /// Path to a JSON file overriding the built-in prompt templates.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    // --- Flight Search Args ---
    /// SerpAPI search endpoint
    #[arg(long, env = "FLIGHT_SEARCH_URL", default_value = "https://serpapi.com/search.json")]
    pub flight_search_url: String,

    /// First proxy tried; the search URL is appended to it as-is.
    #[arg(long, env = "PRIMARY_PROXY_URL", default_value = "https://cors-anywhere.herokuapp.com/")]
    pub primary_proxy_url: String,

    /// Second proxy tried; the search URL is appended percent-encoded.
    #[arg(long, env = "FALLBACK_PROXY_URL", default_value = "https://api.allorigins.win/raw?url=")]
    pub fallback_proxy_url: String,

    /// Call the flight search endpoint directly instead of going through the proxies
    #[arg(long, env = "DIRECT_FLIGHT_SEARCH", default_value = "false")]
    pub direct_flight_search: bool,

    /// Time limit for each flight search attempt, in milliseconds
    #[arg(long, env = "FLIGHT_TIMEOUT_MS", default_value = "10000")]
    pub flight_timeout_ms: u64,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    /// Filter used when RUST_LOG is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_public_services() {
        let args = Args::try_parse_from(["wanderlust"]).unwrap();
        assert_eq!(args.chat_model, "gemini-1.5-flash");
        assert_eq!(args.flight_timeout_ms, 10_000);
        assert_eq!(args.primary_proxy_url, "https://cors-anywhere.herokuapp.com/");
        assert_eq!(args.fallback_proxy_url, "https://api.allorigins.win/raw?url=");
        assert!(!args.direct_flight_search);
        assert_eq!(args.default_log_filter(), "info");
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from([
            "wanderlust",
            "--flight-timeout-ms",
            "2500",
            "--direct-flight-search",
            "--credentials-path",
            "/tmp/keys.json",
            "--debug",
        ]).unwrap();
        assert_eq!(args.default_log_filter(), "debug");
        assert_eq!(args.flight_timeout_ms, 2500);
        assert!(args.direct_flight_search);
        assert_eq!(args.credentials_path.as_deref(), Some("/tmp/keys.json"));
    }
}
