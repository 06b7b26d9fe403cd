mod common;

use common::{
    credentials,
    live_quotes,
    planner_with,
    scripted_factory,
    spawn_proxy,
    trip,
    CountingFlightSource,
    ProxyBehavior,
    ScriptedChatClient,
};
use std::sync::Arc;
use std::time::Duration;

use wanderlust::config::credentials::{ CredentialStore, Credentials, MemoryCredentialStore };
use wanderlust::config::prompt::PromptConfig;
use wanderlust::error::{ FlightFetchError, TravelError };
use wanderlust::flights::proxy::{ AllOriginsProxy, CorsAnywhereProxy, ProxyStrategy };
use wanderlust::flights::FlightFetcher;
use wanderlust::llm::LlmConfig;
use wanderlust::models::chat::Speaker;
use wanderlust::models::travel::{ parse_trip_date, TripRequest };
use wanderlust::planner::{
    FlightDataSource,
    FlightErrorKind,
    NoticeLevel,
    PlannerState,
    TripPlanner,
};

const ITINERARY: &str = "# Hanoi Trip\n## Day 1\n* Old Quarter walk";

#[tokio::test]
async fn missing_gemini_key_waits_for_credentials() {
    let chat = ScriptedChatClient::new(vec![]);
    let (factory, log) = scripted_factory(chat);
    let store = Arc::new(MemoryCredentialStore::default());
    let mut planner = TripPlanner::new(
        store.clone(),
        factory,
        LlmConfig::default(),
        Arc::new(PromptConfig::default()),
        CountingFlightSource::returning(Ok(live_quotes()))
    );
    planner.load_credentials().unwrap();
    assert!(matches!(planner.state(), PlannerState::AwaitingCredentials));

    let err = planner.submit_trip(trip(false)).await.unwrap_err();
    assert!(matches!(err, TravelError::UninitializedClient));

    assert!(planner.save_credentials("   ", Some("serp")).is_err());
    assert!(matches!(planner.state(), PlannerState::AwaitingCredentials));

    planner.save_credentials("gemini-fresh", Some("serp-fresh")).unwrap();
    assert!(matches!(planner.state(), PlannerState::AwaitingTripInput));
    assert_eq!(log.api_keys.lock().unwrap().last().cloned().flatten().as_deref(), Some("gemini-fresh"));

    let stored = store.load().unwrap();
    assert_eq!(stored.gemini_api_key, "gemini-fresh");
    assert_eq!(stored.serp_key(), Some("serp-fresh"));
    let notices = planner.take_notices();
    assert!(notices.iter().any(|n| n.title == "API keys saved"));
}

#[tokio::test]
async fn itinerary_only_trip_skips_flights() {
    let chat = ScriptedChatClient::new(vec![Ok(ITINERARY)]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(Some("serp")), chat.clone(), flights.clone());

    planner.submit_trip(trip(false)).await.unwrap();

    let result = planner.result().unwrap();
    assert_eq!(result.itinerary, ITINERARY);
    assert!(result.flights.is_none());
    assert!(result.transcript.is_empty());
    assert_eq!(flights.calls(), 0);

    let prompt = chat.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Trip from DEL to HAN"));
    assert!(prompt.contains("Budget: $1500"));
    assert!(prompt.contains("Interests: Food"));
}

#[tokio::test]
async fn without_serp_key_flights_come_from_mock_data() {
    let chat = ScriptedChatClient::new(vec![Ok(ITINERARY)]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(None), chat, flights.clone());

    planner.submit_trip(trip(true)).await.unwrap();

    let panel = planner.result().unwrap().flights.clone().unwrap();
    assert_eq!(panel.source, FlightDataSource::Mock);
    assert_eq!(panel.quotes.prices(), vec![289, 384, 417]);
    assert_eq!(flights.calls(), 0);
    let notices = planner.take_notices();
    assert!(notices.iter().any(|n| n.title == "Using mock flight data"));
}

#[tokio::test]
async fn live_flights_are_shown_when_the_search_succeeds() {
    let chat = ScriptedChatClient::new(vec![Ok(ITINERARY)]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(Some("serp-live")), chat, flights.clone());

    planner.submit_trip(trip(true)).await.unwrap();

    let panel = planner.result().unwrap().flights.clone().unwrap();
    assert_eq!(panel.source, FlightDataSource::Live);
    assert_eq!(panel.quotes.prices(), vec![310]);

    let searches = flights.searches.lock().unwrap();
    assert_eq!(searches.len(), 1);
    assert_eq!(searches[0].departure.to_string(), "DEL");
    assert_eq!(searches[0].arrival.to_string(), "HAN");
    assert_eq!(searches[0].date, parse_trip_date("2025-04-15").unwrap());
    assert_eq!(searches[0].api_key, "serp-live");
}

#[tokio::test]
async fn city_names_with_codes_are_searched() {
    let chat = ScriptedChatClient::new(vec![Ok(ITINERARY)]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(Some("serp")), chat, flights.clone());

    let request = TripRequest::builder("New Delhi (del)", "Hanoi (HAN)")
        .dates(parse_trip_date("2025-04-15").unwrap(), parse_trip_date("2025-04-20").unwrap())
        .include_transportation(true)
        .build()
        .unwrap();
    planner.submit_trip(request).await.unwrap();

    let searches = flights.searches.lock().unwrap();
    assert_eq!(searches[0].departure.to_string(), "DEL");
    assert_eq!(searches[0].arrival.to_string(), "HAN");
}

#[tokio::test]
async fn unresolvable_locations_fall_back_to_mock_data() {
    let chat = ScriptedChatClient::new(vec![Ok(ITINERARY)]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(Some("serp")), chat, flights.clone());

    let request = TripRequest::builder("New Delhi", "Hanoi")
        .dates(parse_trip_date("2025-04-15").unwrap(), parse_trip_date("2025-04-20").unwrap())
        .include_transportation(true)
        .build()
        .unwrap();
    planner.submit_trip(request).await.unwrap();

    let panel = planner.result().unwrap().flights.clone().unwrap();
    assert_eq!(panel.source, FlightDataSource::Mock);
    assert_eq!(flights.calls(), 0);
    let notices = planner.take_notices();
    assert!(notices.iter().any(|n| n.title == "Airport code needed" && n.level == NoticeLevel::Error));
}

#[tokio::test]
async fn forbidden_proxies_show_access_denied_and_mock_data() {
    let primary = spawn_proxy(ProxyBehavior::Status(403)).await;
    let fallback = spawn_proxy(ProxyBehavior::Status(403)).await;
    let strategies: Vec<Arc<dyn ProxyStrategy>> = vec![
        Arc::new(CorsAnywhereProxy::new(format!("{}/", primary.base_url))),
        Arc::new(AllOriginsProxy::new(format!("{}/raw?url=", fallback.base_url)))
    ];
    let fetcher = FlightFetcher::new(
        "http://flights.test/search.json",
        strategies,
        Duration::from_secs(5)
    ).unwrap();

    let chat = ScriptedChatClient::new(vec![Ok(ITINERARY)]);
    let mut planner = planner_with(credentials(Some("serp")), chat, Arc::new(fetcher));
    planner.submit_trip(trip(true)).await.unwrap();

    let panel = planner.result().unwrap().flights.clone().unwrap();
    assert_eq!(panel.source, FlightDataSource::Mock);
    assert_eq!(panel.quotes.prices(), vec![289, 384, 417]);
    assert_eq!(primary.hits().len(), 1);
    assert_eq!(fallback.hits().len(), 1);

    let notices = planner.take_notices();
    let failure = notices
        .iter()
        .find(|n| n.title == "Error fetching flights")
        .unwrap();
    assert_eq!(failure.description, FlightErrorKind::AccessDenied.message());
}

#[tokio::test]
async fn failed_search_still_reaches_the_result() {
    let chat = ScriptedChatClient::new(vec![Ok(ITINERARY)]);
    let flights = CountingFlightSource::returning(Err(FlightFetchError::NoStrategies));
    let mut planner = planner_with(credentials(Some("serp")), chat, flights);

    planner.submit_trip(trip(true)).await.unwrap();

    let result = planner.result().unwrap();
    assert_eq!(result.itinerary, ITINERARY);
    assert_eq!(result.flights.as_ref().unwrap().source, FlightDataSource::Mock);
}

#[tokio::test]
async fn generation_failure_returns_to_the_form() {
    let chat = ScriptedChatClient::new(vec![Err("quota exceeded")]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(Some("serp")), chat, flights.clone());

    let err = planner.submit_trip(trip(true)).await.unwrap_err();
    assert!(matches!(err, TravelError::Generation(msg) if msg.contains("quota exceeded")));
    assert!(matches!(planner.state(), PlannerState::AwaitingTripInput));
    assert_eq!(
        planner.error_banner(),
        Some("Failed to generate travel plan. Please check your API key and try again.")
    );
    assert_eq!(flights.calls(), 0);
    assert!(planner.result().is_none());
}

#[tokio::test]
async fn follow_ups_grow_the_transcript_only_on_success() {
    let chat = ScriptedChatClient::new(
        vec![Ok(ITINERARY), Ok("Pack light layers."), Ok("Tip about 5-10%."), Err("network down")]
    );
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(None), chat.clone(), flights);
    planner.submit_trip(trip(false)).await.unwrap();

    assert_eq!(planner.ask("What should I pack?").await.unwrap(), "Pack light layers.");
    assert_eq!(planner.ask("  Tipping?  ").await.unwrap(), "Tip about 5-10%.");
    assert!(planner.ask("Visa rules?").await.is_err());
    assert!(planner.ask("   ").await.is_err());

    let transcript = &planner.result().unwrap().transcript;
    assert_eq!(transcript.len(), 4);
    let messages = transcript.messages();
    assert_eq!(messages[0].speaker, Speaker::User);
    assert_eq!(messages[2].text, "Tipping?");
    assert_eq!(messages[3].speaker, Speaker::Assistant);

    // the follow-up prompt carries the itinerary and the question
    let prompts = chat.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[1].contains(ITINERARY));
    assert!(prompts[1].contains("\"What should I pack?\""));

    let notices = planner.take_notices();
    assert!(notices.iter().any(|n| n.description == "Failed to get a response. Please try again."));
}

#[tokio::test]
async fn questions_need_a_result() {
    let chat = ScriptedChatClient::new(vec![Ok("unused")]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(None), chat.clone(), flights);

    assert!(matches!(planner.ask("Anything?").await, Err(TravelError::InvalidState(_))));
    assert_eq!(chat.calls(), 0);
}

#[tokio::test]
async fn start_over_keeps_credentials() {
    let chat = ScriptedChatClient::new(vec![Ok(ITINERARY), Ok("Sure."), Ok("# Second plan")]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(Some("serp")), chat, flights);

    planner.submit_trip(trip(false)).await.unwrap();
    planner.ask("Is it rainy?").await.unwrap();
    assert!(planner.start_over().is_ok());

    assert!(matches!(planner.state(), PlannerState::AwaitingTripInput));
    assert!(planner.result().is_none());
    assert_eq!(planner.credentials().gemini_api_key, "gemini-test-key");
    assert_eq!(planner.credentials().serp_key(), Some("serp"));
    assert!(planner.start_over().is_err());

    planner.submit_trip(trip(false)).await.unwrap();
    let result = planner.result().unwrap();
    assert_eq!(result.itinerary, "# Second plan");
    assert!(result.transcript.is_empty());
}

#[tokio::test]
async fn blank_serp_key_on_update_keeps_the_stored_one() {
    let chat = ScriptedChatClient::new(vec![]);
    let flights = CountingFlightSource::returning(Ok(live_quotes()));
    let mut planner = planner_with(credentials(Some("serp-old")), chat, flights);

    planner.save_credentials("gemini-new", Some("")).unwrap();
    let expected = Credentials {
        gemini_api_key: "gemini-new".to_string(),
        serp_api_key: Some("serp-old".to_string()),
    };
    assert_eq!(planner.credentials().gemini_api_key, expected.gemini_api_key);
    assert_eq!(planner.credentials().serp_key(), expected.serp_key());
}
