use once_cell::sync::Lazy;

use crate::models::flight::FlightQuoteSet;

static MOCK_FLIGHTS: Lazy<FlightQuoteSet> = Lazy::new(|| {
    serde_json
        ::from_str(include_str!("mock_flights.json"))
        .expect("bundled mock flight data is valid")
});

/// Sample DEL → HAN quotes shown whenever live flight data is unavailable.
pub fn mock_flight_data() -> FlightQuoteSet {
    MOCK_FLIGHTS.clone()
}
