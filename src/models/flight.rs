use serde::{ Deserialize, Serialize };

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightQuoteSet {
    #[serde(default)]
    pub best_flights: Vec<FlightQuote>,
}

impl FlightQuoteSet {
    pub fn prices(&self) -> Vec<u32> {
        self.best_flights.iter().map(|q| q.price).collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightQuote {
    pub flights: Vec<FlightSegment>,
    #[serde(default)]
    pub layovers: Vec<Layover>,
    pub total_duration: u32,
    pub price: u32,
    pub booking_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbon_emissions: Option<CarbonEmissions>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub trip_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_logo: Option<String>,
}

impl FlightQuote {
    /// Every gap between two consecutive segments must have a layover entry.
    pub fn is_consistent(&self) -> bool {
        !self.flights.is_empty() && self.flights.len() - 1 == self.layovers.len()
    }

    pub fn stops(&self) -> usize {
        self.flights.len().saturating_sub(1)
    }

    pub fn first_segment(&self) -> Option<&FlightSegment> {
        self.flights.first()
    }

    pub fn last_segment(&self) -> Option<&FlightSegment> {
        self.flights.last()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub departure_airport: Airport,
    pub arrival_airport: Airport,
    pub duration: u32,
    pub airline: String,
    pub flight_number: String,
    pub travel_class: String,
    #[serde(default)]
    pub extensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airplane: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legroom: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline_logo: Option<String>,
    #[serde(default)]
    pub overnight: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airport {
    pub id: String,
    pub name: String,
    pub time: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layover {
    pub duration: u32,
    pub name: String,
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonEmissions {
    pub this_flight: u64,
    pub typical_for_this_route: u64,
    pub difference_percent: i32,
}
