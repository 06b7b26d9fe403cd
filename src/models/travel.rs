use chrono::NaiveDate;
use serde::{ Deserialize, Serialize };

use crate::error::TravelError;

pub const MAX_INTERESTS: usize = 5;

pub const INTEREST_OPTIONS: [&str; 13] = [
    "Adventure",
    "Art",
    "Beach",
    "Culture",
    "Food",
    "History",
    "Music",
    "Nature",
    "Nightlife",
    "Relaxation",
    "Shopping",
    "Sports",
    "Wildlife",
];

/// Up to five unique, non-blank interests in the order they were picked.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Interests(Vec<String>);

impl Interests {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns false when the interest was rejected (blank, duplicate or full).
    pub fn add(&mut self, interest: &str) -> bool {
        let interest = interest.trim();
        if interest.is_empty() || self.is_full() || self.contains(interest) {
            return false;
        }
        self.0.push(interest.to_string());
        true
    }

    pub fn remove(&mut self, interest: &str) {
        self.0.retain(|i| i != interest);
    }

    pub fn contains(&self, interest: &str) -> bool {
        self.0.iter().any(|i| i == interest)
    }

    pub fn is_full(&self) -> bool {
        self.0.len() >= MAX_INTERESTS
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl TryFrom<Vec<String>> for Interests {
    type Error = String;

    fn try_from(values: Vec<String>) -> Result<Self, Self::Error> {
        let mut interests = Interests::new();
        for value in &values {
            if !interests.add(value) {
                return Err(format!("Interest '{}' is blank, duplicated or over the limit of {}", value, MAX_INTERESTS));
            }
        }
        Ok(interests)
    }
}

impl From<Interests> for Vec<String> {
    fn from(interests: Interests) -> Self {
        interests.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripRequest {
    pub source: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: String,
    pub travelers: u32,
    pub interests: Interests,
    pub include_transportation: bool,
}

impl TripRequest {
    pub fn builder(source: &str, destination: &str) -> TripRequestBuilder {
        TripRequestBuilder {
            source: source.trim().to_string(),
            destination: destination.trim().to_string(),
            start_date: None,
            end_date: None,
            budget: String::new(),
            travelers: 1,
            interests: Interests::new(),
            include_transportation: false,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TripRequestBuilder {
    source: String,
    destination: String,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    budget: String,
    travelers: u32,
    interests: Interests,
    include_transportation: bool,
}

impl TripRequestBuilder {
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn budget(mut self, budget: &str) -> Self {
        self.budget = budget.trim().to_string();
        self
    }

    pub fn travelers(mut self, travelers: u32) -> Self {
        self.travelers = travelers;
        self
    }

    pub fn interest(mut self, interest: &str) -> Self {
        self.interests.add(interest);
        self
    }

    pub fn interests(mut self, interests: Interests) -> Self {
        self.interests = interests;
        self
    }

    pub fn include_transportation(mut self, include: bool) -> Self {
        self.include_transportation = include;
        self
    }

    pub fn build(self) -> Result<TripRequest, TravelError> {
        if self.source.is_empty() {
            return Err(TravelError::InvalidTrip("departure location is required".into()));
        }
        if self.destination.is_empty() {
            return Err(TravelError::InvalidTrip("destination is required".into()));
        }
        let (start_date, end_date) = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => {
                return Err(TravelError::InvalidTrip("travel dates are required".into()));
            }
        };
        if end_date < start_date {
            return Err(
                TravelError::InvalidTrip(
                    format!("end date {} is before start date {}", end_date, start_date)
                )
            );
        }
        Ok(TripRequest {
            source: self.source,
            destination: self.destination,
            start_date,
            end_date,
            budget: self.budget,
            // the form coerces anything below one traveler back to one
            travelers: self.travelers.max(1),
            interests: self.interests,
            include_transportation: self.include_transportation,
        })
    }
}

pub fn parse_trip_date(value: &str) -> Result<NaiveDate, TravelError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e|
        TravelError::InvalidTrip(format!("'{}' is not a YYYY-MM-DD date: {}", value.trim(), e))
    )
}
