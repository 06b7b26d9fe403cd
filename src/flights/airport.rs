use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static PARENTHESIZED_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([A-Za-z]{3})\)").expect("airport code pattern compiles")
});

static BARE_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{3}$").expect("airport code pattern compiles")
});

/// Three-letter IATA airport code, always upper case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AirportCode(String);

impl AirportCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts "Hanoi (HAN)" or a bare "HAN". Anything else yields None rather
/// than a guessed airport.
pub fn resolve_airport_code(location: &str) -> Option<AirportCode> {
    let location = location.trim();
    if let Some(caps) = PARENTHESIZED_CODE.captures(location) {
        return Some(AirportCode(caps[1].to_ascii_uppercase()));
    }
    if BARE_CODE.is_match(location) {
        return Some(AirportCode(location.to_ascii_uppercase()));
    }
    None
}
