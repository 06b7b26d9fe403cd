use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::fs;
use std::sync::Arc;
use log::info;

use crate::models::travel::TripRequest;

pub const ITINERARY_TEMPLATE_KEY: &str = "itinerary";
pub const FOLLOW_UP_TEMPLATE_KEY: &str = "follow_up";

const DEFAULT_ITINERARY_TEMPLATE: &str = "Create a comprehensive travel plan with the following details:
- Trip from {source} to {destination}
- Travel dates: {start_date} to {end_date}
- Budget: {budget}
- Number of travelers: {travelers}
- Interests: {interests}

Please provide a detailed travel itinerary including:
1. Recommended flights or transportation options
2. Accommodation suggestions that fit the budget
3. Daily activities and sightseeing based on the interests
4. Food and dining recommendations
5. Estimated costs for major expenses
6. Travel tips specific to the destination
7. Alternative options if certain suggestions don't work out

Format the response in clean sections with clear headings.";

const DEFAULT_FOLLOW_UP_TEMPLATE: &str = "Here is a travel plan that was previously generated:

{travel_plan}

The user has a follow-up question about this travel plan:

\"{question}\"

Please provide a helpful and detailed answer to their question based on the travel plan.
If the travel plan doesn't contain information to answer the question, provide general travel advice that would be relevant.
Format your response using markdown for readability.";

#[derive(Debug)]
pub enum PromptError {
    TemplateNotFound(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::TemplateNotFound(key) => write!(f, "Prompt template '{}' not found", key),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub templates: HashMap<String, String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        let mut templates = HashMap::new();
        templates.insert(ITINERARY_TEMPLATE_KEY.to_string(), DEFAULT_ITINERARY_TEMPLATE.to_string());
        templates.insert(FOLLOW_UP_TEMPLATE_KEY.to_string(), DEFAULT_FOLLOW_UP_TEMPLATE.to_string());
        Self { templates }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        for key in [ITINERARY_TEMPLATE_KEY, FOLLOW_UP_TEMPLATE_KEY] {
            if !self.templates.contains_key(key) {
                return Err(PromptError::TemplateNotFound(key.to_string()));
            }
        }
        Ok(())
    }
}

pub fn load_prompts_from_str(json_str: &str) -> Result<Arc<PromptConfig>, PromptError> {
    let loaded: PromptConfig = serde_json::from_str(json_str)?;
    // file templates override the built-ins key by key
    let mut config = PromptConfig::default();
    config.templates.extend(loaded.templates);
    config.validate()?;
    Ok(Arc::new(config))
}

pub fn load_prompts(path: Option<&str>) -> Result<Arc<PromptConfig>, PromptError> {
    match path {
        Some(path) => {
            info!("Loading prompt templates from: {}", path);
            let json_str = fs::read_to_string(path)?;
            load_prompts_from_str(&json_str)
        }
        None => {
            info!("Using built-in prompt templates");
            Ok(Arc::new(PromptConfig::default()))
        }
    }
}

fn get_template<'a>(config: &'a PromptConfig, key: &str) -> Result<&'a str, PromptError> {
    config.templates
        .get(key)
        .map(|s| s.as_str())
        .ok_or_else(|| PromptError::TemplateNotFound(key.to_string()))
}

pub fn get_itinerary_prompt(config: &PromptConfig, trip: &TripRequest) -> Result<String, PromptError> {
    let template = get_template(config, ITINERARY_TEMPLATE_KEY)?;
    let budget = if trip.budget.is_empty() { "Flexible" } else { trip.budget.as_str() };
    let interests = if trip.interests.is_empty() {
        "General sightseeing".to_string()
    } else {
        trip.interests.as_slice().join(", ")
    };

    Ok(
        template
            .replace("{source}", &trip.source)
            .replace("{destination}", &trip.destination)
            .replace("{start_date}", &trip.start_date.format("%Y-%m-%d").to_string())
            .replace("{end_date}", &trip.end_date.format("%Y-%m-%d").to_string())
            .replace("{budget}", budget)
            .replace("{travelers}", &trip.travelers.to_string())
            .replace("{interests}", &interests)
    )
}

pub fn get_follow_up_prompt(
    config: &PromptConfig,
    question: &str,
    travel_plan: &str
) -> Result<String, PromptError> {
    let template = get_template(config, FOLLOW_UP_TEMPLATE_KEY)?;
    // question is substituted first so a plan containing "{question}" stays verbatim
    Ok(template.replace("{question}", question).replace("{travel_plan}", travel_plan))
}
