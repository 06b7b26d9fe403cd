use log::{ error, info };
use std::sync::Arc;

use crate::config::prompt::{ self, PromptConfig };
use crate::error::TravelError;
use crate::llm::chat::ChatClient;
use crate::models::travel::TripRequest;

/// Turns trip parameters into an itinerary and answers questions about it.
/// Holds no conversation state: every call carries the text it needs.
#[derive(Clone)]
pub struct ItineraryGenerator {
    client: Option<Arc<dyn ChatClient>>,
    prompt_config: Arc<PromptConfig>,
}

impl ItineraryGenerator {
    pub fn new(client: Option<Arc<dyn ChatClient>>, prompt_config: Arc<PromptConfig>) -> Self {
        Self { client, prompt_config }
    }

    pub fn uninitialized(prompt_config: Arc<PromptConfig>) -> Self {
        Self::new(None, prompt_config)
    }

    pub fn is_initialized(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&Arc<dyn ChatClient>, TravelError> {
        self.client.as_ref().ok_or(TravelError::UninitializedClient)
    }

    pub async fn generate(&self, trip: &TripRequest) -> Result<String, TravelError> {
        let client = self.client()?;
        let prompt = prompt
            ::get_itinerary_prompt(&self.prompt_config, trip)
            .map_err(|e| TravelError::Generation(e.to_string()))?;
        info!(
            "Generating travel plan {} → {} ({} to {}) with model {}",
            trip.source,
            trip.destination,
            trip.start_date,
            trip.end_date,
            client.get_model()
        );
        self.complete(client, &prompt, "generating travel plan").await
    }

    pub async fn answer_follow_up(
        &self,
        question: &str,
        travel_plan: &str
    ) -> Result<String, TravelError> {
        let client = self.client()?;
        let prompt = prompt
            ::get_follow_up_prompt(&self.prompt_config, question, travel_plan)
            .map_err(|e| TravelError::Generation(e.to_string()))?;
        info!("Answering follow-up question ({} chars)", question.len());
        self.complete(client, &prompt, "sending follow-up question").await
    }

    async fn complete(
        &self,
        client: &Arc<dyn ChatClient>,
        prompt: &str,
        action: &str
    ) -> Result<String, TravelError> {
        match client.complete(prompt).await {
            Ok(resp) => Ok(resp.response),
            Err(e) => {
                error!("Error {}: {}", action, e);
                Err(TravelError::Generation(e.to_string()))
            }
        }
    }
}
