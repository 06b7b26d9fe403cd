pub mod gemini;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use super::LlmConfig;
use self::gemini::GeminiChatClient;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        prompt: &str
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

/// Builds a chat client once credentials are known. The planner calls it
/// again every time the keys are saved.
pub type ChatClientFactory = Arc<
    dyn (Fn(&LlmConfig) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>>) +
        Send +
        Sync
>;

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = GeminiChatClient::from_config(config)?;
    Ok(Arc::new(client))
}

pub fn default_factory() -> ChatClientFactory {
    Arc::new(new_client)
}
