pub mod chat;

pub const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            completion_model: Some(DEFAULT_CHAT_MODEL.to_string()),
            base_url: None,
        }
    }
}

impl LlmConfig {
    pub fn with_api_key(&self, api_key: &str) -> Self {
        let key = api_key.trim();
        Self {
            api_key: Some(key.to_string()).filter(|k| !k.is_empty()),
            ..self.clone()
        }
    }
}
