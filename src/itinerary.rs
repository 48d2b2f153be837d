//! One-shot itinerary planning.
//!
//! Linear flow: preferences → prompt → model (with the weather tool
//! available) → response text.

use crate::error::{Result, TourError};
use crate::llm::{ChatBackend, Prompts};
use crate::preferences::UserPreferences;
use crate::session::Conversation;
use crate::tools::ToolBox;
use std::sync::Arc;
use tracing::info;

/// Prompt derived from [`UserPreferences`], consumed by the API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryRequest {
    prompt: String,
}

impl ItineraryRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn into_prompt(self) -> String {
        self.prompt
    }
}

/// Raw text returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryResponse {
    text: String,
}

impl ItineraryResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Produces itineraries from preferences.
pub struct ItineraryPlanner {
    backend: Arc<dyn ChatBackend>,
    tools: ToolBox,
    max_tool_rounds: usize,
}

impl ItineraryPlanner {
    pub fn new(backend: Arc<dyn ChatBackend>, tools: ToolBox, max_tool_rounds: usize) -> Self {
        Self {
            backend,
            tools,
            max_tool_rounds,
        }
    }

    /// Generate an itinerary for the given preferences.
    ///
    /// A blank answer from the model is an error, not an empty itinerary.
    pub async fn plan(&self, prefs: &UserPreferences) -> Result<ItineraryResponse> {
        let request = Prompts::itinerary_request(prefs);
        info!(
            "Planning {}-day trip to {} with {}",
            prefs.duration_days(),
            prefs.destination(),
            self.backend.model()
        );

        let mut conversation =
            Conversation::new(self.backend.clone(), self.tools.clone(), self.max_tool_rounds);
        let text = conversation.respond(&request.into_prompt()).await?;

        let response = ItineraryResponse::new(text);
        if response.is_blank() {
            return Err(TourError::LlmApi("model returned an empty itinerary".to_string()));
        }
        Ok(response)
    }
}
