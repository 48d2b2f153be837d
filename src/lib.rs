//! Tour Assistant - LLM-powered travel itineraries from the command line.
//!
//! Preferences go in, a day-by-day plan comes out. The model can look up
//! hourly weather for a city through the Open-Meteo backed
//! `fetch_weather_window` tool before it answers.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tour_assistant::{
//!     config::Config,
//!     itinerary::ItineraryPlanner,
//!     llm::LlmClient,
//!     output::OutputPresenter,
//!     preferences::UserPreferences,
//!     tools::ToolBox,
//!     weather::WeatherClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let prefs = UserPreferences::new("Lisbon", 3, ["food", "history"], None)?;
//!
//!     let tools = ToolBox::new(Arc::new(WeatherClient::new(config.weather.clone())?));
//!     let planner = ItineraryPlanner::new(
//!         Arc::new(LlmClient::new(config.llm.clone())?),
//!         tools,
//!         config.chat.max_tool_rounds,
//!     );
//!
//!     let itinerary = planner.plan(&prefs).await?;
//!     OutputPresenter::new(std::io::stdout()).present(&itinerary)?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **input**: CLI/interactive preference collection and chat commands
//! - **llm**: OpenAI-compatible client and prompts
//! - **tools** / **weather**: function calling backed by Open-Meteo
//! - **session**: conversation history and the chat loop
//! - **itinerary**: one-shot planning
//! - **output**: terminal and file presentation

pub mod config;
pub mod error;
pub mod input;
pub mod itinerary;
pub mod llm;
pub mod output;
pub mod preferences;
pub mod session;
pub mod tools;
pub mod weather;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, TourError};
pub use itinerary::{ItineraryPlanner, ItineraryRequest, ItineraryResponse};
pub use llm::{ChatBackend, LlmClient};
pub use preferences::{BudgetRange, UserPreferences};
pub use session::{ChatRepl, Conversation};
