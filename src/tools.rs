//! Tools advertised to the model and their dispatch.

use crate::llm::{FunctionSpec, ToolCall, ToolDefinition};
use crate::weather::{clamp_window, WeatherLookup, DEFAULT_WINDOW_HOURS};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// Name of the weather function exposed to the model.
pub const WEATHER_TOOL: &str = "fetch_weather_window";

/// Runs the tools the model asks for.
#[derive(Clone)]
pub struct ToolBox {
    weather: Arc<dyn WeatherLookup>,
}

impl ToolBox {
    pub fn new(weather: Arc<dyn WeatherLookup>) -> Self {
        Self { weather }
    }

    /// Function schemas sent with every completion request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            kind: "function",
            function: FunctionSpec {
                name: WEATHER_TOOL,
                description: "Query Open-Meteo for upcoming hourly temperature and precipitation chances.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "city": {"type": "string"},
                        "hours": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": 24,
                            "default": 12
                        }
                    },
                    "required": ["city"]
                }),
            },
        }]
    }

    /// Execute one tool call. Failures are returned as `{"error": ...}` payloads.
    pub async fn execute(&self, call: &ToolCall) -> Value {
        let args = parse_arguments(&call.function.arguments);
        debug!("Tool call {} -> {}({:?})", call.id, call.function.name, args);

        match call.function.name.as_str() {
            WEATHER_TOOL => {
                let Some(city) = args.get("city").and_then(Value::as_str) else {
                    return json!({"error": "Missing required argument 'city'"});
                };
                let hours = args
                    .get("hours")
                    .and_then(Value::as_i64)
                    .map(clamp_window)
                    .unwrap_or(DEFAULT_WINDOW_HOURS);

                let report = self.weather.fetch_weather_window(city, hours).await;
                serde_json::to_value(report)
                    .unwrap_or_else(|e| json!({"city": city, "error": e.to_string()}))
            }
            other => {
                warn!("Model requested unknown tool '{}'", other);
                json!({"error": format!("Unknown tool {}", other)})
            }
        }
    }
}

/// Decode model-supplied arguments. Anything but a JSON object becomes empty.
fn parse_arguments(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::WeatherReport;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingWeather {
        calls: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl WeatherLookup for RecordingWeather {
        async fn fetch_weather_window(&self, city: &str, hours: u32) -> WeatherReport {
            self.calls.lock().unwrap().push((city.to_string(), hours));
            WeatherReport::failed(city, "offline")
        }
    }

    fn toolbox() -> (ToolBox, Arc<RecordingWeather>) {
        let weather = Arc::new(RecordingWeather::default());
        (ToolBox::new(weather.clone()), weather)
    }

    #[test]
    fn test_definitions_advertise_weather_tool() {
        let (tools, _) = toolbox();
        let defs = serde_json::to_value(tools.definitions()).unwrap();
        assert_eq!(defs[0]["type"], "function");
        assert_eq!(defs[0]["function"]["name"], WEATHER_TOOL);
        assert_eq!(defs[0]["function"]["parameters"]["required"][0], "city");
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_arguments(r#"{"city": "Rome"}"#)["city"], "Rome");
        assert!(parse_arguments("not json").is_empty());
        assert!(parse_arguments("[1, 2]").is_empty());
    }

    #[test]
    fn test_weather_call_clamps_and_defaults_hours() {
        let (tools, weather) = toolbox();

        tokio_test::block_on(async {
            tools
                .execute(&ToolCall::new("a", WEATHER_TOOL, r#"{"city": "Rome", "hours": 99}"#))
                .await;
            tools
                .execute(&ToolCall::new("b", WEATHER_TOOL, r#"{"city": "Oslo"}"#))
                .await;
        });

        let calls = weather.calls.lock().unwrap();
        assert_eq!(calls[0], ("Rome".to_string(), 24));
        assert_eq!(calls[1], ("Oslo".to_string(), DEFAULT_WINDOW_HOURS));
    }

    #[tokio::test]
    async fn test_weather_result_is_passed_through() {
        let (tools, _) = toolbox();
        let result = tools
            .execute(&ToolCall::new("a", WEATHER_TOOL, r#"{"city": "Rome"}"#))
            .await;
        assert_eq!(result, json!({"city": "Rome", "error": "offline"}));
    }

    #[tokio::test]
    async fn test_missing_city_and_unknown_tool() {
        let (tools, weather) = toolbox();

        let missing = tools
            .execute(&ToolCall::new("a", WEATHER_TOOL, "garbage"))
            .await;
        assert!(missing["error"].as_str().unwrap().contains("city"));

        let unknown = tools
            .execute(&ToolCall::new("b", "book_hotel", "{}"))
            .await;
        assert_eq!(unknown, json!({"error": "Unknown tool book_hotel"}));

        assert!(weather.calls.lock().unwrap().is_empty());
    }
}
