//! Conversation state and the interactive chat loop.

use crate::error::{Result, TourError};
use crate::input::ReplCommand;
use crate::llm::{ChatBackend, Message, Prompts, ToolDefinition};
use crate::output::{OutputPresenter, NO_NARRATIVE};
use crate::tools::ToolBox;
use std::io::{self, Write};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Message history plus the tools the model may call.
///
/// The first message is always the system prompt.
pub struct Conversation {
    backend: Arc<dyn ChatBackend>,
    tools: ToolBox,
    definitions: Vec<ToolDefinition>,
    messages: Vec<Message>,
    max_tool_rounds: usize,
}

impl Conversation {
    pub fn new(backend: Arc<dyn ChatBackend>, tools: ToolBox, max_tool_rounds: usize) -> Self {
        let definitions = tools.definitions();
        Self {
            backend,
            tools,
            definitions,
            messages: vec![Message::system(Prompts::system_message())],
            max_tool_rounds,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Drop everything but the system prompt.
    pub fn reset(&mut self) {
        self.messages.truncate(1);
        info!("Conversation reset");
    }

    /// Send a user message and return the assistant's final text.
    ///
    /// Tool calls are answered in order before the model is asked again.
    /// On error the history is rolled back to before `user_text`.
    pub async fn respond(&mut self, user_text: &str) -> Result<String> {
        let checkpoint = self.messages.len();
        self.messages.push(Message::user(user_text));

        let result = self.run_turn().await;
        if result.is_err() {
            self.messages.truncate(checkpoint);
        }
        result
    }

    async fn run_turn(&mut self) -> Result<String> {
        for round in 0..self.max_tool_rounds {
            let turn = self.backend.chat(&self.messages, &self.definitions).await?;

            if turn.tool_calls.is_empty() {
                self.messages.push(Message::assistant(turn.content.clone()));
                return Ok(turn.content);
            }

            debug!(
                "Round {}: model requested {} tool call(s)",
                round + 1,
                turn.tool_calls.len()
            );
            self.messages.push(Message::assistant_tool_calls(
                &turn.content,
                turn.tool_calls.clone(),
            ));

            for call in &turn.tool_calls {
                let result = self.tools.execute(call).await;
                self.messages
                    .push(Message::tool_result(call.id.clone(), result.to_string()));
            }
        }

        warn!(
            "Giving up after {} consecutive tool rounds",
            self.max_tool_rounds
        );
        Err(TourError::ToolLoop(self.max_tool_rounds))
    }
}

/// Line-oriented chat front end over a [`Conversation`].
pub struct ChatRepl<W: Write> {
    conversation: Conversation,
    presenter: OutputPresenter<W>,
}

impl<W: Write> ChatRepl<W> {
    pub fn new(conversation: Conversation, presenter: OutputPresenter<W>) -> Self {
        Self {
            conversation,
            presenter,
        }
    }

    /// Read commands until `/exit` or end of input.
    ///
    /// Lines come from [`spawn_line_reader`](crate::input::spawn_line_reader).
    /// Model errors are printed and the loop carries on.
    pub async fn run(&mut self, mut lines: mpsc::Receiver<io::Result<String>>) -> Result<()> {
        self.presenter
            .line("Tour Assistant chat ready. Type '/reset' to clear or '/exit' to quit.")?;

        loop {
            self.presenter.prompt("You> ")?;

            let Some(line) = lines.recv().await.transpose()? else {
                self.presenter.line("\nEOF received. Bye!")?;
                return Ok(());
            };

            match ReplCommand::parse(&line) {
                ReplCommand::Empty => continue,
                ReplCommand::Exit => {
                    self.presenter.line("Bon voyage!")?;
                    return Ok(());
                }
                ReplCommand::Reset => {
                    self.conversation.reset();
                    self.presenter.line("Conversation reset.")?;
                }
                ReplCommand::Message(text) => match self.conversation.respond(&text).await {
                    Ok(reply) => {
                        let reply = reply.trim();
                        let reply = if reply.is_empty() { NO_NARRATIVE } else { reply };
                        self.presenter.present_text(reply)?;
                    }
                    Err(e) => {
                        warn!("Chat turn failed: {}", e);
                        self.presenter.line(&format!("Error: {}", e))?;
                    }
                },
            }
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::error::{Result, TourError};
    use crate::llm::{AssistantTurn, ChatBackend, Message, ToolDefinition};
    use crate::weather::{WeatherLookup, WeatherReport, WeatherSample};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Backend that replays canned turns and records what it was sent.
    pub struct ScriptedBackend {
        script: Mutex<VecDeque<Result<AssistantTurn>>>,
        requests: Mutex<Vec<Vec<Message>>>,
    }

    impl ScriptedBackend {
        pub fn new(turns: Vec<AssistantTurn>) -> Self {
            Self {
                script: Mutex::new(turns.into_iter().map(Ok).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(err: TourError) -> Self {
            Self {
                script: Mutex::new(VecDeque::from([Err(err)])),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<Vec<Message>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn chat(
            &self,
            messages: &[Message],
            _tools: &[ToolDefinition],
        ) -> Result<AssistantTurn> {
            self.requests.lock().unwrap().push(messages.to_vec());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TourError::LlmApi("script exhausted".to_string())))
        }

        fn model(&self) -> &str {
            "scripted"
        }
    }

    /// Weather source that always reports one mild hour.
    pub struct StaticWeather;

    #[async_trait]
    impl WeatherLookup for StaticWeather {
        async fn fetch_weather_window(&self, city: &str, _hours: u32) -> WeatherReport {
            WeatherReport::Forecast {
                city: city.to_string(),
                latitude: 0.0,
                longitude: 0.0,
                window_hours: 1,
                samples: vec![WeatherSample {
                    time: "2026-10-16T09:00".to_string(),
                    temperature_c: Some(18.0),
                    precipitation_probability: Some(10.0),
                }],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{ScriptedBackend, StaticWeather};
    use super::*;
    use crate::input::spawn_line_reader;
    use crate::llm::{AssistantTurn, Role, ToolCall};
    use std::io::Cursor;

    fn conversation(backend: Arc<ScriptedBackend>, rounds: usize) -> Conversation {
        Conversation::new(backend, ToolBox::new(Arc::new(StaticWeather)), rounds)
    }

    #[tokio::test]
    async fn test_tool_results_answer_each_call_before_next_request() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            AssistantTurn::tools(vec![
                ToolCall::new("c1", "fetch_weather_window", r#"{"city": "Lyon"}"#),
                ToolCall::new("c2", "mystery", "{}"),
            ]),
            AssistantTurn::text("Sunny in Lyon."),
        ]));
        let mut convo = conversation(backend.clone(), 4);

        let reply = convo.respond("Weekend in Lyon?").await.unwrap();
        assert_eq!(reply, "Sunny in Lyon.");

        let second = &backend.requests()[1];
        let roles: Vec<Role> = second.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::Tool, Role::Tool]
        );
        assert_eq!(second[3].tool_call_id.as_deref(), Some("c1"));
        assert!(second[3].content.as_deref().unwrap().contains("Lyon"));
        assert_eq!(second[4].tool_call_id.as_deref(), Some("c2"));
        assert!(second[4].content.as_deref().unwrap().contains("Unknown tool mystery"));

        assert_eq!(convo.messages().len(), 6);
        assert_eq!(convo.messages()[5].content.as_deref(), Some("Sunny in Lyon."));
    }

    #[tokio::test]
    async fn test_tool_loop_is_bounded_and_rolled_back() {
        let call = || ToolCall::new("c", "fetch_weather_window", r#"{"city": "Nice"}"#);
        let backend = Arc::new(ScriptedBackend::new(vec![
            AssistantTurn::tools(vec![call()]),
            AssistantTurn::tools(vec![call()]),
        ]));
        let mut convo = conversation(backend, 2);

        let err = convo.respond("hi").await.unwrap_err();
        assert!(matches!(err, TourError::ToolLoop(2)));
        assert_eq!(convo.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_keeps_system_prompt() {
        let backend = Arc::new(ScriptedBackend::new(vec![AssistantTurn::text("Hi!")]));
        let mut convo = conversation(backend, 2);
        convo.respond("hello").await.unwrap();
        assert_eq!(convo.messages().len(), 3);

        convo.reset();
        assert_eq!(convo.messages().len(), 1);
        assert_eq!(convo.messages()[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_repl_session() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            AssistantTurn::text("Try the Louvre.\n"),
            AssistantTurn::text("   "),
        ]));
        let mut out = Vec::new();
        let mut repl = ChatRepl::new(
            conversation(backend.clone(), 2),
            OutputPresenter::new(&mut out),
        );

        let input = b"What to see in Paris?\n\n/RESET\nAnd food?\n/quit\nignored\n";
        repl.run(spawn_line_reader(Cursor::new(input.to_vec())))
            .await
            .unwrap();
        let history = repl.conversation().messages().len();
        drop(repl);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Tour Assistant chat ready."));
        assert!(text.contains("Try the Louvre.\n"));
        assert!(text.contains("Conversation reset."));
        assert!(text.contains(NO_NARRATIVE));
        assert!(text.trim_end().ends_with("Bon voyage!"));

        // The reset dropped the first exchange before the second was sent.
        assert_eq!(backend.requests()[1].len(), 2);
        assert_eq!(history, 3);
    }

    #[tokio::test]
    async fn test_repl_reports_errors_and_handles_eof() {
        let backend = Arc::new(ScriptedBackend::failing(TourError::Auth {
            status: 401,
            message: "bad key".to_string(),
        }));
        let mut out = Vec::new();
        let mut repl = ChatRepl::new(conversation(backend, 2), OutputPresenter::new(&mut out));

        repl.run(spawn_line_reader(Cursor::new(b"hello\n".to_vec())))
            .await
            .unwrap();
        drop(repl);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error: Authentication failed (401): bad key"));
        assert!(text.contains("EOF received. Bye!"));
    }
}
