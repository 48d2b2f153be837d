//! Collecting preferences and parsing chat input.

use crate::error::{Result, TourError};
use crate::preferences::{parse_interests, BudgetRange, UserPreferences, DEFAULT_CURRENCY};
use std::io::{self, BufRead, Write};
use std::thread;
use tokio::sync::mpsc;

/// Lines buffered between the reader thread and the chat loop.
const LINE_BUFFER: usize = 16;

/// A line typed into the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Empty,
    Exit,
    Reset,
    Message(String),
}

impl ReplCommand {
    /// Commands are case-insensitive; anything else is a message.
    pub fn parse(line: &str) -> Self {
        let text = line.trim();
        if text.is_empty() {
            return ReplCommand::Empty;
        }

        match text.to_lowercase().as_str() {
            "/exit" | "/quit" => ReplCommand::Exit,
            "/reset" => ReplCommand::Reset,
            _ => ReplCommand::Message(text.to_string()),
        }
    }
}

/// Read lines from `reader` on a dedicated thread.
///
/// The blocking read lives outside the runtime, so dropping the receiver
/// (or shutting down the runtime) never waits on it. The channel closes at
/// end of input or after the first read error.
pub fn spawn_line_reader<R>(mut reader: R) -> mpsc::Receiver<io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    thread::spawn(move || {
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.blocking_send(Ok(line)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(Err(e));
                    break;
                }
            }
        }
    });

    rx
}

/// Preferences as given on the command line. Any field may be missing.
#[derive(Debug, Clone, Default)]
pub struct PreferenceArgs {
    pub destination: Option<String>,
    pub days: Option<u32>,
    pub interests: Option<String>,
    pub budget: Option<String>,
    pub currency: Option<String>,
}

/// Fill in missing preferences, asking on `out`/`input` when `interactive`.
///
/// Without interaction, a missing destination or duration is an error.
/// Interests and budget are optional either way.
pub fn collect_preferences<R, W>(
    args: PreferenceArgs,
    input: &mut R,
    out: &mut W,
    interactive: bool,
) -> Result<UserPreferences>
where
    R: BufRead,
    W: Write,
{
    let mut ask = |question: &str| -> Result<String> {
        write!(out, "{}", question)?;
        out.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        Ok(answer.trim().to_string())
    };

    let destination = match args.destination {
        Some(d) => d,
        None if interactive => ask("Destination: ")?,
        None => String::new(),
    };
    // Reject before asking anything else.
    if destination.trim().is_empty() {
        return Err(TourError::preferences("destination must not be empty"));
    }

    let days = match args.days {
        Some(days) => days,
        None if interactive => {
            let raw = ask("Trip length in days: ")?;
            raw.parse::<u32>().map_err(|_| {
                TourError::preferences(format!("'{}' is not a number of days", raw))
            })?
        }
        None => return Err(TourError::preferences("trip duration is required (--days)")),
    };

    let interests = match args.interests {
        Some(raw) => raw,
        None if interactive => ask("Interests (comma separated, optional): ")?,
        None => String::new(),
    };

    let budget = match args.budget {
        Some(raw) => Some(raw),
        None if interactive => Some(ask("Budget, e.g. 1500 or 800-2000 (optional): ")?),
        None => None,
    }
    .filter(|raw| !raw.trim().is_empty());

    let currency = args.currency.as_deref().unwrap_or(DEFAULT_CURRENCY);
    let budget = budget
        .map(|raw| BudgetRange::parse(&raw, currency))
        .transpose()?;

    UserPreferences::new(&destination, days, parse_interests(&interests), budget)
}
