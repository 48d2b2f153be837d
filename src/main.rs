//! Tour Assistant CLI
//!
//! Generates travel itineraries and chats about trips with an LLM.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tour_assistant::{
    config::Config,
    input::{collect_preferences, spawn_line_reader, PreferenceArgs},
    itinerary::ItineraryPlanner,
    llm::LlmClient,
    output::{save_itinerary, OutputPresenter},
    preferences::UserPreferences,
    session::{ChatRepl, Conversation},
    tools::ToolBox,
    weather::WeatherClient,
};
use tracing_subscriber::EnvFilter;

/// Tour Assistant - LLM-powered travel itineraries
#[derive(Parser)]
#[command(name = "tour-assistant")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Override the configured model
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a day-by-day itinerary
    Plan {
        /// Where to go
        #[arg(short, long)]
        destination: Option<String>,

        /// Trip length in days
        #[arg(long)]
        days: Option<u32>,

        /// Comma separated interests (e.g. "history,food,outdoors")
        #[arg(short, long)]
        interests: Option<String>,

        /// Budget as a maximum ("1500") or a range ("800-2000")
        #[arg(short, long)]
        budget: Option<String>,

        /// Currency code for the budget
        #[arg(long)]
        currency: Option<String>,

        /// Also save the itinerary to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Never ask for missing preferences
        #[arg(long)]
        no_prompt: bool,
    },

    /// Chat with the assistant (weather lookups included)
    Chat,

    /// Test LLM connection
    Test,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Plan {
            destination,
            days,
            interests,
            budget,
            currency,
            output,
            no_prompt,
        } => {
            let args = PreferenceArgs {
                destination,
                days,
                interests,
                budget,
                currency,
            };
            let config = load_config(cli.model)?;
            // Ask on the terminal before the Ctrl-C handler takes over SIGINT.
            let prefs = read_preferences(args, no_prompt)?;
            until_interrupted(cmd_plan(config, prefs, output)).await
        }
        Commands::Chat => {
            let config = load_config(cli.model)?;
            until_interrupted(cmd_chat(config)).await
        }
        Commands::Test => cmd_test(cli.model).await,
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Run `task`, or stop quietly on Ctrl-C.
///
/// `task` must not block on stdin: chat reads through
/// [`spawn_line_reader`], which the runtime never waits for.
async fn until_interrupted<F>(task: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::select! {
        result = task => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nSession cancelled by user.");
            Ok(())
        }
    }
}

/// Load and validate configuration. Fails before any network call.
fn load_config(model: Option<String>) -> Result<Config> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(model) = model {
        config.llm.model = model;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn build_tools(config: &Config) -> Result<ToolBox> {
    let weather = WeatherClient::new(config.weather.clone())
        .context("Failed to create weather client")?;
    Ok(ToolBox::new(Arc::new(weather)))
}

fn read_preferences(args: PreferenceArgs, no_prompt: bool) -> Result<UserPreferences> {
    let interactive = !no_prompt && io::stdin().is_terminal();
    collect_preferences(args, &mut io::stdin().lock(), &mut io::stdout(), interactive)
        .context("Invalid trip preferences")
}

async fn cmd_plan(config: Config, prefs: UserPreferences, output: Option<PathBuf>) -> Result<()> {
    println!(
        "Planning {} day(s) in {} using {}...",
        prefs.duration_days(),
        prefs.destination(),
        config.llm.model
    );

    let planner = ItineraryPlanner::new(
        Arc::new(LlmClient::new(config.llm.clone()).context("Failed to create LLM client")?),
        build_tools(&config)?,
        config.chat.max_tool_rounds,
    );

    let start = Instant::now();
    let itinerary = planner
        .plan(&prefs)
        .await
        .context("Failed to generate itinerary")?;
    tracing::info!("Itinerary generated in {:.2?}", start.elapsed());

    OutputPresenter::new(io::stdout().lock()).present(&itinerary)?;

    if let Some(path) = output {
        save_itinerary(&itinerary, &path).context("Failed to save itinerary")?;
        println!("Itinerary saved to: {}", path.display());
    }

    Ok(())
}

async fn cmd_chat(config: Config) -> Result<()> {
    let conversation = Conversation::new(
        Arc::new(LlmClient::new(config.llm.clone()).context("Failed to create LLM client")?),
        build_tools(&config)?,
        config.chat.max_tool_rounds,
    );

    let mut repl = ChatRepl::new(conversation, OutputPresenter::new(io::stdout()));
    repl.run(spawn_line_reader(io::BufReader::new(io::stdin())))
        .await
        .context("Chat session failed")?;

    Ok(())
}

async fn cmd_test(model: Option<String>) -> Result<()> {
    println!("Testing LLM connection...\n");

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(model) = model {
        config.llm.model = model;
    }

    println!("Configuration:");
    println!("  API Base:  {}", config.llm.api_base);
    println!("  Model:     {}", config.llm.model);
    let key_prefix: String = config.llm.api_key.chars().take(8).collect();
    println!("  API Key:   {}...", key_prefix);
    println!();

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Ok(());
    }

    let client = LlmClient::new(config.llm).context("Failed to create LLM client")?;

    println!("Sending test request...");
    match client.test_connection().await {
        Ok(()) => {
            println!("Connection successful!");
        }
        Err(e) => {
            println!("Connection failed: {}", e);
        }
    }

    Ok(())
}
