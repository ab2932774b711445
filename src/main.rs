use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::sync::Arc;

mod agent;
mod config;
mod error;
mod models;
mod storage;
mod tools;

use agent::{AgentClient, DailyAssistant, StdoutSink};
use storage::Storage;
use tools::{ToolContext, ToolRegistry};

/// Quill - your dry-witted personal assistant for tasks and notes.
#[derive(Parser)]
#[command(
    name = "quill",
    about = "Quill - a personal assistant CLI for tasks and notes",
    long_about = "Quill is a dry-witted but dependable CLI assistant for managing tasks and notes.\n\n\
Examples:\n  \
quill -p \"add task: buy milk tomorrow\"\n  \
quill -p \"list my tasks\"\n  \
quill -p \"what did I note about the API?\"\n  \
quill init"
)]
struct Cli {
    /// Send a prompt to Quill
    #[arg(short, long)]
    prompt: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the Quill config directory and data files
    Init,
    /// Delete today's session so the next prompt starts fresh
    Refresh,
    /// Print the Quill version
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => run_init(),
        Some(Commands::Refresh) => run_refresh().await,
        Some(Commands::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => match cli.prompt {
            Some(prompt) => run_prompt(&prompt).await,
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        },
    }
}

fn build_assistant() -> Result<DailyAssistant> {
    let storage = Storage::new(config::config_dir()).context("initializing storage")?;
    let context = ToolContext::new(Arc::new(storage));

    let registry = Arc::new(ToolRegistry::with_builtin_tools());
    registry
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid tool schema: {}", e))?;

    let client = AgentClient::new(&config::agent_url(), registry.clone(), context);
    Ok(DailyAssistant::new(
        Arc::new(client),
        registry,
        config::model(),
    ))
}

async fn run_prompt(prompt: &str) -> Result<()> {
    let assistant = build_assistant()?;
    assistant
        .run(prompt, Arc::new(StdoutSink))
        .await
        .context("running prompt")?;
    Ok(())
}

fn run_init() -> Result<()> {
    let storage = Storage::new(config::config_dir()).context("initializing storage")?;
    storage.initialize().context("seeding data files")?;

    println!("Quill initialized successfully!");
    println!("Config directory: {}", storage.base_path().display());
    println!("Tasks file: {}", storage.tasks_path().display());
    println!("Notes file: {}", storage.notes_path().display());
    Ok(())
}

async fn run_refresh() -> Result<()> {
    let assistant = build_assistant()?;
    let found = assistant.refresh().await.context("refreshing session")?;

    let message = if found {
        "Quill session refreshed."
    } else {
        "No existing session found. Next prompt will start a fresh session."
    };
    println!("{}", message);
    Ok(())
}
