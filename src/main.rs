use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tubequiz::claude::{ApiKeyManager, ClaudeError, ClaudeModel, auth::KeySource};
use tubequiz::config::PlayerBackend;
use tubequiz::quiz::{
    ClaudeQuestionProvider, GenerationRequest, QuestionProvider, parse_quiz_items,
};
use tubequiz::video::VideoId;
use tubequiz::{App, Config};

#[derive(Parser)]
#[command(name = "tubequiz")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Player backend, overriding the config file
    #[arg(long, value_enum, global = true)]
    player: Option<PlayerBackend>,

    /// Estimated video length in minutes, used to space questions
    #[arg(long, global = true)]
    minutes: Option<f64>,

    /// Claude model (haiku, sonnet, opus, or a full model id)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Transcript to ground the questions in
    #[arg(long, global = true)]
    transcript_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the stored Claude API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Print the video id found in a URL
    Id {
        /// YouTube URL or bare video id
        url: String,
    },
    /// Generate a quiz and print it as JSON
    Generate {
        /// Topic to build questions around
        #[arg(short, long)]
        topic: String,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Store a key in the system keyring
    Set {
        /// Anthropic API key (sk-ant-...)
        key: String,
    },
    /// Show where the active key comes from
    Status,
    /// Remove the key from the system keyring
    Delete,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(player) = cli.player {
        config.player = player;
    }
    if let Some(minutes) = cli.minutes {
        if !(minutes.is_finite() && minutes > 0.0) {
            bail!("--minutes must be a positive number");
        }
        config.estimated_minutes = minutes;
    }
    if let Some(model) = &cli.model {
        config.model = ClaudeModel::parse(model)
            .with_context(|| format!("Unknown model {:?}", model))?;
    }

    match cli.command {
        Some(Commands::Key { action }) => {
            init_stderr_logging();
            run_key_command(action)
        }
        Some(Commands::Id { url }) => {
            init_stderr_logging();
            let video_id = VideoId::parse(&url)?;
            println!("{}", video_id);
            Ok(())
        }
        Some(Commands::Generate { topic }) => {
            init_stderr_logging();
            let transcript = read_transcript(cli.transcript_file.as_deref())?;
            run_generate(&config, &topic, &transcript).await
        }
        None => {
            // Launch TUI; logs go to a file so they don't corrupt the screen
            init_file_logging()?;
            let transcript = read_transcript(cli.transcript_file.as_deref())?;
            let provider = ClaudeQuestionProvider::from_environment(config.model)?;
            if !provider.has_credential() {
                tracing::warn!("No API key configured; generation will fail until one is set");
            }
            let factory = tubequiz::app::player_factory(&config);
            let mut app = App::new(config, Arc::new(provider), factory)?.with_transcript(transcript);
            app.run().await?;
            Ok(())
        }
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tubequiz=info".into())
}

fn init_stderr_logging() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn init_file_logging() -> Result<()> {
    let path = Config::log_path()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {:?}", parent))?;
    }
    let file: File = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {:?}", path))?;

    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}

fn read_transcript(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read transcript {:?}", path)),
        None => Ok(String::new()),
    }
}

fn run_key_command(action: KeyAction) -> Result<()> {
    match action {
        KeyAction::Set { key } => {
            ApiKeyManager::set_api_key(key.trim())?;
            println!("Stored API key {}", ApiKeyManager::mask_key(key.trim()));
        }
        KeyAction::Status => match ApiKeyManager::resolve() {
            Ok((key, KeySource::Environment)) => {
                println!("Using {} from the environment", ApiKeyManager::mask_key(&key));
            }
            Ok((key, KeySource::Keyring)) => {
                println!("Using {} from the system keyring", ApiKeyManager::mask_key(&key));
            }
            Err(ClaudeError::ApiKeyNotFound) => println!("No API key configured"),
            Err(e) => return Err(e.into()),
        },
        KeyAction::Delete => match ApiKeyManager::delete_api_key() {
            Ok(()) => println!("Removed API key from the system keyring"),
            Err(ClaudeError::ApiKeyNotFound) => println!("No stored API key to remove"),
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}

async fn run_generate(config: &Config, topic: &str, transcript: &str) -> Result<()> {
    let provider = ClaudeQuestionProvider::from_environment(config.model)?;
    let request = GenerationRequest::new(topic, transcript, config.estimated_minutes)?;

    let payload = provider.generate(&request).await?;
    let items = parse_quiz_items(payload)?;

    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
