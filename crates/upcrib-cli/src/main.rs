use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "upcrib")]
#[command(about = "upCrib CLI - AI-powered home renovation designs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend health
    Health,
    /// Manage renovation sessions
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
    /// Upload a house photo into a session
    Upload {
        session_id: String,
        /// Path to the image file
        image: std::path::PathBuf,
        /// Trigger AI analysis after the upload and wait for questions
        #[arg(long)]
        analyze: bool,
    },
    /// Show the AI-generated style questions for a session
    Questions { session_id: String },
    /// Answer the style questions (id=value pairs) and submit
    Answer {
        session_id: String,
        /// Answers as question-id=value pairs, e.g. q1=Modern
        #[arg(required = true)]
        answers: Vec<String>,
    },
    /// Start renovation image generation
    Generate {
        session_id: String,
        /// Wait for the generation to finish
        #[arg(long)]
        wait: bool,
        /// Wall-clock bound for --wait, in seconds
        #[arg(long, default_value_t = 300)]
        timeout_secs: u64,
    },
    /// Manage the local design history
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show per-user usage entitlements
    Entitlements { user_id: String },
    /// Manage the CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Create a new renovation session
    Create {
        /// Associate the session with a user id
        #[arg(long)]
        user: Option<String>,
    },
    /// Show the full server-side state of a session
    State { session_id: String },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List saved designs
    List,
    /// Show one saved design
    Show { session_id: String },
    /// Rename one saved design
    Rename { session_id: String, title: String },
    /// Delete one saved design and its cached images
    Delete {
        session_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete every saved design
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Seed demo designs into an empty history
    Seed,
    /// Show storage paths and counts
    Info,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set the backend base URL
    SetUrl { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Health => commands::health::run().await?,
        Commands::Session { action } => match action {
            SessionAction::Create { user } => {
                commands::session::create(user.as_deref()).await?
            }
            SessionAction::State { session_id } => commands::session::state(&session_id).await?,
        },
        Commands::Upload {
            session_id,
            image,
            analyze,
        } => commands::upload::run(&session_id, &image, analyze).await?,
        Commands::Questions { session_id } => commands::questions::show(&session_id).await?,
        Commands::Answer {
            session_id,
            answers,
        } => commands::questions::answer(&session_id, &answers).await?,
        Commands::Generate {
            session_id,
            wait,
            timeout_secs,
        } => commands::generate::run(&session_id, wait, timeout_secs).await?,
        Commands::History { action } => match action {
            HistoryAction::List => commands::history::list().await?,
            HistoryAction::Show { session_id } => commands::history::show(&session_id).await?,
            HistoryAction::Rename { session_id, title } => {
                commands::history::rename(&session_id, &title).await?
            }
            HistoryAction::Delete { session_id, yes } => {
                commands::history::delete(&session_id, yes).await?
            }
            HistoryAction::Clear { yes } => commands::history::clear(yes).await?,
            HistoryAction::Seed => commands::history::seed().await?,
            HistoryAction::Info => commands::history::info().await?,
        },
        Commands::Entitlements { user_id } => commands::entitlements::run(&user_id).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show().await?,
            ConfigAction::SetUrl { url } => commands::config::set_url(&url).await?,
        },
    }

    Ok(())
}
