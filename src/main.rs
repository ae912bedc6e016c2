//! Main entry point for the ELO ladder command line
//!
//! This binary plays the part of the command layer: it collects player
//! names and scores, calls into the ladder, and prints the replies.

use anyhow::Result;
use clap::{Parser, Subcommand};
use elo_ladder::config::AppConfig;
use elo_ladder::ladder::{render, LadderManager};
use elo_ladder::rating::{
    EloRatingCalculator, InMemoryRatingStorage, JsonFileRatingStorage, RatingStorage,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// ELO Ladder - record matches and view the leaderboard
#[derive(Parser)]
#[command(
    name = "elo-ladder",
    version,
    about = "Record two-player match results and view the ELO leaderboard",
    long_about = "ELO Ladder keeps a persistent rating for every player. Report a match \
                 with its final score and both ratings move by an amount that depends on \
                 the score margin and the rating gap. Standings are stored in a JSON file."
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Rating file override
    #[arg(
        long,
        value_name = "FILE",
        global = true,
        help = "Override the JSON file holding player ratings"
    )]
    data_file: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        global = true,
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, global = true, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (nothing is written)
    #[arg(
        long,
        global = true,
        help = "Load current ratings but keep every change in memory"
    )]
    dry_run: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Record a match result between two players
    Winner {
        player1: String,
        player2: String,
        score1: u32,
        score2: u32,
    },
    /// Display the ELO leaderboard
    Leaderboard {
        /// Print the leaderboard as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a new player with the default ELO
    AddPlayer { player_name: String },
    /// Remove a player from the ELO system
    RemovePlayer { player_name: String },
    /// Show a single player's record
    Show { player_name: String },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(data_file) = &args.data_file {
        config.storage.data_file = data_file.clone();
    }

    elo_ladder::config::validate_config(&config)?;
    Ok(config)
}

/// Build the ladder from configuration
fn build_ladder(config: &AppConfig, dry_run: bool) -> Result<LadderManager> {
    let file_storage =
        JsonFileRatingStorage::open(&config.storage.data_file, config.storage.initial_rating);

    let storage: Arc<dyn RatingStorage> = if dry_run {
        info!("Dry run - changes will not be written to disk");
        Arc::new(InMemoryRatingStorage::with_records(
            config.storage.initial_rating,
            file_storage.list()?,
        ))
    } else {
        Arc::new(file_storage)
    };

    let calculator = Arc::new(EloRatingCalculator::new(config.rating.clone())?);
    Ok(LadderManager::with_calculator(storage, calculator))
}

async fn run(command: Command, ladder: &LadderManager) -> Result<()> {
    let reply = match command {
        Command::Winner {
            player1,
            player2,
            score1,
            score2,
        } => {
            let report = ladder
                .record_match(&player1, &player2, score1, score2)
                .await?;
            render::match_reply(&report)
        }
        Command::Leaderboard { json } => {
            let entries = ladder.leaderboard().await?;
            if json {
                serde_json::to_string_pretty(&entries)?
            } else {
                render::leaderboard_reply(&entries)
            }
        }
        Command::AddPlayer { player_name } => {
            let outcome = ladder.add_player(&player_name).await?;
            render::add_player_reply(&player_name, &outcome)
        }
        Command::RemovePlayer { player_name } => {
            let outcome = ladder.remove_player(&player_name).await?;
            render::remove_player_reply(&player_name, &outcome)
        }
        Command::Show { player_name } => {
            let record = ladder.player_record(&player_name).await?;
            render::show_reply(&player_name, record.as_ref())
        }
    };

    println!("{}", reply);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!(
        "Starting {} v{} with data file {}",
        config.service.name,
        elo_ladder::VERSION,
        config.storage.data_file.display()
    );

    let ladder = match build_ladder(&config, args.dry_run) {
        Ok(ladder) => ladder,
        Err(e) => {
            error!("Failed to initialize ladder: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(args.command, &ladder).await {
        error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
