//! CLI frontend for the rngtrack random-outcome tracker.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rt_core::{MAX_BULK_COUNT, ProbabilityUnit, UserId};

use crate::config::TrackerConfig;

#[derive(Parser)]
#[command(
    name = "rngtrack",
    about = "rngtrack: log random drops and compare your luck with the odds",
    version,
    propagate_version = true
)]
struct Cli {
    /// Ledger file (overrides the config file and RNGTRACK_DATA)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Config file (default: ./rngtrack.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Act as this user id
    #[arg(short, long, global = true)]
    user: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a template config and an empty ledger in the current directory
    Init,

    /// Add a game (returns the existing one if the name is taken)
    AddGame {
        /// Game name
        name: String,

        /// Cover image URL
        #[arg(long)]
        image_url: Option<String>,
    },

    /// List games
    Games {
        /// Only games you have logged in
        #[arg(short, long)]
        mine: bool,
    },

    /// Define an event with its outcomes
    AddEvent {
        /// Game name or id
        game: String,

        /// Event name
        name: String,

        /// Outcome as NAME=PROBABILITY, e.g. "Legendary=5%" (repeatable)
        #[arg(short, long = "outcome", required = true)]
        outcomes: Vec<String>,

        /// Unit for probabilities without a % sign: percent or fraction
        #[arg(long, default_value = "percent")]
        unit: ProbabilityUnit,
    },

    /// List the events of a game
    Events {
        /// Game name or id
        game: String,
    },

    /// Add an outcome to an existing event
    AddOutcome {
        /// Event id
        event: u64,

        /// Outcome as NAME=PROBABILITY
        outcome: String,

        /// Unit for probabilities without a % sign: percent or fraction
        #[arg(long, default_value = "percent")]
        unit: ProbabilityUnit,
    },

    /// Log an observed outcome
    Log {
        /// Event id
        event: u64,

        /// Outcome name or id
        outcome: String,

        /// Log this many identical observations (at most 100000)
        #[arg(
            short = 'n',
            long,
            default_value = "1",
            value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_BULK_COUNT))
        )]
        count: u32,

        /// Mark the observations as imported history
        #[arg(long)]
        imported: bool,
    },

    /// Show observed versus expected rates for an event
    Stats {
        /// Event id
        event: u64,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export your logs
    Export {
        /// Output format: json, markdown
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import an event from the legacy single-probability JSON format
    ImportLegacy {
        /// Game name or id to attach the event to
        game: String,

        /// Legacy event file
        file: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("rngtrack={level},rt_core={level},rt_stats={level}"))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = TrackerConfig::load(cli.config.as_deref()).and_then(|mut config| {
        if let Some(data) = cli.data {
            config = config.with_data_file(data);
        }
        if let Some(user) = cli.user {
            config = config.with_default_user(Some(UserId(user)));
        }
        run(cli.command, &config)
    });

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(command: Commands, config: &TrackerConfig) -> Result<(), String> {
    match command {
        Commands::Init => commands::init::run(config),
        Commands::AddGame { name, image_url } => commands::game::add(config, &name, image_url),
        Commands::Games { mine } => commands::game::list(config, mine),
        Commands::AddEvent {
            game,
            name,
            outcomes,
            unit,
        } => commands::event::add(config, &game, &name, &outcomes, unit),
        Commands::Events { game } => commands::event::list(config, &game),
        Commands::AddOutcome {
            event,
            outcome,
            unit,
        } => commands::event::add_outcome(config, event, &outcome, unit),
        Commands::Log {
            event,
            outcome,
            count,
            imported,
        } => commands::log::run(config, event, &outcome, count, imported),
        Commands::Stats { event, json } => commands::stats::run(config, event, json),
        Commands::Export { format, output } => {
            commands::export::run(config, &format, output.as_deref())
        }
        Commands::ImportLegacy { game, file } => commands::import::run(config, &game, &file),
    }
}
