//! SceneGate CLI - Command-line interface
//!
//! Runs the imagery gateway and offers one-shot scene queries against the
//! configured Planet account.

mod commands;
mod error;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::query::{SearchArgs, TileArgs};
use commands::serve::ServeArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "scenegate")]
#[command(author, version, about = "Planet satellite scene search and tile gateway", long_about = None)]
struct Cli {
    /// Config file (default: ~/.scenegate/config.ini)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand, PartialEq)]
enum Commands {
    /// Run the HTTP gateway
    Serve {
        /// Listen address (overrides config and SCENEGATE_BIND)
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,

        /// Planet API key (overrides config and PLANET_API_KEY)
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
    },

    /// Search for recent scenes around a point
    Search {
        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Only scenes acquired within this many days
        #[arg(long, default_value_t = 14, allow_negative_numbers = true)]
        days_ago: i32,
    },

    /// Show one scene
    Scene {
        /// Scene identifier
        id: String,
    },

    /// Download one tile of a scene
    Tile {
        /// Scene identifier
        id: String,
        /// Zoom level
        z: u32,
        /// Tile column
        x: u32,
        /// Tile row
        y: u32,
        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Serve { bind, api_key } => {
            commands::serve::run(config_path, ServeArgs { bind, api_key })
        }
        Commands::Search { lon, lat, days_ago } => {
            commands::query::run_search(config_path, SearchArgs { lon, lat, days_ago })
        }
        Commands::Scene { id } => commands::query::run_scene(config_path, &id),
        Commands::Tile {
            id,
            z,
            x,
            y,
            output,
        } => commands::query::run_tile(
            config_path,
            TileArgs {
                scene_id: id,
                z,
                x,
                y,
                output,
            },
        ),
        Commands::Config { command } => commands::config::run(config_path, command),
    }
}
