use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use profile_explorer::config::Config;
use profile_explorer::directory::{seed_profiles, DirectoryService, InMemoryProfileStore, ProfileFilter};
use profile_explorer::geocoding;
use profile_explorer::maps::spawn_loader;
use profile_explorer::observability::{self, metrics};
use profile_explorer::server::{self, AppState};

#[derive(Parser)]
#[command(name = "profile_explorer")]
#[command(about = "Browse profiles and show where they are on a map")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server
    Serve {
        /// Config file (defaults to $PROFILE_EXPLORER_CONFIG or config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Port to listen on, overrides the config file and $PORT
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the sample directory, optionally filtered
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        interest: Option<String>,
    },
    /// Print every interest in the sample directory
    Interests,
    /// Look up the coordinate of an address
    Geocode {
        address: String,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(&path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::load().context("loading configuration")?,
    };
    Ok(config)
}

fn directory(config: &Config) -> Result<DirectoryService> {
    let store = if config.directory.seed {
        InMemoryProfileStore::with_profiles(seed_profiles())
    } else {
        InMemoryProfileStore::new()
    };
    let geocoder = geocoding::from_config(config).context("building geocoder")?;
    Ok(DirectoryService::new(Arc::new(store), geocoder).with_profile_zoom(config.maps.profile_zoom))
}

async fn serve(config_path: Option<PathBuf>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let _guard = observability::init_logging(&config.server.log_dir);
    if let Err(e) = metrics::init() {
        warn!("{}", e);
    }

    let capability = spawn_loader(&config.maps);
    let directory = directory(&config)?;
    let addr = config.bind_addr();
    info!(%addr, geocoder = ?config.geocoding.provider, "starting profile explorer");

    let state = AppState::new(config, directory, capability);
    server::serve(state, &addr).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, port } => serve(config, port).await?,
        Commands::List { search, interest } => {
            observability::init_console_logging();
            let service = directory(&load_config(None)?)?;
            let profiles = service.list(&ProfileFilter::new(search, interest)).await?;
            if profiles.is_empty() {
                println!("No profiles found matching your criteria.");
            }
            for profile in profiles {
                println!("{:<4} {:<16} {:<40} {}", profile.id, profile.name, profile.address, profile.interests.join(", "));
            }
        }
        Commands::Interests => {
            observability::init_console_logging();
            let service = directory(&load_config(None)?)?;
            for interest in service.interests().await? {
                println!("{}", interest);
            }
        }
        Commands::Geocode { address } => {
            observability::init_console_logging();
            let service = directory(&load_config(None)?)?;
            match service.geocode(&address).await {
                Some(coordinate) => println!("{}", coordinate),
                None => println!("no coordinate"),
            }
        }
    }
    Ok(())
}
