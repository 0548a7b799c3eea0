mod nearby;
mod render;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "localmart")]
#[command(about = "Discover marketplace products and workshops near you")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve a position and list nearby products and workshops.
    Nearby {
        /// Latitude to search around; skips position lookup.
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Longitude to search around; skips position lookup.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Print the full map view as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Print the resolved configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = localmart_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Nearby { lat, lng, json }) => {
            let position = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(localmart_core::Coordinate::new(lat, lng)?),
                _ => None,
            };
            nearby::run_nearby(&config, position, json).await?;
        }
        Some(Commands::Config) => println!("{config:#?}"),
        None => println!("localmart: run `localmart nearby` to search around you"),
    }

    Ok(())
}
