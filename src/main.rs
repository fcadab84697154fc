use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use safehaven::view::FALLBACK_ORIGIN;
use safehaven::{Advisor, GeoPoint, MapViewState, SafeHavenConfig, logging, web};

#[derive(Parser)]
#[command(name = "safehaven")]
#[command(about = "Find the calmest direction around you and the shelter that lies along it", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recommend a shelter in the safest weather direction
    Recommend {
        #[command(flatten)]
        location: LocationArgs,

        /// Print the full recommendation as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show current weather at a location
    Conditions {
        #[command(flatten)]
        location: LocationArgs,
    },
    /// Serve the HTTP API
    Serve {
        /// Port to listen on, overrides server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(clap::Args)]
struct LocationArgs {
    /// Latitude in decimal degrees
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude in decimal degrees
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
}

impl LocationArgs {
    /// Apply the requested origin to the view, or the fallback when none was given
    fn apply(&self, view: &mut MapViewState) -> Result<GeoPoint> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => {
                let origin = GeoPoint::try_new(lat, lng)?;
                view.select_location(origin);
            }
            _ => {
                eprintln!(
                    "No location given, using default location {}",
                    FALLBACK_ORIGIN.format_coordinates()
                );
                view.set_user_location(FALLBACK_ORIGIN);
            }
        }
        view.active_origin()
            .context("No origin available for the request")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SafeHavenConfig::load_from_path(cli.config.clone())
        .context("Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose);

    let advisor = Advisor::from_config(&config).context("Failed to initialise providers")?;

    match cli.command {
        Command::Recommend { location, json } => {
            let mut view = MapViewState::new();
            let origin = location.apply(&mut view)?;

            let result = advisor
                .recommend_with_progress(&origin, &mut |progress| {
                    view.apply_progress(progress);
                    eprintln!("{}", view.status);
                })
                .await;

            match result {
                Ok(recommendation) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&recommendation)?);
                    } else {
                        view.show_recommendation(&recommendation);
                        println!("{}", recommendation.headline());
                        println!("{view}");
                    }
                }
                Err(e) => {
                    view.show_failure(&e);
                    println!("{view}");
                    return Err(e.into());
                }
            }
        }
        Command::Conditions { location } => {
            let mut view = MapViewState::new();
            let origin = location.apply(&mut view)?;
            let conditions = advisor.current_conditions(&origin).await;
            view.show_conditions(conditions.as_ref().map(Clone::clone));
            println!("{view}");
            conditions?;
        }
        Command::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            info!("Starting SafeHaven API on port {}", port);
            web::run(port, Arc::new(advisor)).await?;
        }
    }

    Ok(())
}
