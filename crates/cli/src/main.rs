use clap::Parser;
use omnibus::build::{FeedBuilder, PlacementConfig};
use omnibus::plan::NetworkPlan;
use omnibus::shared::Distance;
use std::{error::Error, path::PathBuf, process, time::Instant};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "omnibus")]
#[command(about = "Builds a GTFS feed from a frequency-based network plan", long_about = None)]
struct Cli {
    /// Directory holding frequencies.csv, meta.csv, service_windows.csv,
    /// shapes.geojson and optionally stops.csv
    plan_dir: PathBuf,

    /// Output directory, or a .zip path for an archived feed
    output: PathBuf,

    /// Corridor radius in meters when matching stops to shapes
    #[arg(short, long)]
    buffer: Option<f64>,

    /// Write a zip archive even without a .zip extension
    #[arg(short, long, default_value_t = false)]
    zip: bool,
}

fn main() {
    tracing_subscriber::fmt().init();
    let cli = Cli::parse();
    if let Err(error) = run(&cli) {
        error!("{error}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    info!("Loading plan from {}...", cli.plan_dir.display());
    let now = Instant::now();
    let plan = NetworkPlan::load_dir(&cli.plan_dir)?;

    let mut placement = PlacementConfig::default();
    if let Some(buffer) = cli.buffer {
        placement.radius = Distance::from_meters(buffer);
    }
    let feed = FeedBuilder::new(&plan).with_placement(placement).build()?;

    let as_zip = cli.zip
        || cli
            .output
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("zip"));
    if as_zip {
        feed.write_zip(&cli.output)?;
    } else {
        feed.write_dir(&cli.output)?;
    }
    info!(
        "Built {} trips and {} stop times in {:?}",
        feed.trips.len(),
        feed.stop_times.len(),
        now.elapsed()
    );
    Ok(())
}
