use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};

use geoprep::app::ports::BoundaryProvider;
use geoprep::config::{Config, DEFAULT_CONFIG_PATH};
use geoprep::infra::NominatimBoundaryProvider;
use geoprep::observability::init_logging;
use geoprep::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "geoprep")]
#[command(about = "Geocode, clean and clip scraped place tables to a district")]
#[command(version)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full preparation pipeline
    Run {
        /// Input CSV or spreadsheet
        #[arg(long)]
        input: Option<PathBuf>,
        /// Write the filtered table here
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        district: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
    /// Download a district boundary and print its extent
    Boundary {
        #[arg(long)]
        district: Option<String>,
        #[arg(long)]
        city: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = init_logging();

    let cli = Cli::parse();
    let mut config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Run {
            input,
            output,
            district,
            city,
        } => {
            if let Some(input) = input {
                config.pipeline.input_file = input;
            }
            if output.is_some() {
                config.pipeline.output_file = output;
            }
            if let Some(district) = district {
                config.pipeline.district = district;
            }
            if let Some(city) = city {
                config.pipeline.city = city;
            }

            println!("🚀 Running place preparation pipeline...");
            let pipeline = Pipeline::from_config(&config)?;
            match pipeline.run().await {
                Ok(result) => {
                    info!("Pipeline finished");
                    let report = result.clean_report;
                    println!("\n📊 Pipeline Results for {}:", result.input_file.display());
                    println!("   Loaded: {}", result.loaded);
                    println!(
                        "   Geocoded: {} ({:.1}%)",
                        result.geocoded, result.geocode_success_rate
                    );
                    println!("   Removed (geocode failed): {}", report.geocode_failed);
                    println!("   Removed (duplicates): {}", report.duplicates);
                    println!("   Inside boundary: {}", result.inside_boundary);
                    match &result.output_file {
                        Some(path) => println!("   Output file: {}", path.display()),
                        None => println!("   Output file: (not saved)"),
                    }
                    println!(
                        "   Took: {:.1}s",
                        (result.finished_at - result.started_at).num_milliseconds() as f64
                            / 1000.0
                    );
                }
                Err(e) => {
                    error!("Pipeline failed: {}", e);
                    println!("❌ Pipeline failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Commands::Boundary { district, city } => {
            if let Some(district) = district {
                config.pipeline.district = district;
            }
            if let Some(city) = city {
                config.pipeline.city = city;
            }

            let query = config.pipeline.boundary_query(&config.boundary.country);
            println!("🗺️ Downloading boundary for {}", query);
            let provider = NominatimBoundaryProvider::new(&config.boundary)?;
            let boundary = provider.fetch(&query).await?;

            println!("✅ {}", boundary.name);
            println!("   Polygons: {}", boundary.polygon.0.len());
            if let Some(rect) = boundary.bounding_rect() {
                println!(
                    "   Bounds: lon {:.5}..{:.5}, lat {:.5}..{:.5}",
                    rect.min().x,
                    rect.max().x,
                    rect.min().y,
                    rect.max().y
                );
            }
        }
    }
    Ok(())
}
