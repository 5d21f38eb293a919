//! Tracking-plane command-line interface.
//!
//! Build the geometry and draw vertices from TOML configuration files:
//! ```sh
//! tplane-cli build plane.toml
//! tplane-cli sample plane.toml --region MODULE --count 10000 --seed 1
//! tplane-cli validate plane.toml
//! tplane-cli regions
//! ```

mod config;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tplane_core::vertex::Region;

#[derive(Parser)]
#[command(name = "tplane-cli")]
#[command(about = "Tracking plane geometry builder and vertex sampler")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tracking plane and list the placed volumes.
    Build {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Draw random vertices inside a region.
    Sample {
        /// Path to the job configuration file.
        config: PathBuf,
        /// Region name: PLATE or MODULE.
        #[arg(short, long)]
        region: String,
        /// Number of vertices to draw.
        #[arg(short = 'n', long, default_value_t = 1000)]
        count: usize,
        /// Seed for a reproducible draw.
        #[arg(short, long)]
        seed: Option<u64>,
        /// Output directory (overrides config file setting).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file by building the plane.
    Validate {
        /// Path to the job configuration file.
        config: PathBuf,
    },
    /// List the vertex generation regions.
    Regions,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli.command {
        Commands::Build { config, output } => {
            println!("Tracking Plane Builder");
            println!("======================");
            let job = config::load_config(&config)?;
            println!("Configuration: {}", config.display());

            let result = runner::build_plane(&job)?;
            runner::print_placements(&result);

            if job.diagnostics.sensor_positions {
                let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
                let tracker = result.plane.tracker();
                runner::write_sensor_positions_csv(tracker, &out_dir.join("sensor_positions.csv"))?;
                if job.output.save_json {
                    runner::write_sensor_positions_json(
                        tracker,
                        &out_dir.join("sensor_positions.json"),
                    )?;
                }
            }

            println!("Construction complete.");
            Ok(())
        }
        Commands::Sample {
            config,
            region,
            count,
            seed,
            output,
        } => {
            let region: Region = region.parse()?;
            let job = config::load_config(&config)?;
            let result = runner::build_plane(&job)?;

            let vertices = runner::sample_vertices(&result.plane, region, count, seed)?;
            let out_dir = output.unwrap_or_else(|| PathBuf::from(&job.output.directory));
            let file_name = format!("vertices_{}.csv", region.as_str().to_lowercase());
            runner::write_vertices_csv(&vertices, region, &out_dir.join(file_name))?;
            Ok(())
        }
        Commands::Validate { config } => {
            let job = config::load_config(&config)?;
            runner::build_plane(&job)?;
            println!("Configuration is valid: {}", config.display());
            Ok(())
        }
        Commands::Regions => {
            println!("Vertex generation regions:");
            println!();
            for region in Region::ALL {
                let description = match region {
                    Region::Plate => "support plate slab, holes included (alias TRK_SUPPORT)",
                    Region::Module => "back-face slab of a random module (alias DICE_BOARD)",
                };
                println!("  {:<8} {}", region, description);
            }
            Ok(())
        }
    }
}
