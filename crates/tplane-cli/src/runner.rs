//! Job runner: ties together configuration, assembly and vertex sampling.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tplane_core::assembly::TrackingPlane;
use tplane_core::provider::SensorBoard;
use tplane_core::sink::{LogSink, PlacedVolume, PlacementLog};
use tplane_core::tracker::AbsolutePositionTracker;
use tplane_core::vertex::Region;

use crate::config::JobConfig;

/// A constructed plane together with everything it placed.
pub struct BuildOutput {
    pub plane: TrackingPlane<SensorBoard>,
    pub placements: PlacementLog,
}

/// Build the tracking plane described by `job`.
pub fn build_plane(job: &JobConfig) -> Result<BuildOutput> {
    let board = SensorBoard::new(job.board_spec()).context("Invalid [board] configuration")?;
    let mut plane = TrackingPlane::new(job.plane_config(), board);
    let mut placements = PlacementLog::new();
    plane
        .construct(&mut placements, &mut LogSink)
        .context("Tracking plane construction failed")?;
    Ok(BuildOutput { plane, placements })
}

/// Print the placed volumes to stdout.
pub fn print_placements(output: &BuildOutput) {
    for placement in output.placements.placements() {
        let p = placement.position;
        match &placement.volume {
            PlacedVolume::Solid { solid, visible } => println!(
                "  [{}] {} at ({:.2}, {:.2}, {:.2}) mm: {} holes, volume {:.1} mm^3{}",
                placement.copy_index,
                solid.name(),
                p.x,
                p.y,
                p.z,
                solid.hole_centres().len(),
                solid.volume(),
                if *visible { "" } else { " (hidden)" }
            ),
            PlacedVolume::Module { name } => println!(
                "  [{}] {} at ({:.2}, {:.2}, {:.2}) mm",
                placement.copy_index, name, p.x, p.y, p.z
            ),
        }
    }
}

/// Draw `count` vertices in `region`.
///
/// With a seed the draw is reproducible; otherwise the thread RNG is used.
pub fn sample_vertices(
    plane: &TrackingPlane<SensorBoard>,
    region: Region,
    count: usize,
    seed: Option<u64>,
) -> Result<Vec<Vector3<f64>>> {
    match seed {
        Some(seed) => draw(plane, region, count, &mut StdRng::seed_from_u64(seed)),
        None => draw(plane, region, count, &mut rand::rng()),
    }
}

fn draw<R: Rng>(
    plane: &TrackingPlane<SensorBoard>,
    region: Region,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Vector3<f64>>> {
    (0..count)
        .map(|_| {
            plane
                .generate_vertex_in(region, rng)
                .map_err(anyhow::Error::from)
        })
        .collect()
}

/// Write sampled vertices to a CSV file with a metadata header.
pub fn write_vertices_csv(vertices: &[Vector3<f64>], region: Region, path: &Path) -> Result<()> {
    let mut file = create_file(path)?;

    writeln!(file, "# Tracking plane vertices")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "# region: {}", region)?;
    writeln!(file, "# count: {}", vertices.len())?;
    writeln!(file, "#")?;
    writeln!(file, "x_mm,y_mm,z_mm")?;
    for v in vertices {
        writeln!(file, "{:.6},{:.6},{:.6}", v.x, v.y, v.z)?;
    }

    println!("Vertices written to: {}", path.display());
    Ok(())
}

/// Write the absolute sensor positions to a CSV file.
pub fn write_sensor_positions_csv(tracker: &AbsolutePositionTracker, path: &Path) -> Result<()> {
    let mut file = create_file(path)?;

    writeln!(file, "# Tracking plane absolute sensor positions")?;
    writeln!(file, "# Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(file, "#")?;
    writeln!(file, "id,x_mm,y_mm,z_mm")?;
    for entry in tracker.dump() {
        writeln!(
            file,
            "{},{:.4},{:.4},{:.4}",
            entry.id, entry.position.x, entry.position.y, entry.position.z
        )?;
    }

    println!("Sensor positions written to: {}", path.display());
    Ok(())
}

/// Write the absolute sensor positions to a JSON file.
pub fn write_sensor_positions_json(tracker: &AbsolutePositionTracker, path: &Path) -> Result<()> {
    let entries: Vec<_> = tracker.dump().collect();
    let json = serde_json::to_string_pretty(&entries)
        .map_err(|e| anyhow::anyhow!("JSON serialisation error: {}", e))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;

    println!("Sensor positions (JSON) written to: {}", path.display());
    Ok(())
}

fn create_file(path: &Path) -> Result<std::fs::File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::File::create(path).with_context(|| format!("Cannot create {}", path.display()))
}
