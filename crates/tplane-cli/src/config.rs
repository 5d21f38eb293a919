//! TOML configuration deserialisation for tracking-plane jobs.
//!
//! Every key is optional; omitted values fall back to the NEXT-DEMO++
//! tracking plane.

use anyhow::Context;
use serde::Deserialize;

use tplane_core::assembly::{LayoutSpec, PlaneConfig, PlateSpec, Toggles};
use tplane_core::provider::BoardSpec;

/// Top-level job configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    #[serde(default)]
    pub plate: PlateConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Support plate dimensions (mm).
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlateConfig {
    #[serde(default = "default_side")]
    pub side: f64,
    #[serde(default = "default_thickness")]
    pub thickness: f64,
    #[serde(default = "default_hole_side")]
    pub hole_side: f64,
    #[serde(default = "default_hole_margin")]
    pub hole_margin: f64,
    #[serde(default = "default_z_displacement")]
    pub z_displacement: f64,
}

impl Default for PlateConfig {
    fn default() -> Self {
        Self {
            side: default_side(),
            thickness: default_thickness(),
            hole_side: default_hole_side(),
            hole_margin: default_hole_margin(),
            z_displacement: default_z_displacement(),
        }
    }
}

fn default_side() -> f64 {
    160.0
}
fn default_thickness() -> f64 {
    12.0
}
fn default_hole_side() -> f64 {
    49.0
}
fn default_hole_margin() -> f64 {
    2.0
}
fn default_z_displacement() -> f64 {
    5.79
}

/// Module grid layout.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutConfig {
    #[serde(default = "default_rows_per_column")]
    pub rows_per_column: Vec<usize>,
    /// Gap between neighbouring boards (mm).
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_module_count")]
    pub module_count: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rows_per_column: default_rows_per_column(),
            margin: default_margin(),
            module_count: default_module_count(),
        }
    }
}

fn default_rows_per_column() -> Vec<usize> {
    vec![2, 2]
}
fn default_margin() -> f64 {
    1.0
}
fn default_module_count() -> usize {
    4
}

/// Sensor board ("dice board") description.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardConfig {
    #[serde(default = "default_board_name")]
    pub name: String,
    #[serde(default = "default_board_width")]
    pub width: f64,
    #[serde(default = "default_board_height")]
    pub height: f64,
    #[serde(default = "default_board_thickness")]
    pub thickness: f64,
    #[serde(default = "default_sensor_count")]
    pub sensor_rows: u32,
    #[serde(default = "default_sensor_count")]
    pub sensor_columns: u32,
    #[serde(default = "default_pitch")]
    pub pitch: f64,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: default_board_name(),
            width: default_board_width(),
            height: default_board_height(),
            thickness: default_board_thickness(),
            sensor_rows: default_sensor_count(),
            sensor_columns: default_sensor_count(),
            pitch: default_pitch(),
        }
    }
}

fn default_board_name() -> String {
    "DICE_BOARD".into()
}
fn default_board_width() -> f64 {
    85.0
}
fn default_board_height() -> f64 {
    79.0
}
fn default_board_thickness() -> f64 {
    0.3
}
fn default_sensor_count() -> u32 {
    8
}
fn default_pitch() -> f64 {
    10.0
}

/// Position of the plane inside the mother volume.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlacementConfig {
    /// z of the anode (EL gap edge) in mm.
    #[serde(default)]
    pub anode_z: f64,
}

/// Verbosity and visibility toggles.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticsConfig {
    #[serde(default)]
    pub visibility: bool,
    #[serde(default)]
    pub verbosity: bool,
    #[serde(default)]
    pub sensor_positions: bool,
}

/// Output configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output directory (default: "./output").
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Whether to also write JSON next to the CSV reports (default: false).
    #[serde(default)]
    pub save_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
            save_json: false,
        }
    }
}

fn default_output_dir() -> String {
    "./output".into()
}

impl JobConfig {
    /// The typed assembly configuration.
    pub fn plane_config(&self) -> PlaneConfig {
        PlaneConfig {
            plate: PlateSpec {
                side: self.plate.side,
                thickness: self.plate.thickness,
                hole_side: self.plate.hole_side,
                hole_margin: self.plate.hole_margin,
                z_displacement: self.plate.z_displacement,
            },
            layout: LayoutSpec {
                rows_per_column: self.layout.rows_per_column.clone(),
                margin: self.layout.margin,
                module_count: self.layout.module_count,
            },
            anode_z: self.placement.anode_z,
            toggles: Toggles {
                visibility: self.diagnostics.visibility,
                verbosity: self.diagnostics.verbosity,
                sensor_positions: self.diagnostics.sensor_positions,
            },
        }
    }

    pub fn board_spec(&self) -> BoardSpec {
        BoardSpec {
            name: self.board.name.clone(),
            width: self.board.width,
            height: self.board.height,
            thickness: self.board.thickness,
            sensor_rows: self.board.sensor_rows,
            sensor_columns: self.board.sensor_columns,
            pitch: self.board.pitch,
        }
    }
}

/// Parse a TOML job configuration from a string.
pub fn parse_config(content: &str) -> anyhow::Result<JobConfig> {
    let config: JobConfig = toml::from_str(content)?;
    Ok(config)
}

/// Load and parse a TOML job configuration file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read configuration {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Invalid configuration {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_demo_plane() {
        let job = parse_config("").unwrap();
        assert_eq!(job.plane_config(), PlaneConfig::default());
        assert_eq!(job.board_spec(), BoardSpec::default());
        assert_eq!(job.output.directory, "./output");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let job = parse_config(
            r#"
            [layout]
            rows_per_column = [1, 3, 1]
            module_count = 5

            [placement]
            anode_z = -12.5

            [diagnostics]
            sensor_positions = true
            "#,
        )
        .unwrap();

        let plane = job.plane_config();
        assert_eq!(plane.layout.rows_per_column, vec![1, 3, 1]);
        assert_eq!(plane.layout.margin, 1.0);
        assert_eq!(plane.anode_z, -12.5);
        assert!(plane.toggles.sensor_positions);
        assert!(!plane.toggles.verbosity);
        assert_eq!(plane.plate.side, 160.0);
    }

    #[test]
    fn test_shipped_demo_config_matches_defaults() {
        let job = parse_config(include_str!("../../../configs/next_demo.toml")).unwrap();
        assert_eq!(job.plane_config().plate, PlateSpec::default());
        assert_eq!(job.plane_config().layout, LayoutSpec::default());
        assert_eq!(job.board_spec(), BoardSpec::default());
        assert!(job.output.save_json);
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(parse_config("[plates]\nside = 1.0\n").is_err());
    }

    #[test]
    fn test_unknown_key_inside_section_rejected() {
        let err = parse_config("[layout]\nrows_per_column = [2, 3]\nmodule_cont = 5\n").unwrap_err();
        assert!(err.to_string().contains("module_cont"), "{}", err);
        for section in ["plate", "board", "placement", "diagnostics", "output"] {
            let content = format!("[{}]\nnot_a_key = 1\n", section);
            assert!(parse_config(&content).is_err(), "[{}] accepted unknown key", section);
        }
    }
}
