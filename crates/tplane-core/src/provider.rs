//! Module geometry provider trait.
//!
//! The tracking plane does not build the modules it places. It only reads
//! their footprint and the local positions of their sensors through
//! [`ModuleGeometry`].

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tplane_geometry::GeometryError;

use crate::tracker::MODULE_ID_STRIDE;

/// Position of one sensor in its module's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorPosition {
    /// Sensor number within the module.
    pub id: u32,
    /// Local position relative to the module centre (mm).
    pub position: Vector3<f64>,
}

/// Read-only view of an externally built module.
pub trait ModuleGeometry {
    /// Name of the module's logical volume, used for placements.
    fn volume_name(&self) -> &str;

    /// Full extents (width, height, thickness) in mm.
    fn dimensions(&self) -> Vector3<f64>;

    /// Local sensor positions, in the order the module lists them.
    fn sensor_positions(&self) -> &[SensorPosition];
}

/// Parameters of a [`SensorBoard`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSpec {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    pub sensor_rows: u32,
    pub sensor_columns: u32,
    /// Centre-to-centre sensor spacing (mm).
    pub pitch: f64,
}

impl Default for BoardSpec {
    fn default() -> Self {
        Self {
            name: "DICE_BOARD".into(),
            width: 85.0,
            height: 79.0,
            thickness: 0.3,
            sensor_rows: 8,
            sensor_columns: 8,
            pitch: 10.0,
        }
    }
}

/// A board carrying a regular array of sensors on its anode-facing side.
///
/// Sensors are numbered row by row, starting at 0 in the +x/+y corner, and
/// sit on the board's -z face.
#[derive(Debug, Clone)]
pub struct SensorBoard {
    name: String,
    dimensions: Vector3<f64>,
    sensors: Vec<SensorPosition>,
}

impl SensorBoard {
    pub fn new(spec: BoardSpec) -> Result<Self, GeometryError> {
        for (name, value) in [
            ("board_width", spec.width),
            ("board_height", spec.height),
            ("board_thickness", spec.thickness),
            ("sensor_pitch", spec.pitch),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(GeometryError::InvalidDimension { name, value });
            }
        }

        // Local ids must stay below the absolute id stride.
        let sensor_count = u64::from(spec.sensor_rows) * u64::from(spec.sensor_columns);
        if sensor_count > u64::from(MODULE_ID_STRIDE) {
            return Err(GeometryError::InvalidDimension {
                name: "sensor_count",
                value: sensor_count as f64,
            });
        }

        let span_x = spec.pitch * spec.sensor_columns.saturating_sub(1) as f64;
        let span_y = spec.pitch * spec.sensor_rows.saturating_sub(1) as f64;
        if span_x > spec.width || span_y > spec.height {
            return Err(GeometryError::InvalidDimension {
                name: "sensor_pitch",
                value: spec.pitch,
            });
        }

        let z = -spec.thickness / 2.0;
        let sensors = (0..spec.sensor_rows)
            .flat_map(|row| (0..spec.sensor_columns).map(move |col| (row, col)))
            .map(|(row, col)| SensorPosition {
                id: row * spec.sensor_columns + col,
                position: Vector3::new(
                    span_x / 2.0 - col as f64 * spec.pitch,
                    span_y / 2.0 - row as f64 * spec.pitch,
                    z,
                ),
            })
            .collect();

        Ok(Self {
            name: spec.name,
            dimensions: Vector3::new(spec.width, spec.height, spec.thickness),
            sensors,
        })
    }
}

impl ModuleGeometry for SensorBoard {
    fn volume_name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> Vector3<f64> {
        self.dimensions
    }

    fn sensor_positions(&self) -> &[SensorPosition] {
        &self.sensors
    }
}
