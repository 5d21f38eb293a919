//! Absolute sensor position bookkeeping.
//!
//! Each placed module contributes one entry per sensor, combining the module
//! placement with the sensor's local position. The log is append-only and
//! is used for diagnostics, e.g. to cross-check a readout map.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::provider::SensorPosition;

/// Module number multiplier in absolute sensor ids.
pub const MODULE_ID_STRIDE: u32 = 1000;

/// Errors from combining module and sensor numbers.
#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    #[error("Sensor id {sensor_id} of module {module_index} is not below {}", MODULE_ID_STRIDE)]
    SensorIdOutOfRange { module_index: u32, sensor_id: u32 },

    #[error("Absolute sensor id of module {module_index}, sensor {sensor_id} overflows u32")]
    IdOverflow { module_index: u32, sensor_id: u32 },
}

/// `module_index * MODULE_ID_STRIDE + sensor_id`, refusing ids that would
/// collide with the next module or overflow.
pub fn absolute_id(module_index: u32, sensor_id: u32) -> Result<u32, TrackerError> {
    if sensor_id >= MODULE_ID_STRIDE {
        return Err(TrackerError::SensorIdOutOfRange {
            module_index,
            sensor_id,
        });
    }
    module_index
        .checked_mul(MODULE_ID_STRIDE)
        .and_then(|base| base.checked_add(sensor_id))
        .ok_or(TrackerError::IdOverflow {
            module_index,
            sensor_id,
        })
}

/// A sensor position in the mother volume's frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteSensorPosition {
    /// `module_index * 1000 + local sensor id`.
    pub id: u32,
    /// Absolute position (mm).
    pub position: Vector3<f64>,
}

/// Append-only log of absolute sensor positions.
#[derive(Debug, Clone, Default)]
pub struct AbsolutePositionTracker {
    entries: Vec<AbsoluteSensorPosition>,
}

impl AbsolutePositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every sensor of one module placed at `module_placement`.
    ///
    /// Nothing is recorded if any sensor id is out of range.
    pub fn record(
        &mut self,
        module_index: u32,
        local_positions: &[SensorPosition],
        module_placement: Vector3<f64>,
    ) -> Result<(), TrackerError> {
        let entries = local_positions
            .iter()
            .map(|sensor| {
                Ok(AbsoluteSensorPosition {
                    id: absolute_id(module_index, sensor.id)?,
                    position: module_placement + sensor.position,
                })
            })
            .collect::<Result<Vec<_>, TrackerError>>()?;
        self.entries.extend(entries);
        Ok(())
    }

    /// Entries in log order. The iterator is `Clone`, so it can be replayed.
    pub fn dump(&self) -> std::slice::Iter<'_, AbsoluteSensorPosition> {
        self.entries.iter()
    }

    /// Render the log as diagnostic text lines.
    pub fn report(&self) -> impl Iterator<Item = String> + '_ {
        let header = [
            "----- Absolute position of sensors in gas volume -----".to_string(),
            String::new(),
        ];
        let footer = [
            String::new(),
            "-------------------------------------------------------".to_string(),
        ];
        header
            .into_iter()
            .chain(self.dump().map(|entry| {
                format!(
                    "ID number: {}, position: {}, {}, {}",
                    entry.id, entry.position.x, entry.position.y, entry.position.z
                )
            }))
            .chain(footer)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. Only called when the owning assembly is torn down.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
