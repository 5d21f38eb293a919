//! Centred column/row grid of module placements.
//!
//! Modules are arranged in columns, and each column may hold a different
//! number of rows. Columns are centred about x = 0 and the rows of each
//! column about y = 0. Neighbouring modules are separated by `margin`.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// Planar placement of one module. The z coordinate is fixed at assembly time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModulePosition {
    /// Position in the column-major emission order, starting at 0.
    pub index: usize,
    /// x coordinate of the module centre (mm).
    pub x: f64,
    /// y coordinate of the module centre (mm).
    pub y: f64,
}

/// Column/row topology and module footprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridTopology {
    /// Number of rows in each column, ordered from +x to -x.
    pub rows_per_column: Vec<usize>,
    /// Gap between neighbouring modules (mm).
    pub margin: f64,
    /// Module extent along x (mm).
    pub module_width: f64,
    /// Module extent along y (mm).
    pub module_height: f64,
}

impl GridTopology {
    /// Total number of grid cells described by the row table.
    pub fn cell_count(&self) -> usize {
        self.rows_per_column.iter().sum()
    }
}

/// Compute the ordered module placements for `topology`.
///
/// Positions are emitted column by column. Fails with
/// [`GeometryError::TopologyMismatch`] when the number of generated positions
/// differs from `expected_total`.
pub fn compute(
    topology: &GridTopology,
    expected_total: usize,
) -> Result<Vec<ModulePosition>, GeometryError> {
    let step_x = topology.module_width + topology.margin;
    let step_y = topology.module_height + topology.margin;
    let columns = topology.rows_per_column.len();
    let x_dim = step_x * columns.saturating_sub(1) as f64;

    let mut positions = Vec::with_capacity(topology.cell_count());
    for (col, &rows) in topology.rows_per_column.iter().enumerate() {
        let x = x_dim / 2.0 - col as f64 * step_x;
        let y_dim = step_y * rows.saturating_sub(1) as f64;
        for row in 0..rows {
            positions.push(ModulePosition {
                index: positions.len(),
                x,
                y: y_dim / 2.0 - row as f64 * step_y,
            });
        }
    }

    if positions.len() != expected_total {
        return Err(GeometryError::TopologyMismatch {
            expected: expected_total,
            computed: positions.len(),
        });
    }

    debug!(
        "Computed {} module positions over {} columns (step {:.2} x {:.2} mm)",
        positions.len(),
        columns,
        step_x,
        step_y
    );
    Ok(positions)
}
