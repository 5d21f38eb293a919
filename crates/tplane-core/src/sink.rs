//! Output seams of the construction pass.
//!
//! [`PlacementSink`] receives every placed volume. [`DiagnosticSink`]
//! receives verbose text output. Both are implemented by the surrounding
//! application; in-memory and `log`-backed versions are provided here.

use nalgebra::Vector3;
use tplane_geometry::csg::CompositeSolid;

/// A volume handed to a [`PlacementSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlacedVolume {
    /// A solid built by the tracking plane. Ownership moves to the sink.
    Solid {
        solid: CompositeSolid,
        /// Styling hint only; never affects geometry.
        visible: bool,
    },
    /// An externally built module volume, referenced by name.
    Module { name: String },
}

impl PlacedVolume {
    pub fn name(&self) -> &str {
        match self {
            PlacedVolume::Solid { solid, .. } => solid.name(),
            PlacedVolume::Module { name } => name,
        }
    }
}

/// Receives volume placements in the mother volume's frame.
pub trait PlacementSink {
    fn place(&mut self, volume: PlacedVolume, position: Vector3<f64>, copy_index: usize);
}

/// One recorded placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub volume: PlacedVolume,
    pub position: Vector3<f64>,
    pub copy_index: usize,
}

/// A [`PlacementSink`] that keeps every placement in memory.
#[derive(Debug, Default)]
pub struct PlacementLog {
    placements: Vec<Placement>,
}

impl PlacementLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// The first placed solid, if any.
    pub fn solid(&self) -> Option<&CompositeSolid> {
        self.placements.iter().find_map(|p| match &p.volume {
            PlacedVolume::Solid { solid, .. } => Some(solid),
            PlacedVolume::Module { .. } => None,
        })
    }

    /// Placements of externally built modules, in placement order.
    pub fn modules(&self) -> impl Iterator<Item = &Placement> {
        self.placements
            .iter()
            .filter(|p| matches!(p.volume, PlacedVolume::Module { .. }))
    }
}

impl PlacementSink for PlacementLog {
    fn place(&mut self, volume: PlacedVolume, position: Vector3<f64>, copy_index: usize) {
        self.placements.push(Placement {
            volume,
            position,
            copy_index,
        });
    }
}

/// Receives ordered diagnostic text lines.
pub trait DiagnosticSink {
    fn emit(&mut self, line: &str);
}

/// Forwards diagnostic lines to the `log` facade at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, line: &str) {
        log::info!("{}", line);
    }
}

impl DiagnosticSink for Vec<String> {
    fn emit(&mut self, line: &str) {
        self.push(line.to_owned());
    }
}
