//! Tracking-plane assembly.
//!
//! [`TrackingPlane::construct`] runs the construction pass in dependency
//! order:
//!
//! 1. compute the module grid from the layout and the module footprint;
//! 2. build the perforated support plate and derive the plate and module z;
//! 3. configure the plate and module vertex regions from those z values;
//! 4. place the plate (copy 0), then one module per grid position
//!    (copies 1..=N), recording the absolute positions of their sensors.
//!
//! Along z, the anode-facing side comes first: the modules start
//! `z_displacement` past the anode, and the support plate rests directly
//! behind them.

use log::debug;
use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tplane_geometry::csg::{CompositeSolidBuilder, SolidDescriptor};
use tplane_geometry::grid::{self, GridTopology, ModulePosition};
use tplane_geometry::GeometryError;

use crate::provider::ModuleGeometry;
use crate::sink::{DiagnosticSink, PlacedVolume, PlacementSink};
use crate::tracker::{self, AbsolutePositionTracker, TrackerError};
use crate::vertex::{Region, SamplingRegion, VertexError, VertexGenerator};

/// Name given to the support plate solid.
pub const PLATE_NAME: &str = "SUPPORT_PLATE";

/// Errors from the construction pass.
#[derive(Debug, Error, PartialEq)]
pub enum AssemblyError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Vertex(#[from] VertexError),

    #[error("Module layout has no rows")]
    EmptyTopology,

    #[error("Tracking plane has already been constructed")]
    AlreadyConstructed,

    #[error(transparent)]
    Tracker(#[from] TrackerError),

    #[error("Module copy index {0} does not fit in a sensor id")]
    CopyIndexOverflow(usize),
}

/// Copy number of the module at grid `index`; copy 0 is the plate.
fn module_copy_index(index: usize) -> Result<u32, AssemblyError> {
    index
        .checked_add(1)
        .and_then(|copy| u32::try_from(copy).ok())
        .ok_or(AssemblyError::CopyIndexOverflow(index))
}

/// Support plate dimensions (mm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateSpec {
    pub side: f64,
    pub thickness: f64,
    pub hole_side: f64,
    /// How far each hole extends past either plate face.
    pub hole_margin: f64,
    /// Gap between the anode and the anode-facing side of the modules.
    pub z_displacement: f64,
}

impl Default for PlateSpec {
    fn default() -> Self {
        Self {
            side: 160.0,
            thickness: 12.0,
            hole_side: 49.0,
            hole_margin: 2.0,
            z_displacement: 5.79,
        }
    }
}

/// Module grid layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Rows in each column, ordered from +x to -x.
    pub rows_per_column: Vec<usize>,
    /// Gap between neighbouring modules (mm).
    pub margin: f64,
    /// Number of modules the layout must produce.
    pub module_count: usize,
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self {
            rows_per_column: vec![2, 2],
            margin: 1.0,
            module_count: 4,
        }
    }
}

/// Read-only flags set by the surrounding application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Toggles {
    /// Plate visibility. Styling only.
    pub visibility: bool,
    /// Emit construction diagnostics.
    pub verbosity: bool,
    /// Emit the absolute sensor position dump.
    pub sensor_positions: bool,
}

/// Complete tracking-plane configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaneConfig {
    pub plate: PlateSpec,
    pub layout: LayoutSpec,
    /// z coordinate of the anode (EL gap edge) in the mother frame (mm).
    pub anode_z: f64,
    pub toggles: Toggles,
}

/// The tracking plane assembly builder.
///
/// Owns the module grid, the sensor position log and the vertex regions for
/// as long as it lives.
pub struct TrackingPlane<M: ModuleGeometry> {
    config: PlaneConfig,
    module: M,
    positions: Vec<ModulePosition>,
    tracker: AbsolutePositionTracker,
    vertices: Option<VertexGenerator>,
    plate_z: Option<f64>,
    module_z: Option<f64>,
}

impl<M: ModuleGeometry> TrackingPlane<M> {
    pub fn new(config: PlaneConfig, module: M) -> Self {
        Self {
            config,
            module,
            positions: Vec::new(),
            tracker: AbsolutePositionTracker::new(),
            vertices: None,
            plate_z: None,
            module_z: None,
        }
    }

    pub fn config(&self) -> &PlaneConfig {
        &self.config
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    /// Module placements, empty until constructed.
    pub fn positions(&self) -> &[ModulePosition] {
        &self.positions
    }

    pub fn tracker(&self) -> &AbsolutePositionTracker {
        &self.tracker
    }

    /// Plate centre z in the mother frame, once constructed.
    pub fn plate_z(&self) -> Option<f64> {
        self.plate_z
    }

    /// Module mid-plane z in the mother frame, once constructed.
    pub fn module_z(&self) -> Option<f64> {
        self.module_z
    }

    pub fn vertex_generator(&self) -> Option<&VertexGenerator> {
        self.vertices.as_ref()
    }

    /// Run the construction pass, placing volumes into `sink`.
    ///
    /// Diagnostics go to `diagnostics` only when the matching toggle is set.
    pub fn construct(
        &mut self,
        sink: &mut dyn PlacementSink,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<(), AssemblyError> {
        if self.vertices.is_some() {
            return Err(AssemblyError::AlreadyConstructed);
        }
        let layout = &self.config.layout;
        if layout.rows_per_column.is_empty() || layout.module_count == 0 {
            return Err(AssemblyError::EmptyTopology);
        }

        let dimensions = self.module.dimensions();
        let topology = GridTopology {
            rows_per_column: layout.rows_per_column.clone(),
            margin: layout.margin,
            module_width: dimensions.x,
            module_height: dimensions.y,
        };
        let positions = grid::compute(&topology, layout.module_count)?;

        let plate = &self.config.plate;
        let solid = CompositeSolidBuilder::new(SolidDescriptor {
            name: PLATE_NAME.to_string(),
            side: plate.side,
            thickness: plate.thickness,
            hole_side: plate.hole_side,
            hole_margin: plate.hole_margin,
        })?
        .subtract_all(&positions)
        .build();

        let module_thickness = dimensions.z;
        let base_z = self.config.anode_z + plate.z_displacement;
        let plate_z = base_z + module_thickness + plate.thickness / 2.0;
        let module_z = base_z + module_thickness / 2.0;

        // A failed build must not leave partial placements in the sink.
        let vertices = VertexGenerator::new(
            SamplingRegion::plate(plate.side, plate.thickness, plate_z)?,
            SamplingRegion::module(dimensions, module_z, positions.clone())?,
        );
        let sensors = self.module.sensor_positions();
        let copy_indices = positions
            .iter()
            .map(|p| module_copy_index(p.index))
            .collect::<Result<Vec<_>, _>>()?;
        // Absolute ids grow with the copy index, so the last module bounds them all.
        if let Some(&last) = copy_indices.last() {
            for sensor in sensors {
                tracker::absolute_id(last, sensor.id)?;
            }
        }

        debug!("Placing {} at z = {:.3} mm", PLATE_NAME, plate_z);
        sink.place(
            PlacedVolume::Solid {
                solid,
                visible: self.config.toggles.visibility,
            },
            Vector3::new(0.0, 0.0, plate_z),
            0,
        );

        if self.config.toggles.verbosity {
            diagnostics.emit("  ****************************  ");
            diagnostics.emit(&format!(" anode z: {}", self.config.anode_z));
            diagnostics.emit(&format!(" module z: {}", module_z));
            diagnostics.emit(&format!(" support plate z: {}", plate_z));
            diagnostics.emit("  ****************************  ");
        }

        for (p, &copy_index) in positions.iter().zip(&copy_indices) {
            let placement = Vector3::new(p.x, p.y, module_z);
            sink.place(
                PlacedVolume::Module {
                    name: self.module.volume_name().to_string(),
                },
                placement,
                p.index + 1,
            );
            self.tracker.record(copy_index, sensors, placement)?;
        }
        debug!(
            "Placed {} modules, {} sensors recorded",
            positions.len(),
            self.tracker.len()
        );

        if self.config.toggles.sensor_positions {
            for line in self.tracker.report() {
                diagnostics.emit(&line);
            }
        }

        self.positions = positions;
        self.plate_z = Some(plate_z);
        self.module_z = Some(module_z);
        self.vertices = Some(vertices);
        Ok(())
    }

    /// Draw one vertex in the region called `region`.
    ///
    /// Fails with [`VertexError::UnknownRegion`] for an unrecognised name and
    /// with [`VertexError::NotConstructed`] before [`construct`](Self::construct).
    pub fn generate_vertex<R: Rng>(&self, region: &str, rng: &mut R) -> Result<Vector3<f64>, VertexError> {
        let region: Region = region.parse().map_err(|err| match err {
            VertexError::UnknownRegion { region, .. } => VertexError::UnknownRegion {
                component: "TrackingPlane",
                operation: "generate_vertex",
                region,
            },
            other => other,
        })?;
        self.generate_vertex_in(region, rng)
    }

    /// Draw one vertex in `region`.
    pub fn generate_vertex_in<R: Rng>(&self, region: Region, rng: &mut R) -> Result<Vector3<f64>, VertexError> {
        let vertices = self.vertices.as_ref().ok_or(VertexError::NotConstructed {
            component: "TrackingPlane",
            operation: "generate_vertex",
        })?;
        Ok(vertices.generate(region, rng))
    }

    /// Release everything built by [`construct`](Self::construct).
    ///
    /// This is the only way the sensor position log is cleared.
    pub fn teardown(&mut self) {
        self.tracker.clear();
        self.positions.clear();
        self.vertices = None;
        self.plate_z = None;
        self.module_z = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{BoardSpec, SensorBoard, SensorPosition};
    use crate::sink::PlacementLog;
    use approx::assert_relative_eq;

    fn plane(config: PlaneConfig) -> TrackingPlane<SensorBoard> {
        TrackingPlane::new(config, SensorBoard::new(BoardSpec::default()).unwrap())
    }

    #[test]
    fn test_construct_places_plate_then_modules() {
        let mut plane = plane(PlaneConfig::default());
        let mut sink = PlacementLog::new();
        let mut diag: Vec<String> = Vec::new();
        plane.construct(&mut sink, &mut diag).unwrap();

        let placements = sink.placements();
        assert_eq!(placements.len(), 5);
        assert_eq!(placements[0].copy_index, 0);
        assert_eq!(placements[0].volume.name(), PLATE_NAME);
        let copies: Vec<usize> = sink.modules().map(|p| p.copy_index).collect();
        assert_eq!(copies, vec![1, 2, 3, 4]);
        assert_eq!(sink.solid().unwrap().hole_centres().len(), 4);
        assert!(diag.is_empty());
    }

    #[test]
    fn test_z_stacking() {
        let mut config = PlaneConfig::default();
        config.anode_z = 100.0;
        let mut plane = plane(config);
        plane.construct(&mut PlacementLog::new(), &mut Vec::<String>::new()).unwrap();

        // anode + displacement + board thickness + half plate.
        assert_relative_eq!(plane.plate_z().unwrap(), 100.0 + 5.79 + 0.3 + 6.0);
        assert_relative_eq!(plane.module_z().unwrap(), 100.0 + 5.79 + 0.15);
    }

    #[test]
    fn test_verbose_toggles_emit_diagnostics() {
        let mut config = PlaneConfig::default();
        config.toggles = Toggles {
            visibility: true,
            verbosity: true,
            sensor_positions: true,
        };
        let mut plane = plane(config);
        let mut sink = PlacementLog::new();
        let mut diag: Vec<String> = Vec::new();
        plane.construct(&mut sink, &mut diag).unwrap();

        assert!(diag.iter().any(|l| l.starts_with(" module z:")));
        // 5 construction lines + header, 256 sensors and footer.
        assert_eq!(diag.len(), 5 + 2 + 256 + 2);
        assert!(matches!(
            sink.placements()[0].volume,
            PlacedVolume::Solid { visible: true, .. }
        ));
    }

    #[test]
    fn test_mismatched_layout_aborts_without_placements() {
        let mut config = PlaneConfig::default();
        config.layout.module_count = 5;
        let mut plane = plane(config);
        let mut sink = PlacementLog::new();
        let err = plane.construct(&mut sink, &mut Vec::<String>::new()).unwrap_err();

        assert_eq!(
            err,
            AssemblyError::Geometry(GeometryError::TopologyMismatch { expected: 5, computed: 4 })
        );
        assert!(sink.placements().is_empty());
        assert!(plane.vertex_generator().is_none());
    }

    #[test]
    fn test_empty_layout_rejected() {
        let mut config = PlaneConfig::default();
        config.layout.rows_per_column.clear();
        config.layout.module_count = 0;
        let err = plane(config)
            .construct(&mut PlacementLog::new(), &mut Vec::<String>::new())
            .unwrap_err();
        assert_eq!(err, AssemblyError::EmptyTopology);
    }

    #[test]
    fn test_second_construct_rejected() {
        let mut plane = plane(PlaneConfig::default());
        plane.construct(&mut PlacementLog::new(), &mut Vec::<String>::new()).unwrap();
        assert_eq!(
            plane.construct(&mut PlacementLog::new(), &mut Vec::<String>::new()),
            Err(AssemblyError::AlreadyConstructed)
        );
        assert_eq!(plane.tracker().len(), 256);
    }

    #[test]
    fn test_teardown_clears_log_and_regions() {
        let mut plane = plane(PlaneConfig::default());
        plane.construct(&mut PlacementLog::new(), &mut Vec::<String>::new()).unwrap();
        plane.teardown();

        assert!(plane.tracker().is_empty());
        assert!(plane.positions().is_empty());
        let mut rng = rand::rng();
        assert!(matches!(
            plane.generate_vertex("PLATE", &mut rng),
            Err(VertexError::NotConstructed { .. })
        ));
        // Construction can run again after teardown.
        plane.construct(&mut PlacementLog::new(), &mut Vec::<String>::new()).unwrap();
        assert_eq!(plane.tracker().len(), 256);
    }

    struct WideBoard {
        sensors: Vec<SensorPosition>,
    }

    impl ModuleGeometry for WideBoard {
        fn volume_name(&self) -> &str {
            "WIDE_BOARD"
        }

        fn dimensions(&self) -> Vector3<f64> {
            Vector3::new(85.0, 79.0, 0.3)
        }

        fn sensor_positions(&self) -> &[SensorPosition] {
            &self.sensors
        }
    }

    #[test]
    fn test_sensor_id_past_stride_aborts_without_placements() {
        let board = WideBoard {
            sensors: vec![
                SensorPosition {
                    id: 0,
                    position: Vector3::zeros(),
                },
                SensorPosition {
                    id: 1500,
                    position: Vector3::zeros(),
                },
            ],
        };
        let mut plane = TrackingPlane::new(PlaneConfig::default(), board);
        let mut sink = PlacementLog::new();
        let err = plane.construct(&mut sink, &mut Vec::<String>::new()).unwrap_err();

        assert_eq!(
            err,
            AssemblyError::Tracker(TrackerError::SensorIdOutOfRange {
                module_index: 4,
                sensor_id: 1500
            })
        );
        assert!(sink.placements().is_empty());
        assert!(plane.tracker().is_empty());
        assert!(plane.vertex_generator().is_none());
    }

    #[test]
    fn test_module_copy_index() {
        assert_eq!(module_copy_index(0), Ok(1));
        assert_eq!(module_copy_index(3), Ok(4));
        assert_eq!(
            module_copy_index(usize::MAX),
            Err(AssemblyError::CopyIndexOverflow(usize::MAX))
        );
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_copy_index_past_u32_rejected() {
        let index = u32::MAX as usize;
        assert_eq!(
            module_copy_index(index),
            Err(AssemblyError::CopyIndexOverflow(index))
        );
    }
}
