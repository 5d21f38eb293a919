//! Random vertex generation inside the tracking-plane regions.
//!
//! Two regions are supported:
//!
//! - [`Region::Plate`] — uniform inside the support plate slab. Points are
//!   not rejected when they fall in a hole void.
//! - [`Region::Module`] — uniform inside a thin slab near the back face of
//!   one module, with the module chosen uniformly at random.
//!
//! Generators hold no mutable state. The random source belongs to the
//! caller, so concurrent callers each bring their own.

use std::fmt;
use std::str::FromStr;

use log::trace;
use nalgebra::Vector3;
use rand::Rng;
use thiserror::Error;
use tplane_geometry::grid::ModulePosition;
use tplane_geometry::sampling::BoxPointSampler;
use tplane_geometry::GeometryError;

/// Fraction of the module thickness covered by the sampling slab.
pub const MODULE_SLAB_FRACTION: f64 = 0.1;
/// Offset of the slab centre above the module mid-plane, in module thicknesses.
pub const MODULE_SLAB_OFFSET: f64 = 0.4;

/// Errors from vertex generation.
#[derive(Debug, Error, PartialEq)]
pub enum VertexError {
    #[error("[{component}] {operation}: unknown vertex generation region '{region}'")]
    UnknownRegion {
        component: &'static str,
        operation: &'static str,
        region: String,
    },

    #[error("[{component}] {operation}: geometry has not been constructed")]
    NotConstructed {
        component: &'static str,
        operation: &'static str,
    },

    #[error("Module region needs at least one module position")]
    EmptyTranslationSet,

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Named vertex generation regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Plate,
    Module,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Plate, Region::Module];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Plate => "PLATE",
            Region::Module => "MODULE",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Region {
    type Err = VertexError;

    /// Accepts `PLATE` / `MODULE` and the legacy `TRK_SUPPORT` / `DICE_BOARD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLATE" | "TRK_SUPPORT" => Ok(Region::Plate),
            "MODULE" | "DICE_BOARD" => Ok(Region::Module),
            other => Err(VertexError::UnknownRegion {
                component: "VertexGenerator",
                operation: "generate",
                region: other.to_string(),
            }),
        }
    }
}

/// A sampling region with its own parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingRegion {
    Plate(BoxPointSampler),
    Module(ModuleSlab),
}

/// Slab sampler shared by every module, plus the module translations.
///
/// Only built through [`SamplingRegion::module`], so the translation set is
/// never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSlab {
    sampler: BoxPointSampler,
    translations: Vec<ModulePosition>,
}

impl ModuleSlab {
    pub fn sampler(&self) -> &BoxPointSampler {
        &self.sampler
    }

    pub fn translations(&self) -> &[ModulePosition] {
        &self.translations
    }

    fn generate<R: Rng>(&self, rng: &mut R) -> Vector3<f64> {
        let local = self.sampler.sample(rng);
        let chosen = &self.translations[rng.random_range(0..self.translations.len())];
        local + Vector3::new(chosen.x, chosen.y, 0.0)
    }
}

impl SamplingRegion {
    /// Plate slab centred at `plate_z`.
    ///
    /// The box is given edge lengths `(side/2, side/2, thickness)`.
    pub fn plate(side: f64, thickness: f64, plate_z: f64) -> Result<Self, VertexError> {
        let sampler = BoxPointSampler::new(
            Vector3::new(side / 2.0, side / 2.0, thickness),
            Vector3::new(0.0, 0.0, plate_z),
        )?;
        Ok(SamplingRegion::Plate(sampler))
    }

    /// Thin slab near the back face of a module whose mid-plane is at
    /// `module_z`, translated to each of `translations`.
    pub fn module(
        dimensions: Vector3<f64>,
        module_z: f64,
        translations: Vec<ModulePosition>,
    ) -> Result<Self, VertexError> {
        if translations.is_empty() {
            return Err(VertexError::EmptyTranslationSet);
        }
        let thickness = dimensions.z;
        let sampler = BoxPointSampler::new(
            Vector3::new(dimensions.x, dimensions.y, thickness * MODULE_SLAB_FRACTION),
            Vector3::new(0.0, 0.0, module_z + thickness * MODULE_SLAB_OFFSET),
        )?;
        Ok(SamplingRegion::Module(ModuleSlab {
            sampler,
            translations,
        }))
    }

    pub fn region(&self) -> Region {
        match self {
            SamplingRegion::Plate(_) => Region::Plate,
            SamplingRegion::Module(_) => Region::Module,
        }
    }

    /// Draw one vertex.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Vector3<f64> {
        match self {
            SamplingRegion::Plate(sampler) => sampler.sample(rng),
            SamplingRegion::Module(slab) => slab.generate(rng),
        }
    }
}

/// The configured plate and module regions.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexGenerator {
    plate: SamplingRegion,
    module: SamplingRegion,
}

impl VertexGenerator {
    pub fn new(plate: SamplingRegion, module: SamplingRegion) -> Self {
        Self { plate, module }
    }

    pub fn region(&self, region: Region) -> &SamplingRegion {
        match region {
            Region::Plate => &self.plate,
            Region::Module => &self.module,
        }
    }

    /// Draw one vertex in `region`.
    pub fn generate<R: Rng>(&self, region: Region, rng: &mut R) -> Vector3<f64> {
        let vertex = self.region(region).generate(rng);
        trace!("{} vertex: ({:.3}, {:.3}, {:.3})", region, vertex.x, vertex.y, vertex.z);
        vertex
    }

    /// Draw one vertex in the region called `name`.
    pub fn generate_named<R: Rng>(&self, name: &str, rng: &mut R) -> Result<Vector3<f64>, VertexError> {
        let region: Region = name.parse()?;
        Ok(self.generate(region, rng))
    }
}
