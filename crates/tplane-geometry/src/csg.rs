//! Perforated support plate built by constructive solid geometry.
//!
//! The plate is a cuboid with one cuboid hole cut out per module position.
//! Instead of chaining one named subtraction per hole, the
//! [`CompositeSolidBuilder`] collects the hole translations and then
//! produces a single [`CompositeSolid`].
//!
//! Holes are assumed to be disjoint, which the module grid spacing
//! guarantees. The resulting shape therefore does not depend on subtraction
//! order. The order is kept only so that hole identities are deterministic.

use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::grid::ModulePosition;
use crate::primitives::Cuboid;
use crate::{require_positive, GeometryError};

/// Dimensions of the base plate and of the hole shared by all modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidDescriptor {
    /// Name given to the finished solid.
    pub name: String,
    /// Full side length of the square plate (mm).
    pub side: f64,
    /// Full plate thickness (mm).
    pub thickness: f64,
    /// Full side length of each square hole (mm).
    pub hole_side: f64,
    /// How far each hole extends past either plate face (mm).
    pub hole_margin: f64,
}

/// A base solid with a list of translated hole cut-outs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeSolid {
    name: String,
    base: Cuboid,
    hole: Cuboid,
    hole_centres: Vec<Vector3<f64>>,
}

impl CompositeSolid {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The uncut plate.
    pub fn base(&self) -> &Cuboid {
        &self.base
    }

    /// The hole shape, centred at the origin.
    pub fn hole_template(&self) -> &Cuboid {
        &self.hole
    }

    /// Hole centres in subtraction order.
    pub fn hole_centres(&self) -> &[Vector3<f64>] {
        &self.hole_centres
    }

    /// Iterate over the holes as placed cuboids.
    pub fn holes(&self) -> impl Iterator<Item = Cuboid> + '_ {
        self.hole_centres
            .iter()
            .map(move |centre| self.hole.translated(centre))
    }

    /// Check whether a point lies in plate material, i.e. inside the base
    /// and outside every hole.
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        self.base.contains(point) && !self.holes().any(|hole| hole.contains(point))
    }

    /// Material volume (mm³): the base minus each hole's overlap with it.
    pub fn volume(&self) -> f64 {
        let removed: f64 = self
            .holes()
            .map(|hole| self.base.intersection_volume(&hole))
            .sum();
        self.base.volume() - removed
    }

    /// Bounding box of the composite, which is that of the base.
    pub fn bounding_box(&self) -> (Vector3<f64>, Vector3<f64>) {
        self.base.bounding_box()
    }
}

/// Collects hole translations and finalises them into one [`CompositeSolid`].
#[derive(Debug, Clone)]
pub struct CompositeSolidBuilder {
    name: String,
    base: Cuboid,
    hole: Cuboid,
    hole_centres: Vec<Vector3<f64>>,
}

impl CompositeSolidBuilder {
    /// Build the base and hole shapes from `descriptor`.
    ///
    /// The hole footprint must be strictly smaller than the plate footprint.
    pub fn new(descriptor: SolidDescriptor) -> Result<Self, GeometryError> {
        let side = require_positive("side", descriptor.side)?;
        let thickness = require_positive("thickness", descriptor.thickness)?;
        let hole_side = require_positive("hole_side", descriptor.hole_side)?;
        if !(descriptor.hole_margin.is_finite() && descriptor.hole_margin >= 0.0) {
            return Err(GeometryError::InvalidDimension {
                name: "hole_margin",
                value: descriptor.hole_margin,
            });
        }
        if hole_side >= side {
            return Err(GeometryError::InvalidHole { hole_side, plate_side: side });
        }

        Ok(Self {
            name: descriptor.name,
            base: Cuboid::centred(side / 2.0, side / 2.0, thickness / 2.0)?,
            hole: Cuboid::centred(
                hole_side / 2.0,
                hole_side / 2.0,
                thickness / 2.0 + descriptor.hole_margin,
            )?,
            hole_centres: Vec::new(),
        })
    }

    /// Queue one hole at `translation` (plate-local frame).
    pub fn subtract(mut self, translation: Vector3<f64>) -> Self {
        self.hole_centres.push(translation);
        self
    }

    /// Queue one hole per module position, at z = 0 in the plate frame.
    pub fn subtract_all(self, positions: &[ModulePosition]) -> Self {
        positions
            .iter()
            .fold(self, |builder, p| builder.subtract(Vector3::new(p.x, p.y, 0.0)))
    }

    /// Number of holes queued so far.
    pub fn hole_count(&self) -> usize {
        self.hole_centres.len()
    }

    /// Finalise the composite solid. Placement is left to the caller.
    pub fn build(self) -> CompositeSolid {
        debug!(
            "Built composite solid '{}' with {} holes",
            self.name,
            self.hole_centres.len()
        );
        CompositeSolid {
            name: self.name,
            base: self.base,
            hole: self.hole,
            hole_centres: self.hole_centres,
        }
    }
}
