//! Axis-aligned cuboid primitive.
//!
//! The support plate, its holes and the sampling regions are all boxes, so a
//! single primitive is enough. A cuboid is described by its centre and its
//! half-extents along x, y and z.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{require_positive, GeometryError};

/// An axis-aligned cuboid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cuboid {
    /// Centre position (mm).
    pub centre: Vector3<f64>,
    /// Half-extents along x, y, z (mm).
    pub half_extents: Vector3<f64>,
}

impl Cuboid {
    /// Create a cuboid centred at the origin.
    pub fn centred(hx: f64, hy: f64, hz: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            centre: Vector3::zeros(),
            half_extents: Vector3::new(
                require_positive("half_x", hx)?,
                require_positive("half_y", hy)?,
                require_positive("half_z", hz)?,
            ),
        })
    }

    /// The same cuboid moved by `offset`.
    pub fn translated(&self, offset: &Vector3<f64>) -> Self {
        Self {
            centre: self.centre + offset,
            half_extents: self.half_extents,
        }
    }

    /// Check whether a point lies inside (or on the surface of) this cuboid.
    pub fn contains(&self, point: &Vector3<f64>) -> bool {
        let d = point - self.centre;
        d.x.abs() <= self.half_extents.x
            && d.y.abs() <= self.half_extents.y
            && d.z.abs() <= self.half_extents.z
    }

    /// Enclosed volume (mm³).
    pub fn volume(&self) -> f64 {
        8.0 * self.half_extents.x * self.half_extents.y * self.half_extents.z
    }

    /// Axis-aligned bounding box: returns (min_corner, max_corner).
    pub fn bounding_box(&self) -> (Vector3<f64>, Vector3<f64>) {
        (
            self.centre - self.half_extents,
            self.centre + self.half_extents,
        )
    }

    /// Volume shared with another cuboid; zero when they are disjoint.
    pub fn intersection_volume(&self, other: &Cuboid) -> f64 {
        let (a_min, a_max) = self.bounding_box();
        let (b_min, b_max) = other.bounding_box();
        (0..3)
            .map(|i| (a_max[i].min(b_max[i]) - a_min[i].max(b_min[i])).max(0.0))
            .product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contains_boundary_and_outside() {
        let c = Cuboid::centred(1.0, 2.0, 3.0).unwrap();
        assert!(c.contains(&Vector3::new(1.0, -2.0, 3.0)));
        assert!(!c.contains(&Vector3::new(1.01, 0.0, 0.0)));

        let moved = c.translated(&Vector3::new(10.0, 0.0, 0.0));
        assert!(moved.contains(&Vector3::new(10.5, 0.0, 0.0)));
        assert!(!moved.contains(&Vector3::zeros()));
    }

    #[test]
    fn test_volume() {
        let c = Cuboid::centred(80.0, 80.0, 6.0).unwrap();
        assert_relative_eq!(c.volume(), 160.0 * 160.0 * 12.0);
    }

    #[test]
    fn test_intersection_volume() {
        let plate = Cuboid::centred(5.0, 5.0, 1.0).unwrap();
        // Taller than the plate: only the plate's thickness counts.
        let hole = Cuboid::centred(1.0, 1.0, 3.0).unwrap();
        assert_relative_eq!(plate.intersection_volume(&hole), 2.0 * 2.0 * 2.0);

        let far = hole.translated(&Vector3::new(20.0, 0.0, 0.0));
        assert_eq!(plate.intersection_volume(&far), 0.0);
    }

    #[test]
    fn test_rejects_non_positive_extent() {
        let err = Cuboid::centred(1.0, 0.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            GeometryError::InvalidDimension { name: "half_y", value: 0.0 }
        );
    }
}
