//! # Tracking-plane Geometry
//!
//! Geometry building blocks for the tracking plane. This crate provides:
//!
//! - **Primitives** ([`primitives`]) — Axis-aligned cuboids with containment,
//!   volume and bounding-box queries.
//! - **Module grid** ([`grid`]) — Centred column/row placement of sensor
//!   modules ("dice boards").
//! - **Composite solids** ([`csg`]) — A base plate with one hole subtracted
//!   per module position.
//! - **Point sampling** ([`sampling`]) — Uniform random points inside a box.
//!
//! All lengths are in millimetres.

pub mod csg;
pub mod grid;
pub mod primitives;
pub mod sampling;

use thiserror::Error;

/// Errors raised while building tracking-plane geometry.
///
/// All of these signal a configuration bug rather than bad runtime data, so
/// callers abort the build instead of retrying.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("Number of modules ({expected}) doesn't match the number of positions calculated ({computed})")]
    TopologyMismatch { expected: usize, computed: usize },

    #[error("Hole side {hole_side} mm must be strictly smaller than plate side {plate_side} mm")]
    InvalidHole { hole_side: f64, plate_side: f64 },

    #[error("Dimension '{name}' must be finite and positive, got {value}")]
    InvalidDimension { name: &'static str, value: f64 },
}

/// Check that a length is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<f64, GeometryError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(GeometryError::InvalidDimension { name, value })
    }
}
