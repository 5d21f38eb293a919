//! Uniform random points inside an axis-aligned box.

use nalgebra::Vector3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{require_positive, GeometryError};

/// Draws points uniformly inside a box.
///
/// `dimensions` are full edge lengths, not half-extents: each coordinate is
/// drawn from `origin ± length / 2`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPointSampler {
    dimensions: Vector3<f64>,
    origin: Vector3<f64>,
}

impl BoxPointSampler {
    pub fn new(dimensions: Vector3<f64>, origin: Vector3<f64>) -> Result<Self, GeometryError> {
        require_positive("sampler_x", dimensions.x)?;
        require_positive("sampler_y", dimensions.y)?;
        require_positive("sampler_z", dimensions.z)?;
        Ok(Self { dimensions, origin })
    }

    /// Full edge lengths (mm).
    pub fn dimensions(&self) -> &Vector3<f64> {
        &self.dimensions
    }

    /// Box centre (mm).
    pub fn origin(&self) -> &Vector3<f64> {
        &self.origin
    }

    /// Draw one point inside the box.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Vector3<f64> {
        let unit = Vector3::new(
            rng.random::<f64>() - 0.5,
            rng.random::<f64>() - 0.5,
            rng.random::<f64>() - 0.5,
        );
        self.origin + unit.component_mul(&self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_points_stay_inside() {
        let sampler =
            BoxPointSampler::new(Vector3::new(2.0, 4.0, 0.5), Vector3::new(1.0, -1.0, 10.0))
                .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5_000 {
            let p = sampler.sample(&mut rng);
            assert!((p.x - 1.0).abs() <= 1.0);
            assert!((p.y + 1.0).abs() <= 2.0);
            assert!((p.z - 10.0).abs() <= 0.25);
        }
    }

    #[test]
    fn test_mean_is_origin() {
        let origin = Vector3::new(3.0, 0.0, -2.0);
        let sampler = BoxPointSampler::new(Vector3::new(6.0, 6.0, 6.0), origin).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let mean = (0..n).fold(Vector3::zeros(), |acc, _| acc + sampler.sample(&mut rng)) / n as f64;
        // Standard error per axis is 6 / sqrt(12 n) ~ 0.012.
        assert_relative_eq!(mean.x, origin.x, epsilon = 0.08);
        assert_relative_eq!(mean.y, origin.y, epsilon = 0.08);
        assert_relative_eq!(mean.z, origin.z, epsilon = 0.08);
    }

    #[test]
    fn test_rejects_flat_box() {
        assert!(BoxPointSampler::new(Vector3::new(1.0, 1.0, 0.0), Vector3::zeros()).is_err());
    }
}
