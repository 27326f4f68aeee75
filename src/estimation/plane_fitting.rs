//! Plane fitting from range sensor returns
//!
//! Converts spherical sensor returns to Cartesian points and fits the
//! ground model z = a + b * x + c * y by least squares.

use nalgebra::{DMatrix, DVector};

use crate::common::error::{EstimationError, EstimationResult};
use crate::common::types::Point3D;
use crate::estimation::least_squares;

/// Convert a spherical sensor return to Cartesian coordinates.
///
/// `elevation` is measured up from the x-y plane, `azimuth` around the
/// z axis from the x axis.
pub fn spherical_to_cartesian(elevation: f64, azimuth: f64, range: f64) -> Point3D {
    Point3D::new(
        range * elevation.cos() * azimuth.cos(),
        range * elevation.cos() * azimuth.sin(),
        range * elevation.sin(),
    )
}

/// Fit z = a + b * x + c * y to a point cloud, returning (a, b, c).
pub fn fit_plane(points: &[Point3D]) -> EstimationResult<(f64, f64, f64)> {
    if points.len() < 3 {
        return Err(EstimationError::InvalidParameter(
            "plane fit needs at least three points".to_string(),
        ));
    }
    let h = DMatrix::from_fn(points.len(), 3, |i, j| match j {
        0 => 1.0,
        1 => points[i].x,
        _ => points[i].y,
    });
    let z = DVector::from_fn(points.len(), |i, _| points[i].z);
    let solution = least_squares::fit(&h, &z)?;
    Ok((solution[0], solution[1], solution[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_spherical_to_cartesian_axes() {
        let p = spherical_to_cartesian(0.0, 0.0, 5.0);
        assert!((p.x - 5.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);

        let p = spherical_to_cartesian(PI / 2.0, 0.0, 5.0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.z - 5.0).abs() < 1e-12);

        let p = spherical_to_cartesian(0.0, PI / 2.0, 2.0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_plane_exact() {
        // Points on z = 1 + 2x + 3y
        let points = [
            Point3D::new(0.0, 0.0, 1.0),
            Point3D::new(1.0, 0.0, 3.0),
            Point3D::new(0.0, 1.0, 4.0),
            Point3D::new(1.0, 1.0, 6.0),
            Point3D::new(2.0, 1.0, 8.0),
        ];
        let (a, b, c) = fit_plane(&points).unwrap();
        assert!((a - 1.0).abs() < 1e-9);
        assert!((b - 2.0).abs() < 1e-9);
        assert!((c - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_plane_through_sensor_frame() {
        // Flat floor one unit below the sensor seen at different angles
        let returns = [
            (-PI / 4.0, 0.0),
            (-PI / 4.0, PI / 2.0),
            (-PI / 3.0, PI / 4.0),
            (-PI / 6.0, -PI / 3.0),
        ];
        let points: Vec<Point3D> = returns
            .iter()
            .map(|&(elevation, azimuth)| {
                let range = 1.0 / (-elevation).sin();
                spherical_to_cartesian(elevation, azimuth, range)
            })
            .collect();
        let (a, b, c) = fit_plane(&points).unwrap();
        assert!((a + 1.0).abs() < 1e-9);
        assert!(b.abs() < 1e-9);
        assert!(c.abs() < 1e-9);
    }

    #[test]
    fn test_fit_plane_rejects_collinear_points() {
        let points = [
            Point3D::new(0.0, 0.0, 1.0),
            Point3D::new(6.0, 6.0, 31.0),
            Point3D::new(8.0, 8.0, 41.0),
            Point3D::new(14.0, 14.0, 71.0),
        ];
        assert!(matches!(
            fit_plane(&points),
            Err(EstimationError::NumericalError(_))
        ));
    }

    #[test]
    fn test_fit_plane_rejects_too_few_points() {
        let points = [Point3D::new(0.0, 0.0, 0.0), Point3D::new(1.0, 0.0, 0.0)];
        assert!(fit_plane(&points).is_err());
    }
}
