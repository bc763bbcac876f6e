//! Parametric curve sampling.
use nalgebra::Point3;
use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::geometry::Polyline;
use crate::sampling::{check_axis, count_through, param_at};

/// A one-argument parametric function sampled over `[min_t, max_t]`.
///
/// Samples are taken at `min_t + i * step_t` while the parameter does not
/// exceed `max_t`; when the interval is not a multiple of the step the last
/// segment ends short of `max_t`. A sample within rounding of `max_t` is
/// kept.
pub struct ParametricCurve<F> {
    f: F,
    min_t: f32,
    max_t: f32,
    step_t: f32,
    samples: usize,
}

impl<F> ParametricCurve<F>
where
    F: Fn(f32) -> Point3<f32>,
{
    pub fn new(f: F, min_t: f32, max_t: f32, step_t: f32) -> Result<Self> {
        check_axis("t", min_t, max_t, step_t)?;
        if max_t < min_t {
            return Err(GeometryError::config(format!(
                "empty t domain [{min_t}, {max_t}]"
            )));
        }
        let samples = count_through("t", min_t, max_t, step_t)?;
        Ok(Self {
            f,
            min_t,
            max_t,
            step_t,
            samples,
        })
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn bounds(&self) -> (f32, f32) {
        (self.min_t, self.max_t)
    }

    /// Evaluate the function at every sample parameter.
    pub fn sample(&self) -> Polyline {
        let points: Vec<Point3<f32>> = (0..self.samples)
            .map(|i| (self.f)(param_at(self.min_t, self.step_t, i)))
            .collect();
        debug!(points = points.len(), "sampled parametric curve");
        Polyline::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stops_before_overshooting_max() {
        let curve = ParametricCurve::new(|t| Point3::new(t, 0.0, 0.0), 0.0, 10.0, 3.0).unwrap();
        let line = curve.sample();
        let ts: Vec<f32> = line.points.iter().map(|p| p.x).collect();
        assert_eq!(ts, vec![0.0, 3.0, 6.0, 9.0]);
    }

    #[test]
    fn test_includes_max_when_reached_exactly() {
        let curve = ParametricCurve::new(|t| Point3::new(0.0, t, 0.0), 0.0, 1.0, 0.25).unwrap();
        let line = curve.sample();
        assert_eq!(line.len(), 5);
        assert_relative_eq!(line.points[4].y, 1.0);
    }

    #[test]
    fn test_circle_samples_lie_on_radius() {
        let r = 2.5;
        let curve = ParametricCurve::new(
            |t: f32| {
                let a = t.to_radians();
                Point3::new(r * a.cos(), r * a.sin(), 0.0)
            },
            0.0,
            360.0,
            10.0,
        )
        .unwrap();
        let line = curve.sample();
        assert_eq!(line.len(), 37);
        for p in &line.points {
            assert_relative_eq!(p.coords.norm(), r, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_single_point_domain() {
        let curve = ParametricCurve::new(|t| Point3::new(t, t, t), 2.0, 2.0, 1.0).unwrap();
        let line = curve.sample();
        assert_eq!(line.len(), 1);
        assert!(line.is_degenerate());
    }

    #[test]
    fn test_rejects_bad_step_and_empty_domain() {
        let f = |t: f32| Point3::new(t, 0.0, 0.0);
        assert!(matches!(
            ParametricCurve::new(f, 0.0, 1.0, 0.0),
            Err(GeometryError::Configuration(_))
        ));
        assert!(matches!(
            ParametricCurve::new(f, 0.0, 1.0, -1.0),
            Err(GeometryError::Configuration(_))
        ));
        assert!(matches!(
            ParametricCurve::new(f, 1.0, 0.0, 0.1),
            Err(GeometryError::Configuration(_))
        ));
    }
}
