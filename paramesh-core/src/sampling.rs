//! Axis sampling shared by curves and surfaces.

use crate::error::{GeometryError, Result};

/// Upper bound on the number of samples taken along one parameter axis.
pub const MAX_SAMPLES_PER_AXIS: usize = 1 << 20;

/// A sample closer to the bound than this fraction of a step counts as
/// landing on the bound. Absorbs the rounding of `min + i * step` when the
/// span is a whole number of steps that are not exact in `f32`.
const BOUND_SNAP: f32 = 1e-3;

/// Reject non-finite bounds and non-positive steps.
pub(crate) fn check_axis(axis: &str, min: f32, max: f32, step: f32) -> Result<()> {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) {
        return Err(GeometryError::config(format!(
            "{axis} axis has non-finite bounds ({min}, {max}, step {step})"
        )));
    }
    if step <= 0.0 {
        return Err(GeometryError::config(format!(
            "{axis} step must be positive, got {step}"
        )));
    }
    Ok(())
}

/// Count the leading samples `min + i * step` accepted by `keep`.
///
/// Parameters are computed from the index rather than accumulated so that
/// the same sample is produced wherever it is requested.
pub(crate) fn count_while(axis: &str, min: f32, step: f32, keep: impl Fn(f32) -> bool) -> Result<usize> {
    let mut count = 0usize;
    while keep(param_at(min, step, count)) {
        count += 1;
        if count > MAX_SAMPLES_PER_AXIS {
            return Err(GeometryError::config(format!(
                "{axis} axis needs more than {MAX_SAMPLES_PER_AXIS} samples (step {step})"
            )));
        }
    }
    Ok(count)
}

/// Samples strictly below `max`: the number of cells on a surface axis.
pub(crate) fn count_below(axis: &str, min: f32, max: f32, step: f32) -> Result<usize> {
    let limit = max - step * BOUND_SNAP;
    count_while(axis, min, step, |p| p < limit)
}

/// Samples up to and including `max`: the points of a curve.
pub(crate) fn count_through(axis: &str, min: f32, max: f32, step: f32) -> Result<usize> {
    let limit = max + step * BOUND_SNAP;
    count_while(axis, min, step, |p| p <= limit)
}

#[inline]
pub(crate) fn param_at(min: f32, step: f32, index: usize) -> f32 {
    min + index as f32 * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_positive_step() {
        assert!(check_axis("u", 0.0, 1.0, 0.0).is_err());
        assert!(check_axis("u", 0.0, 1.0, -0.5).is_err());
        assert!(check_axis("u", 0.0, 1.0, 0.5).is_ok());
    }

    #[test]
    fn test_rejects_non_finite_bounds() {
        assert!(check_axis("v", f32::NAN, 1.0, 0.1).is_err());
        assert!(check_axis("v", 0.0, f32::INFINITY, 0.1).is_err());
    }

    #[test]
    fn test_count_inclusive_and_exclusive() {
        assert_eq!(count_while("t", 0.0, 3.0, |t| t <= 10.0).unwrap(), 4);
        assert_eq!(count_while("t", 0.0, 5.0, |t| t <= 10.0).unwrap(), 3);
        assert_eq!(count_while("u", 0.0, 5.0, |u| u < 10.0).unwrap(), 2);
    }

    #[test]
    fn test_rounded_steps_land_on_the_bound() {
        assert_eq!(count_below("u", 0.0, 0.3, 0.1).unwrap(), 3);
        assert_eq!(count_through("t", 0.0, 0.3, 0.1).unwrap(), 4);
        assert_eq!(count_below("u", 0.0, 3.3, 1.1).unwrap(), 3);
        assert_eq!(count_through("t", 0.0, 3.3, 1.1).unwrap(), 4);
        assert_eq!(count_below("u", -0.5, 0.5, 0.2).unwrap(), 5);
    }

    #[test]
    fn test_count_guards_runaway_axis() {
        let err = count_while("u", 0.0, 1e-9, |u| u < 1.0).unwrap_err();
        assert!(matches!(err, GeometryError::Configuration(_)));
    }
}
