//! Small astrophysical helpers

use crate::error::ModelError;

use std::f64::consts::PI;

/// Gravitational constant, m^3 / (kg s^2)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67e-11;

const SECONDS_PER_DAY: f64 = 86400.0;

/// Mean stellar density in g/cm^3 from the orbital period in days and the semi-major axis in
/// stellar radii, Kepler's third law with a negligible planet mass
pub fn stellar_density(period: f64, a: f64) -> Result<f64, ModelError> {
    if !(period.is_finite() && period > 0.0 && a.is_finite() && a > 0.0) {
        return Err(ModelError::geometry(
            "period and semi-major axis must be positive",
            [("period", period), ("a", a)],
        ));
    }
    let period = period * SECONDS_PER_DAY;
    // kg/m^3 to g/cm^3
    Ok(3.0 * PI / GRAVITATIONAL_CONSTANT / period.powi(2) * a.powi(3) / 1000.0)
}

/// Orbital inclination in degrees from the impact parameter and the semi-major axis
pub fn inclination(b: f64, a: f64) -> Result<f64, ModelError> {
    if !(a.is_finite() && a > 0.0 && b.is_finite() && b >= 0.0) {
        return Err(ModelError::geometry(
            "semi-major axis must be positive and impact parameter non-negative",
            [("b", b), ("a", a)],
        ));
    }
    if b >= a {
        return Err(ModelError::geometry(
            "impact parameter must be smaller than semi-major axis, inclination is undefined",
            [("b", b), ("a", a)],
        ));
    }
    Ok((b / a).acos().to_degrees())
}

/// Total transit duration (first to fourth contact) in units of `period` for a circular orbit
///
/// Zero when the planet misses the stellar disk, `b >= 1 + radius`.
pub fn transit_duration(period: f64, radius: f64, a: f64, b: f64) -> Result<f64, ModelError> {
    inclination(b, a)?;
    let sin_i = (1.0 - (b / a).powi(2)).sqrt();
    if !(period.is_finite() && period > 0.0 && radius.is_finite() && radius >= 0.0) {
        return Err(ModelError::geometry(
            "period must be positive and radius non-negative",
            [("period", period), ("radius", radius)],
        ));
    }
    let chord2 = (1.0 + radius).powi(2) - b * b;
    if chord2 <= 0.0 {
        return Ok(0.0);
    }
    let arg = (chord2.sqrt() / (a * sin_i)).min(1.0);
    Ok(period / PI * arg.asin())
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn sun_density() {
        assert_relative_eq!(stellar_density(365.25, 215.0).unwrap(), 1.41011, max_relative = 1e-5);
        assert_relative_eq!(stellar_density(3.14, 10.0).unwrap(), 1.91981, max_relative = 1e-5);
        assert!(stellar_density(0.0, 10.0).is_err());
    }

    #[test]
    fn inclination_of_central_transit() {
        assert_relative_eq!(inclination(0.0, 10.0).unwrap(), 90.0);
        assert_relative_eq!(inclination(5.0, 10.0).unwrap(), 60.0, max_relative = 1e-12);
        let err = inclination(12.0, 10.0).unwrap_err();
        assert!(err.to_string().contains("b = 12, a = 10"));
    }

    #[test]
    fn earth_transit_duration() {
        let hours = 24.0 * transit_duration(365.25, 0.0092, 215.0, 0.0).unwrap();
        assert_relative_eq!(hours, 13.0976, max_relative = 1e-4);
        assert_relative_eq!(
            transit_duration(3.14, 0.1, 10.0, 0.3).unwrap(),
            0.106023,
            max_relative = 1e-5
        );
        assert_eq!(transit_duration(3.14, 0.1, 10.0, 1.2).unwrap(), 0.0);
    }
}
