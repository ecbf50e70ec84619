use std::f64::consts::PI;

/// Area of the intersection of a star-centered disk of radius `r` and the planet disk of radius
/// `p` whose center is at distance `z` from the star center
pub(super) fn overlap_area(r: f64, p: f64, z: f64) -> f64 {
    if z >= r + p {
        return 0.0;
    }
    if z <= (r - p).abs() {
        let min = r.min(p);
        return PI * min * min;
    }
    let r2 = r * r;
    let p2 = p * p;
    let z2 = z * z;
    let kappa_r = ((z2 + r2 - p2) / (2.0 * z * r)).clamp(-1.0, 1.0).acos();
    let kappa_p = ((z2 + p2 - r2) / (2.0 * z * p)).clamp(-1.0, 1.0).acos();
    let d = (-z + r + p) * (z + r - p) * (z - r + p) * (z + r + p);
    r2 * kappa_r + p2 * kappa_p - 0.5 * d.max(0.0).sqrt()
}

/// Quadratic limb-darkening law, unity at the disk center
#[inline]
pub(super) fn quadratic_intensity(r: f64, u1: f64, u2: f64) -> f64 {
    let one_minus_mu = 1.0 - (1.0 - r * r).max(0.0).sqrt();
    1.0 - u1 * one_minus_mu - u2 * one_minus_mu * one_minus_mu
}

/// Total flux of the limb-darkened unit disk
#[inline]
pub(super) fn quadratic_total_flux(u1: f64, u2: f64) -> f64 {
    PI * (1.0 - u1 / 3.0 - u2 / 6.0)
}

/// Fraction of the stellar flux blocked by the planet
///
/// The star is split into `nannuli` concentric annuli over the radii touched by the planet,
/// each annulus contributes its mid-radius intensity times the planet-covered part of its area.
pub(super) fn blocked_fraction(z: f64, p: f64, u1: f64, u2: f64, nannuli: usize) -> f64 {
    if p <= 0.0 || z >= 1.0 + p {
        return 0.0;
    }
    let r_min = (z - p).max(0.0);
    let r_max = (z + p).min(1.0);
    let dr = (r_max - r_min) / nannuli as f64;
    let mut area_inner = overlap_area(r_min, p, z);
    let mut blocked = 0.0;
    for k in 0..nannuli {
        let r_outer = r_min + (k + 1) as f64 * dr;
        let area_outer = overlap_area(r_outer, p, z);
        let r_mid = r_outer - 0.5 * dr;
        blocked += quadratic_intensity(r_mid, u1, u2) * (area_outer - area_inner);
        area_inner = area_outer;
    }
    blocked / quadratic_total_flux(u1, u2)
}
