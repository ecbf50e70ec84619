use ndarray::{Array2, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Photon flux of a zero magnitude star, photons/s/m^2 (very approximate)
pub const ZERO_MAGNITUDE_FLUX: f64 = 1.0e10;

/// A star in the field of view
///
/// Position is in pixels relative to the field center.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub magnitude: f64,
}

impl Star {
    pub fn new(x: f64, y: f64, magnitude: f64) -> Self {
        Self { x, y, magnitude }
    }

    /// Photons/s/m^2
    pub fn photon_flux(&self) -> f64 {
        ZERO_MAGNITUDE_FLUX * 10f64.powf(-0.4 * self.magnitude)
    }
}

/// Telescope settings for [simulate_optics]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct OpticsSettings {
    /// m^2
    pub collecting_area: f64,
    /// arcsec/pixel
    pub pixel_scale: f64,
    /// Field of view, arcsec
    pub fov: f64,
    /// Diffuse sky brightness, photons/s/arcsec^2
    pub background: f64,
    /// Standard deviation of the Gaussian PSF, pixels
    pub psf_sigma: f64,
}

impl OpticsSettings {
    pub fn new(
        collecting_area: f64,
        pixel_scale: f64,
        fov: f64,
        background: f64,
        psf_sigma: f64,
    ) -> Self {
        assert!(collecting_area >= 0.0, "collecting_area must be non-negative");
        assert!(pixel_scale > 0.0, "pixel_scale must be positive");
        assert!(fov > 0.0, "fov must be positive");
        assert!(psf_sigma > 0.0, "psf_sigma must be positive");
        Self {
            collecting_area,
            pixel_scale,
            fov,
            background,
            psf_sigma,
        }
    }

    #[inline]
    pub fn default_collecting_area() -> f64 {
        1.0
    }

    #[inline]
    pub fn default_pixel_scale() -> f64 {
        21.0
    }

    #[inline]
    pub fn default_fov() -> f64 {
        3.0 * 60.0
    }

    #[inline]
    pub fn default_background() -> f64 {
        0.0
    }

    #[inline]
    pub fn default_psf_sigma() -> f64 {
        1.0
    }

    /// Half size of the square image, pixels
    pub fn half_size(&self) -> usize {
        (0.5 * self.fov / self.pixel_scale).ceil() as usize
    }
}

impl Default for OpticsSettings {
    fn default() -> Self {
        Self::new(
            Self::default_collecting_area(),
            Self::default_pixel_scale(),
            Self::default_fov(),
            Self::default_background(),
            Self::default_psf_sigma(),
        )
    }
}

/// Noiseless image of the photon flux hitting the detector, photons/s/pixel
///
/// The image is `2 h x 2 h` pixels for the half size `h`, pixel `[[i, j]]` is at
/// `(x, y) = (j - h, i - h)` relative to the field center.
pub fn simulate_optics(stars: &[Star], settings: &OpticsSettings) -> Array2<f64> {
    let half = settings.half_size();
    let size = 2 * half;
    let sigma2 = settings.psf_sigma.powi(2);
    let norm = 1.0 / (2.0 * PI * sigma2);
    let sky = settings.background * settings.pixel_scale.powi(2);
    let fluxes: Vec<_> = stars.iter().map(Star::photon_flux).collect();
    Array2::from_shape_fn((size, size), |(i, j)| {
        let x = j as f64 - half as f64;
        let y = i as f64 - half as f64;
        let stars: f64 = stars
            .iter()
            .zip(&fluxes)
            .map(|(star, &flux)| {
                let r2 = (x - star.x).powi(2) + (y - star.y).powi(2);
                flux * norm * (-0.5 * r2 / sigma2).exp()
            })
            .sum();
        (sky + stars) * settings.collecting_area
    })
}

/// Detector settings for [simulate_detector]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct DetectorSettings {
    /// Exposure time, s
    pub exposure_time: f64,
    /// Fraction of recorded photons
    pub quantum_efficiency: f64,
    /// photons/pixel/exposure
    pub read_noise: f64,
}

impl DetectorSettings {
    pub fn new(exposure_time: f64, quantum_efficiency: f64, read_noise: f64) -> Self {
        assert!(exposure_time >= 0.0, "exposure_time must be non-negative");
        assert!(
            (0.0..=1.0).contains(&quantum_efficiency),
            "quantum_efficiency must be in [0, 1]"
        );
        assert!(read_noise >= 0.0, "read_noise must be non-negative");
        Self {
            exposure_time,
            quantum_efficiency,
            read_noise,
        }
    }

    #[inline]
    pub fn default_exposure_time() -> f64 {
        1.0
    }

    #[inline]
    pub fn default_quantum_efficiency() -> f64 {
        1.0
    }

    #[inline]
    pub fn default_read_noise() -> f64 {
        10.0
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self::new(
            Self::default_exposure_time(),
            Self::default_quantum_efficiency(),
            Self::default_read_noise(),
        )
    }
}

/// A single noisy realization of the photons recorded per pixel
///
/// The expected count is `flux * exposure_time * quantum_efficiency`, the noise is Gaussian
/// with variance `expected + read_noise^2`.
pub fn simulate_detector<R: Rng + ?Sized>(
    image: ArrayView2<f64>,
    settings: &DetectorSettings,
    rng: &mut R,
) -> Array2<f64> {
    let read_variance = settings.read_noise.powi(2);
    image.mapv(|flux| {
        let expected = flux * settings.exposure_time * settings.quantum_efficiency;
        let sigma = (expected.max(0.0) + read_variance).sqrt();
        let z: f64 = StandardNormal.sample(&mut *rng);
        expected + sigma * z
    })
}

/// [simulate_optics] followed by [simulate_detector]
pub fn simulate_image<R: Rng + ?Sized>(
    stars: &[Star],
    optics: &OpticsSettings,
    detector: &DetectorSettings,
    rng: &mut R,
) -> Array2<f64> {
    let flux = simulate_optics(stars, optics);
    simulate_detector(flux.view(), detector, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photometry::{Aperture, marginal_centroid};

    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_field_size() {
        let image = simulate_optics(&[], &OpticsSettings::default());
        assert_eq!(image.dim(), (10, 10));
        assert!(image.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn psf_is_normalized() {
        let settings = OpticsSettings {
            fov: 40.0 * 21.0,
            ..Default::default()
        };
        let star = Star::new(1.0, -2.0, 10.0);
        let image = simulate_optics(&[star], &settings);
        assert_relative_eq!(image.sum(), star.photon_flux(), max_relative = 1e-6);
        assert_relative_eq!(star.photon_flux(), 1e6, max_relative = 1e-12);
        // Star is at pixel (21, 18)
        let (x, y) = marginal_centroid(image.view(), (20.0, 19.0), 8.0).unwrap();
        assert_relative_eq!(x, 21.0, epsilon = 0.05);
        assert_relative_eq!(y, 18.0, epsilon = 0.05);
    }

    #[test]
    fn sky_background_scales_with_pixel_area() {
        let settings = OpticsSettings::new(2.0, 3.0, 30.0, 0.5, 1.0);
        let image = simulate_optics(&[], &settings);
        assert!(image.iter().all(|&v| v == 2.0 * 0.5 * 9.0));
    }

    #[test]
    fn detector_noise() {
        let flux = Array2::from_elem((200, 200), 900.0);
        let settings = DetectorSettings::new(2.0, 0.5, 30.0);
        let mut rng = StdRng::seed_from_u64(0);
        let image = simulate_detector(flux.view(), &settings, &mut rng);
        assert_relative_eq!(image.mean().unwrap(), 900.0, max_relative = 0.005);
        assert_relative_eq!(image.std(0.0), (900.0f64 + 900.0).sqrt(), max_relative = 0.02);
    }

    #[test]
    fn end_to_end_photometry() {
        let settings = OpticsSettings {
            fov: 60.0 * 21.0,
            ..Default::default()
        };
        let stars = [Star::new(-10.0, 5.0, 8.0), Star::new(12.0, -8.0, 9.0)];
        let mut rng = StdRng::seed_from_u64(1);
        let image = simulate_image(&stars, &settings, &DetectorSettings::default(), &mut rng);
        let measure = |star: &Star| {
            let x = star.x + settings.half_size() as f64;
            let y = star.y + settings.half_size() as f64;
            Aperture::new("star", x, y, 5.0)
                .unwrap()
                .with_background(7.0, 10.0)
                .unwrap()
                .measure(image.view())
                .unwrap()
                .flux
        };
        let ratio = measure(&stars[0]) / measure(&stars[1]);
        assert_relative_eq!(ratio, 10f64.powf(0.4), max_relative = 0.01);
    }
}
