use crate::data::{LightCurve, TimeFormat};
use crate::error::SimulationError;
use crate::models::{Model, TransitModelTrait};
use crate::params::Parameters;

use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, Poisson, StandardNormal};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

fn check_positive(name: &'static str, value: f64) -> Result<f64, SimulationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SimulationError::NonPositive { name, value })
    }
}

/// Times `0, cadence, 2 cadence, ...` below `duration`
pub fn time_grid(cadence: f64, duration: f64) -> Result<Array1<f64>, SimulationError> {
    let cadence = check_positive("cadence", cadence)?;
    let duration = check_positive("duration", duration)?;
    let n = (duration / cadence).ceil() as usize;
    Ok(Array1::from_shape_fn(n, |i| i as f64 * cadence))
}

fn poisson_sample<R: Rng + ?Sized>(
    time: f64,
    expected: f64,
    rng: &mut R,
) -> Result<f64, SimulationError> {
    Poisson::new(expected)
        .map(|poisson| poisson.sample(rng))
        .map_err(|_| SimulationError::InvalidExpectation { time, expected })
}

/// Photon counts of a constant source, Poisson distributed with mean `n` per exposure
///
/// The uncertainty of each count is its square root. Times are [TimeFormat::Relative] days.
pub fn photon_light_curve<R: Rng + ?Sized>(
    n: f64,
    cadence: f64,
    duration: f64,
    rng: &mut R,
) -> Result<LightCurve, SimulationError> {
    let n = check_positive("n", n)?;
    let time = time_grid(cadence, duration)?;
    let counts = time
        .iter()
        .map(|&t| poisson_sample(t, n, rng))
        .collect::<Result<Array1<_>, _>>()?;
    let flux_err = counts.mapv(f64::sqrt);
    Ok(LightCurve::new(time, counts, flux_err, TimeFormat::Relative)?)
}

/// Gaussian approximation of [photon_light_curve]: normal counts with mean `n` and standard
/// deviation `sqrt(n)`
pub fn approximate_light_curve<R: Rng + ?Sized>(
    n: f64,
    cadence: f64,
    duration: f64,
    rng: &mut R,
) -> Result<LightCurve, SimulationError> {
    let n = check_positive("n", n)?;
    let time = time_grid(cadence, duration)?;
    let sigma = n.sqrt();
    let flux = time.mapv(|_| {
        let z: f64 = StandardNormal.sample(&mut *rng);
        n + sigma * z
    });
    let flux_err = Array1::from_elem(time.len(), sigma);
    Ok(LightCurve::new(time, flux, flux_err, TimeFormat::Relative)?)
}

/// Number of photons collected by a circular bucket of `diameter` during `time` under a photon
/// `rate` per unit area and time
pub fn catch_photons_in_bucket<R: Rng + ?Sized>(
    rate: f64,
    diameter: f64,
    time: f64,
    rng: &mut R,
) -> Result<f64, SimulationError> {
    let rate = check_positive("rate", rate)?;
    let diameter = check_positive("diameter", diameter)?;
    let time = check_positive("time", time)?;
    let expected = PI * (0.5 * diameter).powi(2) * time * rate;
    poisson_sample(time, expected, rng)
}

/// Photon noise of a simulated observation
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct PhotonNoise {
    /// Expected number of photons per exposure at unit model flux
    pub photons_per_exposure: f64,
    /// Time between exposures, days
    pub cadence: f64,
    /// Total duration, days
    pub duration: f64,
}

impl PhotonNoise {
    pub fn new(photons_per_exposure: f64, cadence: f64, duration: f64) -> Self {
        Self {
            photons_per_exposure,
            cadence,
            duration,
        }
    }

    #[inline]
    pub fn default_photons_per_exposure() -> f64 {
        100.0
    }

    #[inline]
    pub fn default_cadence() -> f64 {
        0.5 / 24.0
    }

    #[inline]
    pub fn default_duration() -> f64 {
        1.0
    }
}

impl Default for PhotonNoise {
    fn default() -> Self {
        Self::new(
            Self::default_photons_per_exposure(),
            Self::default_cadence(),
            Self::default_duration(),
        )
    }
}

/// Inject a model into a photon-noise light curve
///
/// Photon counts are Poisson distributed with the mean `N * model(t)`, the flux is
/// `counts / N` and its uncertainty is `sqrt(counts) / N`, where `N` is
/// [PhotonNoise::photons_per_exposure].
pub fn simulate_transit_data<R: Rng + ?Sized>(
    model: &Model,
    params: &Parameters,
    noise: &PhotonNoise,
    rng: &mut R,
) -> Result<LightCurve, SimulationError> {
    let n = check_positive("photons_per_exposure", noise.photons_per_exposure)?;
    let time = time_grid(noise.cadence, noise.duration)?;
    let model_flux = model.evaluate(time.view(), params)?;

    let mut flux = Array1::zeros(time.len());
    let mut flux_err = Array1::zeros(time.len());
    for ((&t, &m), (f, err)) in time
        .iter()
        .zip(&model_flux)
        .zip(flux.iter_mut().zip(flux_err.iter_mut()))
    {
        let counts = poisson_sample(t, n * m, rng)?;
        *f = counts / n;
        *err = counts.sqrt() / n;
    }
    log::debug!(
        "simulated {} {} exposures with {n} photons each",
        time.len(),
        model.name()
    );
    Ok(LightCurve::new(time, flux, flux_err, TimeFormat::Relative)?)
}
