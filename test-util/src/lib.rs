use lazy_static::lazy_static;
use light_curve_transit::{
    BatmanParameters, LightCurve, Model, PhotonNoise, TimeFormat, simulate_transit_data,
};
use rand::prelude::*;
use rand_distr::StandardNormal;

/// Simulated transit light curve with known parameters
#[derive(Clone, Debug)]
pub struct TransitFixture {
    pub name: &'static str,
    pub params: BatmanParameters,
    pub noise: PhotonNoise,
    pub light_curve: LightCurve,
}

fn transit_fixture(
    name: &'static str,
    params: BatmanParameters,
    noise: PhotonNoise,
    seed: u64,
) -> TransitFixture {
    let mut rng = StdRng::seed_from_u64(seed);
    let light_curve = simulate_transit_data(&Model::batman(), &params.into(), &noise, &mut rng)
        .unwrap()
        .with_name(name);
    TransitFixture {
        name,
        params,
        noise,
        light_curve,
    }
}

lazy_static! {
    pub static ref TRANSIT_LIGHT_CURVES: Vec<TransitFixture> = vec![
        transit_fixture(
            "hot-jupiter",
            BatmanParameters {
                period: 3.14,
                t0: 0.3,
                radius: 0.1,
                a: 10.0,
                b: 0.3,
                ..Default::default()
            },
            PhotonNoise::new(1e6, 1.0 / 1440.0, 10.0),
            0,
        ),
        transit_fixture(
            "mini-neptune",
            BatmanParameters {
                period: 1.58,
                t0: 0.7,
                radius: 0.05,
                a: 14.0,
                b: 0.1,
                ld: [0.3, 0.2],
                ..Default::default()
            },
            PhotonNoise::new(1e5, 2.0 / 1440.0, 5.0),
            1,
        ),
        transit_fixture(
            "grazing",
            BatmanParameters {
                period: 2.0,
                t0: 0.5,
                radius: 0.15,
                a: 8.0,
                b: 1.05,
                ..Default::default()
            },
            PhotonNoise::new(1e6, 1.0 / 1440.0, 4.0),
            2,
        ),
    ];
}

pub fn iter_transit_light_curves() -> impl Iterator<Item = &'static TransitFixture> {
    TRANSIT_LIGHT_CURVES.iter()
}

/// Time, flux and flux uncertainty of `slope * t + intercept` at `n` points of `[0, 1]` with
/// Gaussian noise of `sigma`
pub fn noisy_line_arrays(
    n: usize,
    slope: f64,
    intercept: f64,
    sigma: f64,
    seed: u64,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let time: Vec<_> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
    let flux = time
        .iter()
        .map(|&t| {
            let z: f64 = rng.sample(StandardNormal);
            slope * t + intercept + sigma * z
        })
        .collect();
    (time, flux, vec![sigma; n])
}

/// [noisy_line_arrays] as a [LightCurve]
pub fn noisy_line(n: usize, slope: f64, intercept: f64, sigma: f64, seed: u64) -> LightCurve {
    let (time, flux, flux_err) = noisy_line_arrays(n, slope, intercept, sigma, seed);
    LightCurve::new(time, flux, flux_err, TimeFormat::Relative).unwrap()
}
