pub use crate::{
    BatmanParameters, FitAlgorithmTrait, FitError, FitProblem, Goodness, GoodnessTrait,
    GuessAndCheckFit, LightCurve, Model, NoopObserver, Parameters, Percentiles, PhotonNoise,
    TimeFormat, TraceObserver, TransitModelTrait, simulate_transit_data,
};

pub use light_curve_common::{all_close, linspace};
pub use ndarray::Array1;
pub use rand::prelude::*;
pub use rand_distr::StandardNormal;

/// Straight line `2 t + 1` sampled at 50 points of `[0, 1]` with Gaussian noise of 0.1
///
/// Slope is free in `[0, 4]` and intercept is free in `[0, 2]`, both start at zero.
pub fn noisy_line(seed: u64) -> (LightCurve, Model, Parameters) {
    let (time, flux, flux_err) =
        light_curve_transit_test_util::noisy_line_arrays(50, 2.0, 1.0, 0.1, seed);
    let lc = LightCurve::new(time, flux, flux_err, TimeFormat::Relative).unwrap();
    let params = Parameters::new()
        .free("slope", 0.0, 0.0, 4.0)
        .unwrap()
        .free("intercept", 0.0, 0.0, 2.0)
        .unwrap();
    (lc, Model::linear(), params)
}

#[test]
fn noisy_line_is_reproducible() {
    let (a, _, _) = noisy_line(0);
    let (b, _, _) = noisy_line(0);
    let (c, _, _) = noisy_line(1);
    assert_eq!(a, b);
    assert_ne!(a.flux(), c.flux());
    let expected = linspace(1.0, 3.0, 50);
    all_close(a.time().mapv(|t| 2.0 * t + 1.0).as_slice().unwrap(), &expected[..], 1e-12);
}
