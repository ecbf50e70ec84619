//! Simulated observations: photon-noise light curves, injected transits and toy images

mod images;
pub use images::{
    DetectorSettings, OpticsSettings, Star, ZERO_MAGNITUDE_FLUX, simulate_detector, simulate_image,
    simulate_optics,
};

mod light_curves;
pub use light_curves::{
    PhotonNoise, approximate_light_curve, catch_photons_in_bucket, photon_light_curve,
    simulate_transit_data, time_grid,
};
