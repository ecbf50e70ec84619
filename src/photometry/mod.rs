//! Aperture photometry and centroiding on two-dimensional images

mod aperture;
pub use aperture::{Annulus, Aperture, ApertureMeasurement, Apertures};

mod centroid;
pub use centroid::{marginal_centroid, marginal_centroids};
