use crate::array_stats::{nan_mean, nan_sum};
use crate::error::PhotometryError;

use ndarray::{ArrayView2, aview1};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Background annulus around an aperture, radii in pixels
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Annulus {
    pub inner: f64,
    pub outer: f64,
}

impl Annulus {
    pub fn new(inner: f64, outer: f64) -> Self {
        Self { inner, outer }
    }
}

/// Result of [Aperture::measure]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ApertureMeasurement {
    /// Sum of the aperture pixels, NaN pixels are skipped
    pub sum: f64,
    /// Number of pixels in the aperture
    pub area: usize,
    /// Background estimate for the whole aperture, zero without an annulus
    pub background: f64,
    /// Source flux, `sum - background` when the background is subtracted
    pub flux: f64,
}

/// Circular aperture with an optional background annulus
///
/// Pixel `(x, y)` is the element `image[[y, x]]` and its center is at integer coordinates. A
/// pixel belongs to the aperture or the annulus if its center does. The background per pixel
/// is the NaN-aware mean of the annulus pixels, scaled by the aperture pixel count.
#[derive(Clone, Debug, PartialEq)]
pub struct Aperture {
    name: String,
    x: f64,
    y: f64,
    radius: f64,
    annulus: Option<Annulus>,
    subtract_background: bool,
}

impl Aperture {
    pub fn new(name: impl Into<String>, x: f64, y: f64, radius: f64) -> Result<Self, PhotometryError> {
        let aperture = Self {
            name: name.into(),
            x,
            y,
            radius,
            annulus: None,
            subtract_background: false,
        };
        aperture.validate(radius, None)?;
        Ok(aperture)
    }

    /// Add a background annulus and subtract the background from the flux
    pub fn with_background(mut self, inner: f64, outer: f64) -> Result<Self, PhotometryError> {
        self.set_annulus(Some(Annulus::new(inner, outer)))?;
        self.subtract_background = true;
        Ok(self)
    }

    fn validate(&self, radius: f64, annulus: Option<Annulus>) -> Result<(), PhotometryError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhotometryError::InvalidRadius {
                name: self.name.clone(),
                radius,
            });
        }
        if let Some(Annulus { inner, outer }) = annulus {
            // Annulus must not overlap the aperture
            if !(inner.is_finite() && outer.is_finite() && inner >= radius && inner < outer) {
                return Err(PhotometryError::InvalidAnnulus {
                    name: self.name.clone(),
                    inner,
                    outer,
                });
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn annulus(&self) -> Option<Annulus> {
        self.annulus
    }

    pub fn subtract_background(&self) -> bool {
        self.subtract_background
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_radius(&mut self, radius: f64) -> Result<(), PhotometryError> {
        self.validate(radius, self.annulus)?;
        self.radius = radius;
        Ok(())
    }

    pub fn set_annulus(&mut self, annulus: Option<Annulus>) -> Result<(), PhotometryError> {
        self.validate(self.radius, annulus)?;
        self.annulus = annulus;
        Ok(())
    }

    pub fn set_subtract_background(&mut self, subtract: bool) {
        self.subtract_background = subtract;
    }

    /// Measure the aperture on the image
    ///
    /// Fails with [PhotometryError::EmptyRegion] if no pixel center falls into the aperture or
    /// no finite pixel falls into the annulus, e.g. when the aperture is outside of the image.
    pub fn measure(&self, image: ArrayView2<f64>) -> Result<ApertureMeasurement, PhotometryError> {
        let extent = self.annulus.map_or(self.radius, |a| a.outer);
        let (height, width) = image.dim();
        let mut aperture_pixels = vec![];
        let mut annulus_pixels = vec![];
        for iy in pixel_range(self.y, extent, height) {
            for ix in pixel_range(self.x, extent, width) {
                let distance = (ix as f64 - self.x).hypot(iy as f64 - self.y);
                if distance <= self.radius {
                    aperture_pixels.push(image[[iy, ix]]);
                } else if let Some(annulus) = self.annulus {
                    if distance >= annulus.inner && distance <= annulus.outer {
                        annulus_pixels.push(image[[iy, ix]]);
                    }
                }
            }
        }

        let empty = || PhotometryError::EmptyRegion {
            x: self.x,
            y: self.y,
        };
        if aperture_pixels.is_empty() {
            return Err(empty());
        }
        let area = aperture_pixels.len();
        let sum = nan_sum(aview1(&aperture_pixels));
        let background = match self.annulus {
            Some(_) => {
                let mean = nan_mean(aview1(&annulus_pixels));
                if !mean.is_finite() {
                    return Err(empty());
                }
                mean * area as f64
            }
            None => 0.0,
        };
        let flux = if self.subtract_background {
            sum - background
        } else {
            sum
        };
        log::trace!(
            "aperture {:?} at ({}, {}): sum {sum}, area {area}, background {background}",
            self.name,
            self.x,
            self.y
        );
        Ok(ApertureMeasurement {
            sum,
            area,
            background,
            flux,
        })
    }
}

/// Indices of pixels with centers within `[center - extent, center + extent]`
pub(super) fn pixel_range(center: f64, extent: f64, len: usize) -> Range<usize> {
    let low = (center - extent).ceil().max(0.0);
    let high = ((center + extent).floor() + 1.0).min(len as f64);
    if low < high {
        low as usize..high as usize
    } else {
        0..0
    }
}

/// Named apertures placed on an image
///
/// Apertures stay in insertion order, [Apertures::remove] destroys one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Apertures {
    apertures: Vec<Aperture>,
    next_star: usize,
}

impl Apertures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, aperture: Aperture) -> Result<&mut Aperture, PhotometryError> {
        if self.get(aperture.name()).is_some() {
            return Err(PhotometryError::DuplicateAperture {
                name: aperture.name.clone(),
            });
        }
        self.apertures.push(aperture);
        let index = self.apertures.len() - 1;
        Ok(&mut self.apertures[index])
    }

    /// Add an aperture at a star position, named "Star 1", "Star 2" and so on
    pub fn add_star(&mut self, x: f64, y: f64, radius: f64) -> Result<&mut Aperture, PhotometryError> {
        let name = loop {
            self.next_star += 1;
            let name = format!("Star {}", self.next_star);
            if self.get(&name).is_none() {
                break name;
            }
        };
        self.add(Aperture::new(name, x, y, radius)?)
    }

    pub fn remove(&mut self, name: &str) -> Result<Aperture, PhotometryError> {
        let index = self
            .apertures
            .iter()
            .position(|a| a.name() == name)
            .ok_or_else(|| PhotometryError::UnknownAperture { name: name.into() })?;
        Ok(self.apertures.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&Aperture> {
        self.apertures.iter().find(|a| a.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Aperture> {
        self.apertures.iter_mut().find(|a| a.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aperture> {
        self.apertures.iter()
    }

    pub fn len(&self) -> usize {
        self.apertures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apertures.is_empty()
    }

    /// Set the same radius for every aperture, nothing changes if any of them rejects it
    pub fn set_radius(&mut self, radius: f64) -> Result<(), PhotometryError> {
        for aperture in &self.apertures {
            aperture.validate(radius, aperture.annulus)?;
        }
        for aperture in &mut self.apertures {
            aperture.radius = radius;
        }
        Ok(())
    }

    pub fn measure_all(
        &self,
        image: ArrayView2<f64>,
    ) -> Result<Vec<(String, ApertureMeasurement)>, PhotometryError> {
        self.apertures
            .iter()
            .map(|a| Ok((a.name.clone(), a.measure(image)?)))
            .collect()
    }
}
