use crate::array_stats::nan_median;
use crate::data::time_format::TimeFormat;
use crate::error::LightCurveError;

use itertools::Itertools;
use ndarray::{Array1, ArrayView1, Zip};

/// Photometric time series: time-ordered (time, flux, flux uncertainty) triples
///
/// The object is immutable, derived operations like [LightCurve::fold] and
/// [LightCurve::normalize] return new instances. NaN flux or uncertainty values mark data
/// gaps and are skipped by the NaN-aware reductions used for fitting.
#[derive(Clone, Debug, PartialEq)]
pub struct LightCurve {
    time: Array1<f64>,
    flux: Array1<f64>,
    flux_err: Array1<f64>,
    time_format: TimeFormat,
    name: Option<String>,
}

impl LightCurve {
    /// Construct [LightCurve] from time, flux and flux uncertainty arrays
    ///
    /// All arrays must have the same non-zero length, `time` must be finite and non-decreasing,
    /// `flux_err` must be non-negative (NaN is allowed and marks a gap).
    pub fn new(
        time: impl Into<Array1<f64>>,
        flux: impl Into<Array1<f64>>,
        flux_err: impl Into<Array1<f64>>,
        time_format: TimeFormat,
    ) -> Result<Self, LightCurveError> {
        let time = time.into();
        let flux = flux.into();
        let flux_err = flux_err.into();

        if time.len() != flux.len() || flux.len() != flux_err.len() {
            return Err(LightCurveError::LengthMismatch {
                time: time.len(),
                flux: flux.len(),
                flux_err: flux_err.len(),
            });
        }
        if time.is_empty() {
            return Err(LightCurveError::Empty);
        }
        if let Some((index, &value)) = flux_err.iter().find_position(|&&err| err < 0.0) {
            return Err(LightCurveError::NegativeUncertainty { index, value });
        }
        if let Some((index, &value)) = time.iter().find_position(|t| !t.is_finite()) {
            return Err(LightCurveError::UnsortedTime { index, value });
        }
        if let Some((index, (_, &value))) = time
            .iter()
            .tuple_windows()
            .find_position(|(prev, next)| next < prev)
        {
            return Err(LightCurveError::UnsortedTime {
                index: index + 1,
                value,
            });
        }

        Ok(Self {
            time,
            flux,
            flux_err,
            time_format,
            name: None,
        })
    }

    /// Construct [LightCurve] from time and flux only
    ///
    /// It is the same as [LightCurve::new], but sets unity uncertainties, so the goodness of fit
    /// becomes a plain sum of squared differences.
    pub fn new_without_errors(
        time: impl Into<Array1<f64>>,
        flux: impl Into<Array1<f64>>,
        time_format: TimeFormat,
    ) -> Result<Self, LightCurveError> {
        let time = time.into();
        let flux_err = Array1::ones(time.len());
        Self::new(time, flux, flux_err, time_format)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn time(&self) -> ArrayView1<'_, f64> {
        self.time.view()
    }

    #[inline]
    pub fn flux(&self) -> ArrayView1<'_, f64> {
        self.flux.view()
    }

    #[inline]
    pub fn flux_err(&self) -> ArrayView1<'_, f64> {
        self.flux_err.view()
    }

    #[inline]
    pub fn time_format(&self) -> TimeFormat {
        self.time_format
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Phase-fold on `period` around the mid-transit time `t0`
    ///
    /// Output time is the offset from the nearest transit in days, in `[-period/2, period/2)`,
    /// and the points are re-sorted by it. `t0` must be given in the same time format as the
    /// light curve.
    pub fn fold(&self, period: f64, t0: f64) -> Result<Self, LightCurveError> {
        if !(period.is_finite() && period > 0.0) {
            return Err(LightCurveError::InvalidPeriod { period });
        }
        let phase = self
            .time
            .mapv(|t| (t - t0 + 0.5 * period).rem_euclid(period) - 0.5 * period);
        let order: Vec<_> = (0..self.len())
            .sorted_by(|&a, &b| phase[a].total_cmp(&phase[b]))
            .collect();
        let take = |a: &Array1<f64>| -> Array1<f64> { order.iter().map(|&i| a[i]).collect() };
        Ok(Self {
            time: take(&phase),
            flux: take(&self.flux),
            flux_err: take(&self.flux_err),
            time_format: TimeFormat::Relative,
            name: self.name.clone(),
        })
    }

    /// Divide flux and its uncertainty by the median flux
    pub fn normalize(&self) -> Result<Self, LightCurveError> {
        let median = nan_median(self.flux.view());
        if !median.is_finite() || median == 0.0 {
            return Err(LightCurveError::InvalidMedian { median });
        }
        let scale = median.abs().recip();
        Ok(Self {
            time: self.time.clone(),
            flux: self.flux.mapv(|f| f / median),
            flux_err: self.flux_err.mapv(|e| e * scale),
            time_format: self.time_format,
            name: self.name.clone(),
        })
    }

    /// Drop points with NaN flux or uncertainty
    pub fn remove_nans(&self) -> Result<Self, LightCurveError> {
        let mut time = Vec::with_capacity(self.len());
        let mut flux = Vec::with_capacity(self.len());
        let mut flux_err = Vec::with_capacity(self.len());
        Zip::from(&self.time)
            .and(&self.flux)
            .and(&self.flux_err)
            .for_each(|&t, &f, &e| {
                if !(f.is_nan() || e.is_nan()) {
                    time.push(t);
                    flux.push(f);
                    flux_err.push(e);
                }
            });
        let lc = Self::new(time, flux, flux_err, self.time_format)?;
        Ok(Self {
            name: self.name.clone(),
            ..lc
        })
    }

    /// Express the time axis in another epoch system
    pub fn to_time_format(&self, time_format: TimeFormat) -> Result<Self, LightCurveError> {
        let shift = self.time_format.shift_to(time_format)?;
        Ok(Self {
            time: self.time.mapv(|t| t + shift),
            flux: self.flux.clone(),
            flux_err: self.flux_err.clone(),
            time_format,
            name: self.name.clone(),
        })
    }
}
