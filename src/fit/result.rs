use crate::params::{FreeParameters, Parameters};
use crate::sorted_array::SortedArray;

use ndarray::{Array1, Array2, Array3, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 16th, 50th and 84th percentiles of a parameter distribution
///
/// For a Gaussian posterior `p50` is the mean and the interval `[p16, p84]` is `±1σ`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Percentiles {
    pub p16: f64,
    pub p50: f64,
    pub p84: f64,
}

impl Percentiles {
    /// Degenerate summary of a point estimate
    pub fn point(value: f64) -> Self {
        Self {
            p16: value,
            p50: value,
            p84: value,
        }
    }

    /// Percentiles of the sample, NaN values are dropped, `None` if nothing is left
    pub fn from_samples(samples: ArrayView1<f64>) -> Option<Self> {
        let sorted = SortedArray::from_unsorted_skip_nan(samples.iter());
        if sorted.is_empty() {
            return None;
        }
        Some(Self {
            p16: sorted.percentile(16.0),
            p50: sorted.percentile(50.0),
            p84: sorted.percentile(84.0),
        })
    }

    /// Is `value` inside of `[p16, p84]`?
    pub fn brackets(&self, value: f64) -> bool {
        self.p16 <= value && value <= self.p84
    }

    #[inline]
    pub fn lower_error(&self) -> f64 {
        self.p50 - self.p16
    }

    #[inline]
    pub fn upper_error(&self) -> f64 {
        self.p84 - self.p50
    }
}

/// Post-burn-in samples of an ensemble sampler
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Chain {
    /// Walker positions, shape is `(steps, walkers, free parameters)`
    pub samples: Array3<f64>,
    /// Log-posterior of the positions, shape is `(steps, walkers)`
    pub ln_posterior: Array2<f64>,
    /// Fraction of accepted proposals per walker over the whole run including burn-in
    pub acceptance: Array1<f64>,
}

impl Chain {
    pub fn nsteps(&self) -> usize {
        self.samples.len_of(Axis(0))
    }

    pub fn nwalkers(&self) -> usize {
        self.samples.len_of(Axis(1))
    }

    pub fn ndim(&self) -> usize {
        self.samples.len_of(Axis(2))
    }

    /// Samples of all walkers concatenated, shape is `(steps * walkers, free parameters)`
    pub fn flat(&self) -> Array2<f64> {
        let nwalkers = self.nwalkers();
        Array2::from_shape_fn((self.nsteps() * nwalkers, self.ndim()), |(i, j)| {
            self.samples[[i / nwalkers, i % nwalkers, j]]
        })
    }

    pub fn mean_acceptance(&self) -> f64 {
        self.acceptance.mean().unwrap_or(f64::NAN)
    }
}

/// Outcome of a fit
///
/// `summary` and the columns of `chain` follow the order of the free parameters.
#[derive(Clone, Debug, Serialize)]
pub struct FitResult {
    pub algorithm: &'static str,
    /// Initial parameters with free ones replaced by the best trial
    pub best: Parameters,
    /// Goodness of fit of `best`
    pub goodness: f64,
    pub summary: Vec<(String, Percentiles)>,
    pub chain: Option<Chain>,
    /// Number of objective evaluations
    pub evaluations: usize,
}

impl FitResult {
    /// Result of an algorithm producing a single best point
    pub(crate) fn point_estimate(
        algorithm: &'static str,
        free: &FreeParameters,
        initial: &Parameters,
        x: &[f64],
        goodness: f64,
        evaluations: usize,
    ) -> Self {
        Self {
            algorithm,
            best: free.apply(initial, x),
            goodness,
            summary: free
                .iter()
                .zip(x)
                .map(|(p, &value)| (p.name.clone(), Percentiles::point(value)))
                .collect(),
            chain: None,
            evaluations,
        }
    }

    pub fn percentiles(&self, name: &str) -> Option<&Percentiles> {
        self.summary
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, percentiles)| percentiles)
    }

    /// Free parameter names in the fit order
    pub fn names(&self) -> Vec<&str> {
        self.summary.iter().map(|(name, _)| name.as_str()).collect()
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: goodness = {}, {} evaluations",
            self.algorithm, self.goodness, self.evaluations
        )?;
        for (name, p) in &self.summary {
            if p.p16 == p.p84 {
                writeln!(f, "  {name} = {}", p.p50)?;
            } else {
                writeln!(
                    f,
                    "  {name} = {} (+{} / -{})",
                    p.p50,
                    p.upper_error(),
                    p.lower_error()
                )?;
            }
        }
        Ok(())
    }
}
