use crate::data::LightCurve;
use crate::error::{FitError, ModelError};
use crate::goodness::GoodnessTrait;
use crate::models::{Model, TransitModelTrait};
use crate::params::{FreeParameters, Parameters};

use ndarray::{Array1, Zip};
use std::f64::consts::PI;

/// Light curve, model, goodness-of-fit function and parameters bound together
///
/// Fit algorithms see the problem through flat vectors of free parameter values, ordered by
/// [FitProblem::free], and never touch parameter names.
#[derive(Clone)]
pub struct FitProblem<'a> {
    light_curve: &'a LightCurve,
    model: &'a Model,
    goodness: &'a (dyn GoodnessTrait + Sync),
    params: Parameters,
    free: FreeParameters,
}

/// Result of a single objective evaluation
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Evaluation {
    /// Goodness of fit, infinite outside of the prior support or for an invalid model
    pub goodness: f64,
    /// `-inf` outside of the prior support or for an invalid model
    pub ln_posterior: f64,
}

impl Evaluation {
    const REJECTED: Self = Self {
        goodness: f64::INFINITY,
        ln_posterior: f64::NEG_INFINITY,
    };

    /// Goodness with NaN ordered after every real value
    #[inline]
    pub fn comparable_goodness(&self) -> f64 {
        if self.goodness.is_nan() {
            f64::INFINITY
        } else {
            self.goodness
        }
    }
}

impl<'a> FitProblem<'a> {
    /// Bind the fit inputs together
    ///
    /// Fails if no parameter is free, or if a non-NaN flux has zero uncertainty.
    pub fn new(
        light_curve: &'a LightCurve,
        model: &'a Model,
        goodness: &'a (dyn GoodnessTrait + Sync),
        params: Parameters,
    ) -> Result<Self, FitError> {
        let free = params.free_parameters();
        if free.is_empty() {
            return Err(FitError::NoFreeParameters);
        }
        let zero_err = light_curve
            .flux()
            .iter()
            .zip(light_curve.flux_err())
            .position(|(f, &err)| !f.is_nan() && err == 0.0);
        if let Some(index) = zero_err {
            return Err(FitError::ZeroUncertainty {
                index,
                time: light_curve.time()[index],
            });
        }
        Ok(Self {
            light_curve,
            model,
            goodness,
            params,
            free,
        })
    }

    pub fn light_curve(&self) -> &LightCurve {
        self.light_curve
    }

    pub fn model(&self) -> &Model {
        self.model
    }

    /// Initial parameters
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn free(&self) -> &FreeParameters {
        &self.free
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.free.len()
    }

    /// Initial values of the free parameters
    pub fn initial(&self) -> Vec<f64> {
        self.free.vector(&self.params)
    }

    /// Initial parameters with free ones replaced by `x`
    pub fn parameters_at(&self, x: &[f64]) -> Parameters {
        self.free.apply(&self.params, x)
    }

    pub fn model_flux(&self, params: &Parameters) -> Result<Array1<f64>, ModelError> {
        self.model.evaluate(self.light_curve.time(), params)
    }

    /// Standardized residuals `(flux - model) / flux_err`
    pub fn residuals(&self, params: &Parameters) -> Result<Array1<f64>, ModelError> {
        let mut model = self.model_flux(params)?;
        Zip::from(&mut model)
            .and(self.light_curve.flux())
            .and(self.light_curve.flux_err())
            .for_each(|m, &f, &err| *m = (f - *m) / err);
        Ok(model)
    }

    pub fn goodness_of(&self, params: &Parameters) -> Result<f64, ModelError> {
        Ok(self.goodness.goodness(self.residuals(params)?.view()))
    }

    /// Flat vector adaptor of [FitProblem::goodness_of]
    pub fn goodness_at(&self, x: &[f64]) -> Result<f64, ModelError> {
        self.goodness_of(&self.parameters_at(x))
    }

    /// Gaussian log-likelihood of independent points, NaN residuals are skipped
    pub fn ln_likelihood(&self, params: &Parameters) -> Result<f64, ModelError> {
        Ok(self.ln_likelihood_of_residuals(&self.residuals(params)?))
    }

    fn ln_likelihood_of_residuals(&self, residuals: &Array1<f64>) -> f64 {
        let mut ln_l = 0.0;
        Zip::from(residuals)
            .and(self.light_curve.flux_err())
            .for_each(|&r, &err| {
                if !r.is_nan() {
                    ln_l -= 0.5 * (r * r + (2.0 * PI * err * err).ln());
                }
            });
        ln_l
    }

    /// Log-likelihood inside of the rectangular bounds of free parameters, `-inf` outside or if
    /// the model is invalid
    pub fn ln_posterior(&self, x: &[f64]) -> f64 {
        self.evaluate(x).ln_posterior
    }

    /// Goodness and log-posterior from a single model evaluation
    pub(crate) fn evaluate(&self, x: &[f64]) -> Evaluation {
        if !self.free.within_bounds(x) {
            return Evaluation::REJECTED;
        }
        let residuals = match self.residuals(&self.parameters_at(x)) {
            Ok(residuals) => residuals,
            Err(_) => return Evaluation::REJECTED,
        };
        let ln_l = self.ln_likelihood_of_residuals(&residuals);
        Evaluation {
            goodness: self.goodness.goodness(residuals.view()),
            ln_posterior: if ln_l.is_nan() {
                f64::NEG_INFINITY
            } else {
                ln_l
            },
        }
    }
}
