pub(super) use crate::error::ModelError;
pub(super) use crate::params::Parameters;
use crate::models::batman::BatmanTransit;
use crate::models::linear::LinearModel;
use crate::models::trapezoid::TrapezoidTransit;

use enum_dispatch::enum_dispatch;
pub(super) use macro_const::macro_const;
pub(super) use ndarray::{Array1, ArrayView1};
pub(super) use schemars::JsonSchema;
pub(super) use serde::{Deserialize, Serialize};
pub(super) use std::fmt::Debug;

/// Parametric light-curve model
///
/// Evaluation is a pure function of times and parameters. Parameters are looked up by name, extra
/// entries are ignored.
#[enum_dispatch]
pub trait TransitModelTrait: Clone + Debug + Send + Sync {
    /// Short model name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Names of the parameters the model reads
    fn parameter_names(&self) -> &'static [&'static str];

    /// Complete parameter set with every parameter fixed at its default value
    fn default_parameters(&self) -> Parameters;

    /// Predicted flux at times `t`
    fn evaluate(&self, t: ArrayView1<f64>, params: &Parameters) -> Result<Array1<f64>, ModelError>;
}

/// All models are available as variants of this enum
///
/// Consider to import [TransitModelTrait] as well
#[enum_dispatch(TransitModelTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[non_exhaustive]
pub enum Model {
    Batman(BatmanTransit),
    Trapezoid(TrapezoidTransit),
    Linear(LinearModel),
}

impl Model {
    pub fn batman() -> Self {
        BatmanTransit::default().into()
    }

    pub fn trapezoid() -> Self {
        TrapezoidTransit.into()
    }

    pub fn linear() -> Self {
        LinearModel.into()
    }
}

/// Look up a parameter required by `model`
pub(super) fn required(
    model: &'static str,
    params: &Parameters,
    name: &str,
) -> Result<f64, ModelError> {
    params
        .value(name)
        .ok_or_else(|| ModelError::MissingParameter {
            model,
            name: name.into(),
        })
}

/// Fails with [ModelError::InvalidGeometry] naming all `values` unless each one is finite
pub(super) fn check_finite<'a>(
    values: impl IntoIterator<Item = (&'a str, f64)> + Clone,
) -> Result<(), ModelError> {
    if values.clone().into_iter().all(|(_, x)| x.is_finite()) {
        Ok(())
    } else {
        Err(ModelError::geometry("parameters must be finite", values))
    }
}
