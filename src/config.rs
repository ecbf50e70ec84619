use crate::data::LightCurve;
use crate::error::FitError;
use crate::fit::{FitAlgorithm, FitAlgorithmTrait, FitObserver, FitProblem, FitResult};
use crate::goodness::Goodness;
use crate::models::{Model, TransitModelTrait};
use crate::params::Parameters;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Serializable description of a fit: what to fit, how, and how to measure the goodness
///
/// ```
/// use light_curve_transit::{FitConfig, GuessAndCheckFit, Model};
///
/// let mut config = FitConfig::default_for(Model::trapezoid());
/// config.parameters.set_bounds("delta", 0.0, 0.05).unwrap();
/// config.parameters.mark_free("delta").unwrap();
/// config.algorithm = GuessAndCheckFit::new(200, Some(0), false).into();
///
/// let json = serde_json::to_string(&config).unwrap();
/// let restored: FitConfig = serde_json::from_str(&json).unwrap();
/// assert_eq!(restored, config);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FitConfig {
    pub model: Model,
    pub parameters: Parameters,
    #[serde(default)]
    pub goodness: Goodness,
    #[serde(default)]
    pub algorithm: FitAlgorithm,
}

impl FitConfig {
    pub fn new(
        model: Model,
        parameters: Parameters,
        goodness: Goodness,
        algorithm: FitAlgorithm,
    ) -> Self {
        Self {
            model,
            parameters,
            goodness,
            algorithm,
        }
    }

    /// Model default parameters, all fixed, with the default goodness and algorithm
    ///
    /// Free some parameters before fitting.
    pub fn default_for(model: Model) -> Self {
        let parameters = model.default_parameters();
        Self::new(
            model,
            parameters,
            Goodness::default(),
            FitAlgorithm::default(),
        )
    }

    pub fn problem<'a>(&'a self, light_curve: &'a LightCurve) -> Result<FitProblem<'a>, FitError> {
        FitProblem::new(
            light_curve,
            &self.model,
            &self.goodness,
            self.parameters.clone(),
        )
    }

    pub fn fit(
        &self,
        light_curve: &LightCurve,
        observer: &mut dyn FitObserver,
    ) -> Result<FitResult, FitError> {
        let problem = self.problem(light_curve)?;
        self.algorithm.fit(&problem, observer)
    }
}
