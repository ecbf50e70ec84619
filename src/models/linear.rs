use crate::models::model::*;

const NAMES: [&str; 2] = ["slope", "intercept"];

/// Straight line $f(t) = \mathrm{slope} \cdot t + \mathrm{intercept}$
///
/// It is the smallest model to practice fitting with, all the algorithms treat it the same way
/// as transit models.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LinearModel;

impl TransitModelTrait for LinearModel {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &NAMES
    }

    fn default_parameters(&self) -> Parameters {
        Parameters::new().fixed("slope", 0.0).fixed("intercept", 1.0)
    }

    fn evaluate(&self, t: ArrayView1<f64>, params: &Parameters) -> Result<Array1<f64>, ModelError> {
        let slope = required(self.name(), params, "slope")?;
        let intercept = required(self.name(), params, "intercept")?;
        check_finite([("slope", slope), ("intercept", intercept)])?;
        Ok(t.mapv(|t| slope * t + intercept))
    }
}
