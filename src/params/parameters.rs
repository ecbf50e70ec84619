use crate::error::ParameterError;
use crate::params::bounds::Bounds;
use crate::params::free::{FreeParameter, FreeParameters};

use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Single model parameter: current value, estimation status and bounds
///
/// Bounds of a fixed parameter are kept, so it could be freed again, but no algorithm looks at
/// them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameter {
    pub value: f64,
    pub fixed: bool,
    pub bounds: Bounds,
}

impl Parameter {
    pub fn fixed(value: f64) -> Self {
        Self {
            value,
            fixed: true,
            bounds: Bounds::unbounded(),
        }
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        !self.fixed
    }
}

/// Named model parameters in insertion order
///
/// The order is the order of the free parameter vector seen by the optimizers and of every
/// report produced from it, see [FreeParameters].
///
/// ```
/// use light_curve_transit::Parameters;
///
/// let params = Parameters::new()
///     .fixed("period", 1.58)
///     .bounded("radius", 0.0, 0.5)
///     .unwrap();
/// assert_eq!(params.value("radius"), Some(0.25));
/// assert_eq!(params.free_names(), vec!["radius"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<ParameterEntry>", try_from = "Vec<ParameterEntry>")]
pub struct Parameters {
    entries: Vec<(String, Parameter)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixed parameter or replace the value of an existing one and fix it
    pub fn fixed(mut self, name: impl Into<String>, value: f64) -> Self {
        let name = name.into();
        match self.position(&name) {
            Some(i) => {
                let par = &mut self.entries[i].1;
                par.value = value;
                par.fixed = true;
            }
            None => self.entries.push((name, Parameter::fixed(value))),
        }
        self
    }

    /// Add a free parameter with given initial value and bounds
    pub fn free(
        self,
        name: impl Into<String>,
        value: f64,
        low: f64,
        high: f64,
    ) -> Result<Self, ParameterError> {
        let name = name.into();
        let mut params = self.fixed(name.clone(), value);
        params.set_bounds(&name, low, high)?;
        params.mark_free(&name)?;
        Ok(params)
    }

    /// Add a free parameter starting at the middle of its bounds
    pub fn bounded(
        self,
        name: impl Into<String>,
        low: f64,
        high: f64,
    ) -> Result<Self, ParameterError> {
        let value = 0.5 * (low + high);
        self.free(name, value, low, high)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut Parameter, ParameterError> {
        match self.position(name) {
            Some(i) => Ok(&mut self.entries[i].1),
            None => Err(ParameterError::UnknownParameter { name: name.into() }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    /// Current value of the parameter
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(|par| par.value)
    }

    /// Set the value, a free parameter must stay inside of its bounds
    pub fn set_value(&mut self, name: &str, value: f64) -> Result<(), ParameterError> {
        let par = self.get_mut(name)?;
        if par.is_free() && !par.bounds.contains(value) {
            return Err(ParameterError::InvalidBounds {
                name: name.into(),
                value,
                low: par.bounds.low(),
                high: par.bounds.high(),
            });
        }
        par.value = value;
        Ok(())
    }

    /// Set bounds of the parameter
    ///
    /// Fails if `low >= high`, any side is NaN, or the current value is outside of `[low, high]`.
    /// Use infinite values to leave a side unbounded.
    pub fn set_bounds(&mut self, name: &str, low: f64, high: f64) -> Result<(), ParameterError> {
        let par = self.get_mut(name)?;
        let bounds = Bounds::new_unchecked(low, high);
        if !bounds.is_well_formed() || !bounds.contains(par.value) {
            return Err(ParameterError::InvalidBounds {
                name: name.into(),
                value: par.value,
                low,
                high,
            });
        }
        par.bounds = bounds;
        Ok(())
    }

    pub fn mark_fixed(&mut self, name: &str) -> Result<(), ParameterError> {
        self.get_mut(name)?.fixed = true;
        Ok(())
    }

    /// Let the parameter be estimated, its bounds must bracket the current value
    pub fn mark_free(&mut self, name: &str) -> Result<(), ParameterError> {
        let par = self.get_mut(name)?;
        if !par.bounds.contains(par.value) {
            return Err(ParameterError::InvalidBounds {
                name: name.into(),
                value: par.value,
                low: par.bounds.low(),
                high: par.bounds.high(),
            });
        }
        par.fixed = false;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Parameter)> {
        self.entries.iter().map(|(name, par)| (name.as_str(), par))
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|(name, _)| name).collect()
    }

    pub fn free_names(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, par)| par.is_free())
            .map(|(name, _)| name)
            .collect()
    }

    /// Ordered registry of free parameters, shared by optimizers and reports
    pub fn free_parameters(&self) -> FreeParameters {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, (_, par))| par.is_free())
            .map(|(index, (name, par))| FreeParameter {
                index,
                name: name.clone(),
                bounds: par.bounds,
            })
            .collect()
    }

    /// Overwrite the value at the registry position without bounds check
    pub(crate) fn set_value_at(&mut self, index: usize, value: f64) {
        self.entries[index].1.value = value;
    }

    pub(crate) fn value_at(&self, index: usize) -> f64 {
        self.entries[index].1.value
    }
}

/// Serialized form of a single [Parameter]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ParameterEntry {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub bounds: Bounds,
}

impl From<Parameters> for Vec<ParameterEntry> {
    fn from(params: Parameters) -> Self {
        params
            .entries
            .into_iter()
            .map(|(name, par)| ParameterEntry {
                name,
                value: par.value,
                fixed: par.fixed,
                bounds: par.bounds,
            })
            .collect()
    }
}

impl TryFrom<Vec<ParameterEntry>> for Parameters {
    type Error = ParameterError;

    fn try_from(entries: Vec<ParameterEntry>) -> Result<Self, Self::Error> {
        let mut params = Parameters::new();
        for entry in entries {
            if params.position(&entry.name).is_some() {
                return Err(ParameterError::DuplicateParameter { name: entry.name });
            }
            params = params.fixed(entry.name.clone(), entry.value);
            let (low, high) = (entry.bounds.low(), entry.bounds.high());
            if (low, high) != (f64::NEG_INFINITY, f64::INFINITY) {
                params.set_bounds(&entry.name, low, high)?;
            }
            if !entry.fixed {
                params.mark_free(&entry.name)?;
            }
        }
        Ok(params)
    }
}

impl JsonSchema for Parameters {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("Parameters")
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <Vec<ParameterEntry> as JsonSchema>::json_schema(generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transit_like() -> Parameters {
        Parameters::new()
            .fixed("period", 3.14)
            .free("t0", 0.3, 0.0, 1.0)
            .unwrap()
            .bounded("radius", 0.0, 0.5)
            .unwrap()
            .fixed("a", 10.0)
    }

    #[test]
    fn inverted_bounds_fail_immediately() {
        let err = Parameters::new()
            .free("radius", 0.15, 0.2, 0.1)
            .unwrap_err();
        assert_eq!(
            err,
            ParameterError::InvalidBounds {
                name: "radius".into(),
                value: 0.15,
                low: 0.2,
                high: 0.1
            }
        );
    }

    #[test]
    fn bounds_must_bracket_value() {
        let mut params = transit_like();
        assert!(params.set_bounds("t0", 0.5, 1.0).is_err());
        assert!(params.set_bounds("t0", 0.0, 0.3).is_ok());
        assert!(params.set_bounds("t0", f64::NAN, 0.5).is_err());
        assert!(params.set_bounds("t0", f64::NEG_INFINITY, 0.5).is_ok());
    }

    #[test]
    fn set_bounds_unknown() {
        let mut params = transit_like();
        assert_eq!(
            params.set_bounds("ecc", 0.0, 1.0),
            Err(ParameterError::UnknownParameter { name: "ecc".into() })
        );
    }

    #[test]
    fn free_order_is_insertion_order() {
        let mut params = transit_like();
        params.set_bounds("a", 3.0, 50.0).unwrap();
        params.mark_free("a").unwrap();
        params.mark_fixed("t0").unwrap();
        params.set_bounds("period", 3.0, 3.3).unwrap();
        params.mark_free("period").unwrap();
        assert_eq!(params.free_names(), vec!["period", "radius", "a"]);
        let free = params.free_parameters();
        assert_eq!(free.names(), vec!["period", "radius", "a"]);
    }

    #[test]
    fn mark_free_needs_bracketing_bounds() {
        let mut params = Parameters::new().fixed("b", 0.3);
        assert!(params.mark_free("b").is_ok());
        params.mark_fixed("b").unwrap();
        params.set_bounds("b", 0.0, 1.0).unwrap();
        params.set_value("b", 2.0).unwrap();
        assert!(params.mark_free("b").is_err());
    }

    #[test]
    fn set_value_respects_bounds_of_free() {
        let mut params = transit_like();
        assert!(params.set_value("radius", 0.6).is_err());
        assert!(params.set_value("radius", 0.1).is_ok());
        assert_eq!(params.value("radius"), Some(0.1));
    }

    #[test]
    fn serde_round_trip_keeps_order() {
        let params = transit_like();
        let json = serde_json::to_string(&params).unwrap();
        let restored: Parameters = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, params);
        assert_eq!(restored.names(), vec!["period", "t0", "radius", "a"]);
    }

    #[test]
    fn deserialization_validates_bounds() {
        let json = r#"[{"name": "radius", "value": 0.15, "bounds": [0.2, 0.1]}]"#;
        let err = serde_json::from_str::<Parameters>(json).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn deserialization_rejects_duplicates() {
        let json = r#"[{"name": "a", "value": 1.0, "fixed": true}, {"name": "a", "value": 2.0, "fixed": true}]"#;
        assert!(serde_json::from_str::<Parameters>(json).is_err());
    }
}
