use crate::error::ParameterValues;
use crate::params::bounds::{Bounds, within_bounds};
use crate::params::parameters::Parameters;

/// Free parameter as a position in the fit vector
#[derive(Clone, Debug, PartialEq)]
pub struct FreeParameter {
    /// Position of the parameter in its [Parameters]
    pub index: usize,
    pub name: String,
    pub bounds: Bounds,
}

/// Ordered registry of free parameters
///
/// This is the only mapping between a flat parameter vector used by optimizers and named
/// [Parameters]: the `i`-th component of every vector is the `i`-th free parameter here. Fit
/// results are reported by the same registry, so names and components can't be misaligned.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FreeParameters(Vec<FreeParameter>);

impl FreeParameters {
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FreeParameter> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn bounds(&self) -> impl Iterator<Item = &Bounds> {
        self.0.iter().map(|p| &p.bounds)
    }

    /// Current values of free parameters as a flat vector
    pub fn vector(&self, params: &Parameters) -> Vec<f64> {
        self.0.iter().map(|p| params.value_at(p.index)).collect()
    }

    /// Copy of `params` with free parameter values replaced by `x`
    pub fn apply(&self, params: &Parameters, x: &[f64]) -> Parameters {
        let mut params = params.clone();
        self.apply_in_place(&mut params, x);
        params
    }

    pub(crate) fn apply_in_place(&self, params: &mut Parameters, x: &[f64]) {
        assert_eq!(x.len(), self.len(), "fit vector length mismatch");
        for (p, &value) in self.0.iter().zip(x) {
            params.set_value_at(p.index, value);
        }
    }

    /// Hard rectangular prior support
    pub fn within_bounds(&self, x: &[f64]) -> bool {
        x.len() == self.len() && within_bounds(x, self.bounds())
    }

    /// Named view of a fit vector, used by error messages and logs
    pub fn values(&self, x: &[f64]) -> ParameterValues {
        ParameterValues::new(self.0.iter().map(|p| p.name.as_str()).zip(x.iter().copied()))
    }
}

impl FromIterator<FreeParameter> for FreeParameters {
    fn from_iter<I: IntoIterator<Item = FreeParameter>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FreeParameters {
    type Item = &'a FreeParameter;
    type IntoIter = std::slice::Iter<'a, FreeParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
