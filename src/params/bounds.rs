use rand::Rng;
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Closed interval `[low, high]` allowed for a free parameter
///
/// Either side may be infinite to leave the parameter unbounded from that side. The serialized
/// form is a `[low, high]` pair with `null` standing for an infinite side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(into = "BoundsPair", from = "BoundsPair")]
pub struct Bounds {
    low: f64,
    high: f64,
}

impl Bounds {
    /// Bounds without validation, [crate::Parameters::set_bounds] validates them
    pub(crate) fn new_unchecked(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// `(-inf, inf)`
    pub fn unbounded() -> Self {
        Self::new_unchecked(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Well-formed means no NaN and `low < high`
    pub fn is_well_formed(&self) -> bool {
        !self.low.is_nan() && !self.high.is_nan() && self.low < self.high
    }

    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }

    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }

    /// Both sides and the width are finite, so uniform sampling is defined
    #[inline]
    pub fn is_finite(&self) -> bool {
        (self.high - self.low).is_finite()
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.low + self.high)
    }

    /// Draw a value uniformly from the interval, or `None` if it is not [finite](Bounds::is_finite)
    pub fn sample_uniform<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<f64> {
        if self.is_finite() {
            Some(rng.random_range(self.low..=self.high))
        } else {
            None
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Checks that every component of `x` is within its bounds
pub(crate) fn within_bounds<'a>(x: &[f64], bounds: impl IntoIterator<Item = &'a Bounds>) -> bool {
    x.iter().zip(bounds).all(|(&x, b)| b.contains(x))
}

#[derive(Serialize, Deserialize, JsonSchema)]
struct BoundsPair(Option<f64>, Option<f64>);

impl From<Bounds> for BoundsPair {
    fn from(b: Bounds) -> Self {
        Self(
            b.low.is_finite().then_some(b.low),
            b.high.is_finite().then_some(b.high),
        )
    }
}

impl From<BoundsPair> for Bounds {
    fn from(pair: BoundsPair) -> Self {
        Self::new_unchecked(
            pair.0.unwrap_or(f64::NEG_INFINITY),
            pair.1.unwrap_or(f64::INFINITY),
        )
    }
}

impl JsonSchema for Bounds {
    fn inline_schema() -> bool {
        true
    }

    fn schema_name() -> Cow<'static, str> {
        Cow::Borrowed("Bounds")
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        <BoundsPair as JsonSchema>::json_schema(generator)
    }
}
