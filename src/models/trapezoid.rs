use crate::models::model::*;

const NAMES: [&str; 6] = ["delta", "period", "t0", "duration", "tau", "baseline"];

macro_const! {
    const DOC: &str = r#"
Trapezoid approximation of a transit

Light curve is phase-folded on the period around $t_0$, it is unity out of transit, then it
linearly ramps over the ingress time $\tau$ down to the flat bottom of depth $\delta$ and back up
over the egress, the total duration measured at the half depth is $T$. When $\tau > T$ the ramps
would overlap, so the model becomes V-shaped: linear ramps of length $\tau$ meeting at the depth
$\delta$ at mid-transit. Result is multiplied by the baseline flux.

- Parameters: **delta**, **period** (days), **t0**, **duration** ($T$, days), **tau** (days),
  **baseline**
- Valid geometry: period > 0, duration $\ge 0$, tau $\ge 0$
"#;
}

#[doc = DOC!()]
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TrapezoidTransit;

impl TransitModelTrait for TrapezoidTransit {
    fn name(&self) -> &'static str {
        "trapezoid"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &NAMES
    }

    fn default_parameters(&self) -> Parameters {
        TrapezoidParameters::default().into()
    }

    fn evaluate(&self, t: ArrayView1<f64>, params: &Parameters) -> Result<Array1<f64>, ModelError> {
        TrapezoidParameters::from_parameters(params)?.light_curve(t)
    }
}

/// Typed parameters of [TrapezoidTransit]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct TrapezoidParameters {
    pub delta: f64,
    pub period: f64,
    pub t0: f64,
    pub duration: f64,
    pub tau: f64,
    pub baseline: f64,
}

/// Corners of the trapezoid in the folded time
#[derive(Clone, Copy, Debug, PartialEq)]
struct Corners {
    x1: f64,
    x2: f64,
    x3: f64,
    x4: f64,
    slope: f64,
}

impl TrapezoidParameters {
    pub fn from_parameters(params: &Parameters) -> Result<Self, ModelError> {
        let get = |name| required("trapezoid", params, name);
        Ok(Self {
            delta: get("delta")?,
            period: get("period")?,
            t0: get("t0")?,
            duration: get("duration")?,
            tau: get("tau")?,
            baseline: get("baseline")?,
        })
    }

    fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("delta", self.delta),
            ("period", self.period),
            ("t0", self.t0),
            ("duration", self.duration),
            ("tau", self.tau),
            ("baseline", self.baseline),
        ]
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_finite(self.named())?;
        if self.period <= 0.0 {
            return Err(ModelError::geometry(
                "period must be positive",
                [("period", self.period)],
            ));
        }
        if self.duration < 0.0 || self.tau < 0.0 {
            return Err(ModelError::geometry(
                "transit duration and ingress time must be non-negative",
                [("duration", self.duration), ("tau", self.tau)],
            ));
        }
        Ok(())
    }

    /// True if the ramps overlap and the transit has no flat bottom
    #[inline]
    pub fn is_v_shaped(&self) -> bool {
        self.tau > self.duration
    }

    fn corners(&self) -> Corners {
        let (x1, x2, x3, x4) = if self.is_v_shaped() {
            (-self.tau, 0.0, 0.0, self.tau)
        } else {
            let half_outer = 0.5 * (self.duration + self.tau);
            let half_inner = 0.5 * (self.duration - self.tau);
            (-half_outer, -half_inner, half_inner, half_outer)
        };
        let slope = if self.tau > 0.0 {
            self.delta / self.tau
        } else {
            0.0
        };
        Corners {
            x1,
            x2,
            x3,
            x4,
            slope,
        }
    }

    /// Time from the nearest mid-transit, in `[-period/2, period/2)`
    #[inline]
    fn folded(&self, t: f64) -> f64 {
        let half = 0.5 * self.period;
        (t - self.t0 + half).rem_euclid(self.period) - half
    }

    fn relative_flux(&self, x: f64, c: &Corners) -> f64 {
        if x <= c.x1 || x >= c.x4 {
            1.0
        } else if x < c.x2 {
            1.0 - c.slope * (x - c.x1)
        } else if x <= c.x3 {
            1.0 - self.delta
        } else {
            1.0 - c.slope * (c.x4 - x)
        }
    }

    /// Model flux at times `t`
    pub fn light_curve(&self, t: ArrayView1<f64>) -> Result<Array1<f64>, ModelError> {
        self.validate()?;
        let corners = self.corners();
        Ok(t.mapv(|t| self.baseline * self.relative_flux(self.folded(t), &corners)))
    }
}

impl Default for TrapezoidParameters {
    fn default() -> Self {
        Self {
            delta: 0.01,
            period: 1.0,
            t0: 0.0,
            duration: 0.1,
            tau: 0.01,
            baseline: 1.0,
        }
    }
}

impl From<TrapezoidParameters> for Parameters {
    fn from(p: TrapezoidParameters) -> Self {
        p.named()
            .into_iter()
            .fold(Parameters::new(), |params, (name, value)| {
                params.fixed(name, value)
            })
    }
}
