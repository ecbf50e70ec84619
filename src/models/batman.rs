use crate::models::model::*;
use crate::models::occultation::blocked_fraction;

use std::f64::consts::PI;

const NAMES: [&str; 8] = ["period", "t0", "radius", "a", "b", "baseline", "ld1", "ld2"];

macro_const! {
    const DOC: &str = r#"
Transit of a planet on a circular orbit across a star with quadratic limb darkening

Planet is at the sky-projected distance from the star center, in stellar radii,

$$
z(t) = a \sqrt{\sin^2\phi + \cos^2 i \cos^2 \phi},\quad \phi = 2\pi \frac{t - t_0}{P},\quad \cos i = b / a,
$$

and is in front of the star when $\cos\phi > 0$. Blocked flux is integrated over concentric
annuli of the stellar disk, each annulus contributes its intensity
$I(\mu) = 1 - u_1 (1 - \mu) - u_2 (1 - \mu)^2$ times the area covered by the planet, the same
scheme is used by the `batman` package. Result is multiplied by the baseline flux.

- Parameters: **period** (days), **t0** (mid-transit time), **radius** ($R_p / R_\star$),
  **a** ($a / R_\star$), **b** (impact parameter), **baseline**, **ld1** and **ld2**
  (limb-darkening coefficients)
- Valid geometry: period > 0, a > 0, $0 \le$ radius $\le 1$, $0 \le b < a$
"#;
}

#[doc = DOC!()]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename = "Batman")]
pub struct BatmanTransit {
    /// Number of annuli used to integrate the blocked flux
    pub nannuli: usize,
}

impl BatmanTransit {
    pub fn new(nannuli: usize) -> Self {
        assert!(nannuli > 0, "nannuli must be positive");
        Self { nannuli }
    }

    #[inline]
    pub fn default_nannuli() -> usize {
        256
    }
}

impl Default for BatmanTransit {
    fn default() -> Self {
        Self::new(Self::default_nannuli())
    }
}

impl TransitModelTrait for BatmanTransit {
    fn name(&self) -> &'static str {
        "batman"
    }

    fn parameter_names(&self) -> &'static [&'static str] {
        &NAMES
    }

    fn default_parameters(&self) -> Parameters {
        BatmanParameters::default().into()
    }

    fn evaluate(&self, t: ArrayView1<f64>, params: &Parameters) -> Result<Array1<f64>, ModelError> {
        BatmanParameters::from_parameters(params)?.light_curve_with(t, self.nannuli)
    }
}

/// Typed parameters of [BatmanTransit]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BatmanParameters {
    pub period: f64,
    pub t0: f64,
    pub radius: f64,
    pub a: f64,
    pub b: f64,
    pub baseline: f64,
    pub ld: [f64; 2],
}

impl BatmanParameters {
    pub fn from_parameters(params: &Parameters) -> Result<Self, ModelError> {
        let get = |name| required("batman", params, name);
        Ok(Self {
            period: get("period")?,
            t0: get("t0")?,
            radius: get("radius")?,
            a: get("a")?,
            b: get("b")?,
            baseline: get("baseline")?,
            ld: [get("ld1")?, get("ld2")?],
        })
    }

    fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("period", self.period),
            ("t0", self.t0),
            ("radius", self.radius),
            ("a", self.a),
            ("b", self.b),
            ("baseline", self.baseline),
            ("ld1", self.ld[0]),
            ("ld2", self.ld[1]),
        ]
    }

    /// Check that the orbit and the planet are well defined
    pub fn validate(&self) -> Result<(), ModelError> {
        check_finite(self.named())?;
        if self.period <= 0.0 {
            return Err(ModelError::geometry(
                "period must be positive",
                [("period", self.period)],
            ));
        }
        if self.a <= 0.0 {
            return Err(ModelError::geometry(
                "semi-major axis must be positive",
                [("a", self.a)],
            ));
        }
        if !(0.0..=1.0).contains(&self.radius) {
            return Err(ModelError::geometry(
                "radius ratio must be in [0, 1]",
                [("radius", self.radius)],
            ));
        }
        if self.b < 0.0 {
            return Err(ModelError::geometry(
                "impact parameter must be non-negative",
                [("b", self.b)],
            ));
        }
        if self.b >= self.a {
            return Err(ModelError::geometry(
                "impact parameter must be smaller than semi-major axis, inclination is undefined",
                [("b", self.b), ("a", self.a)],
            ));
        }
        Ok(())
    }

    /// Orbital inclination in degrees
    pub fn inclination(&self) -> Result<f64, ModelError> {
        self.validate()?;
        Ok((self.b / self.a).acos().to_degrees())
    }

    /// Sky-projected star-planet distance in stellar radii, `None` when the planet is behind the
    /// star
    fn separation(&self, t: f64, cos_i: f64) -> Option<f64> {
        let phi = 2.0 * PI * (t - self.t0) / self.period;
        let (sin_phi, cos_phi) = phi.sin_cos();
        (cos_phi > 0.0).then(|| {
            self.a * (sin_phi * sin_phi + cos_i * cos_i * cos_phi * cos_phi).sqrt()
        })
    }

    /// Model flux at times `t`
    pub fn light_curve(&self, t: ArrayView1<f64>) -> Result<Array1<f64>, ModelError> {
        self.light_curve_with(t, BatmanTransit::default_nannuli())
    }

    fn light_curve_with(
        &self,
        t: ArrayView1<f64>,
        nannuli: usize,
    ) -> Result<Array1<f64>, ModelError> {
        self.validate()?;
        let cos_i = self.b / self.a;
        let [u1, u2] = self.ld;
        Ok(t.mapv(|t| {
            let blocked = self
                .separation(t, cos_i)
                .map_or(0.0, |z| blocked_fraction(z, self.radius, u1, u2, nannuli));
            self.baseline * (1.0 - blocked)
        }))
    }
}

impl Default for BatmanParameters {
    /// GJ 1132b-like limb darkening
    fn default() -> Self {
        Self {
            period: 1.0,
            t0: 0.0,
            radius: 0.1,
            a: 10.0,
            b: 0.0,
            baseline: 1.0,
            ld: [0.1956, 0.3700],
        }
    }
}

impl From<BatmanParameters> for Parameters {
    fn from(p: BatmanParameters) -> Self {
        p.named()
            .into_iter()
            .fold(Parameters::new(), |params, (name, value)| {
                params.fixed(name, value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn impact_parameter_beyond_orbit() {
        let params = BatmanParameters {
            b: 12.0,
            a: 10.0,
            ..Default::default()
        };
        let err = params.light_curve(array![0.0].view()).unwrap_err();
        match &err {
            ModelError::InvalidGeometry { values, .. } => {
                assert_eq!(values.to_string(), "b = 12, a = 10");
            }
            _ => panic!("unexpected error {err:?}"),
        }
        let model = BatmanTransit::default();
        assert!(
            model
                .evaluate(array![0.0].view(), &params.into())
                .is_err()
        );
    }

    #[test]
    fn baseline_outside_of_transit() {
        let params = BatmanParameters {
            period: 3.14,
            t0: 0.3,
            b: 0.3,
            baseline: 1.7,
            ..Default::default()
        };
        // Transit half-duration is below P / (2 pi a) * (1 + radius) ~ 0.055 days
        let t = Array1::linspace(0.3 + 0.2, 0.3 + 3.14 - 0.2, 1000);
        let flux = params.light_curve(t.view()).unwrap();
        for &f in flux.iter() {
            assert_relative_eq!(f, 1.7);
        }
    }

    #[test]
    fn depth_of_uniform_disk() {
        let params = BatmanParameters {
            ld: [0.0, 0.0],
            ..Default::default()
        };
        let flux = params.light_curve(array![0.0, 1.0, -2.0].view()).unwrap();
        for &f in flux.iter() {
            assert_relative_eq!(1.0 - f, 0.01, max_relative = 1e-10);
        }
    }

    #[test]
    fn limb_darkening_is_deeper_in_center() {
        let params = BatmanParameters::default();
        let t = array![0.0, 0.01];
        let flux = params.light_curve(t.view()).unwrap();
        let uniform = BatmanParameters {
            ld: [0.0, 0.0],
            ..params
        }
        .light_curve(t.view())
        .unwrap();
        assert!(flux[0] < uniform[0]);
        assert!(flux[0] < flux[1]);
    }

    #[test]
    fn symmetric_around_t0() {
        let params = BatmanParameters {
            t0: 0.25,
            b: 0.5,
            ..Default::default()
        };
        let dt: Array1<f64> = Array1::linspace(0.0, 0.05, 26);
        let before = params.light_curve((0.25_f64 - &dt).view()).unwrap();
        let after = params.light_curve((0.25_f64 + &dt).view()).unwrap();
        for (a, b) in before.iter().zip(after.iter()) {
            assert_relative_eq!(a, b, max_relative = 1e-9);
        }
    }

    #[test]
    fn no_secondary_eclipse() {
        let params = BatmanParameters::default();
        let flux = params.light_curve(array![0.5].view()).unwrap();
        assert_eq!(flux[0], 1.0);
    }

    #[test]
    fn inclination_of_central_transit() {
        assert_relative_eq!(BatmanParameters::default().inclination().unwrap(), 90.0);
    }

    #[test]
    fn radius_ratio_domain() {
        let params = BatmanParameters {
            radius: 1.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn trait_evaluation_reads_named_parameters() {
        let model = BatmanTransit::default();
        let params = model.default_parameters();
        let t = Array1::linspace(-0.1, 0.1, 51);
        let direct = BatmanParameters::default().light_curve(t.view()).unwrap();
        assert_eq!(model.evaluate(t.view(), &params).unwrap(), direct);
    }
}
