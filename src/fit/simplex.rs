use crate::fit::algorithm::*;

use cobyla::{Func, RhoBeg, StopTols, minimize};
use std::cell::{Cell, RefCell};

/// Local derivative-free minimization of the goodness of fit by COBYLA
///
/// COBYLA (Constrained Optimization BY Linear Approximations) walks a simplex of trial points
/// over linear approximations of the objective, see M.J.D. Powell's 1994 paper "A direct search
/// optimization method that models the objective and constraint functions by linear
/// interpolation". Bounds of the free parameters are passed as box constraints.
///
/// The optimizer works with parameters scaled to the width of their bounds (or to their initial
/// value for unbounded parameters), so `rhobeg` is the initial step as a fraction of it. Trials
/// with an undefined goodness of fit, e.g. invalid transit geometry, are heavily penalized.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "Simplex")]
pub struct SimplexFit {
    pub niterations: u32,
    pub rhobeg: f64,
    pub ftol_rel: f64,
}

impl SimplexFit {
    /// Create a new [SimplexFit]
    ///
    /// # Arguments
    /// - `niterations`: maximum number of objective evaluations
    /// - `rhobeg`: initial step relative to the parameter scale
    /// - `ftol_rel`: relative tolerance on the goodness for convergence
    pub fn new(niterations: u32, rhobeg: f64, ftol_rel: f64) -> Self {
        assert!(niterations > 0, "niterations must be positive");
        assert!(
            rhobeg.is_finite() && rhobeg > 0.0,
            "rhobeg must be positive and finite"
        );
        assert!(
            ftol_rel.is_finite() && ftol_rel >= 0.0,
            "ftol_rel must be non-negative and finite"
        );
        Self {
            niterations,
            rhobeg,
            ftol_rel,
        }
    }

    #[inline]
    pub fn default_niterations() -> u32 {
        1000
    }

    #[inline]
    pub fn default_rhobeg() -> f64 {
        0.1
    }

    #[inline]
    pub fn default_ftol_rel() -> f64 {
        1e-8
    }
}

impl Default for SimplexFit {
    fn default() -> Self {
        Self::new(
            Self::default_niterations(),
            Self::default_rhobeg(),
            Self::default_ftol_rel(),
        )
    }
}

/// Affine map between parameters and the optimizer space, `x = x0 + scale * u`
struct Scaling {
    x0: Vec<f64>,
    scale: Vec<f64>,
}

impl Scaling {
    fn new(problem: &FitProblem) -> Self {
        let x0 = problem.initial();
        let scale = problem
            .free()
            .bounds()
            .zip(&x0)
            .map(|(b, &x)| {
                if b.is_finite() {
                    b.high() - b.low()
                } else {
                    x.abs().max(1.0)
                }
            })
            .collect();
        Self { x0, scale }
    }

    fn to_params(&self, u: &[f64]) -> Vec<f64> {
        self.x0
            .iter()
            .zip(&self.scale)
            .zip(u)
            .map(|((&x0, &s), &u)| x0 + s * u)
            .collect()
    }

    fn bounds(&self, problem: &FitProblem) -> Vec<(f64, f64)> {
        problem
            .free()
            .bounds()
            .zip(self.x0.iter().zip(&self.scale))
            .map(|(b, (&x0, &s))| ((b.low() - x0) / s, (b.high() - x0) / s))
            .collect()
    }
}

impl FitAlgorithmTrait for SimplexFit {
    fn name(&self) -> &'static str {
        "simplex"
    }

    fn fit(
        &self,
        problem: &FitProblem,
        observer: &mut dyn FitObserver,
    ) -> Result<FitResult, FitError> {
        let free = problem.free();
        observer.begin(self.name(), free);

        let scaling = Scaling::new(problem);
        let observer = RefCell::new(observer);
        let iteration = Cell::new(0);
        let best: RefCell<Option<(Vec<f64>, f64)>> = RefCell::new(None);

        let objective = |u: &[f64], _user_data: &mut ()| -> f64 {
            let x = scaling.to_params(u);
            // Bounds are clipped, COBYLA may step slightly outside of them
            let x: Vec<f64> = x
                .iter()
                .zip(free.bounds())
                .map(|(&x, b)| x.clamp(b.low(), b.high()))
                .collect();
            let evaluation = problem.evaluate(&x);
            let i = iteration.get();
            iteration.set(i + 1);
            observer.borrow_mut().observe(i, &x, evaluation.goodness);

            let goodness = evaluation.comparable_goodness();
            if goodness.is_finite() {
                let mut best = best.borrow_mut();
                if best.as_ref().is_none_or(|(_, g)| goodness < *g) {
                    *best = Some((x, goodness));
                }
                goodness
            } else {
                f64::MAX
            }
        };

        let u0 = vec![0.0; free.len()];
        let bounds = scaling.bounds(problem);
        let constraints: Vec<&dyn Func<()>> = vec![];
        let stop_tol = StopTols {
            ftol_rel: self.ftol_rel,
            ..StopTols::default()
        };

        let result = minimize(
            objective,
            &u0,
            &bounds,
            &constraints,
            (),
            self.niterations as usize,
            RhoBeg::All(self.rhobeg),
            Some(stop_tol),
        );
        match &result {
            Ok((status, _, _)) => log::debug!("{}: COBYLA finished with {status:?}", self.name()),
            Err((status, _, _)) => {
                log::warn!("{}: COBYLA stopped with {status:?}", self.name())
            }
        }

        let evaluations = iteration.get();
        let (x, goodness) = best.into_inner().ok_or_else(|| FitError::Infeasible {
            algorithm: self.name(),
            values: free.values(&scaling.x0),
            reason: format!("none of {evaluations} trials has a finite goodness of fit"),
        })?;
        log::info!(
            "{}: best goodness {goodness} after {evaluations} evaluations",
            self.name()
        );
        Ok(FitResult::point_estimate(
            self.name(),
            free,
            problem.parameters(),
            &x,
            goodness,
            evaluations,
        ))
    }
}
