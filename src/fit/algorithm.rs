pub(super) use crate::error::FitError;
pub(super) use crate::fit::observer::FitObserver;
pub(super) use crate::fit::problem::{Evaluation, FitProblem};
pub(super) use crate::fit::result::FitResult;
use crate::fit::guess_and_check::GuessAndCheckFit;
use crate::fit::mcmc::McmcFit;
use crate::fit::simplex::SimplexFit;

use enum_dispatch::enum_dispatch;
pub(super) use rand::SeedableRng;
pub(super) use rand::rngs::StdRng;
pub(super) use schemars::JsonSchema;
pub(super) use serde::{Deserialize, Serialize};

/// Fit algorithm: finds free parameters minimizing the goodness of fit of a [FitProblem]
#[enum_dispatch]
pub trait FitAlgorithmTrait {
    fn name(&self) -> &'static str;

    /// Run the fit, `observer` sees every objective evaluation
    fn fit(
        &self,
        problem: &FitProblem,
        observer: &mut dyn FitObserver,
    ) -> Result<FitResult, FitError>;
}

/// All fit algorithms are available as variants of this enum
///
/// Consider to import [FitAlgorithmTrait] as well
#[enum_dispatch(FitAlgorithmTrait)]
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[non_exhaustive]
pub enum FitAlgorithm {
    GuessAndCheck(GuessAndCheckFit),
    Simplex(SimplexFit),
    Mcmc(McmcFit),
}

impl Default for FitAlgorithm {
    fn default() -> Self {
        GuessAndCheckFit::default().into()
    }
}

/// Seeded generator, or a randomly seeded one for `None`
pub(super) fn rng_from_seed(seed: Option<u64>) -> StdRng {
    StdRng::seed_from_u64(seed.unwrap_or_else(rand::random))
}

/// Evaluate all the points, in parallel if asked, results are in the same order as `points`
pub(super) fn evaluate_all(
    problem: &FitProblem,
    points: &[Vec<f64>],
    parallel: bool,
) -> Vec<Evaluation> {
    if parallel {
        use rayon::prelude::*;
        points.par_iter().map(|x| problem.evaluate(x)).collect()
    } else {
        points.iter().map(|x| problem.evaluate(x)).collect()
    }
}
