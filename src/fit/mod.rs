//! Fitting models to light curves
//!
//! A [FitProblem] binds a light curve, a model, a goodness-of-fit function and the parameters.
//! Every algorithm sees it through flat vectors ordered by the free parameter registry
//! [FreeParameters](crate::FreeParameters), reports the same order in [FitResult], and calls a
//! [FitObserver] once per objective evaluation.

mod algorithm;
pub use algorithm::{FitAlgorithm, FitAlgorithmTrait};

mod guess_and_check;
pub use guess_and_check::GuessAndCheckFit;

mod mcmc;
pub use mcmc::McmcFit;

mod observer;
pub use observer::{FitObserver, LogObserver, NoopObserver, TraceObserver, Trial};

mod problem;
pub use problem::FitProblem;

mod result;
pub use result::{Chain, FitResult, Percentiles};

mod simplex;
pub use simplex::SimplexFit;
