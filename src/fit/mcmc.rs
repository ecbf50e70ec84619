use crate::fit::algorithm::*;
use crate::fit::result::{Chain, Percentiles};
use crate::params::FreeParameters;

use emcee::{EnsembleSampler, Guess, Prob};
use ndarray::{Array1, Array2, Array3, Axis, aview1, s};
use rand::Rng;
use rand_distr::StandardNormal;
use std::cell::{Cell, RefCell};

/// Affine-invariant ensemble sampler by [emcee]
///
/// The algorithm is described in Goodman & Weare 2010 (Comm. App. Math. Comp. Sci. 5, 65) and
/// Foreman-Mackey et al. 2013 (PASP 125, 306), the stretch move has the scale of two.
///
/// Posterior is the Gaussian likelihood inside of the bounds of free parameters and zero outside.
/// Walkers start uniformly distributed within the bounds, or in a small Gaussian ball around the
/// initial value for parameters with an infinite bound. The first `burn_in` fraction of steps is
/// discarded from the reported chain and percentiles.
///
/// The best result is the point with the highest posterior evaluated during the run.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename = "Mcmc")]
pub struct McmcFit {
    pub nwalkers: u32,
    pub nsteps: u32,
    pub burn_in: f64,
    pub seed: Option<u64>,
}

impl McmcFit {
    /// Create a new [McmcFit]
    ///
    /// # Arguments
    /// - `nwalkers`: ensemble size, must be even and larger than twice the number of free
    ///   parameters
    /// - `nsteps`: number of ensemble steps including burn-in
    /// - `burn_in`: fraction of the first steps to discard, in `[0, 1)`
    /// - `seed`: random generator seed, `None` for a random one
    pub fn new(nwalkers: u32, nsteps: u32, burn_in: f64, seed: Option<u64>) -> Self {
        Self {
            nwalkers,
            nsteps,
            burn_in,
            seed,
        }
    }

    #[inline]
    pub fn default_nwalkers() -> u32 {
        64
    }

    #[inline]
    pub fn default_nsteps() -> u32 {
        2000
    }

    #[inline]
    pub fn default_burn_in() -> f64 {
        0.2
    }

    #[inline]
    pub fn default_seed() -> Option<u64> {
        None
    }

    fn invalid_settings(&self, reason: String) -> FitError {
        FitError::InvalidSettings {
            algorithm: self.name(),
            reason,
        }
    }

    fn check_settings(&self, ndim: usize) -> Result<(), FitError> {
        let nwalkers = self.nwalkers as usize;
        if nwalkers % 2 != 0 || nwalkers <= 2 * ndim {
            return Err(self.invalid_settings(format!(
                "nwalkers = {nwalkers} must be even and larger than twice the number of free parameters {ndim}"
            )));
        }
        if self.nsteps == 0 {
            return Err(self.invalid_settings("nsteps must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.burn_in) {
            return Err(self.invalid_settings(format!(
                "burn_in = {} must be in [0, 1)",
                self.burn_in
            )));
        }
        Ok(())
    }

    /// Number of steps discarded as burn-in
    pub fn nburn(&self) -> usize {
        (self.burn_in * self.nsteps as f64).floor() as usize
    }

    fn initial_walkers<R: Rng>(
        free: &FreeParameters,
        x0: &[f64],
        n: usize,
        rng: &mut R,
    ) -> Vec<Vec<f64>> {
        (0..n)
            .map(|_| {
                free.iter()
                    .zip(x0)
                    .map(|(p, &x0)| {
                        p.bounds.sample_uniform(rng).unwrap_or_else(|| {
                            let eps: f64 = rng.sample(StandardNormal);
                            x0 + 1e-4 * x0.abs().max(1.0) * eps
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

impl Default for McmcFit {
    fn default() -> Self {
        Self::new(
            Self::default_nwalkers(),
            Self::default_nsteps(),
            Self::default_burn_in(),
            Self::default_seed(),
        )
    }
}

/// [Prob] of a fit problem, every evaluation is passed to the observer
struct Posterior<'p, 'o> {
    problem: &'p FitProblem<'p>,
    observer: RefCell<&'o mut dyn FitObserver>,
    iteration: Cell<usize>,
    best: RefCell<(Vec<f64>, Evaluation)>,
}

impl<'p, 'o> Posterior<'p, 'o> {
    fn new(
        problem: &'p FitProblem<'p>,
        observer: &'o mut dyn FitObserver,
        best: (Vec<f64>, Evaluation),
    ) -> Self {
        Self {
            problem,
            observer: RefCell::new(observer),
            iteration: Cell::new(0),
            best: RefCell::new(best),
        }
    }

    fn best_ln_posterior(&self) -> f64 {
        self.best.borrow().1.ln_posterior
    }
}

impl Prob for Posterior<'_, '_> {
    fn lnlike(&self, params: &Guess) -> f64 {
        self.problem.evaluate(&params.values).ln_posterior
    }

    fn lnprior(&self, params: &Guess) -> f64 {
        if self.problem.free().within_bounds(&params.values) {
            0.0
        } else {
            f64::NEG_INFINITY
        }
    }

    fn lnprob(&self, params: &Guess) -> f64 {
        let x = &params.values;
        let evaluation = self.problem.evaluate(x);
        let iteration = self.iteration.get();
        self.observer
            .borrow_mut()
            .observe(iteration, x, evaluation.goodness);
        self.iteration.set(iteration + 1);
        if evaluation.ln_posterior > self.best_ln_posterior() {
            *self.best.borrow_mut() = (x.clone(), evaluation);
        }
        evaluation.ln_posterior
    }
}

impl FitAlgorithmTrait for McmcFit {
    fn name(&self) -> &'static str {
        "mcmc"
    }

    fn fit(
        &self,
        problem: &FitProblem,
        observer: &mut dyn FitObserver,
    ) -> Result<FitResult, FitError> {
        let free = problem.free();
        let ndim = free.len();
        self.check_settings(ndim)?;
        observer.begin(self.name(), free);

        let nwalkers = self.nwalkers as usize;
        let nsteps = self.nsteps as usize;
        let nburn = self.nburn();
        let nkept = nsteps - nburn;
        log::debug!(
            "{}: {nwalkers} walkers, {nsteps} steps ({nburn} burn-in) over {}",
            self.name(),
            free.names().join(", ")
        );

        let seed: u64 = self.seed.unwrap_or_else(emcee_rand::random);
        let mut rng = rng_from_seed(Some(seed));
        let x0 = problem.initial();
        let walkers = Self::initial_walkers(free, &x0, nwalkers, &mut rng);

        let scan: Vec<Evaluation> = walkers.iter().map(|x| problem.evaluate(x)).collect();
        let initial = walkers
            .iter()
            .zip(&scan)
            .filter(|(_, e)| e.ln_posterior > f64::NEG_INFINITY)
            .max_by(|(_, a), (_, b)| a.ln_posterior.total_cmp(&b.ln_posterior))
            .map(|(x, e)| (x.clone(), *e))
            .ok_or_else(|| FitError::Infeasible {
                algorithm: self.name(),
                values: free.values(&x0),
                reason: format!(
                    "all {nwalkers} initial walkers are outside of the posterior support"
                ),
            })?;
        let ninfeasible = scan
            .iter()
            .filter(|e| e.ln_posterior == f64::NEG_INFINITY)
            .count();
        if ninfeasible > 0 {
            log::warn!(
                "{}: {ninfeasible} of {nwalkers} initial walkers are outside of the posterior support",
                self.name(),
            );
        }

        let posterior = Posterior::new(problem, observer, initial);
        let mut sampler = EnsembleSampler::new(nwalkers, ndim, &posterior)
            .map_err(|_| self.invalid_settings("ensemble sampler rejected the settings".into()))?;
        sampler.seed(&[seed as usize]);

        let mut samples = Array3::zeros((nkept, nwalkers, ndim));
        let mut ln_posterior = Array2::zeros((nkept, nwalkers));
        let mut accepted = vec![0_usize; nwalkers];
        let mut previous = walkers.clone();
        let mut step = 0;
        let progress_every = (nsteps / 10).max(1);

        let p0: Vec<Guess> = walkers.iter().map(|x| Guess::new(x)).collect();
        sampler
            .sample(&p0, nsteps, |state| {
                for (w, (guess, &lnp)) in state.pos.iter().zip(state.lnprob.iter()).enumerate() {
                    if guess.values != previous[w] {
                        accepted[w] += 1;
                        previous[w].clone_from(&guess.values);
                    }
                    if step >= nburn {
                        samples
                            .slice_mut(s![step - nburn, w, ..])
                            .assign(&aview1(&guess.values));
                        ln_posterior[[step - nburn, w]] = lnp;
                    }
                }
                step += 1;
                if step % progress_every == 0 {
                    log::debug!(
                        "{}: step {step}/{nsteps}, best ln posterior {}",
                        self.name(),
                        posterior.best_ln_posterior()
                    );
                }
            })
            .map_err(|_| self.invalid_settings("ensemble sampler failed to run".into()))?;
        drop(sampler);

        let acceptance: Array1<f64> = accepted
            .iter()
            .map(|&n| n as f64 / nsteps as f64)
            .collect();
        let chain = Chain {
            samples,
            ln_posterior,
            acceptance,
        };
        let flat = chain.flat();
        let summary = free
            .iter()
            .zip(flat.axis_iter(Axis(1)))
            .map(|(p, column)| {
                let percentiles = Percentiles::from_samples(column)
                    .unwrap_or_else(|| Percentiles::point(f64::NAN));
                (p.name.clone(), percentiles)
            })
            .collect();

        let evaluations = posterior.iteration.get();
        let (x, evaluation) = posterior.best.into_inner();
        log::info!(
            "{}: mean acceptance fraction {:.3}, best ln posterior {}",
            self.name(),
            chain.mean_acceptance(),
            evaluation.ln_posterior
        );
        Ok(FitResult {
            algorithm: self.name(),
            best: problem.parameters_at(&x),
            goodness: evaluation.goodness,
            summary,
            chain: Some(chain),
            evaluations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn too_few_walkers() {
        let (lc, model, params) = noisy_line(0);
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let err = McmcFit::new(3, 10, 0.2, Some(0))
            .fit(&problem, &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, FitError::InvalidSettings { .. }));
    }

    #[test]
    fn infeasible_walkers_are_an_error() {
        let lc = LightCurve::new_without_errors(
            Array1::linspace(-0.1, 0.1, 20),
            Array1::ones(20),
            TimeFormat::Relative,
        )
        .unwrap();
        let model = Model::batman();
        let params = Parameters::from(BatmanParameters {
            a: 2.0,
            ..Default::default()
        })
        .free("b", 3.0, 2.5, 3.5)
        .unwrap();
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let err = McmcFit::new(10, 20, 0.2, Some(0))
            .fit(&problem, &mut NoopObserver)
            .unwrap_err();
        match err {
            FitError::Infeasible { values, .. } => assert_eq!(values.to_string(), "b = 3"),
            _ => panic!("unexpected error {err:?}"),
        }
    }

    #[test]
    fn chain_shape_and_ordering() {
        let (lc, model, params) = noisy_line(1);
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let mut iterations = 0;
        let mut observer = |i: usize, _x: &[f64], _g: f64| {
            assert_eq!(i, iterations);
            iterations += 1;
        };
        let fit = McmcFit::new(8, 100, 0.25, Some(1));
        let result = fit.fit(&problem, &mut observer).unwrap();
        let chain = result.chain.as_ref().unwrap();
        assert_eq!(chain.samples.dim(), (75, 8, 2));
        assert!(result.evaluations >= 8 * 100);
        assert_eq!(iterations, result.evaluations);
        assert!(chain.acceptance.iter().all(|&a| (0.0..=1.0).contains(&a)));
        assert!(chain.mean_acceptance() > 0.0);
        for (_, p) in &result.summary {
            assert!(p.p16 <= p.p50 && p.p50 <= p.p84);
        }
        assert!(problem.free().within_bounds(&problem.free().vector(&result.best)));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let (lc, model, params) = noisy_line(2);
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let fit = McmcFit::new(8, 50, 0.2, Some(5));
        let first = fit.fit(&problem, &mut NoopObserver).unwrap();
        let second = fit.fit(&problem, &mut NoopObserver).unwrap();
        assert_eq!(first.chain, second.chain);
        assert_eq!(first.summary, second.summary);
    }

    #[test]
    fn odd_ensemble_is_rejected() {
        let (lc, model, params) = noisy_line(3);
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let err = McmcFit::new(9, 10, 0.2, Some(0))
            .fit(&problem, &mut NoopObserver)
            .unwrap_err();
        assert!(err.to_string().contains("nwalkers = 9"));
    }

    #[test]
    fn percentile_calibration() {
        let truth = [2.0, 1.0];
        let mut bracketed = 0;
        let ntrials = 40;
        for seed in 0..ntrials {
            let (lc, model, params) = noisy_line(100 + seed);
            let goodness = Goodness::chi_square();
            let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
            let result = McmcFit::new(16, 600, 0.3, Some(seed))
                .fit(&problem, &mut NoopObserver)
                .unwrap();
            for (&value, (_, p)) in truth.iter().zip(&result.summary) {
                assert!(p.p16 <= p.p50 && p.p50 <= p.p84);
                if p.brackets(value) {
                    bracketed += 1;
                }
            }
        }
        // About 68% of 80 intervals are expected to contain the truth
        assert!(bracketed >= 46, "{bracketed} of {} intervals bracket the truth", 2 * ntrials);
        assert!(bracketed <= 72, "{bracketed} of {} intervals bracket the truth", 2 * ntrials);
    }
}
