use crate::fit::algorithm::*;
use crate::params::FreeParameters;

use rand::Rng;

/// Random search: evaluate uniformly drawn parameters, keep the best
///
/// The initial parameters are evaluated first, then each of `niterations` trials draws every
/// free parameter uniformly from its bounds. A parameter with an infinite side of its bounds
/// keeps its initial value. Trials are drawn from a single seeded generator in advance, so a
/// parallel run gives the same result as the sequential one, and running more iterations with
/// the same seed extends the sequence of trials and can only improve the result.
#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename = "GuessAndCheck")]
pub struct GuessAndCheckFit {
    pub niterations: u32,
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl GuessAndCheckFit {
    /// Create a new [GuessAndCheckFit]
    ///
    /// # Arguments
    /// - `niterations`: number of random trials besides the initial parameters
    /// - `seed`: random generator seed, `None` for a random one
    /// - `parallel`: evaluate trials with [rayon]
    pub fn new(niterations: u32, seed: Option<u64>, parallel: bool) -> Self {
        Self {
            niterations,
            seed,
            parallel,
        }
    }

    #[inline]
    pub fn default_niterations() -> u32 {
        100
    }

    #[inline]
    pub fn default_seed() -> Option<u64> {
        None
    }

    #[inline]
    pub fn default_parallel() -> bool {
        false
    }

    fn draw<R: Rng>(free: &FreeParameters, initial: &[f64], rng: &mut R) -> Vec<f64> {
        free.iter()
            .zip(initial)
            .map(|(p, &x0)| p.bounds.sample_uniform(rng).unwrap_or(x0))
            .collect()
    }
}

impl Default for GuessAndCheckFit {
    fn default() -> Self {
        Self::new(
            Self::default_niterations(),
            Self::default_seed(),
            Self::default_parallel(),
        )
    }
}

impl FitAlgorithmTrait for GuessAndCheckFit {
    fn name(&self) -> &'static str {
        "guess-and-check"
    }

    fn fit(
        &self,
        problem: &FitProblem,
        observer: &mut dyn FitObserver,
    ) -> Result<FitResult, FitError> {
        let free = problem.free();
        observer.begin(self.name(), free);
        log::debug!(
            "{}: {} trials of {}",
            self.name(),
            self.niterations,
            free.names().join(", ")
        );

        let mut rng = rng_from_seed(self.seed);
        let initial = problem.initial();
        let trials: Vec<_> = std::iter::once(initial.clone())
            .chain((0..self.niterations).map(|_| Self::draw(free, &initial, &mut rng)))
            .collect();
        let evaluations = evaluate_all(problem, &trials, self.parallel);

        let mut best: Option<(usize, f64)> = None;
        for (i, (x, evaluation)) in trials.iter().zip(&evaluations).enumerate() {
            observer.observe(i, x, evaluation.goodness);
            let goodness = evaluation.comparable_goodness();
            if goodness.is_finite() && best.is_none_or(|(_, g)| goodness < g) {
                best = Some((i, goodness));
            }
        }

        let (index, goodness) = best.ok_or_else(|| FitError::Infeasible {
            algorithm: self.name(),
            values: free.values(&initial),
            reason: format!(
                "none of {} trials has a finite goodness of fit",
                trials.len()
            ),
        })?;
        log::info!(
            "{}: best goodness {goodness} at trial {index} of {}",
            self.name(),
            trials.len()
        );
        Ok(FitResult::point_estimate(
            self.name(),
            free,
            problem.parameters(),
            &trials[index],
            goodness,
            trials.len(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;

    #[test]
    fn deterministic_with_seed() {
        let (lc, model, params) = noisy_line(0);
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let fit = GuessAndCheckFit::new(200, Some(42), false);
        let a = fit.fit(&problem, &mut NoopObserver).unwrap();
        let b = fit.fit(&problem, &mut NoopObserver).unwrap();
        assert_eq!(a.best, b.best);
        assert_eq!(a.goodness, b.goodness);
        assert_eq!(a.evaluations, 201);
    }

    #[test]
    fn more_iterations_never_worse() {
        let (lc, model, params) = noisy_line(1);
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let mut previous = f64::INFINITY;
        for n in [0, 1, 10, 50, 100, 500] {
            let result = GuessAndCheckFit::new(n, Some(7), false)
                .fit(&problem, &mut NoopObserver)
                .unwrap();
            assert!(result.goodness <= previous);
            previous = result.goodness;
        }
    }

    #[test]
    fn parallel_equals_sequential() {
        let (lc, model, params) = noisy_line(2);
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let sequential = GuessAndCheckFit::new(300, Some(3), false)
            .fit(&problem, &mut NoopObserver)
            .unwrap();
        let mut trace = TraceObserver::new();
        let parallel = GuessAndCheckFit::new(300, Some(3), true)
            .fit(&problem, &mut trace)
            .unwrap();
        assert_eq!(sequential.best, parallel.best);
        assert_eq!(sequential.goodness, parallel.goodness);
        // Observer sees trials in order
        assert!(
            trace
                .trials()
                .iter()
                .enumerate()
                .all(|(i, trial)| trial.iteration == i)
        );
        assert_eq!(trace.best_so_far().last(), Some(&parallel.goodness));
    }

    #[test]
    fn unbounded_parameter_keeps_value() {
        let (lc, model, _) = noisy_line(3);
        let params = Parameters::new()
            .free("slope", 1.5, f64::NEG_INFINITY, f64::INFINITY)
            .unwrap()
            .free("intercept", 0.0, -2.0, 2.0)
            .unwrap();
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let mut trace = TraceObserver::new();
        GuessAndCheckFit::new(20, Some(0), false)
            .fit(&problem, &mut trace)
            .unwrap();
        assert!(trace.trials().iter().all(|trial| trial.x[0] == 1.5));
        assert!(trace.trials().iter().skip(1).any(|trial| trial.x[1] != 0.0));
    }

    #[test]
    fn overflowing_bounds_keep_value() {
        let (lc, model, _) = noisy_line(4);
        let params = Parameters::new()
            .free("slope", 0.0, -1e308, 1e308)
            .unwrap()
            .free("intercept", 1.0, 0.0, 2.0)
            .unwrap();
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let mut trace = TraceObserver::new();
        GuessAndCheckFit::new(5, Some(0), false)
            .fit(&problem, &mut trace)
            .unwrap();
        assert_eq!(trace.trials().len(), 6);
        assert!(trace.trials().iter().all(|trial| trial.x[0] == 0.0));
    }

    #[test]
    fn infeasible_everywhere() {
        let lc = LightCurve::new_without_errors(vec![0.0, 1.0], vec![1.0, 1.0], TimeFormat::Relative)
            .unwrap();
        let model = Model::batman();
        // Impact parameter is always beyond the orbit
        let params = BatmanParameters {
            a: 2.0,
            ..Default::default()
        };
        let params = Parameters::from(params).free("b", 3.0, 2.5, 3.5).unwrap();
        let goodness = Goodness::chi_square();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let err = GuessAndCheckFit::new(10, Some(0), false)
            .fit(&problem, &mut NoopObserver)
            .unwrap_err();
        assert!(matches!(err, FitError::Infeasible { .. }));
        assert!(err.to_string().contains("b = 3"));
    }

    #[test]
    fn recovers_injected_transit_radius() {
        let injected = BatmanParameters {
            period: 3.14,
            t0: 0.3,
            radius: 0.1,
            a: 10.0,
            b: 0.3,
            baseline: 1.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(2024);
        let lc = simulate_transit_data(
            &Model::batman(),
            &injected.into(),
            &PhotonNoise::new(1e6, 1.0 / 1440.0, 10.0),
            &mut rng,
        )
        .unwrap();
        let params = Parameters::from(injected)
            .free("radius", 0.05, 0.0, 0.3)
            .unwrap();
        let goodness = Goodness::chi_square();
        let model = Model::batman();
        let problem = FitProblem::new(&lc, &model, &goodness, params).unwrap();
        let result = GuessAndCheckFit::new(500, Some(0), true)
            .fit(&problem, &mut NoopObserver)
            .unwrap();
        let radius = result.best.value("radius").unwrap();
        assert!((radius - 0.1).abs() < 0.02, "radius = {radius}");
        assert_eq!(result.percentiles("radius"), Some(&Percentiles::point(radius)));
    }
}
