use crate::params::FreeParameters;

/// Hook called once per objective evaluation of a fit
///
/// `iteration` counts evaluations from zero, `x` is ordered by the [FreeParameters] passed to
/// [FitObserver::begin], `goodness` is infinite for trials outside of the prior support. It is a
/// pure observer: fit results don't depend on it.
///
/// Any `FnMut(usize, &[f64], f64)` closure is an observer.
pub trait FitObserver {
    /// Called once before the first evaluation
    fn begin(&mut self, _algorithm: &'static str, _free: &FreeParameters) {}

    fn observe(&mut self, iteration: usize, x: &[f64], goodness: f64);
}

impl<F> FitObserver for F
where
    F: FnMut(usize, &[f64], f64),
{
    fn observe(&mut self, iteration: usize, x: &[f64], goodness: f64) {
        self(iteration, x, goodness)
    }
}

/// Observer which does nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl FitObserver for NoopObserver {
    fn observe(&mut self, _iteration: usize, _x: &[f64], _goodness: f64) {}
}

/// Single recorded evaluation
#[derive(Clone, Debug, PartialEq)]
pub struct Trial {
    pub iteration: usize,
    pub x: Vec<f64>,
    pub goodness: f64,
}

/// Observer recording every trial and the best goodness seen so far
///
/// This is the data source for live plots and progress readouts.
#[derive(Clone, Debug, Default)]
pub struct TraceObserver {
    names: Vec<String>,
    trials: Vec<Trial>,
    best_so_far: Vec<f64>,
}

impl TraceObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Free parameter names, in the order of [Trial::x]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    /// Best goodness after each trial, non-increasing
    pub fn best_so_far(&self) -> &[f64] {
        &self.best_so_far
    }

    /// Trial with the lowest goodness, the earliest one for ties
    pub fn best(&self) -> Option<&Trial> {
        self.trials
            .iter()
            .filter(|trial| !trial.goodness.is_nan())
            .reduce(|best, trial| {
                if trial.goodness < best.goodness {
                    trial
                } else {
                    best
                }
            })
    }
}

impl FitObserver for TraceObserver {
    fn begin(&mut self, _algorithm: &'static str, free: &FreeParameters) {
        self.names = free.names().into_iter().map(String::from).collect();
        self.trials.clear();
        self.best_so_far.clear();
    }

    fn observe(&mut self, iteration: usize, x: &[f64], goodness: f64) {
        let previous = self.best_so_far.last().copied().unwrap_or(f64::INFINITY);
        self.best_so_far.push(if goodness < previous {
            goodness
        } else {
            previous
        });
        self.trials.push(Trial {
            iteration,
            x: x.to_vec(),
            goodness,
        });
    }
}

/// Observer reporting progress through the [log] facade
///
/// Every `every`-th evaluation is logged at the debug level, and every improvement of the best
/// goodness at the trace level.
#[derive(Clone, Debug)]
pub struct LogObserver {
    every: usize,
    algorithm: &'static str,
    free: Option<FreeParameters>,
    best: f64,
}

impl LogObserver {
    pub fn new(every: usize) -> Self {
        assert!(every > 0, "every must be positive");
        Self {
            every,
            algorithm: "fit",
            free: None,
            best: f64::INFINITY,
        }
    }

    #[inline]
    pub fn default_every() -> usize {
        100
    }

    fn describe(&self, x: &[f64]) -> String {
        match &self.free {
            Some(free) => free.values(x).to_string(),
            None => format!("{x:?}"),
        }
    }
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::new(Self::default_every())
    }
}

impl FitObserver for LogObserver {
    fn begin(&mut self, algorithm: &'static str, free: &FreeParameters) {
        self.algorithm = algorithm;
        self.free = Some(free.clone());
        self.best = f64::INFINITY;
        log::debug!("{algorithm}: fitting {}", free.names().join(", "));
    }

    fn observe(&mut self, iteration: usize, x: &[f64], goodness: f64) {
        if goodness < self.best {
            self.best = goodness;
            log::trace!(
                "{} #{iteration}: new best goodness {goodness} at {}",
                self.algorithm,
                self.describe(x)
            );
        }
        if iteration % self.every == 0 {
            log::debug!(
                "{} #{iteration}: goodness {goodness}, best so far {}",
                self.algorithm,
                self.best
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Parameters;

    #[test]
    fn closure_is_observer() {
        let mut seen = vec![];
        {
            let mut observer = |i: usize, x: &[f64], g: f64| seen.push((i, x[0], g));
            let observer: &mut dyn FitObserver = &mut observer;
            observer.observe(0, &[1.0], 2.0);
            observer.observe(1, &[3.0], 4.0);
        }
        assert_eq!(seen, vec![(0, 1.0, 2.0), (1, 3.0, 4.0)]);
    }

    #[test]
    fn trace_best_so_far() {
        let free = Parameters::new()
            .free("radius", 0.1, 0.0, 1.0)
            .unwrap()
            .free_parameters();
        let mut trace = TraceObserver::new();
        trace.begin("test", &free);
        for (i, g) in [3.0, f64::INFINITY, 1.0, 2.0, f64::NAN, 1.0].into_iter().enumerate() {
            trace.observe(i, &[i as f64], g);
        }
        assert_eq!(trace.names(), &["radius".to_string()]);
        assert_eq!(trace.best_so_far(), &[3.0, 3.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(trace.best().unwrap().iteration, 2);
    }

    #[test]
    fn log_observer_tracks_best() {
        let free = Parameters::new()
            .free("a", 1.0, 0.0, 2.0)
            .unwrap()
            .free_parameters();
        let mut observer = LogObserver::new(2);
        observer.begin("test", &free);
        observer.observe(0, &[1.0], 5.0);
        observer.observe(1, &[1.5], 7.0);
        assert_eq!(observer.best, 5.0);
        assert_eq!(observer.describe(&[1.5]), "a = 1.5");
    }
}
