use crate::array_stats::{nan_mean, nan_sum_squares};

use enum_dispatch::enum_dispatch;
use ndarray::ArrayView1;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Goodness of fit: maps standardized residuals `(data - model) / sigma` to a single number,
/// lower is better
///
/// NaN residuals mark data gaps and are ignored.
#[enum_dispatch]
pub trait GoodnessTrait {
    fn name(&self) -> &'static str;

    fn goodness(&self, residuals: ArrayView1<f64>) -> f64;
}

/// Goodness-of-fit functions usable by the fit algorithms
#[enum_dispatch(GoodnessTrait)]
#[derive(Clone, Copy, Debug, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Goodness {
    SumOfSquares(SumOfSquares),
    ChiSquare(ChiSquare),
    MeanResidual(MeanResidual),
}

impl Goodness {
    pub fn sum_of_squares() -> Self {
        SumOfSquares.into()
    }

    pub fn chi_square() -> Self {
        ChiSquare.into()
    }

    pub fn mean_residual() -> Self {
        MeanResidual.into()
    }
}

impl Default for Goodness {
    fn default() -> Self {
        Self::chi_square()
    }
}

/// $\sum_i r_i^2$
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct SumOfSquares;

impl GoodnessTrait for SumOfSquares {
    fn name(&self) -> &'static str {
        "sum_of_squares"
    }

    fn goodness(&self, residuals: ArrayView1<f64>) -> f64 {
        nan_sum_squares(residuals)
    }
}

/// $\chi^2 = \sum_i r_i^2$ of residuals already divided by uncertainties
///
/// It is the same value as [SumOfSquares], the separate name follows the usual terminology for
/// weighted residuals.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct ChiSquare;

impl GoodnessTrait for ChiSquare {
    fn name(&self) -> &'static str {
        "chi_square"
    }

    fn goodness(&self, residuals: ArrayView1<f64>) -> f64 {
        nan_sum_squares(residuals)
    }
}

/// Mean residual
///
/// It can be negative and is zero for any residuals symmetric around zero, so it is a
/// demonstration of a bad goodness of fit rather than something to optimize.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct MeanResidual;

impl GoodnessTrait for MeanResidual {
    fn name(&self) -> &'static str {
        "mean_residual"
    }

    fn goodness(&self, residuals: ArrayView1<f64>) -> f64 {
        nan_mean(residuals)
    }
}

/// Human-in-the-loop goodness: asks to rate the current model from 1 to 10
///
/// The prompt is written to `output`, and a line of comma-separated ratings is read from `input`,
/// their mean is the goodness. Residuals are ignored. Unparseable answers give NaN. It blocks on
/// input, so it is meant for live demonstrations only and isn't accepted by the fit algorithms.
pub struct Votes<R, W> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> Votes<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input.into_inner(), self.output.into_inner())
    }

    fn ask(&self) -> io::Result<String> {
        let mut output = self.output.borrow_mut();
        writeln!(
            output,
            "On a scale of 1-10, how good is this model?\n[separate multiple entries by commas]"
        )?;
        output.flush()?;
        let mut answer = String::new();
        self.input.borrow_mut().read_line(&mut answer)?;
        Ok(answer)
    }
}

impl Votes<StdinLock<'static>, Stdout> {
    /// Ask on the terminal
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

/// Mean of comma-separated numbers, `None` if any entry isn't a number or there are none
pub fn average_votes(answer: &str) -> Option<f64> {
    let votes = answer
        .split(',')
        .map(|x| x.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    if votes.is_empty() {
        None
    } else {
        Some(votes.iter().sum::<f64>() / votes.len() as f64)
    }
}

impl<R: BufRead, W: Write> GoodnessTrait for Votes<R, W> {
    fn name(&self) -> &'static str {
        "votes"
    }

    fn goodness(&self, _residuals: ArrayView1<f64>) -> f64 {
        let answer = match self.ask() {
            Ok(answer) => answer,
            Err(err) => {
                log::warn!("cannot collect votes: {err}");
                return f64::NAN;
            }
        };
        average_votes(&answer).unwrap_or_else(|| {
            log::warn!("cannot parse votes {:?}", answer.trim());
            f64::NAN
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{Array1, array};
    use rand::prelude::*;

    #[test]
    fn zero_residuals() {
        let zeros = Array1::zeros(100);
        assert_eq!(Goodness::sum_of_squares().goodness(zeros.view()), 0.0);
        assert_eq!(Goodness::chi_square().goodness(zeros.view()), 0.0);
        assert_eq!(Goodness::mean_residual().goodness(zeros.view()), 0.0);
    }

    #[test]
    fn permutation_invariance_and_non_negativity() {
        let mut rng = StdRng::seed_from_u64(0);
        let goodness = Goodness::sum_of_squares();
        for _ in 0..20 {
            let mut r: Vec<f64> = (0..50).map(|_| rng.random_range(-10.0..10.0)).collect();
            let value = goodness.goodness(Array1::from(r.clone()).view());
            assert!(value >= 0.0);
            r.shuffle(&mut rng);
            let shuffled = goodness.goodness(Array1::from(r).view());
            approx::assert_relative_eq!(value, shuffled, max_relative = 1e-12);
        }
    }

    #[test]
    fn nan_residuals_are_ignored() {
        let r = array![1.0, f64::NAN, 2.0, f64::NAN];
        assert_eq!(Goodness::chi_square().goodness(r.view()), 5.0);
        assert_eq!(Goodness::mean_residual().goodness(r.view()), 1.5);
    }

    #[test]
    fn votes_average() {
        let votes = Votes::new("7, 8,9\n".as_bytes(), Vec::new());
        assert_eq!(votes.goodness(array![0.0].view()), 8.0);
        let (_, prompt) = votes.into_inner();
        assert!(String::from_utf8(prompt).unwrap().contains("1-10"));
    }

    #[test]
    fn unparseable_votes() {
        let votes = Votes::new("seven\n".as_bytes(), io::sink());
        assert!(votes.goodness(array![0.0].view()).is_nan());
        assert_eq!(average_votes(""), None);
        assert_eq!(average_votes("1,,2"), None);
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&Goodness::mean_residual()).unwrap();
        let restored: Goodness = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, Goodness::mean_residual());
    }
}
