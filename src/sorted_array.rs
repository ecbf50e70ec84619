use ndarray::Array1;
use std::ops::Deref;

// Underlying array is guaranteed to be sorted, contiguous and NaN-free
#[derive(Clone, Debug, PartialEq)]
pub struct SortedArray(Array1<f64>);

impl SortedArray {
    /// Sort a copy of the sample dropping NaN values
    pub fn from_unsorted_skip_nan<'a>(values: impl IntoIterator<Item = &'a f64>) -> Self {
        values
            .into_iter()
            .copied()
            .filter(|x| !x.is_nan())
            .collect::<Vec<_>>()
            .into()
    }

    pub fn maximum(&self) -> f64 {
        self[self.len() - 1]
    }

    pub fn median(&self) -> f64 {
        assert_ne!(self.len(), 0);
        let i = (self.len() - 1) / 2;
        if self.len() % 2 == 0 {
            0.5 * (self[i] + self[i + 1])
        } else {
            self[i]
        }
    }

    /// Percentile with linear interpolation between closest ranks, `q` is in percents
    ///
    /// This is R-7 from <https://en.wikipedia.org/wiki/Quantile>, the `numpy.percentile` default
    pub fn percentile(&self, q: f64) -> f64 {
        assert_ne!(self.len(), 0);
        assert!(
            (0.0..=100.0).contains(&q),
            "percentile should be between zero and one hundred"
        );
        let h = (self.len() - 1) as f64 * q / 100.0;
        let h_floor = h.floor();
        #[allow(clippy::cast_sign_loss)]
        let i = h_floor as usize;
        if i >= self.len() - 1 {
            self.maximum()
        } else {
            self[i] + (h - h_floor) * (self[i + 1] - self[i])
        }
    }
}

impl From<Vec<f64>> for SortedArray {
    fn from(mut v: Vec<f64>) -> Self {
        v.retain(|x| !x.is_nan());
        v.sort_unstable_by(f64::total_cmp);
        Self(Array1::from_vec(v))
    }
}

impl Deref for SortedArray {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        self.0.as_slice().unwrap()
    }
}
