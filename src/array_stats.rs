//! NaN-aware array reductions
//!
//! Real photometry has data gaps marked by NaN, all reductions here skip them the same way
//! `numpy.nansum` and friends do.

use crate::sorted_array::SortedArray;

use ndarray::ArrayView1;

/// Sum of all non-NaN elements, zero for an empty or all-NaN array
pub fn nan_sum(values: ArrayView1<f64>) -> f64 {
    values.iter().filter(|x| !x.is_nan()).sum()
}

/// Sum of squares of all non-NaN elements
pub fn nan_sum_squares(values: ArrayView1<f64>) -> f64 {
    values
        .iter()
        .filter(|x| !x.is_nan())
        .map(|x| x * x)
        .sum()
}

/// Mean of all non-NaN elements, NaN if there are none
pub fn nan_mean(values: ArrayView1<f64>) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|x| !x.is_nan())
        .fold((0.0, 0usize), |(sum, count), &x| (sum + x, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Median of all non-NaN elements, NaN if there are none
pub fn nan_median(values: ArrayView1<f64>) -> f64 {
    let sorted = SortedArray::from_unsorted_skip_nan(values);
    if sorted.is_empty() {
        f64::NAN
    } else {
        sorted.median()
    }
}
