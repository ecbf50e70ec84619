use crate::error::PhotometryError;
use crate::photometry::aperture::pixel_range;

use ndarray::{ArrayView1, ArrayView2, Axis, s};
use std::ops::Range;

/// Weighted mean centroid from the marginal sums of a box around a guess position
///
/// The box holds the pixels with centers within `box_size / 2` of the guess, NaN pixels count as
/// zero. For each axis the image is summed over the other one, and the coordinate is the mean of
/// the pixel coordinates weighted by how much their sum exceeds the mean sum. Pixels are
/// indexed as `image[[y, x]]`. A flat profile has no excess and keeps the guess coordinate.
pub fn marginal_centroid(
    image: ArrayView2<f64>,
    guess: (f64, f64),
    box_size: f64,
) -> Result<(f64, f64), PhotometryError> {
    let (x, y) = guess;
    let (height, width) = image.dim();
    let half = 0.5 * box_size;
    let xs = pixel_range(x, half, width);
    let ys = pixel_range(y, half, height);
    if xs.is_empty() || ys.is_empty() {
        return Err(PhotometryError::EmptyRegion { x, y });
    }

    let cropped = image
        .slice(s![ys.clone(), xs.clone()])
        .mapv(|v| if v.is_finite() { v } else { 0.0 });
    let columns = cropped.sum_axis(Axis(0));
    let rows = cropped.sum_axis(Axis(1));
    let centroid = (
        weighted_coordinate(columns.view(), xs).unwrap_or(x),
        weighted_coordinate(rows.view(), ys).unwrap_or(y),
    );
    log::trace!("centroid at {centroid:?}, guess {guess:?}");
    Ok(centroid)
}

fn weighted_coordinate(profile: ArrayView1<f64>, coords: Range<usize>) -> Option<f64> {
    let mean = profile.mean()?;
    let (weight, moment) = profile
        .iter()
        .zip(coords)
        .filter(|&(&v, _)| v > mean)
        .fold((0.0, 0.0), |(w, m), (&v, i)| {
            (w + (v - mean), m + (v - mean) * i as f64)
        });
    (weight > 0.0).then(|| moment / weight)
}

/// [marginal_centroid] for several stars
pub fn marginal_centroids(
    image: ArrayView2<f64>,
    guesses: &[(f64, f64)],
    box_size: f64,
) -> Result<Vec<(f64, f64)>, PhotometryError> {
    guesses
        .iter()
        .map(|&guess| marginal_centroid(image, guess, box_size))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use std::f64::consts::PI;

    fn star_image(stars: &[(f64, f64)]) -> Array2<f64> {
        let sigma: f64 = 1.5;
        Array2::from_shape_fn((25, 40), |(y, x)| {
            10.0 + stars
                .iter()
                .map(|&(x0, y0)| {
                    let r2 = (x as f64 - x0).powi(2) + (y as f64 - y0).powi(2);
                    1000.0 / (2.0 * PI * sigma.powi(2)) * (-0.5 * r2 / sigma.powi(2)).exp()
                })
                .sum::<f64>()
        })
    }

    #[test]
    fn centered_star_is_exact() {
        let image = star_image(&[(12.0, 8.0)]);
        let (x, y) = marginal_centroid(image.view(), (12.0, 8.0), 10.0).unwrap();
        assert_abs_diff_eq!(x, 12.0, epsilon = 1e-10);
        assert_abs_diff_eq!(y, 8.0, epsilon = 1e-10);
    }

    #[test]
    fn subpixel_star() {
        let image = star_image(&[(12.3, 8.7)]);
        for guess in [(12.0, 9.0), (11.0, 10.0)] {
            let (x, y) = marginal_centroid(image.view(), guess, 12.0).unwrap();
            assert_abs_diff_eq!(x, 12.3, epsilon = 0.05);
            assert_abs_diff_eq!(y, 8.7, epsilon = 0.05);
        }
    }

    #[test]
    fn several_stars() {
        let truth = [(8.0, 12.0), (30.0, 6.0)];
        let image = star_image(&truth);
        let centroids = marginal_centroids(image.view(), &[(9.0, 11.0), (29.0, 7.0)], 10.0).unwrap();
        for ((x, y), (x0, y0)) in centroids.into_iter().zip(truth) {
            assert_abs_diff_eq!(x, x0, epsilon = 0.05);
            assert_abs_diff_eq!(y, y0, epsilon = 0.05);
        }
    }

    #[test]
    fn flat_box_keeps_guess() {
        let mut image = Array2::from_elem((20, 20), 3.0);
        image[[0, 0]] = f64::NAN;
        let centroid = marginal_centroid(image.view(), (9.5, 10.0), 6.0).unwrap();
        assert_eq!(centroid, (9.5, 10.0));
    }

    #[test]
    fn box_outside_of_image() {
        let image = Array2::<f64>::zeros((20, 20));
        assert!(matches!(
            marginal_centroid(image.view(), (50.0, 5.0), 6.0),
            Err(PhotometryError::EmptyRegion { .. })
        ));
    }
}
