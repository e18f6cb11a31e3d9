//! Kernel density estimation and the sample → point-set conversion.

use crate::point_set::PointSetDist;
use crate::xy::{linspace, XyShape};
use crate::{DistError, DistResult};

/// A value repeated at least this many times becomes a point mass, and at
/// least this many continuous samples are needed for a density.
pub const MIN_DISCRETE_TO_KEEP: usize = 5;

/// Linear-interpolated quantile of sorted values.
pub(crate) fn quantile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        len => {
            let position = p.clamp(0.0, 1.0) * (len - 1) as f64;
            let below = position.floor() as usize;
            let above = (below + 1).min(len - 1);
            let fraction = position - below as f64;
            sorted[below] + (sorted[above] - sorted[below]) * fraction
        }
    }
}

/// Silverman's rule of thumb: `0.9 · min(sd, iqr / 1.34) · n^(-1/5)`.
pub fn nrd0(sorted: &[f64]) -> f64 {
    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let sd = (sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0).max(1.0)).sqrt();
    let iqr = quantile(sorted, 0.75) - quantile(sorted, 0.25);
    let mut spread = sd.min(iqr / 1.34);
    if spread <= 0.0 {
        spread = sd;
    }
    if spread <= 0.0 {
        spread = sorted.first().map_or(0.0, |x| x.abs());
    }
    if spread <= 0.0 {
        spread = 1.0;
    }
    0.9 * spread * n.powf(-0.2)
}

/// Triangular-kernel density of `sorted` on an evenly spaced grid of
/// `output_length` points. The grid extends one kernel width past the data,
/// so both endpoint ys are 0, and the result integrates to 1.
pub fn kde(sorted: &[f64], output_length: usize, kernel_width: Option<f64>) -> XyShape {
    let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) else {
        return XyShape::empty();
    };
    let length = output_length.max(4);
    // At least one grid step wide, so no kernel falls between grid points.
    let width = kernel_width
        .filter(|w| *w > 0.0 && w.is_finite())
        .unwrap_or_else(|| nrd0(sorted))
        .max((last - first) / (length - 3) as f64);
    let (lo, hi) = (first - width, last + width);
    let xs = linspace(lo, hi, length);
    let step = (hi - lo) / (length - 1) as f64;
    let weight = 1.0 / (sorted.len() as f64 * width);

    let mut ys = vec![0.0; length];
    for &sample in sorted {
        // Endpoints lie one width outside every sample.
        let from = (((sample - width - lo) / step).ceil().max(1.0)) as usize;
        let to = (((sample + width - lo) / step).floor() as usize).min(length - 2);
        for i in from..=to {
            let u = (xs[i] - sample) / width;
            if u.abs() < 1.0 {
                ys[i] += (1.0 - u.abs()) * weight;
            }
        }
    }

    let mut points: Vec<(f64, f64)> = xs.into_iter().zip(ys).collect();
    let area: f64 = points
        .windows(2)
        .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
        .sum();
    if area > 0.0 {
        for point in &mut points {
            point.1 /= area;
        }
    }
    XyShape::from_unsorted(points, |a, _| a)
}

/// Split samples into point masses (values repeated at least
/// [`MIN_DISCRETE_TO_KEEP`] times) and a KDE density of the rest, each part
/// weighted by its share of the samples. Non-finite samples are ignored.
pub fn samples_to_point_set(
    samples: &[f64],
    output_length: usize,
    kernel_width: Option<f64>,
) -> DistResult<PointSetDist> {
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let total = sorted.len() as f64;

    let mut masses: Vec<(f64, f64)> = Vec::new();
    let mut rest: Vec<f64> = Vec::with_capacity(sorted.len());
    for run in sorted.chunk_by(|a, b| a == b) {
        if run.len() >= MIN_DISCRETE_TO_KEEP {
            masses.push((run[0], run.len() as f64 / total));
        } else {
            rest.extend_from_slice(run);
        }
    }

    let continuous = if rest.len() >= MIN_DISCRETE_TO_KEEP {
        let share = rest.len() as f64 / total;
        Some(kde(&rest, output_length, kernel_width).map_y(|y| y * share))
    } else if masses.is_empty() {
        return Err(DistError::TooFewSamplesForConversionToPointSet);
    } else {
        masses.extend(rest.iter().map(|&x| (x, 1.0 / total)));
        None
    };

    tracing::trace!(
        samples = sorted.len(),
        masses = masses.len(),
        "converted samples to point set"
    );
    PointSetDist::from_shapes(continuous, XyShape::from_unsorted(masses, |a, b| a + b))
        .ok_or(DistError::TooFewSamplesForConversionToPointSet)
}
