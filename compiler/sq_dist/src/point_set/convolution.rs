//! Numeric convolution of point sets.
//!
//! Continuous × continuous approximates each density as overlapping
//! triangles, turns every triangle into a point mass with a mean and a
//! variance, combines every pair with the algebra of random variables, and
//! reconstructs a density with a Gaussian kernel per pair. Anything involving
//! a discrete part is exact: the continuous shape is shifted or scaled once
//! per point mass.

use rayon::prelude::*;

use super::{ContinuousShape, DiscreteShape, PointSetDist};
use crate::xy::{linspace, Interpolation, XyShape};
use crate::ConvolutionOperation;

/// Continuous inputs are resampled to at most this many points first; the
/// pairwise step is quadratic in it.
const MAX_INPUT_POINTS: usize = 100;

/// z-score covering 90% of a normal, doubled to bound each kernel.
const KERNEL_REACH: f64 = 2.0 * 1.644_854;

struct Moments {
    masses: Vec<f64>,
    means: Vec<f64>,
    variances: Vec<f64>,
}

/// One triangle per interior point, the outermost points doubled so the
/// ends are covered too.
fn triangle_moments(shape: &XyShape) -> Moments {
    let mut xs = Vec::with_capacity(shape.len() + 2);
    let mut ys = Vec::with_capacity(shape.len() + 2);
    if let (Some(&x0), Some(&y0)) = (shape.xs().first(), shape.ys().first()) {
        xs.push(x0);
        ys.push(y0);
    }
    xs.extend_from_slice(shape.xs());
    ys.extend_from_slice(shape.ys());
    if let (Some(&xn), Some(&yn)) = (shape.xs().last(), shape.ys().last()) {
        xs.push(xn);
        ys.push(yn);
    }

    let count = xs.len().saturating_sub(2);
    let mut moments = Moments {
        masses: Vec::with_capacity(count),
        means: Vec::with_capacity(count),
        variances: Vec::with_capacity(count),
    };
    for i in 1..=count {
        let (a, c, b) = (xs[i - 1], xs[i], xs[i + 1]);
        moments.masses.push((b - a) * ys[i] / 2.0);
        moments.means.push((a + b + c) / 3.0);
        moments
            .variances
            .push((a * a + b * b + c * c - a * c - c * b - a * b) / 18.0);
    }
    moments
}

fn combine_continuous(
    op: ConvolutionOperation,
    s1: &XyShape,
    s2: &XyShape,
    output_length: usize,
) -> XyShape {
    let t1 = triangle_moments(&s1.resample(MAX_INPUT_POINTS));
    let t2 = triangle_moments(&s2.resample(MAX_INPUT_POINTS));

    let pairs = t1.masses.len() * t2.masses.len();
    let mut masses = Vec::with_capacity(pairs);
    let mut means = Vec::with_capacity(pairs);
    let mut variances = Vec::with_capacity(pairs);
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for i in 0..t1.masses.len() {
        for j in 0..t2.masses.len() {
            let (m1, m2) = (t1.means[i], t2.means[j]);
            let (v1, v2) = (t1.variances[i], t2.variances[j]);
            let mean = op.apply(m1, m2);
            let variance = match op {
                ConvolutionOperation::Add | ConvolutionOperation::Subtract => v1 + v2,
                ConvolutionOperation::Multiply => v1 * v2 + v1 * m2 * m2 + v2 * m1 * m1,
            };
            let reach = KERNEL_REACH * variance.sqrt();
            lo = lo.min(mean - reach);
            hi = hi.max(mean + reach);
            masses.push(t1.masses[i] * t2.masses[j]);
            means.push(mean);
            variances.push(variance);
        }
    }
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return XyShape::empty();
    }

    let xs = linspace(lo, hi, output_length.max(2));
    let ys: Vec<f64> = xs
        .par_iter()
        .map(|&x| {
            let mut y = 0.0;
            for k in 0..masses.len() {
                if variances[k] > 0.0 && masses[k] > 0.0 {
                    let dx = x - means[k];
                    y += masses[k] * (-(dx * dx) / (2.0 * variances[k])).exp()
                        / (2.0 * std::f64::consts::PI * variances[k]).sqrt();
                }
            }
            y
        })
        .collect();
    XyShape::from_unsorted(xs.into_iter().zip(ys).collect(), |a, _| a)
}

/// One transformed copy of the density per point mass, stacked. Multiplying
/// by a mass at zero collapses that copy into a point mass at zero.
fn combine_continuous_discrete(
    op: ConvolutionOperation,
    continuous: &ContinuousShape,
    discrete: &DiscreteShape,
    discrete_first: bool,
) -> (XyShape, Vec<(f64, f64)>) {
    let mut total = XyShape::empty();
    let mut collapsed = Vec::new();
    for (dx, mass) in discrete.xy.points() {
        if op == ConvolutionOperation::Multiply && dx == 0.0 {
            collapsed.push((0.0, continuous.integral_sum * mass));
            continue;
        }
        let density_scale = match op {
            ConvolutionOperation::Multiply => mass / dx.abs(),
            _ => mass,
        };
        let points = continuous
            .xy
            .points()
            .map(|(cx, cy)| {
                let x = if discrete_first {
                    op.apply(dx, cx)
                } else {
                    op.apply(cx, dx)
                };
                (x, cy * density_scale)
            })
            .collect();
        let copy = XyShape::from_unsorted(points, |a, b| a + b);
        total = total.add(&copy, Interpolation::Linear);
    }
    (total, collapsed)
}

impl PointSetDist {
    /// Distribution of `op(X, Y)` for independent `X ~ self`, `Y ~ other`.
    pub fn combine_algebraic(
        &self,
        other: &PointSetDist,
        op: ConvolutionOperation,
        output_length: usize,
    ) -> PointSetDist {
        let (c1, d1) = self.to_parts();
        let (c2, d2) = other.to_parts();

        let mut continuous = XyShape::empty();
        if !c1.xy.is_empty() && !c2.xy.is_empty() {
            continuous = combine_continuous(op, &c1.xy, &c2.xy, output_length);
        }

        let mut masses: Vec<(f64, f64)> = Vec::new();
        if !c1.xy.is_empty() && !d2.xy.is_empty() {
            let (shape, collapsed) = combine_continuous_discrete(op, &c1, &d2, false);
            continuous = continuous.add(&shape, Interpolation::Linear);
            masses.extend(collapsed);
        }
        if !d1.xy.is_empty() && !c2.xy.is_empty() {
            let (shape, collapsed) = combine_continuous_discrete(op, &c2, &d1, true);
            continuous = continuous.add(&shape, Interpolation::Linear);
            masses.extend(collapsed);
        }
        for (x1, m1) in d1.xy.points() {
            for (x2, m2) in d2.xy.points() {
                masses.push((op.apply(x1, x2), m1 * m2));
            }
        }

        tracing::trace!(
            continuous_points = continuous.len(),
            masses = masses.len(),
            "convolved point sets"
        );
        PointSetDist::from_parts(
            ContinuousShape::new(continuous),
            DiscreteShape::new(XyShape::from_unsorted(masses, |a, b| a + b)),
        )
    }
}
