//! Point-set distributions: densities and masses sampled on a grid.
//!
//! A point set is a continuous density (read with linear interpolation), a
//! set of discrete point masses, or both. The integral sum of each part is
//! computed once on construction.

mod convolution;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::xy::{Interpolation, XyShape};
use crate::{DistError, DistResult, DistRng, OperationError, ScaleOperation};

/// Tolerance for treating a total mass as 1.
const NORMALIZED_TOLERANCE: f64 = 1e-7;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousShape {
    xy: XyShape,
    integral_sum: f64,
}

impl ContinuousShape {
    pub fn new(xy: XyShape) -> Self {
        let integral_sum = xy.area();
        ContinuousShape { xy, integral_sum }
    }

    pub fn xy(&self) -> &XyShape {
        &self.xy
    }

    pub fn integral_sum(&self) -> f64 {
        self.integral_sum
    }

    fn pdf(&self, x: f64) -> f64 {
        self.xy.y_at(x, Interpolation::Linear)
    }

    fn cdf(&self, x: f64) -> f64 {
        self.cdf_with(&self.xy.cumulative(), x)
    }

    /// `cdf` given the precomputed running integral.
    fn cdf_with(&self, cumulative: &[f64], x: f64) -> f64 {
        let xs = self.xy.xs();
        let index = xs.partition_point(|&v| v <= x);
        if index == 0 {
            return 0.0;
        }
        if index == xs.len() {
            return self.integral_sum;
        }
        let (x1, y1) = (xs[index - 1], self.xy.ys()[index - 1]);
        cumulative[index - 1] + (x - x1) * (y1 + self.pdf(x)) / 2.0
    }

    /// `∫ x^power · f(x) dx` for `power` 1 or 2, exact for the piecewise
    /// linear density.
    fn moment(&self, power: i32) -> f64 {
        let antiderivative = |p: f64, a: f64, b: f64| match power {
            1 => a * p.powi(2) / 2.0 + b * p.powi(3) / 3.0,
            _ => a * p.powi(3) / 3.0 + b * p.powi(4) / 4.0,
        };
        let (xs, ys) = (self.xy.xs(), self.xy.ys());
        let mut total = 0.0;
        for i in 1..xs.len() {
            let (x1, x2, h1, h2) = (xs[i - 1], xs[i], ys[i - 1], ys[i]);
            let slope = (h2 - h1) / (x2 - x1);
            let intercept = h1 - slope * x1;
            total += antiderivative(x2, intercept, slope) - antiderivative(x1, intercept, slope);
        }
        total
    }

    fn scaled(&self, factor: f64) -> ContinuousShape {
        ContinuousShape {
            xy: self.xy.map_y(|y| y * factor),
            integral_sum: self.integral_sum * factor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DiscreteShape {
    xy: XyShape,
    integral_sum: f64,
}

impl DiscreteShape {
    pub fn new(xy: XyShape) -> Self {
        let integral_sum = xy.ys().iter().sum();
        DiscreteShape { xy, integral_sum }
    }

    pub fn xy(&self) -> &XyShape {
        &self.xy
    }

    pub fn integral_sum(&self) -> f64 {
        self.integral_sum
    }

    fn cdf(&self, x: f64) -> f64 {
        self.xy.points().take_while(|(px, _)| *px <= x).map(|(_, y)| y).sum()
    }

    fn moment(&self, power: i32) -> f64 {
        self.xy.points().map(|(x, y)| x.powi(power) * y).sum()
    }

    fn scaled(&self, factor: f64) -> DiscreteShape {
        DiscreteShape {
            xy: self.xy.map_y(|y| y * factor),
            integral_sum: self.integral_sum * factor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PointSetDist {
    Continuous(ContinuousShape),
    Discrete(DiscreteShape),
    Mixed {
        continuous: ContinuousShape,
        discrete: DiscreteShape,
    },
}

impl PointSetDist {
    pub fn continuous(xy: XyShape) -> Self {
        PointSetDist::Continuous(ContinuousShape::new(xy))
    }

    pub fn discrete(xy: XyShape) -> Self {
        PointSetDist::Discrete(DiscreteShape::new(xy))
    }

    /// Assemble from parts, choosing the narrowest variant. `None` when both
    /// parts are empty.
    pub fn from_shapes(continuous: Option<XyShape>, discrete: XyShape) -> Option<Self> {
        let continuous = continuous.filter(|c| !c.is_empty());
        match (continuous, discrete.is_empty()) {
            (None, true) => None,
            (None, false) => Some(PointSetDist::discrete(discrete)),
            (Some(c), true) => Some(PointSetDist::continuous(c)),
            (Some(c), false) => Some(PointSetDist::Mixed {
                continuous: ContinuousShape::new(c),
                discrete: DiscreteShape::new(discrete),
            }),
        }
    }

    fn from_parts(continuous: ContinuousShape, discrete: DiscreteShape) -> Self {
        match (continuous.xy.is_empty(), discrete.xy.is_empty()) {
            (false, true) => PointSetDist::Continuous(continuous),
            (true, _) => PointSetDist::Discrete(discrete),
            (false, false) => PointSetDist::Mixed {
                continuous,
                discrete,
            },
        }
    }

    pub fn continuous_part(&self) -> Option<&ContinuousShape> {
        match self {
            PointSetDist::Continuous(c) | PointSetDist::Mixed { continuous: c, .. } => Some(c),
            PointSetDist::Discrete(_) => None,
        }
    }

    pub fn discrete_part(&self) -> Option<&DiscreteShape> {
        match self {
            PointSetDist::Discrete(d) | PointSetDist::Mixed { discrete: d, .. } => Some(d),
            PointSetDist::Continuous(_) => None,
        }
    }

    /// Both parts, the missing one empty.
    fn to_parts(&self) -> (ContinuousShape, DiscreteShape) {
        (
            self.continuous_part()
                .cloned()
                .unwrap_or_else(|| ContinuousShape::new(XyShape::empty())),
            self.discrete_part()
                .cloned()
                .unwrap_or_else(|| DiscreteShape::new(XyShape::empty())),
        )
    }

    pub fn integral_sum(&self) -> f64 {
        self.continuous_part().map_or(0.0, ContinuousShape::integral_sum)
            + self.discrete_part().map_or(0.0, DiscreteShape::integral_sum)
    }

    pub fn is_normalized(&self) -> bool {
        (self.integral_sum() - 1.0).abs() < NORMALIZED_TOLERANCE
    }

    #[must_use]
    pub fn normalize(&self) -> Self {
        let total = self.integral_sum();
        if total <= 0.0 || !total.is_finite() {
            return self.clone();
        }
        self.scaled(1.0 / total)
    }

    #[must_use]
    fn scaled(&self, factor: f64) -> Self {
        match self {
            PointSetDist::Continuous(c) => PointSetDist::Continuous(c.scaled(factor)),
            PointSetDist::Discrete(d) => PointSetDist::Discrete(d.scaled(factor)),
            PointSetDist::Mixed {
                continuous,
                discrete,
            } => PointSetDist::Mixed {
                continuous: continuous.scaled(factor),
                discrete: discrete.scaled(factor),
            },
        }
    }

    /// Density of the continuous part plus any point mass at `x`.
    pub fn pdf(&self, x: f64) -> f64 {
        self.continuous_part().map_or(0.0, |c| c.pdf(x))
            + self
                .discrete_part()
                .map_or(0.0, |d| d.xy.y_at(x, Interpolation::Discrete))
    }

    pub fn cdf(&self, x: f64) -> f64 {
        self.continuous_part().map_or(0.0, |c| c.cdf(x))
            + self.discrete_part().map_or(0.0, |d| d.cdf(x))
    }

    /// Smallest x whose cumulative mass reaches `p`, interpolating inside
    /// continuous segments.
    pub fn inv(&self, p: f64) -> f64 {
        self.cumulative_points().inv(p)
    }

    /// The cdf as a non-decreasing polyline. Point masses appear as two
    /// points at the same x, one before and one after the jump.
    fn cumulative_points(&self) -> CumulativePoints {
        let continuous = self.continuous_part();
        let discrete = self.discrete_part();
        let running = continuous.map(|c| c.xy.cumulative()).unwrap_or_default();
        let continuous_cdf = |x: f64| continuous.map_or(0.0, |c| c.cdf_with(&running, x));
        let continuous_xs = continuous.map_or(&[][..], |c| c.xy.xs());
        let (discrete_xs, masses) = discrete.map_or((&[][..], &[][..]), |d| (d.xy.xs(), d.xy.ys()));

        let mut xs = Vec::with_capacity(continuous_xs.len() + 2 * discrete_xs.len());
        let mut cumulative = Vec::with_capacity(xs.capacity());
        let mut mass_below = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < continuous_xs.len() || j < discrete_xs.len() {
            let take_discrete = match (continuous_xs.get(i), discrete_xs.get(j)) {
                (Some(&c), Some(&d)) => d <= c,
                (None, Some(_)) => true,
                _ => false,
            };
            if take_discrete {
                let x = discrete_xs[j];
                let before = continuous_cdf(x) + mass_below;
                mass_below += masses[j];
                xs.extend([x, x]);
                cumulative.extend([before, before + masses[j]]);
                j += 1;
                if continuous_xs.get(i) == Some(&x) {
                    i += 1;
                }
            } else {
                let x = continuous_xs[i];
                xs.push(x);
                cumulative.push(continuous_cdf(x) + mass_below);
                i += 1;
            }
        }
        CumulativePoints { xs, cumulative }
    }

    pub fn mean(&self) -> f64 {
        let total = self.integral_sum();
        let first = self.continuous_part().map_or(0.0, |c| c.moment(1))
            + self.discrete_part().map_or(0.0, |d| d.moment(1));
        first / total
    }

    pub fn variance(&self) -> f64 {
        let total = self.integral_sum();
        let second = self.continuous_part().map_or(0.0, |c| c.moment(2))
            + self.discrete_part().map_or(0.0, |d| d.moment(2));
        second / total - self.mean().powi(2)
    }

    /// The most likely value. A point mass outranks any density.
    pub fn mode(&self) -> f64 {
        let argmax = |xy: &XyShape| {
            xy.points()
                .fold((f64::NAN, f64::NEG_INFINITY), |best, (x, y)| {
                    if y > best.1 {
                        (x, y)
                    } else {
                        best
                    }
                })
                .0
        };
        match self {
            PointSetDist::Continuous(c) => argmax(&c.xy),
            PointSetDist::Discrete(d) | PointSetDist::Mixed { discrete: d, .. } => argmax(&d.xy),
        }
    }

    pub fn min(&self) -> f64 {
        let c = self.continuous_part().and_then(|c| c.xy.min_x());
        let d = self.discrete_part().and_then(|d| d.xy.min_x());
        c.into_iter().chain(d).fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        let c = self.continuous_part().and_then(|c| c.xy.max_x());
        let d = self.discrete_part().and_then(|d| d.xy.max_x());
        c.into_iter().chain(d).fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn sample(&self, rng: &mut DistRng) -> f64 {
        let u: f64 = rng.gen();
        self.inv(u * self.integral_sum())
    }

    /// Inverse-transform sampling; the cdf polyline is built once.
    pub fn sample_n(&self, n: usize, rng: &mut DistRng) -> Vec<f64> {
        let cdf = self.cumulative_points();
        let total = self.integral_sum();
        (0..n).map(|_| cdf.inv(rng.gen::<f64>() * total)).collect()
    }

    /// Cut the distribution to `[left, right]` and renormalize.
    pub fn truncate(&self, left: Option<f64>, right: Option<f64>) -> DistResult<Self> {
        let lo = left.unwrap_or(f64::NEG_INFINITY);
        let hi = right.unwrap_or(f64::INFINITY);
        let (continuous, discrete) = self.to_parts();
        let continuous = ContinuousShape::new(continuous.xy.truncate_linear(left, right));
        let discrete = DiscreteShape::new(discrete.xy.filter_x(|x| x >= lo && x <= hi));
        let truncated = PointSetDist::from_parts(continuous, discrete);
        if truncated.integral_sum() <= 0.0 {
            return Err(DistError::Other(
                "Truncation removed all probability mass".to_string(),
            ));
        }
        Ok(truncated.normalize())
    }

    /// Apply `op` with `factor` to every y value.
    pub fn scale_y(&self, op: ScaleOperation, factor: f64) -> Result<Self, OperationError> {
        let (continuous, discrete) = self.to_parts();
        let continuous = ContinuousShape::new(continuous.xy.try_map_y(|y| op.apply(y, factor))?);
        let discrete = DiscreteShape::new(discrete.xy.try_map_y(|y| op.apply(y, factor))?);
        Ok(PointSetDist::from_parts(continuous, discrete))
    }

    /// Combine y values on the union of both grids. Continuous parts combine
    /// with continuous parts and masses with masses.
    pub fn combine_pointwise(
        &self,
        other: &PointSetDist,
        mut f: impl FnMut(f64, f64) -> Result<f64, OperationError>,
    ) -> Result<Self, OperationError> {
        let (c1, d1) = self.to_parts();
        let (c2, d2) = other.to_parts();
        let continuous = c1.xy.combine(&c2.xy, Interpolation::Linear, &mut f)?;
        let discrete = d1.xy.combine(&d2.xy, Interpolation::Discrete, &mut f)?;
        Ok(PointSetDist::from_parts(
            ContinuousShape::new(continuous),
            DiscreteShape::new(discrete),
        ))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            PointSetDist::Continuous(_) => "Continuous",
            PointSetDist::Discrete(_) => "Discrete",
            PointSetDist::Mixed { .. } => "Mixed",
        }
    }
}

struct CumulativePoints {
    xs: Vec<f64>,
    cumulative: Vec<f64>,
}

impl CumulativePoints {
    fn inv(&self, p: f64) -> f64 {
        let Some(&first_x) = self.xs.first() else {
            return f64::NAN;
        };
        let index = self.cumulative.partition_point(|&c| c < p);
        if index == 0 {
            return first_x;
        }
        if index == self.xs.len() {
            return self.xs[self.xs.len() - 1];
        }
        let (x1, x2) = (self.xs[index - 1], self.xs[index]);
        let (c1, c2) = (self.cumulative[index - 1], self.cumulative[index]);
        if c2 == c1 {
            return x2;
        }
        x1 + (x2 - x1) * (p - c1) / (c2 - c1)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
