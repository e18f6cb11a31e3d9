//! XY shapes: the sampled curves point sets are made of.

use serde::{Deserialize, Serialize};

/// Points `(xs[i], ys[i])` with strictly increasing, finite xs.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct XyShape {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum XyShapeError {
    #[error("xs and ys have different lengths ({xs} and {ys})")]
    LengthMismatch { xs: usize, ys: usize },

    #[error("xs must be strictly increasing")]
    NotSorted,

    #[error("shape contains a non-finite value")]
    NotFinite,

    #[error("shape has no points")]
    Empty,
}

/// How y values between the points of a shape are read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interpolation {
    /// Linear between points, zero outside the shape.
    Linear,
    /// Zero anywhere except exactly at a point.
    Discrete,
}

impl XyShape {
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> Result<Self, XyShapeError> {
        if xs.len() != ys.len() {
            return Err(XyShapeError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        if xs.is_empty() {
            return Err(XyShapeError::Empty);
        }
        if xs.iter().chain(&ys).any(|v| !v.is_finite()) {
            return Err(XyShapeError::NotFinite);
        }
        if xs.windows(2).any(|w| w[0] >= w[1]) {
            return Err(XyShapeError::NotSorted);
        }
        Ok(XyShape { xs, ys })
    }

    /// Build from points in any order. Non-finite points are dropped and
    /// points sharing an x are merged with `merge`.
    pub(crate) fn from_unsorted(
        mut points: Vec<(f64, f64)>,
        merge: impl Fn(f64, f64) -> f64,
    ) -> Self {
        points.retain(|(x, y)| x.is_finite() && y.is_finite());
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut xs: Vec<f64> = Vec::with_capacity(points.len());
        let mut ys: Vec<f64> = Vec::with_capacity(points.len());
        for (x, y) in points {
            match (xs.last(), ys.last_mut()) {
                (Some(&last), Some(last_y)) if last == x => *last_y = merge(*last_y, y),
                _ => {
                    xs.push(x);
                    ys.push(y);
                }
            }
        }
        XyShape { xs, ys }
    }

    pub fn empty() -> Self {
        XyShape::default()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    pub fn min_x(&self) -> Option<f64> {
        self.xs.first().copied()
    }

    pub fn max_x(&self) -> Option<f64> {
        self.xs.last().copied()
    }

    /// Index of the point exactly at `x`.
    fn index_of(&self, x: f64) -> Result<usize, usize> {
        let index = self.xs.partition_point(|&v| v < x);
        match self.xs.get(index) {
            Some(&v) if v == x => Ok(index),
            _ => Err(index),
        }
    }

    pub fn y_at(&self, x: f64, interpolation: Interpolation) -> f64 {
        match (self.index_of(x), interpolation) {
            (Ok(index), _) => self.ys[index],
            (Err(_), Interpolation::Discrete) => 0.0,
            (Err(index), Interpolation::Linear) => {
                if index == 0 || index == self.xs.len() {
                    return 0.0;
                }
                let (x1, x2) = (self.xs[index - 1], self.xs[index]);
                let (y1, y2) = (self.ys[index - 1], self.ys[index]);
                let fraction = (x - x1) / (x2 - x1);
                y1 * (1.0 - fraction) + y2 * fraction
            }
        }
    }

    /// Running trapezoid integral, one value per point, starting at 0.
    pub fn cumulative(&self) -> Vec<f64> {
        let mut total = 0.0;
        let mut cumulative = Vec::with_capacity(self.len());
        for (i, y) in self.ys.iter().enumerate() {
            if i > 0 {
                total += (self.xs[i] - self.xs[i - 1]) * (self.ys[i - 1] + y) / 2.0;
            }
            cumulative.push(total);
        }
        cumulative
    }

    /// Trapezoid integral over the whole shape.
    pub fn area(&self) -> f64 {
        self.cumulative().last().copied().unwrap_or(0.0)
    }

    #[must_use]
    pub fn map_y(&self, f: impl Fn(f64) -> f64) -> XyShape {
        XyShape {
            xs: self.xs.clone(),
            ys: self.ys.iter().map(|&y| f(y)).collect(),
        }
    }

    pub fn try_map_y<E>(&self, f: impl Fn(f64) -> Result<f64, E>) -> Result<XyShape, E> {
        Ok(XyShape {
            xs: self.xs.clone(),
            ys: self.ys.iter().map(|&y| f(y)).collect::<Result<_, E>>()?,
        })
    }

    /// Combine two shapes on the union of their xs, reading each side with
    /// `interpolation` where it has no point.
    pub fn combine<E>(
        &self,
        other: &XyShape,
        interpolation: Interpolation,
        mut f: impl FnMut(f64, f64) -> Result<f64, E>,
    ) -> Result<XyShape, E> {
        let xs = merge_sorted(&self.xs, &other.xs);
        let mut ys = Vec::with_capacity(xs.len());
        for &x in &xs {
            let a = self.y_at(x, interpolation);
            let b = other.y_at(x, interpolation);
            ys.push(f(a, b)?);
        }
        Ok(XyShape { xs, ys })
    }

    /// Pointwise sum, used to stack shapes.
    #[must_use]
    pub fn add(&self, other: &XyShape, interpolation: Interpolation) -> XyShape {
        let combined: Result<XyShape, std::convert::Infallible> =
            self.combine(other, interpolation, |a, b| Ok(a + b));
        match combined {
            Ok(shape) => shape,
            Err(never) => match never {},
        }
    }

    /// Keep the part of a density within `[left, right]`, adding boundary
    /// points read off the curve.
    #[must_use]
    pub fn truncate_linear(&self, left: Option<f64>, right: Option<f64>) -> XyShape {
        let lo = left.unwrap_or(f64::NEG_INFINITY);
        let hi = right.unwrap_or(f64::INFINITY);
        let mut points: Vec<(f64, f64)> = Vec::with_capacity(self.len() + 2);
        if let Some(left) = left {
            if self.min_x().is_some_and(|min| min < left) {
                points.push((left, self.y_at(left, Interpolation::Linear)));
            }
        }
        points.extend(self.points().filter(|(x, _)| *x >= lo && *x <= hi));
        if let Some(right) = right {
            if self.max_x().is_some_and(|max| max > right) {
                points.push((right, self.y_at(right, Interpolation::Linear)));
            }
        }
        XyShape::from_unsorted(points, |a, _| a)
    }

    #[must_use]
    pub fn filter_x(&self, keep: impl Fn(f64) -> bool) -> XyShape {
        let (xs, ys) = self.points().filter(|(x, _)| keep(*x)).unzip();
        XyShape { xs, ys }
    }

    /// Re-read the curve at `length` evenly spaced xs.
    #[must_use]
    pub fn resample(&self, length: usize) -> XyShape {
        let (Some(min), Some(max)) = (self.min_x(), self.max_x()) else {
            return XyShape::empty();
        };
        if self.len() <= length || min == max {
            return self.clone();
        }
        let xs = linspace(min, max, length);
        let ys = xs
            .iter()
            .map(|&x| self.y_at(x, Interpolation::Linear))
            .collect();
        XyShape { xs, ys }
    }
}

/// `n` evenly spaced values from `lo` to `hi`, both included.
pub(crate) fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

fn merge_sorted(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) if x == y => {
                i += 1;
                j += 1;
                x
            }
            (Some(&x), Some(&y)) if x < y => {
                i += 1;
                x
            }
            (Some(_), Some(&y)) | (None, Some(&y)) => {
                j += 1;
                y
            }
            (Some(&x), None) => {
                i += 1;
                x
            }
            (None, None) => break,
        };
        out.push(next);
    }
    out
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    fn shape(xs: &[f64], ys: &[f64]) -> XyShape {
        XyShape::new(xs.to_vec(), ys.to_vec()).unwrap()
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            XyShape::new(vec![1.0, 1.0], vec![0.0, 0.0]),
            Err(XyShapeError::NotSorted)
        );
        assert_eq!(
            XyShape::new(vec![1.0], vec![0.0, 0.0]),
            Err(XyShapeError::LengthMismatch { xs: 1, ys: 2 })
        );
        assert_eq!(
            XyShape::new(vec![f64::NAN], vec![0.0]),
            Err(XyShapeError::NotFinite)
        );
        assert_eq!(XyShape::new(vec![], vec![]), Err(XyShapeError::Empty));
    }

    #[test]
    fn test_interpolation() {
        let s = shape(&[0.0, 2.0], &[0.0, 1.0]);
        assert_eq!(s.y_at(1.0, Interpolation::Linear), 0.5);
        assert_eq!(s.y_at(3.0, Interpolation::Linear), 0.0);
        assert_eq!(s.y_at(1.0, Interpolation::Discrete), 0.0);
        assert_eq!(s.y_at(2.0, Interpolation::Discrete), 1.0);
    }

    #[test]
    fn test_area() {
        let s = shape(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]);
        assert_eq!(s.area(), 1.0);
        assert_eq!(s.cumulative(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_combine_unions_xs() {
        let a = shape(&[0.0, 2.0], &[1.0, 1.0]);
        let b = shape(&[1.0, 3.0], &[2.0, 2.0]);
        let sum = a.add(&b, Interpolation::Linear);
        assert_eq!(sum.xs(), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(sum.ys(), &[1.0, 3.0, 3.0, 2.0]);
    }

    #[test]
    fn test_from_unsorted_merges() {
        let s = XyShape::from_unsorted(vec![(2.0, 1.0), (1.0, 1.0), (2.0, 3.0)], |a, b| a + b);
        assert_eq!(s.xs(), &[1.0, 2.0]);
        assert_eq!(s.ys(), &[1.0, 4.0]);
    }

    #[test]
    fn test_truncate_linear() {
        let s = shape(&[0.0, 2.0, 4.0], &[0.0, 2.0, 0.0]);
        let t = s.truncate_linear(Some(1.0), None);
        assert_eq!(t.xs(), &[1.0, 2.0, 4.0]);
        assert_eq!(t.ys(), &[1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(5.0, 6.0, 1), vec![5.0]);
    }
}
