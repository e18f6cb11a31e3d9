//! Symbolic distributions: closed-form parameters with exact queries.
//!
//! Parameters are validated once, on construction. The `statrs` backend is
//! built on demand from the parameters, so a `SymbolicDist` stays `Copy` and
//! serializes as its parameters only.

mod backend;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, Cauchy, Exp, Gamma, LogNormal, Normal, Triangular, Uniform};
use statrs::function::erf::erfc_inv;

use self::backend::{Backend, Logistic};
use crate::xy::{linspace, XyShape};
use crate::{
    AlgebraicOperation, DistError, DistResult, DistRng, Env, OperationError, PointSetDist,
};

/// Probability mass left out at each end when a distribution with infinite
/// support is cut to a finite range.
const MIN_CDF: f64 = 0.0001;
const MAX_CDF: f64 = 0.9999;

/// z-score of the 95th percentile: `low to high` is a 90% interval.
const NINETY_PERCENT_Z: f64 = 1.644_853_626_951_472_2;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Params {
    Normal { mean: f64, stdev: f64 },
    Lognormal { mu: f64, sigma: f64 },
    Uniform { low: f64, high: f64 },
    Beta { alpha: f64, beta: f64 },
    Cauchy { local: f64, scale: f64 },
    Gamma { shape: f64, scale: f64 },
    Logistic { location: f64, scale: f64 },
    Exponential { rate: f64 },
    Triangular { low: f64, medium: f64, high: f64 },
    PointMass { value: f64 },
    Bernoulli { p: f64 },
}

/// How xs are chosen when a symbolic distribution becomes a point set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointSetConversion {
    /// Mostly at quantiles, so the points follow the probability mass, with
    /// a third spread evenly to keep the tails visible.
    #[default]
    ByWeight,
    /// Evenly spaced between the 0.0001 and 0.9999 quantiles.
    Linear,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Params", into = "Params")]
pub struct SymbolicDist {
    params: Params,
}

impl TryFrom<Params> for SymbolicDist {
    type Error = DistError;

    fn try_from(params: Params) -> DistResult<Self> {
        SymbolicDist::new(params)
    }
}

impl From<SymbolicDist> for Params {
    fn from(dist: SymbolicDist) -> Self {
        dist.params
    }
}

/// Φ⁻¹(p) for the standard normal.
fn standard_normal_inv(p: f64) -> f64 {
    -std::f64::consts::SQRT_2 * erfc_inv(2.0 * p)
}

fn check(ok: bool, message: &str) -> DistResult<()> {
    if ok {
        Ok(())
    } else {
        Err(DistError::ArgumentError(message.to_string()))
    }
}

impl SymbolicDist {
    pub fn new(params: Params) -> DistResult<Self> {
        let finite = match params {
            Params::Normal { mean: a, stdev: b }
            | Params::Lognormal { mu: a, sigma: b }
            | Params::Uniform { low: a, high: b }
            | Params::Beta { alpha: a, beta: b }
            | Params::Cauchy { local: a, scale: b }
            | Params::Gamma { shape: a, scale: b }
            | Params::Logistic { location: a, scale: b } => a.is_finite() && b.is_finite(),
            Params::Exponential { rate: a } | Params::PointMass { value: a } | Params::Bernoulli { p: a } => {
                a.is_finite()
            }
            Params::Triangular { low, medium, high } => {
                low.is_finite() && medium.is_finite() && high.is_finite()
            }
        };
        check(finite, "Distribution parameters must be finite")?;
        match params {
            Params::Normal { stdev, .. } => check(
                stdev > 0.0,
                "Standard deviation of normal distribution must be larger than 0",
            )?,
            Params::Lognormal { sigma, .. } => check(
                sigma > 0.0,
                "Lognormal standard deviation must be larger than 0",
            )?,
            Params::Uniform { low, high } => check(high > low, "High must be larger than low")?,
            Params::Beta { alpha, beta } => check(
                alpha > 0.0 && beta > 0.0,
                "Beta distribution parameters must be positive",
            )?,
            Params::Cauchy { scale, .. } => check(scale > 0.0, "Cauchy scale must be larger than 0")?,
            Params::Gamma { shape, scale } => check(
                shape > 0.0 && scale > 0.0,
                "Gamma shape and scale must be larger than 0",
            )?,
            Params::Logistic { scale, .. } => {
                check(scale > 0.0, "Logistic scale must be larger than 0")?;
            }
            Params::Exponential { rate } => {
                check(rate > 0.0, "Exponential distributions mean must be larger than 0")?;
            }
            Params::Triangular { low, medium, high } => check(
                low < medium && medium < high,
                "Triangular values must be increasing order.",
            )?,
            Params::PointMass { .. } => {}
            Params::Bernoulli { p } => check(
                (0.0..=1.0).contains(&p),
                "Bernoulli parameter must be between 0 and 1",
            )?,
        }
        Ok(SymbolicDist { params })
    }

    pub fn normal(mean: f64, stdev: f64) -> DistResult<Self> {
        SymbolicDist::new(Params::Normal { mean, stdev })
    }

    pub fn lognormal(mu: f64, sigma: f64) -> DistResult<Self> {
        SymbolicDist::new(Params::Lognormal { mu, sigma })
    }

    pub fn uniform(low: f64, high: f64) -> DistResult<Self> {
        SymbolicDist::new(Params::Uniform { low, high })
    }

    pub fn point_mass(value: f64) -> DistResult<Self> {
        SymbolicDist::new(Params::PointMass { value })
    }

    /// Normal whose central `probability` interval is `[low, high]`.
    pub fn normal_from_interval(low: f64, high: f64, probability: f64) -> DistResult<Self> {
        check(low < high, "Low value must be less than high value")?;
        let z = interval_z(probability)?;
        SymbolicDist::normal((low + high) / 2.0, (high - low) / (2.0 * z))
    }

    /// Lognormal whose central `probability` interval is `[low, high]`.
    pub fn lognormal_from_interval(low: f64, high: f64, probability: f64) -> DistResult<Self> {
        check(low < high, "Low value must be less than high value")?;
        check(low > 0.0, "Low value must be above 0")?;
        let z = interval_z(probability)?;
        let (log_low, log_high) = (low.ln(), high.ln());
        SymbolicDist::lognormal((log_low + log_high) / 2.0, (log_high - log_low) / (2.0 * z))
    }

    pub fn lognormal_from_mean_and_stdev(mean: f64, stdev: f64) -> DistResult<Self> {
        check(mean > 0.0, "Lognormal mean must be larger than 0")?;
        check(stdev > 0.0, "Lognormal standard deviation must be larger than 0")?;
        let variance = stdev.powi(2);
        let mean_squared = mean.powi(2);
        let mu = 2.0 * mean.ln() - 0.5 * (variance + mean_squared).ln();
        let sigma = (variance / mean_squared + 1.0).ln().sqrt();
        SymbolicDist::lognormal(mu, sigma)
    }

    /// `low to high`: lognormal when the interval is positive, else normal.
    pub fn from_ninety_percent_interval(low: f64, high: f64) -> DistResult<Self> {
        if low > 0.0 {
            SymbolicDist::lognormal_from_interval(low, high, 0.9)
        } else {
            SymbolicDist::normal_from_interval(low, high, 0.9)
        }
    }

    pub fn params(&self) -> Params {
        self.params
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self.params, Params::PointMass { .. } | Params::Bernoulli { .. })
    }

    /// The `statrs` backend for continuous parameters. Parameters are
    /// validated on construction, so construction only fails on values
    /// `statrs` is stricter about.
    fn backend(&self) -> Option<Box<dyn Backend>> {
        let backend: Box<dyn Backend> = match self.params {
            Params::Normal { mean, stdev } => Box::new(Normal::new(mean, stdev).ok()?),
            Params::Lognormal { mu, sigma } => Box::new(LogNormal::new(mu, sigma).ok()?),
            Params::Uniform { low, high } => Box::new(Uniform::new(low, high).ok()?),
            Params::Beta { alpha, beta } => Box::new(Beta::new(alpha, beta).ok()?),
            Params::Cauchy { local, scale } => Box::new(Cauchy::new(local, scale).ok()?),
            Params::Gamma { shape, scale } => Box::new(Gamma::new(shape, 1.0 / scale).ok()?),
            Params::Exponential { rate } => Box::new(Exp::new(rate).ok()?),
            Params::Triangular { low, medium, high } => {
                Box::new(Triangular::new(low, high, medium).ok()?)
            }
            Params::Logistic { location, scale } => Box::new(Logistic { location, scale }),
            Params::PointMass { .. } | Params::Bernoulli { .. } => return None,
        };
        Some(backend)
    }

    pub fn pdf(&self, x: f64) -> f64 {
        match self.params {
            Params::PointMass { value } => f64::from(u8::from(x == value)),
            Params::Bernoulli { p } => bernoulli_mass(p, x),
            _ => self.backend().map_or(f64::NAN, |b| b.density(x)),
        }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match self.params {
            Params::PointMass { value } => f64::from(u8::from(x >= value)),
            Params::Bernoulli { p } => {
                if x < 0.0 {
                    0.0
                } else if x < 1.0 {
                    1.0 - p
                } else {
                    1.0
                }
            }
            _ => self.backend().map_or(f64::NAN, |b| b.cumulative(x)),
        }
    }

    pub fn inv(&self, p: f64) -> f64 {
        match self.params {
            Params::PointMass { value } => value,
            Params::Bernoulli { p: weight } => f64::from(u8::from(p > 1.0 - weight)),
            // statrs only bisects the lognormal cdf; the closed form is exact.
            Params::Lognormal { mu, sigma } => (mu + sigma * standard_normal_inv(p)).exp(),
            _ => self.backend().map_or(f64::NAN, |b| b.quantile(p)),
        }
    }

    /// `NaN` for Cauchy, which has no mean.
    pub fn mean(&self) -> f64 {
        match self.params {
            Params::Normal { mean, .. } => mean,
            Params::Lognormal { mu, sigma } => (mu + sigma * sigma / 2.0).exp(),
            Params::Uniform { low, high } => (low + high) / 2.0,
            Params::Beta { alpha, beta } => alpha / (alpha + beta),
            Params::Cauchy { .. } => f64::NAN,
            Params::Gamma { shape, scale } => shape * scale,
            Params::Logistic { location, .. } => location,
            Params::Exponential { rate } => 1.0 / rate,
            Params::Triangular { low, medium, high } => (low + medium + high) / 3.0,
            Params::PointMass { value } => value,
            Params::Bernoulli { p } => p,
        }
    }

    pub fn variance(&self) -> DistResult<f64> {
        Ok(match self.params {
            Params::Normal { stdev, .. } => stdev * stdev,
            Params::Lognormal { mu, sigma } => {
                let s2 = sigma * sigma;
                (s2.exp() - 1.0) * (2.0 * mu + s2).exp()
            }
            Params::Uniform { low, high } => (high - low).powi(2) / 12.0,
            Params::Beta { alpha, beta } => {
                alpha * beta / ((alpha + beta).powi(2) * (alpha + beta + 1.0))
            }
            Params::Cauchy { .. } => {
                return Err(DistError::Other(
                    "Cauchy distributions have no variance".to_string(),
                ))
            }
            Params::Gamma { shape, scale } => shape * scale * scale,
            Params::Logistic { scale, .. } => (scale * std::f64::consts::PI).powi(2) / 3.0,
            Params::Exponential { rate } => 1.0 / (rate * rate),
            Params::Triangular { low, medium, high } => {
                (low * low + medium * medium + high * high
                    - low * medium
                    - low * high
                    - medium * high)
                    / 18.0
            }
            Params::PointMass { .. } => 0.0,
            Params::Bernoulli { p } => p * (1.0 - p),
        })
    }

    pub fn mode(&self) -> DistResult<f64> {
        match self.params {
            Params::Normal { mean, .. } => Ok(mean),
            Params::Lognormal { mu, sigma } => Ok((mu - sigma * sigma).exp()),
            Params::Uniform { .. } => Err(DistError::Other(
                "Uniform distributions have no unique mode".to_string(),
            )),
            Params::Beta { alpha, beta } if alpha > 1.0 && beta > 1.0 => {
                Ok((alpha - 1.0) / (alpha + beta - 2.0))
            }
            Params::Beta { .. } => Err(DistError::Other(
                "Beta distribution has no unique mode unless both parameters exceed 1".to_string(),
            )),
            Params::Cauchy { local, .. } => Ok(local),
            Params::Gamma { shape, scale } => Ok((shape - 1.0).max(0.0) * scale),
            Params::Logistic { location, .. } => Ok(location),
            Params::Exponential { .. } => Ok(0.0),
            Params::Triangular { medium, .. } => Ok(medium),
            Params::PointMass { value } => Ok(value),
            Params::Bernoulli { p } => Ok(f64::from(u8::from(p >= 0.5))),
        }
    }

    pub fn min(&self) -> f64 {
        match self.params {
            Params::PointMass { value } => value,
            Params::Uniform { low, .. } => low,
            Params::Bernoulli { .. } => 0.0,
            _ => self.inv(MIN_CDF),
        }
    }

    pub fn max(&self) -> f64 {
        match self.params {
            Params::PointMass { value } => value,
            Params::Uniform { high, .. } => high,
            Params::Bernoulli { .. } => 1.0,
            _ => self.inv(MAX_CDF),
        }
    }

    pub fn sample(&self, rng: &mut DistRng) -> f64 {
        match self.params {
            Params::PointMass { value } => value,
            Params::Bernoulli { p } => f64::from(u8::from(rng.gen::<f64>() < p)),
            _ => self.backend().map_or(f64::NAN, |b| b.draw(rng)),
        }
    }

    pub fn sample_n(&self, n: usize, rng: &mut DistRng) -> Vec<f64> {
        match self.backend() {
            Some(backend) => (0..n).map(|_| backend.draw(rng)).collect(),
            None => (0..n).map(|_| self.sample(rng)).collect(),
        }
    }

    pub fn to_point_set(&self, env: &Env, conversion: PointSetConversion) -> DistResult<PointSetDist> {
        match self.params {
            Params::PointMass { value } => {
                return Ok(PointSetDist::discrete(XyShape::new(vec![value], vec![1.0])?));
            }
            Params::Bernoulli { p } => {
                return Ok(PointSetDist::discrete(XyShape::new(
                    vec![0.0, 1.0],
                    vec![1.0 - p, p],
                )?));
            }
            Params::Uniform { low, high } => {
                let n = env.xy_point_length.max(2);
                let edge = (high - low) * 1e-6;
                let density = 1.0 / (high - low);
                let mut points: Vec<(f64, f64)> =
                    linspace(low, high, n).into_iter().map(|x| (x, density)).collect();
                points.extend([(low - edge, 0.0), (high + edge, 0.0)]);
                let shape = XyShape::from_unsorted(points, |a, _| a);
                return Ok(PointSetDist::continuous(shape).normalize());
            }
            _ => {}
        }

        let xs = match conversion {
            PointSetConversion::ByWeight => self.weighted_xs(env.xy_point_length),
            PointSetConversion::Linear => linspace(self.inv(MIN_CDF), self.inv(MAX_CDF), env.xy_point_length),
        };
        let points = xs.into_iter().map(|x| (x, self.pdf(x))).collect();
        let shape = XyShape::from_unsorted(points, |a, _| a);
        if shape.len() < 2 {
            return Err(DistError::Other(format!(
                "Could not build a point set for {self}"
            )));
        }
        Ok(PointSetDist::continuous(shape).normalize())
    }

    /// Two thirds of the points at quantiles of evenly spaced probabilities,
    /// one third evenly spaced across the same range.
    fn weighted_xs(&self, n: usize) -> Vec<f64> {
        let n = n.max(3);
        let tail_count = n / 3;
        let quantile_count = n - tail_count;
        let (min, max) = (self.inv(MIN_CDF), self.inv(MAX_CDF));
        let mut xs: Vec<f64> = linspace(MIN_CDF, MAX_CDF, quantile_count)
            .into_iter()
            .map(|p| self.inv(p))
            .chain(linspace(min, max, tail_count))
            .collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup();
        xs
    }

    /// Closed-form result of `op(self, other)`, when one exists. Numbers are
    /// point masses here.
    pub fn try_analytical_simplification(
        &self,
        other: &SymbolicDist,
        op: AlgebraicOperation,
    ) -> Option<Result<SymbolicDist, OperationError>> {
        use AlgebraicOperation as Op;
        let make = |params: Params| -> Option<Result<SymbolicDist, OperationError>> {
            SymbolicDist::new(params).ok().map(Ok)
        };
        match (self.params, other.params, op) {
            (Params::PointMass { value: a }, Params::PointMass { value: b }, _) => {
                Some(op.apply(a, b).map(|value| SymbolicDist {
                    params: Params::PointMass { value },
                }))
            }
            (
                Params::Normal { mean: m1, stdev: s1 },
                Params::Normal { mean: m2, stdev: s2 },
                Op::Add | Op::Subtract,
            ) => {
                let mean = if op == Op::Add { m1 + m2 } else { m1 - m2 };
                make(Params::Normal {
                    mean,
                    stdev: s1.hypot(s2),
                })
            }
            (Params::Normal { mean, stdev }, Params::PointMass { value }, _) => match op {
                Op::Add => make(Params::Normal { mean: mean + value, stdev }),
                Op::Subtract => make(Params::Normal { mean: mean - value, stdev }),
                Op::Multiply if value != 0.0 => make(Params::Normal {
                    mean: mean * value,
                    stdev: stdev * value.abs(),
                }),
                Op::Divide if value != 0.0 => make(Params::Normal {
                    mean: mean / value,
                    stdev: stdev / value.abs(),
                }),
                _ => None,
            },
            (Params::PointMass { value }, Params::Normal { mean, stdev }, _) => match op {
                Op::Add => make(Params::Normal { mean: value + mean, stdev }),
                Op::Subtract => make(Params::Normal { mean: value - mean, stdev }),
                Op::Multiply if value != 0.0 => make(Params::Normal {
                    mean: mean * value,
                    stdev: stdev * value.abs(),
                }),
                _ => None,
            },
            (
                Params::Lognormal { mu: mu1, sigma: s1 },
                Params::Lognormal { mu: mu2, sigma: s2 },
                Op::Multiply | Op::Divide,
            ) => {
                let mu = if op == Op::Multiply { mu1 + mu2 } else { mu1 - mu2 };
                make(Params::Lognormal {
                    mu,
                    sigma: s1.hypot(s2),
                })
            }
            (Params::Lognormal { mu, sigma }, Params::PointMass { value }, _) if value > 0.0 => {
                match op {
                    Op::Multiply => make(Params::Lognormal { mu: mu + value.ln(), sigma }),
                    Op::Divide => make(Params::Lognormal { mu: mu - value.ln(), sigma }),
                    _ => None,
                }
            }
            (Params::PointMass { value }, Params::Lognormal { mu, sigma }, _) if value > 0.0 => {
                match op {
                    Op::Multiply => make(Params::Lognormal { mu: value.ln() + mu, sigma }),
                    Op::Divide => make(Params::Lognormal { mu: value.ln() - mu, sigma }),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.params {
            Params::Normal { .. } => "Normal",
            Params::Lognormal { .. } => "Lognormal",
            Params::Uniform { .. } => "Uniform",
            Params::Beta { .. } => "Beta",
            Params::Cauchy { .. } => "Cauchy",
            Params::Gamma { .. } => "Gamma",
            Params::Logistic { .. } => "Logistic",
            Params::Exponential { .. } => "Exponential",
            Params::Triangular { .. } => "Triangular",
            Params::PointMass { .. } => "PointMass",
            Params::Bernoulli { .. } => "Bernoulli",
        }
    }
}

fn interval_z(probability: f64) -> DistResult<f64> {
    check(
        probability > 0.0 && probability < 1.0,
        "Probability must be in (0, 1) interval",
    )?;
    if probability == 0.9 {
        return Ok(NINETY_PERCENT_Z);
    }
    let standard = SymbolicDist {
        params: Params::Normal {
            mean: 0.0,
            stdev: 1.0,
        },
    };
    Ok(standard.inv(1.0 - (1.0 - probability) / 2.0))
}

fn bernoulli_mass(p: f64, x: f64) -> f64 {
    if x == 0.0 {
        1.0 - p
    } else if x == 1.0 {
        p
    } else {
        0.0
    }
}

impl fmt::Display for SymbolicDist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.type_name();
        match self.params {
            Params::Normal { mean: a, stdev: b }
            | Params::Lognormal { mu: a, sigma: b }
            | Params::Uniform { low: a, high: b }
            | Params::Beta { alpha: a, beta: b }
            | Params::Cauchy { local: a, scale: b }
            | Params::Gamma { shape: a, scale: b }
            | Params::Logistic { location: a, scale: b } => write!(f, "{name}({a},{b})"),
            Params::Exponential { rate: a } | Params::PointMass { value: a } | Params::Bernoulli { p: a } => {
                write!(f, "{name}({a})")
            }
            Params::Triangular { low, medium, high } => write!(f, "{name}({low},{medium},{high})"),
        }
    }
}
