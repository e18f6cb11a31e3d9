//! The distribution sum type and the queries every representation answers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    DistError, DistResult, DistRng, Env, PointSetConversion, PointSetDist, SampleSetDist,
    SymbolicDist,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Dist {
    Symbolic(SymbolicDist),
    PointSet(PointSetDist),
    SampleSet(SampleSetDist),
}

impl Dist {
    pub fn type_name(&self) -> &'static str {
        match self {
            Dist::Symbolic(_) => "Symbolic",
            Dist::PointSet(_) => "PointSet",
            Dist::SampleSet(_) => "SampleSet",
        }
    }

    pub fn is_sample_set(&self) -> bool {
        matches!(self, Dist::SampleSet(_))
    }

    pub fn pdf(&self, x: f64, env: &Env) -> DistResult<f64> {
        match self {
            Dist::Symbolic(d) => Ok(d.pdf(x)),
            Dist::PointSet(d) => Ok(d.pdf(x)),
            Dist::SampleSet(d) => d.pdf(x, env),
        }
    }

    pub fn cdf(&self, x: f64) -> f64 {
        match self {
            Dist::Symbolic(d) => d.cdf(x),
            Dist::PointSet(d) => d.cdf(x),
            Dist::SampleSet(d) => d.cdf(x),
        }
    }

    pub fn inv(&self, p: f64) -> f64 {
        match self {
            Dist::Symbolic(d) => d.inv(p),
            Dist::PointSet(d) => d.inv(p),
            Dist::SampleSet(d) => d.inv(p),
        }
    }

    pub fn mean(&self) -> f64 {
        match self {
            Dist::Symbolic(d) => d.mean(),
            Dist::PointSet(d) => d.mean(),
            Dist::SampleSet(d) => d.mean(),
        }
    }

    pub fn variance(&self) -> DistResult<f64> {
        match self {
            Dist::Symbolic(d) => d.variance(),
            Dist::PointSet(d) => Ok(d.variance()),
            Dist::SampleSet(d) => Ok(d.variance()),
        }
    }

    pub fn stdev(&self) -> DistResult<f64> {
        self.variance().map(f64::sqrt)
    }

    pub fn mode(&self) -> DistResult<f64> {
        match self {
            Dist::Symbolic(d) => d.mode(),
            Dist::PointSet(d) => Ok(d.mode()),
            Dist::SampleSet(d) => d.mode(),
        }
    }

    pub fn min(&self) -> f64 {
        match self {
            Dist::Symbolic(d) => d.min(),
            Dist::PointSet(d) => d.min(),
            Dist::SampleSet(d) => d.min(),
        }
    }

    pub fn max(&self) -> f64 {
        match self {
            Dist::Symbolic(d) => d.max(),
            Dist::PointSet(d) => d.max(),
            Dist::SampleSet(d) => d.max(),
        }
    }

    pub fn sample(&self, rng: &mut DistRng) -> f64 {
        match self {
            Dist::Symbolic(d) => d.sample(rng),
            Dist::PointSet(d) => d.sample(rng),
            Dist::SampleSet(d) => d.sample(rng),
        }
    }

    pub fn sample_n(&self, n: usize, rng: &mut DistRng) -> Vec<f64> {
        match self {
            Dist::Symbolic(d) => d.sample_n(n, rng),
            Dist::PointSet(d) => d.sample_n(n, rng),
            Dist::SampleSet(d) => d.sample_n(n, rng),
        }
    }

    /// Symbolic and sample-set distributions are always normalized.
    pub fn integral_sum(&self) -> f64 {
        match self {
            Dist::PointSet(d) => d.integral_sum(),
            Dist::Symbolic(_) | Dist::SampleSet(_) => 1.0,
        }
    }

    pub fn is_normalized(&self) -> bool {
        match self {
            Dist::PointSet(d) => d.is_normalized(),
            Dist::Symbolic(_) | Dist::SampleSet(_) => true,
        }
    }

    #[must_use]
    pub fn normalize(&self) -> Dist {
        match self {
            Dist::PointSet(d) => Dist::PointSet(d.normalize()),
            other => other.clone(),
        }
    }

    pub fn to_point_set(&self, env: &Env) -> DistResult<PointSetDist> {
        self.to_point_set_with(env, PointSetConversion::default())
    }

    pub fn to_point_set_with(&self, env: &Env, conversion: PointSetConversion) -> DistResult<PointSetDist> {
        match self {
            Dist::Symbolic(d) => d.to_point_set(env, conversion),
            Dist::PointSet(d) => Ok(d.clone()),
            Dist::SampleSet(d) => d.to_point_set(env),
        }
    }

    /// `env.sample_count` draws, or the set itself when already sampled.
    pub fn to_sample_set(&self, env: &Env, rng: &mut DistRng) -> DistResult<SampleSetDist> {
        match self {
            Dist::SampleSet(d) => Ok(d.clone()),
            other => SampleSetDist::make(other.sample_n(env.sample_count, rng)),
        }
    }

    /// Cut to `[left, right]`. Symbolic distributions go through their
    /// point set; sample sets filter and resample.
    pub fn truncate(
        &self,
        left: Option<f64>,
        right: Option<f64>,
        env: &Env,
        rng: &mut DistRng,
    ) -> DistResult<Dist> {
        if let (Some(l), Some(r)) = (left, right) {
            if l > r {
                return Err(DistError::ArgumentError(format!(
                    "Left truncation bound must be smaller than right truncation bound, got {l} and {r}"
                )));
            }
        }
        if left.is_none() && right.is_none() {
            return Ok(self.clone());
        }
        match self {
            Dist::SampleSet(d) => Ok(Dist::SampleSet(d.truncate(left, right, rng)?)),
            other => Ok(Dist::PointSet(other.to_point_set(env)?.truncate(left, right)?)),
        }
    }
}

impl From<SymbolicDist> for Dist {
    fn from(d: SymbolicDist) -> Self {
        Dist::Symbolic(d)
    }
}

impl From<PointSetDist> for Dist {
    fn from(d: PointSetDist) -> Self {
        Dist::PointSet(d)
    }
}

impl From<SampleSetDist> for Dist {
    fn from(d: SampleSetDist) -> Self {
        Dist::SampleSet(d)
    }
}

impl fmt::Display for Dist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dist::Symbolic(d) => write!(f, "{d}"),
            Dist::PointSet(d) => write!(f, "Point Set Distribution ({})", d.type_name()),
            Dist::SampleSet(d) => write!(f, "Sample Set Distribution ({} samples)", d.len()),
        }
    }
}
