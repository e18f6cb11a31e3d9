//! Sample-set distributions: a shared, immutable vector of draws.

mod kde;

use std::sync::Arc;

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use self::kde::{kde, nrd0, samples_to_point_set, MIN_DISCRETE_TO_KEEP};
use crate::{DistError, DistResult, DistRng, Env, OperationError, PointSetDist};

/// Sample sets at least this long are combined in parallel.
const PARALLEL_THRESHOLD: usize = 10_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleSetDist {
    samples: Arc<[f64]>,
}

impl SampleSetDist {
    /// Requires more than five samples.
    pub fn make(samples: Vec<f64>) -> DistResult<Self> {
        if samples.len() > MIN_DISCRETE_TO_KEEP {
            Ok(SampleSetDist {
                samples: samples.into(),
            })
        } else {
            Err(DistError::TooFewSamples)
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn sorted(&self) -> Vec<f64> {
        let mut sorted = self.samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        sorted
    }

    pub fn min(&self) -> f64 {
        self.samples.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.samples.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn mean(&self) -> f64 {
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / self.samples.len() as f64
    }

    /// Share of samples at or below `x`.
    pub fn cdf(&self, x: f64) -> f64 {
        self.samples.iter().filter(|&&s| s <= x).count() as f64 / self.samples.len() as f64
    }

    pub fn inv(&self, p: f64) -> f64 {
        kde::quantile(&self.sorted(), p)
    }

    /// Density read off the KDE point set.
    pub fn pdf(&self, x: f64, env: &Env) -> DistResult<f64> {
        Ok(self.to_point_set(env)?.pdf(x))
    }

    pub fn mode(&self) -> DistResult<f64> {
        Err(DistError::NotYetImplemented)
    }

    pub fn sample(&self, rng: &mut DistRng) -> f64 {
        self.samples[rng.gen_range(0..self.samples.len())]
    }

    /// The first `n` samples when there are enough, which keeps sample sets
    /// derived from the same source correlated. Otherwise `n` random draws.
    pub fn sample_n(&self, n: usize, rng: &mut DistRng) -> Vec<f64> {
        if n <= self.samples.len() {
            self.samples[..n].to_vec()
        } else {
            (0..n).map(|_| self.sample(rng)).collect()
        }
    }

    /// Keep samples inside `[left, right]`, then resample back to the
    /// original length.
    pub fn truncate(&self, left: Option<f64>, right: Option<f64>, rng: &mut DistRng) -> DistResult<Self> {
        let lo = left.unwrap_or(f64::NEG_INFINITY);
        let hi = right.unwrap_or(f64::INFINITY);
        let kept: Vec<f64> = self
            .samples
            .iter()
            .copied()
            .filter(|x| *x >= lo && *x <= hi)
            .collect();
        let kept = SampleSetDist::make(kept)?;
        SampleSetDist::make(kept.sample_n(self.samples.len(), rng))
    }

    pub fn map(&self, f: impl Fn(f64) -> Result<f64, OperationError> + Sync) -> DistResult<Self> {
        let samples: Vec<f64> = if self.samples.len() >= PARALLEL_THRESHOLD {
            self.samples.par_iter().map(|&x| f(x)).collect::<Result<_, _>>()?
        } else {
            self.samples.iter().map(|&x| f(x)).collect::<Result<_, _>>()?
        };
        SampleSetDist::make(samples)
    }

    /// Pair samples by index. The longer set is cut to the shorter length.
    pub fn map2(
        &self,
        other: &SampleSetDist,
        f: impl Fn(f64, f64) -> Result<f64, OperationError> + Sync,
    ) -> DistResult<Self> {
        let length = self.samples.len().min(other.samples.len());
        let (a, b) = (&self.samples[..length], &other.samples[..length]);
        let samples: Vec<f64> = if length >= PARALLEL_THRESHOLD {
            a.par_iter()
                .zip(b.par_iter())
                .map(|(&x, &y)| f(x, y))
                .collect::<Result<_, _>>()?
        } else {
            a.iter()
                .zip(b)
                .map(|(&x, &y)| f(x, y))
                .collect::<Result<_, _>>()?
        };
        SampleSetDist::make(samples)
    }

    /// Weighted mixture: each draw picks a component by weight, then a random
    /// sample of it.
    pub fn mixture(parts: &[(SampleSetDist, f64)], length: usize, rng: &mut DistRng) -> DistResult<Self> {
        let total: f64 = parts.iter().map(|(_, w)| w).sum();
        if parts.is_empty() || total <= 0.0 {
            return Err(DistError::ArgumentError(
                "Mixture requires at least one positive weight".to_string(),
            ));
        }
        let mut cumulative = Vec::with_capacity(parts.len());
        let mut running = 0.0;
        for (_, weight) in parts {
            running += weight / total;
            cumulative.push(running);
        }
        let samples = (0..length)
            .map(|_| {
                let u: f64 = rng.gen();
                let index = cumulative.partition_point(|&c| c < u).min(parts.len() - 1);
                parts[index].0.sample(rng)
            })
            .collect();
        SampleSetDist::make(samples)
    }

    pub fn to_point_set(&self, env: &Env) -> DistResult<PointSetDist> {
        samples_to_point_set(&self.samples, env.xy_point_length, None)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
