//! Adapter from `statrs` distributions to the four queries symbolic
//! distributions need.

use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::{Continuous, ContinuousCDF};

use crate::DistRng;

pub(super) trait Backend {
    fn density(&self, x: f64) -> f64;
    fn cumulative(&self, x: f64) -> f64;
    fn quantile(&self, p: f64) -> f64;
    fn draw(&self, rng: &mut DistRng) -> f64;
}

impl<T> Backend for T
where
    T: Continuous<f64, f64> + ContinuousCDF<f64, f64> + Distribution<f64>,
{
    fn density(&self, x: f64) -> f64 {
        self.pdf(x)
    }

    fn cumulative(&self, x: f64) -> f64 {
        self.cdf(x)
    }

    fn quantile(&self, p: f64) -> f64 {
        self.inverse_cdf(p)
    }

    fn draw(&self, rng: &mut DistRng) -> f64 {
        self.sample(rng)
    }
}

/// `statrs` has no logistic distribution.
pub(super) struct Logistic {
    pub location: f64,
    pub scale: f64,
}

impl Backend for Logistic {
    fn density(&self, x: f64) -> f64 {
        let z = (-(x - self.location) / self.scale).exp();
        z / (self.scale * (1.0 + z).powi(2))
    }

    fn cumulative(&self, x: f64) -> f64 {
        1.0 / (1.0 + (-(x - self.location) / self.scale).exp())
    }

    fn quantile(&self, p: f64) -> f64 {
        self.location + self.scale * (p / (1.0 - p)).ln()
    }

    fn draw(&self, rng: &mut DistRng) -> f64 {
        self.quantile(rng.gen())
    }
}
