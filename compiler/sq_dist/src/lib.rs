//! Distribution algebra for Squiggle.
//!
//! Three representations share one sum type, [`Dist`]:
//!
//! - **Symbolic**: closed-form parameters with exact pdf, cdf and quantiles.
//! - **Point set**: a continuous density and/or point masses on a grid.
//! - **Sample set**: a shared vector of draws.
//!
//! Conversions go one way (symbolic → point set, anything → sample set) and
//! lose information. Every operation that samples or discretizes takes an
//! explicit [`Env`] and, when it draws, a [`DistRng`] seeded from it.

mod combination;
mod dist;
mod env;
mod error;
mod operation;
mod point_set;
mod sample_set;
mod scoring;
mod symbolic;
mod xy;

pub use combination::{
    algebraic_combination, mixture, pointwise_combination, pointwise_combination_float,
};
pub use dist::Dist;
pub use env::{DistRng, Env};
pub use error::{DistError, DistResult, OperationError};
pub use operation::{AlgebraicOperation, ConvolutionOperation, ScaleOperation};
pub use point_set::{ContinuousShape, DiscreteShape, PointSetDist};
pub use sample_set::{kde, nrd0, samples_to_point_set, SampleSetDist, MIN_DISCRETE_TO_KEEP};
pub use scoring::{kl_divergence, log_score_dist_answer, log_score_scalar_answer};
pub use symbolic::{Params, PointSetConversion, SymbolicDist};
pub use xy::{Interpolation, XyShape, XyShapeError};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
