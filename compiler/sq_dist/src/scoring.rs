//! Log scores and KL divergence, computed on point sets.

use crate::xy::{Interpolation, XyShape};
use crate::{Dist, DistError, DistResult, Env, OperationError, PointSetDist};

/// `-answer · ln(estimate / answer)`, the pointwise KL integrand.
fn integrand(estimate: f64, answer: f64) -> DistResult<f64> {
    if answer == 0.0 {
        return Ok(0.0);
    }
    if estimate == 0.0 {
        return Err(DistError::NonOverlappingSupport);
    }
    let quotient = estimate / answer;
    if quotient < 0.0 {
        return Err(OperationError::ComplexNumber.into());
    }
    Ok(-answer * quotient.ln())
}

fn parts(dist: &PointSetDist) -> (XyShape, XyShape) {
    (
        dist.continuous_part()
            .map_or_else(XyShape::empty, |c| c.xy().clone()),
        dist.discrete_part()
            .map_or_else(XyShape::empty, |d| d.xy().clone()),
    )
}

fn score_point_sets(estimate: &PointSetDist, answer: &PointSetDist) -> DistResult<f64> {
    let (estimate_c, estimate_d) = parts(estimate);
    let (answer_c, answer_d) = parts(answer);
    let continuous = estimate_c
        .combine(&answer_c, Interpolation::Linear, integrand)?
        .area();
    let discrete: f64 = estimate_d
        .combine(&answer_d, Interpolation::Discrete, integrand)?
        .ys()
        .iter()
        .sum();
    Ok(continuous + discrete)
}

/// Score of `estimate` against a distribution-valued answer. With a prior,
/// the score relative to the prior's.
pub fn log_score_dist_answer(
    estimate: &Dist,
    answer: &Dist,
    prior: Option<&Dist>,
    env: &Env,
) -> DistResult<f64> {
    let answer = answer.to_point_set(env)?.normalize();
    let score = score_point_sets(&estimate.to_point_set(env)?.normalize(), &answer)?;
    match prior {
        Some(prior) => {
            let prior_score = score_point_sets(&prior.to_point_set(env)?.normalize(), &answer)?;
            Ok(score - prior_score)
        }
        None => Ok(score),
    }
}

/// `-ln(pdf(answer))`. With a prior, the score relative to the prior's.
pub fn log_score_scalar_answer(
    estimate: &Dist,
    answer: f64,
    prior: Option<&Dist>,
    env: &Env,
) -> DistResult<f64> {
    let score = |dist: &Dist| -> DistResult<f64> {
        let density = dist.pdf(answer, env)?;
        if density < 0.0 {
            Err(OperationError::PdfInvalid.into())
        } else if density == 0.0 {
            Err(DistError::NonOverlappingSupport)
        } else {
            Ok(-density.ln())
        }
    };
    let estimate_score = score(estimate)?;
    match prior {
        Some(prior) => Ok(estimate_score - score(prior)?),
        None => Ok(estimate_score),
    }
}

/// `KL(answer ‖ estimate)`. The estimate must cover the answer's support.
pub fn kl_divergence(answer: &Dist, estimate: &Dist, env: &Env) -> DistResult<f64> {
    log_score_dist_answer(estimate, answer, None, env)
}
