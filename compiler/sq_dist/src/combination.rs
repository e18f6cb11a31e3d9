//! Binary operations and mixtures over distributions.
//!
//! Algebraic combination is the distribution of `op(X, Y)` for independent
//! `X` and `Y`. A closed form is used when both operands are symbolic and
//! one exists. Without one, operands that are not sample sets are converted
//! to point sets at `xy_point_length` and convolved, as long as the operation
//! is a convolution. Everything else is Monte-Carlo over paired samples.
//! Pointwise combination applies `op` to the two density curves instead.

use crate::{
    AlgebraicOperation, Dist, DistError, DistResult, DistRng, Env, PointSetDist, SampleSetDist,
};

/// Where a Logarithm operand may not put any mass.
const LOG_MIN_POSITIVE: f64 = 1e-10;

fn validate_logarithm(a: &Dist, b: &Dist) -> DistResult<()> {
    if a.cdf(LOG_MIN_POSITIVE) > 0.0 {
        return Err(DistError::ArgumentError(
            "First input must be completely greater than 0".to_string(),
        ));
    }
    if b.cdf(LOG_MIN_POSITIVE) > 0.0 {
        return Err(DistError::ArgumentError(
            "Second input must be completely greater than 0".to_string(),
        ));
    }
    Ok(())
}

#[tracing::instrument(level = "trace", skip_all, fields(op = op.name(), a = a.type_name(), b = b.type_name()))]
pub fn algebraic_combination(
    a: &Dist,
    b: &Dist,
    op: AlgebraicOperation,
    env: &Env,
    rng: &mut DistRng,
) -> DistResult<Dist> {
    if op == AlgebraicOperation::Logarithm {
        validate_logarithm(a, b)?;
    }

    if let (Dist::Symbolic(x), Dist::Symbolic(y)) = (a, b) {
        if let Some(result) = x.try_analytical_simplification(y, op) {
            return Ok(Dist::Symbolic(result?));
        }
    }

    if let Some(convolution) = op.as_convolution() {
        if !a.is_sample_set() && !b.is_sample_set() {
            let x = a.to_point_set(env)?;
            let y = b.to_point_set(env)?;
            return Ok(Dist::PointSet(x.combine_algebraic(
                &y,
                convolution,
                env.xy_point_length,
            )));
        }
    }

    let x = a.to_sample_set(env, rng)?;
    let y = b.to_sample_set(env, rng)?;
    Ok(Dist::SampleSet(x.map2(&y, |u, v| op.apply(u, v))?))
}

/// Combine the two density curves on a shared grid.
pub fn pointwise_combination(
    a: &Dist,
    b: &Dist,
    op: AlgebraicOperation,
    env: &Env,
) -> DistResult<Dist> {
    let x = a.to_point_set(env)?;
    let y = b.to_point_set(env)?;
    Ok(Dist::PointSet(x.combine_pointwise(&y, |u, v| op.apply(u, v))?))
}

/// Apply `op` with `factor` to every density value. Adding to a density is
/// not a distribution operation and is rejected.
pub fn pointwise_combination_float(
    dist: &Dist,
    op: AlgebraicOperation,
    factor: f64,
    env: &Env,
) -> DistResult<Dist> {
    let Some(scale) = op.as_scale() else {
        return Err(DistError::DistributionVerticalShiftIsInvalid);
    };
    Ok(Dist::PointSet(dist.to_point_set(env)?.scale_y(scale, factor)?))
}

/// Weighted mixture. Sample sets stay sample sets; anything else becomes a
/// weighted sum of point sets.
pub fn mixture(parts: &[(Dist, f64)], env: &Env, rng: &mut DistRng) -> DistResult<Dist> {
    if parts.is_empty() {
        return Err(DistError::ArgumentError(
            "Mixture requires at least one distribution".to_string(),
        ));
    }
    if let Some((_, weight)) = parts.iter().find(|(_, w)| *w < 0.0 || !w.is_finite()) {
        return Err(DistError::ArgumentError(format!(
            "Mixture weights must be non-negative, got {weight}"
        )));
    }

    if parts.iter().all(|(d, _)| d.is_sample_set()) {
        let sample_sets = parts
            .iter()
            .filter_map(|(d, w)| match d {
                Dist::SampleSet(s) => Some((s.clone(), *w)),
                _ => None,
            })
            .collect::<Vec<(SampleSetDist, f64)>>();
        return Ok(Dist::SampleSet(SampleSetDist::mixture(
            &sample_sets,
            env.sample_count,
            rng,
        )?));
    }

    let total: f64 = parts.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return Err(DistError::ArgumentError(
            "Mixture weights must not all be zero".to_string(),
        ));
    }
    let mut combined: Option<PointSetDist> = None;
    for (dist, weight) in parts {
        let scaled = dist
            .to_point_set(env)?
            .normalize()
            .scale_y(crate::ScaleOperation::Multiply, weight / total)?;
        combined = Some(match combined {
            None => scaled,
            Some(acc) => acc.combine_pointwise(&scaled, |u, v| Ok(u + v))?,
        });
    }
    combined
        .map(Dist::PointSet)
        .ok_or(DistError::Unreachable)
}
