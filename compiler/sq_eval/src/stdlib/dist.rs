//! Distribution constructors and queries.

use sq_dist::{
    kl_divergence, log_score_dist_answer, log_score_scalar_answer, mixture, Dist, DistResult,
    Params, SymbolicDist,
};
use sq_value::{Context, EvalError, FnDefinition, FrType as T, Value, ValueMap};

use super::{array, dist, field, number, number_field, numbers, optional};
use crate::Registry;

type Result = std::result::Result<Value, EvalError>;

fn symbolic(result: DistResult<SymbolicDist>) -> Result {
    Ok(Value::dist(result?))
}

fn params(params: Params) -> Result {
    symbolic(SymbolicDist::new(params))
}

/// `{p5, p95}`, `{p10, p90}`, `{p25, p75}` or `{mean, stdev}`.
fn from_dict(
    map: &ValueMap,
    from_interval: fn(f64, f64, f64) -> DistResult<SymbolicDist>,
    from_moments: fn(f64, f64) -> DistResult<SymbolicDist>,
) -> Result {
    for (low, high, probability) in [("p5", "p95", 0.9), ("p10", "p90", 0.8), ("p25", "p75", 0.5)] {
        if let (Some(l), Some(h)) = (number_field(map, low)?, number_field(map, high)?) {
            return symbolic(from_interval(l, h, probability));
        }
    }
    if let (Some(mean), Some(stdev)) = (number_field(map, "mean")?, number_field(map, "stdev")?) {
        return symbolic(from_moments(mean, stdev));
    }
    Err(EvalError::other(
        "Expected a dict with keys p5 and p95, p10 and p90, p25 and p75, or mean and stdev",
    ))
}

fn beta_from_moments(mean: f64, stdev: f64) -> DistResult<SymbolicDist> {
    let variance = stdev.powi(2);
    let sample_size = mean * (1.0 - mean) / variance - 1.0;
    SymbolicDist::new(Params::Beta {
        alpha: mean * sample_size,
        beta: (1.0 - mean) * sample_size,
    })
}

pub(super) fn register(registry: &mut Registry) {
    registry.define(
        "normal",
        vec![
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                symbolic(SymbolicDist::normal(number(a, 0)?, number(a, 1)?))
            }),
            FnDefinition::new(vec![T::Dict], |a, _| {
                from_dict(
                    super::dict(a, 0)?,
                    SymbolicDist::normal_from_interval,
                    SymbolicDist::normal,
                )
            }),
        ],
    );
    registry.define(
        "lognormal",
        vec![
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                symbolic(SymbolicDist::lognormal(number(a, 0)?, number(a, 1)?))
            }),
            FnDefinition::new(vec![T::Dict], |a, _| {
                from_dict(
                    super::dict(a, 0)?,
                    SymbolicDist::lognormal_from_interval,
                    SymbolicDist::lognormal_from_mean_and_stdev,
                )
            }),
        ],
    );
    registry.define(
        "uniform",
        vec![FnDefinition::new(vec![T::Number, T::Number], |a, _| {
            symbolic(SymbolicDist::uniform(number(a, 0)?, number(a, 1)?))
        })],
    );
    registry.define(
        "beta",
        vec![
            FnDefinition::new(vec![T::Number, T::Number], |a, _| {
                params(Params::Beta {
                    alpha: number(a, 0)?,
                    beta: number(a, 1)?,
                })
            }),
            FnDefinition::new(vec![T::Dict], |a, _| {
                let map = super::dict(a, 0)?;
                match (number_field(map, "mean")?, number_field(map, "stdev")?) {
                    (Some(mean), Some(stdev)) => symbolic(beta_from_moments(mean, stdev)),
                    _ => Err(EvalError::other("Expected a dict with keys mean and stdev")),
                }
            }),
        ],
    );
    registry.define(
        "cauchy",
        vec![FnDefinition::new(vec![T::Number, T::Number], |a, _| {
            params(Params::Cauchy {
                local: number(a, 0)?,
                scale: number(a, 1)?,
            })
        })],
    );
    registry.define(
        "gamma",
        vec![FnDefinition::new(vec![T::Number, T::Number], |a, _| {
            params(Params::Gamma {
                shape: number(a, 0)?,
                scale: number(a, 1)?,
            })
        })],
    );
    registry.define(
        "logistic",
        vec![FnDefinition::new(vec![T::Number, T::Number], |a, _| {
            params(Params::Logistic {
                location: number(a, 0)?,
                scale: number(a, 1)?,
            })
        })],
    );
    registry.define(
        "exponential",
        vec![FnDefinition::new(vec![T::Number], |a, _| {
            params(Params::Exponential {
                rate: number(a, 0)?,
            })
        })],
    );
    registry.define(
        "triangular",
        vec![FnDefinition::new(vec![T::Number, T::Number, T::Number], |a, _| {
            params(Params::Triangular {
                low: number(a, 0)?,
                medium: number(a, 1)?,
                high: number(a, 2)?,
            })
        })],
    );
    registry.define(
        "pointMass",
        vec![FnDefinition::new(vec![T::Number], |a, _| {
            symbolic(SymbolicDist::point_mass(number(a, 0)?))
        })],
    );
    registry.define(
        "bernoulli",
        vec![FnDefinition::new(vec![T::Number], |a, _| {
            params(Params::Bernoulli { p: number(a, 0)? })
        })],
    );

    registry.define(
        "mx",
        vec![
            FnDefinition::new(
                vec![
                    T::Array(Box::new(T::DistOrNumber)),
                    T::Optional(Box::new(T::Array(Box::new(T::Number)))),
                ],
                |a, c| {
                    let dists = array(a, 0)?;
                    let weights = match optional(a, 1) {
                        Some(weights) => Some(numbers(weights.as_array().unwrap_or_default())?),
                        None => None,
                    };
                    mix(dists, weights, c)
                },
            ),
            FnDefinition::variadic(vec![T::DistOrNumber], T::DistOrNumber, |a, c| {
                mix(a, None, c)
            }),
        ],
    );
    registry.alias("mixture", "mx");

    registry.define(
        "sample",
        vec![FnDefinition::new(vec![T::Dist], |a, c| {
            let d = dist(a, 0)?;
            Ok(Value::number(d.sample(c.sampler().1)))
        })],
    );
    registry.define(
        "sampleN",
        vec![FnDefinition::new(vec![T::Dist, T::Number], |a, c| {
            let d = dist(a, 0)?;
            let n = super::count(a, 1)?;
            let samples = d.sample_n(n, c.sampler().1);
            Ok(Value::array(samples.into_iter().map(Value::number).collect()))
        })],
    );
    registry.define(
        "mean",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::number(dist(a, 0)?.mean()))
        })],
    );
    registry.define(
        "stdev",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::number(dist(a, 0)?.stdev()?))
        })],
    );
    registry.define(
        "variance",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::number(dist(a, 0)?.variance()?))
        })],
    );
    registry.define(
        "mode",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::number(dist(a, 0)?.mode()?))
        })],
    );
    registry.define(
        "min",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::number(dist(a, 0)?.min()))
        })],
    );
    registry.define(
        "max",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::number(dist(a, 0)?.max()))
        })],
    );
    registry.define(
        "cdf",
        vec![FnDefinition::new(vec![T::Dist, T::Number], |a, _| {
            Ok(Value::number(dist(a, 0)?.cdf(number(a, 1)?)))
        })],
    );
    registry.define(
        "pdf",
        vec![FnDefinition::new(vec![T::Dist, T::Number], |a, c| {
            Ok(Value::number(dist(a, 0)?.pdf(number(a, 1)?, c.env())?))
        })],
    );
    registry.define(
        "quantile",
        vec![FnDefinition::new(vec![T::Dist, T::Number], |a, _| {
            let p = number(a, 1)?;
            if !(0.0..=1.0).contains(&p) {
                return Err(EvalError::other(format!(
                    "Quantile must be between 0 and 1, got {}",
                    sq_ir::format_number(p)
                )));
            }
            Ok(Value::number(dist(a, 0)?.inv(p)))
        })],
    );
    registry.alias("inv", "quantile");
    registry.define(
        "truncate",
        vec![FnDefinition::new(vec![T::Dist, T::Number, T::Number], |a, c| {
            truncate(a, c, Some(number(a, 1)?), Some(number(a, 2)?))
        })],
    );
    registry.define(
        "truncateLeft",
        vec![FnDefinition::new(vec![T::Dist, T::Number], |a, c| {
            truncate(a, c, Some(number(a, 1)?), None)
        })],
    );
    registry.define(
        "truncateRight",
        vec![FnDefinition::new(vec![T::Dist, T::Number], |a, c| {
            truncate(a, c, None, Some(number(a, 1)?))
        })],
    );
    registry.define(
        "normalize",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::dist(dist(a, 0)?.normalize()))
        })],
    );
    registry.define(
        "isNormalized",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::bool(dist(a, 0)?.is_normalized()))
        })],
    );
    registry.define(
        "integralSum",
        vec![FnDefinition::new(vec![T::Dist], |a, _| {
            Ok(Value::number(dist(a, 0)?.integral_sum()))
        })],
    );

    registry.define(
        "Dist.logScore",
        vec![FnDefinition::new(vec![T::Dict], |a, c| {
            let map = super::dict(a, 0)?;
            let estimate = field(map, "estimate")
                .and_then(Value::as_dist)
                .ok_or_else(|| EvalError::other("logScore requires an estimate distribution"))?;
            let answer = field(map, "answer")
                .ok_or_else(|| EvalError::other("logScore requires an answer"))?;
            let prior = field(map, "prior").and_then(Value::as_dist);
            let env = c.env();
            let score = match (answer.as_number(), answer.as_dist()) {
                (Some(x), _) => log_score_scalar_answer(estimate, x, prior, env)?,
                (None, Some(answer)) => log_score_dist_answer(estimate, answer, prior, env)?,
                (None, None) => {
                    return Err(EvalError::other(
                        "logScore answer must be a number or a distribution",
                    ))
                }
            };
            Ok(Value::number(score))
        })],
    );
    registry.define(
        "Dist.klDivergence",
        vec![FnDefinition::new(vec![T::Dist, T::Dist], |a, c| {
            let answer = dist(a, 0)?;
            let estimate = dist(a, 1)?;
            Ok(Value::number(kl_divergence(&answer, &estimate, c.env())?))
        })],
    );

    for name in [
        "normal",
        "lognormal",
        "uniform",
        "beta",
        "cauchy",
        "gamma",
        "logistic",
        "exponential",
        "triangular",
        "pointMass",
        "bernoulli",
        "mixture",
        "sample",
        "sampleN",
        "mean",
        "stdev",
        "variance",
        "mode",
        "min",
        "max",
        "cdf",
        "pdf",
        "quantile",
        "inv",
        "truncate",
        "truncateLeft",
        "truncateRight",
        "normalize",
        "isNormalized",
        "integralSum",
    ] {
        registry.alias(&format!("Dist.{name}"), name);
    }
}

fn mix(values: &[Value], weights: Option<Vec<f64>>, context: &mut dyn Context) -> Result {
    let weights = weights.unwrap_or_else(|| vec![1.0; values.len()]);
    if weights.len() != values.len() {
        return Err(EvalError::other(format!(
            "Mixture got {} distributions but {} weights",
            values.len(),
            weights.len()
        )));
    }
    let mut parts = Vec::with_capacity(values.len());
    for (i, weight) in weights.into_iter().enumerate() {
        parts.push((dist(values, i)?, weight));
    }
    let (env, rng) = context.sampler();
    Ok(Value::dist(mixture(&parts, env, rng)?))
}

fn truncate(
    args: &[Value],
    context: &mut dyn Context,
    left: Option<f64>,
    right: Option<f64>,
) -> Result {
    let d: Dist = dist(args, 0)?;
    let (env, rng) = context.sampler();
    Ok(Value::dist(d.truncate(left, right, env, rng)?))
}
