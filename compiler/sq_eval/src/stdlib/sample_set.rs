//! Representation-specific constructors: `SampleSet.*`, `PointSet.*`, `Sym.*`.

use sq_dist::{DistError, PointSetDist, SampleSetDist, XyShape};
use sq_value::{EvalError, FnDefinition, FrType as T, Value};

use super::{array, dist, lambda, number_field, numbers, returned_number};
use crate::Registry;

pub(super) fn register(registry: &mut Registry) {
    registry.define(
        "SampleSet.fromDist",
        vec![FnDefinition::new(vec![T::Dist], |a, c| {
            let d = dist(a, 0)?;
            let (env, rng) = c.sampler();
            Ok(Value::dist(d.to_sample_set(env, rng)?))
        })],
    );
    registry.define(
        "SampleSet.fromList",
        vec![FnDefinition::new(vec![T::Array(Box::new(T::Number))], |a, _| {
            let samples = numbers(array(a, 0)?)?;
            Ok(Value::dist(SampleSetDist::make(samples)?))
        })],
    );
    registry.define(
        "SampleSet.fromFn",
        vec![FnDefinition::new(vec![T::Lambda], |a, c| {
            let f = lambda(a, 0)?;
            let pass_index = f.parameter_count() == Some(1);
            let count = c.env().sample_count;
            let mut samples = Vec::with_capacity(count);
            for i in 0..count {
                let args = if pass_index {
                    vec![Value::number(i as f64)]
                } else {
                    Vec::new()
                };
                samples.push(returned_number(&c.call(f, args)?)?);
            }
            Ok(Value::dist(SampleSetDist::make(samples)?))
        })],
    );
    registry.define(
        "SampleSet.toList",
        vec![FnDefinition::new(vec![T::Dist], |a, c| {
            let d = dist(a, 0)?;
            let (env, rng) = c.sampler();
            let samples = d.to_sample_set(env, rng)?;
            Ok(Value::array(
                samples.samples().iter().copied().map(Value::number).collect(),
            ))
        })],
    );
    registry.define(
        "SampleSet.map",
        vec![FnDefinition::new(vec![T::Dist, T::Lambda], |a, c| {
            let d = dist(a, 0)?;
            let f = lambda(a, 1)?;
            let samples = {
                let (env, rng) = c.sampler();
                d.to_sample_set(env, rng)?
            };
            let mut mapped = Vec::with_capacity(samples.len());
            for &x in samples.samples() {
                mapped.push(returned_number(&c.call(f, vec![Value::number(x)])?)?);
            }
            Ok(Value::dist(SampleSetDist::make(mapped)?))
        })],
    );

    registry.define(
        "PointSet.fromDist",
        vec![FnDefinition::new(vec![T::Dist], |a, c| {
            Ok(Value::dist(dist(a, 0)?.to_point_set(c.env())?))
        })],
    );
    registry.define(
        "PointSet.makeContinuous",
        vec![FnDefinition::new(vec![T::Array(Box::new(T::Dict))], |a, _| {
            Ok(Value::dist(PointSetDist::continuous(xy_shape(array(a, 0)?)?)))
        })],
    );
    registry.define(
        "PointSet.makeDiscrete",
        vec![FnDefinition::new(vec![T::Array(Box::new(T::Dict))], |a, _| {
            Ok(Value::dist(PointSetDist::discrete(xy_shape(array(a, 0)?)?)))
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
    ] {
        registry.alias(&format!("Sym.{name}"), name);
    }
}

/// `[{x, y}, ...]` in any order; xs must be distinct.
fn xy_shape(points: &[Value]) -> Result<XyShape, EvalError> {
    let mut pairs = Vec::with_capacity(points.len());
    for point in points {
        let map = point
            .as_dict()
            .ok_or_else(|| EvalError::other("Expected a list of {x, y} dicts"))?;
        match (number_field(map, "x")?, number_field(map, "y")?) {
            (Some(x), Some(y)) => pairs.push((x, y)),
            _ => return Err(EvalError::other("Each point needs numeric x and y")),
        }
    }
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (xs, ys) = pairs.into_iter().unzip();
    XyShape::new(xs, ys).map_err(|err| DistError::from(err).into())
}
