//! Combination strategies and scoring across representations.

use super::*;

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

fn normal(mean: f64, stdev: f64) -> Dist {
    Dist::Symbolic(SymbolicDist::normal(mean, stdev).unwrap())
}

fn number(value: f64) -> Dist {
    Dist::Symbolic(SymbolicDist::point_mass(value).unwrap())
}

fn env() -> Env {
    Env::default().with_sample_count(2000)
}

#[test]
fn test_symbolic_closed_form() {
    let env = env();
    let mut rng = env.rng();
    let sum = algebraic_combination(
        &normal(1.0, 3.0),
        &normal(2.0, 4.0),
        AlgebraicOperation::Add,
        &env,
        &mut rng,
    )
    .unwrap();
    assert_eq!(sum, normal(3.0, 5.0));
}

#[test]
fn test_number_arithmetic_stays_symbolic() {
    let env = env();
    let mut rng = env.rng();
    let product = algebraic_combination(
        &number(3.0),
        &number(4.0),
        AlgebraicOperation::Multiply,
        &env,
        &mut rng,
    )
    .unwrap();
    assert_eq!(product, number(12.0));
    let err = algebraic_combination(
        &number(1.0),
        &number(0.0),
        AlgebraicOperation::Divide,
        &env,
        &mut rng,
    );
    assert_eq!(
        err,
        Err(DistError::OperationError(OperationError::DivisionByZero))
    );
}

fn uniform(low: f64, high: f64) -> Dist {
    Dist::Symbolic(SymbolicDist::uniform(low, high).unwrap())
}

#[test]
fn test_symbolic_without_closed_form_convolves() {
    let env = env();
    let mut rng = env.rng();
    let product = algebraic_combination(
        &normal(10.0, 1.0),
        &normal(5.0, 1.0),
        AlgebraicOperation::Multiply,
        &env,
        &mut rng,
    )
    .unwrap();
    assert_eq!(product.type_name(), "PointSet");
    assert!(close(product.mean(), 50.0, 1.5));

    let shifted = algebraic_combination(
        &uniform(0.0, 1.0),
        &number(3.0),
        AlgebraicOperation::Add,
        &env,
        &mut rng,
    )
    .unwrap();
    assert_eq!(shifted.type_name(), "PointSet");
    assert!(close(shifted.mean(), 3.5, 0.05));

    let sum = algebraic_combination(
        &uniform(0.0, 1.0),
        &uniform(0.0, 1.0),
        AlgebraicOperation::Add,
        &env,
        &mut rng,
    )
    .unwrap();
    assert_eq!(sum.type_name(), "PointSet");
    assert!(close(sum.mean(), 1.0, 0.05));
}

#[test]
fn test_monte_carlo_when_not_convolvable() {
    let env = env();
    let mut rng = env.rng();
    let ratio = algebraic_combination(
        &normal(10.0, 1.0),
        &uniform(4.0, 6.0),
        AlgebraicOperation::Divide,
        &env,
        &mut rng,
    )
    .unwrap();
    assert!(ratio.is_sample_set());
    // E[10 / U(4, 6)] = 10 * ln(6 / 4) / 2
    assert!(close(ratio.mean(), 5.0 * 1.5f64.ln(), 0.1));
}

#[test]
fn test_point_set_uses_convolution() {
    let env = Env::default().with_sample_count(200);
    let mut rng = env.rng();
    let ps = Dist::PointSet(normal(0.0, 1.0).to_point_set(&env).unwrap());
    let shifted =
        algebraic_combination(&ps, &number(10.0), AlgebraicOperation::Add, &env, &mut rng).unwrap();
    assert_eq!(shifted.type_name(), "PointSet");
    assert!(close(shifted.mean(), 10.0, 1e-6));
}

#[test]
fn test_sample_set_pairs_samples() {
    let env = env();
    let mut rng = env.rng();
    let s = normal(0.0, 1.0).to_sample_set(&env, &mut rng).unwrap();
    let s = Dist::SampleSet(s);
    let zero =
        algebraic_combination(&s, &s, AlgebraicOperation::Subtract, &env, &mut rng).unwrap();
    assert_eq!(zero.min(), 0.0);
    assert_eq!(zero.max(), 0.0);
}

#[test]
fn test_logarithm_requires_positive_operands() {
    let env = env();
    let mut rng = env.rng();
    let err = algebraic_combination(
        &normal(0.0, 1.0),
        &number(10.0),
        AlgebraicOperation::Logarithm,
        &env,
        &mut rng,
    );
    assert_eq!(
        err,
        Err(DistError::ArgumentError(
            "First input must be completely greater than 0".to_string()
        ))
    );
}

#[test]
fn test_pointwise_float() {
    let env = env();
    let doubled =
        pointwise_combination_float(&normal(0.0, 1.0), AlgebraicOperation::Multiply, 2.0, &env)
            .unwrap();
    assert!(close(doubled.integral_sum(), 2.0, 1e-9));
    assert!(!doubled.is_normalized());
    assert!(doubled.normalize().is_normalized());
    assert_eq!(
        pointwise_combination_float(&normal(0.0, 1.0), AlgebraicOperation::Add, 2.0, &env),
        Err(DistError::DistributionVerticalShiftIsInvalid)
    );
}

#[test]
fn test_pointwise_sum_of_densities() {
    let env = env();
    let sum = pointwise_combination(
        &normal(0.0, 1.0),
        &normal(5.0, 1.0),
        AlgebraicOperation::Add,
        &env,
    )
    .unwrap();
    assert!(close(sum.integral_sum(), 2.0, 1e-3));
}

#[test]
fn test_mixture_of_point_sets() {
    let env = env();
    let mut rng = env.rng();
    let mixed = mixture(
        &[(normal(0.0, 1.0), 1.0), (number(10.0), 1.0)],
        &env,
        &mut rng,
    )
    .unwrap();
    assert!(mixed.is_normalized());
    assert!(close(mixed.mean(), 5.0, 1e-3));
    assert!(close(mixed.cdf(9.0), 0.5, 1e-3));
}

#[test]
fn test_mixture_of_sample_sets_stays_sampled() {
    let env = env();
    let mut rng = env.rng();
    let a = Dist::SampleSet(SampleSetDist::make(vec![0.0; 10]).unwrap());
    let b = Dist::SampleSet(SampleSetDist::make(vec![1.0; 10]).unwrap());
    let mixed = mixture(&[(a, 1.0), (b, 1.0)], &env, &mut rng).unwrap();
    assert!(mixed.is_sample_set());
    assert!(mixture(&[], &env, &mut rng).is_err());
}

#[test]
fn test_truncate_by_representation() {
    let env = env();
    let mut rng = env.rng();
    let t = normal(0.0, 1.0)
        .truncate(Some(0.0), None, &env, &mut rng)
        .unwrap();
    assert_eq!(t.type_name(), "PointSet");
    assert!(t.min() >= 0.0);

    let s = Dist::SampleSet(normal(0.0, 1.0).to_sample_set(&env, &mut rng).unwrap());
    let ts = s.truncate(None, Some(0.0), &env, &mut rng).unwrap();
    assert!(ts.is_sample_set());
    assert!(ts.max() <= 0.0);

    assert!(s.truncate(Some(1.0), Some(0.0), &env, &mut rng).is_err());
}

#[test]
fn test_kl_divergence_of_identical_is_zero() {
    let env = Env::default().with_sample_count(300);
    let kl = kl_divergence(&normal(0.0, 1.0), &normal(0.0, 1.0), &env).unwrap();
    assert!(close(kl, 0.0, 1e-9));
}

#[test]
fn test_kl_divergence_requires_cover() {
    let env = Env::default().with_sample_count(300);
    let wide_answer = kl_divergence(&normal(0.0, 5.0), &normal(0.0, 1.0), &env);
    assert_eq!(wide_answer, Err(DistError::NonOverlappingSupport));
    let narrow_answer = kl_divergence(&normal(0.0, 1.0), &normal(0.0, 5.0), &env).unwrap();
    assert!(narrow_answer > 0.0);
}

#[test]
fn test_scalar_log_score() {
    let env = env();
    let score = log_score_scalar_answer(&normal(0.0, 1.0), 0.0, None, &env).unwrap();
    assert!(close(score, 0.5 * (2.0 * std::f64::consts::PI).ln(), 1e-9));
    let relative =
        log_score_scalar_answer(&normal(0.0, 1.0), 0.0, Some(&normal(0.0, 1.0)), &env).unwrap();
    assert_eq!(relative, 0.0);
    let outside = log_score_scalar_answer(&number(1.0), 2.0, None, &env);
    assert_eq!(outside, Err(DistError::NonOverlappingSupport));
}

#[test]
fn test_display() {
    assert_eq!(normal(1.0, 2.0).to_string(), "Normal(1,2)");
    let s = Dist::SampleSet(SampleSetDist::make(vec![0.0; 10]).unwrap());
    assert_eq!(s.to_string(), "Sample Set Distribution (10 samples)");
}
