use super::*;
use crate::{ConvolutionOperation, Env};

fn triangle() -> PointSetDist {
    PointSetDist::continuous(XyShape::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 0.0]).unwrap())
}

fn coin() -> PointSetDist {
    PointSetDist::discrete(XyShape::new(vec![0.0, 1.0], vec![0.5, 0.5]).unwrap())
}

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

#[test]
fn test_continuous_stats() {
    let d = triangle();
    assert!(d.is_normalized());
    assert!(close(d.mean(), 1.0, 1e-12));
    assert!(close(d.variance(), 1.0 / 6.0, 1e-12));
    assert_eq!(d.cdf(1.0), 0.5);
    assert_eq!(d.cdf(-1.0), 0.0);
    assert_eq!(d.cdf(5.0), 1.0);
    assert_eq!(d.pdf(0.5), 0.5);
    assert_eq!(d.mode(), 1.0);
}

#[test]
fn test_continuous_inv() {
    let d = triangle();
    assert!(close(d.inv(0.5), 1.0, 1e-12));
    assert_eq!(d.inv(0.0), 0.0);
    assert_eq!(d.inv(1.0), 2.0);
}

#[test]
fn test_discrete_stats() {
    let d = coin();
    assert_eq!(d.mean(), 0.5);
    assert_eq!(d.variance(), 0.25);
    assert_eq!(d.cdf(0.0), 0.5);
    assert_eq!(d.cdf(0.99), 0.5);
    assert_eq!(d.inv(0.25), 0.0);
    assert_eq!(d.inv(0.75), 1.0);
    assert_eq!(d.pdf(1.0), 0.5);
    assert_eq!(d.pdf(0.5), 0.0);
}

#[test]
fn test_mixed_mode_prefers_mass() {
    let d = PointSetDist::from_shapes(
        Some(XyShape::new(vec![0.0, 1.0, 2.0], vec![0.0, 0.8, 0.0]).unwrap()),
        XyShape::new(vec![5.0], vec![0.2]).unwrap(),
    )
    .unwrap();
    assert_eq!(d.type_name(), "Mixed");
    assert!(d.is_normalized());
    assert_eq!(d.mode(), 5.0);
    assert_eq!(d.min(), 0.0);
    assert_eq!(d.max(), 5.0);
    assert!(close(d.inv(0.9), 5.0, 1e-12));
}

#[test]
fn test_from_shapes_empty() {
    assert_eq!(PointSetDist::from_shapes(None, XyShape::empty()), None);
    let d = PointSetDist::from_shapes(Some(XyShape::empty()), coin_shape()).unwrap();
    assert_eq!(d.type_name(), "Discrete");
}

fn coin_shape() -> XyShape {
    XyShape::new(vec![0.0, 1.0], vec![0.5, 0.5]).unwrap()
}

#[test]
fn test_normalize() {
    let d = PointSetDist::continuous(XyShape::new(vec![0.0, 1.0], vec![4.0, 4.0]).unwrap());
    assert!(!d.is_normalized());
    assert!(d.normalize().is_normalized());
}

#[test]
fn test_truncate() {
    let d = triangle().truncate(Some(1.0), None).unwrap();
    assert!(d.is_normalized());
    assert_eq!(d.min(), 1.0);
    assert!(close(d.cdf(1.5), 0.75, 1e-12));

    let err = coin().truncate(Some(2.0), Some(3.0));
    assert!(matches!(err, Err(DistError::Other(_))));
}

#[test]
fn test_scale_y() {
    let d = triangle().scale_y(ScaleOperation::Multiply, 2.0).unwrap();
    assert!(close(d.integral_sum(), 2.0, 1e-12));
    assert_eq!(
        triangle().scale_y(ScaleOperation::Divide, 0.0),
        Err(OperationError::DivisionByZero)
    );
}

#[test]
fn test_combine_pointwise() {
    let d = triangle()
        .combine_pointwise(&triangle(), |a, b| Ok(a + b))
        .unwrap();
    assert!(close(d.integral_sum(), 2.0, 1e-12));
    let masses = coin().combine_pointwise(&coin(), |a, b| Ok(a * b)).unwrap();
    assert_eq!(masses.discrete_part().unwrap().xy().ys(), &[0.25, 0.25]);
}

#[test]
fn test_sampling_stays_in_support() {
    let mut rng = Env::default().rng();
    let samples = triangle().sample_n(500, &mut rng);
    assert_eq!(samples.len(), 500);
    assert!(samples.iter().all(|&s| (0.0..=2.0).contains(&s)));
    let mean = samples.iter().sum::<f64>() / 500.0;
    assert!(close(mean, 1.0, 0.1));

    let coin_samples = coin().sample_n(100, &mut rng);
    assert!(coin_samples.iter().all(|&s| s == 0.0 || s == 1.0));
}

#[test]
fn test_convolve_discrete() {
    let sum = coin().combine_algebraic(&coin(), ConvolutionOperation::Add, 100);
    let d = sum.discrete_part().unwrap();
    assert_eq!(d.xy().xs(), &[0.0, 1.0, 2.0]);
    assert_eq!(d.xy().ys(), &[0.25, 0.5, 0.25]);
}

#[test]
fn test_convolve_continuous_shift() {
    let shift = PointSetDist::discrete(XyShape::new(vec![10.0], vec![1.0]).unwrap());
    let moved = triangle().combine_algebraic(&shift, ConvolutionOperation::Add, 100);
    assert_eq!(moved.type_name(), "Continuous");
    assert!(close(moved.mean(), 11.0, 1e-9));
    assert!(close(moved.integral_sum(), 1.0, 1e-9));
}

#[test]
fn test_convolve_scale_by_mass() {
    let double = PointSetDist::discrete(XyShape::new(vec![2.0], vec![1.0]).unwrap());
    let scaled = triangle().combine_algebraic(&double, ConvolutionOperation::Multiply, 100);
    assert!(close(scaled.mean(), 2.0, 1e-9));
    assert!(close(scaled.integral_sum(), 1.0, 1e-9));
    assert_eq!(scaled.max(), 4.0);
}

#[test]
fn test_convolve_multiply_by_zero_mass() {
    let zero = PointSetDist::discrete(XyShape::new(vec![0.0], vec![1.0]).unwrap());
    let product = triangle().combine_algebraic(&zero, ConvolutionOperation::Multiply, 100);
    assert_eq!(product.type_name(), "Discrete");
    assert!(close(product.pdf(0.0), 1.0, 1e-12));
}

#[test]
fn test_convolve_continuous_pair() {
    let sum = triangle().combine_algebraic(&triangle(), ConvolutionOperation::Add, 200);
    assert!(close(sum.integral_sum(), 1.0, 0.02));
    assert!(close(sum.mean(), 2.0, 0.05));
    assert!(close(sum.variance(), 1.0 / 3.0, 0.1));
}
