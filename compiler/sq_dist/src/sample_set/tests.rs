use proptest::prelude::*;

use super::*;

fn close(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

fn example() -> SampleSetDist {
    SampleSetDist::make(vec![3.0, 4.0, 5.0, 6.0, 6.0, 7.0, 10.0, 15.0, 30.0]).unwrap()
}

#[test]
fn test_make_requires_six_samples() {
    assert_eq!(
        SampleSetDist::make(vec![1.0; 5]),
        Err(DistError::TooFewSamples)
    );
    assert!(SampleSetDist::make(vec![1.0; 6]).is_ok());
}

#[test]
fn test_statistics() {
    let d = example();
    assert_eq!(d.inv(0.5), 6.0);
    assert!(close(d.mean(), 9.556, 1e-3));
    assert_eq!(d.min(), 3.0);
    assert_eq!(d.max(), 30.0);
    assert!(close(d.cdf(6.0), 5.0 / 9.0, 1e-12));
    assert_eq!(d.inv(0.0), 3.0);
    assert_eq!(d.inv(1.0), 30.0);
    assert_eq!(d.mode(), Err(DistError::NotYetImplemented));
}

#[test]
fn test_variance_is_population() {
    let d = SampleSetDist::make(vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0]).unwrap();
    assert_eq!(d.variance(), 1.0);
}

#[test]
fn test_sample_n_prefix_then_random() {
    let d = example();
    let mut rng = Env::default().rng();
    assert_eq!(d.sample_n(3, &mut rng), vec![3.0, 4.0, 5.0]);
    let many = d.sample_n(50, &mut rng);
    assert_eq!(many.len(), 50);
    assert!(many.iter().all(|x| d.samples().contains(x)));
}

#[test]
fn test_truncate_resamples() {
    let d = example();
    let mut rng = Env::default().rng();
    let t = d.truncate(Some(4.0), Some(15.0), &mut rng).unwrap();
    assert_eq!(t.len(), d.len());
    assert!(t.samples().iter().all(|x| (4.0..=15.0).contains(x)));
    assert_eq!(
        d.truncate(Some(20.0), None, &mut rng),
        Err(DistError::TooFewSamples)
    );
}

#[test]
fn test_map_propagates_errors() {
    let d = example();
    let doubled = d.map(|x| Ok(x * 2.0)).unwrap();
    assert_eq!(doubled.min(), 6.0);
    let failed = d.map(|_| Err(OperationError::DivisionByZero));
    assert_eq!(
        failed,
        Err(DistError::OperationError(OperationError::DivisionByZero))
    );
}

#[test]
fn test_map2_truncates_to_shorter() {
    let a = SampleSetDist::make((0..10).map(f64::from).collect()).unwrap();
    let b = SampleSetDist::make(vec![1.0; 8]).unwrap();
    let sum = a.map2(&b, |x, y| Ok(x + y)).unwrap();
    assert_eq!(sum.len(), 8);
    assert_eq!(sum.samples()[7], 8.0);
}

#[test]
fn test_mixture_draws_from_parts() {
    let low = SampleSetDist::make(vec![0.0; 10]).unwrap();
    let high = SampleSetDist::make(vec![1.0; 10]).unwrap();
    let mut rng = Env::default().rng();
    let mixed = SampleSetDist::mixture(&[(low, 1.0), (high, 3.0)], 2000, &mut rng).unwrap();
    assert_eq!(mixed.len(), 2000);
    assert!(close(mixed.mean(), 0.75, 0.05));
    assert!(SampleSetDist::mixture(&[], 10, &mut rng).is_err());
}

#[test]
fn test_to_point_set_splits_repeats() {
    let mut samples: Vec<f64> = (0..100).map(|i| f64::from(i) / 10.0).collect();
    samples.extend([20.0; 25]);
    let d = SampleSetDist::make(samples).unwrap();
    let ps = d.to_point_set(&Env::default()).unwrap();
    assert_eq!(ps.type_name(), "Mixed");
    assert!(ps.is_normalized());
    assert!(close(ps.discrete_part().unwrap().integral_sum(), 0.2, 1e-12));
}

#[test]
fn test_to_point_set_all_equal_is_discrete() {
    let d = SampleSetDist::make(vec![4.0; 10]).unwrap();
    let ps = d.to_point_set(&Env::default()).unwrap();
    assert_eq!(ps.type_name(), "Discrete");
    assert_eq!(ps.mean(), 4.0);
}

#[test]
fn test_too_few_for_point_set() {
    let err = samples_to_point_set(&[1.0, 2.0, 3.0, f64::NAN], 100, None);
    assert_eq!(err, Err(DistError::TooFewSamplesForConversionToPointSet));
}

#[test]
fn test_nrd0() {
    let sorted: Vec<f64> = (1..=100).map(f64::from).collect();
    let width = nrd0(&sorted);
    let sd = (sorted.iter().map(|x| (x - 50.5).powi(2)).sum::<f64>() / 99.0).sqrt();
    let expected = 0.9 * sd.min(49.5 / 1.34) * 100f64.powf(-0.2);
    assert!(close(width, expected, 1e-9));
}

proptest! {
    #[test]
    fn kde_is_normalized_with_zero_endpoints(
        mut samples in prop::collection::vec(-1000.0f64..1000.0, 5..200),
        length in 10usize..400,
    ) {
        samples.sort_by(f64::total_cmp);
        prop_assume!(samples.first() != samples.last());
        let shape = kde(&samples, length, None);
        prop_assert!((shape.area() - 1.0).abs() < 1e-9);
        prop_assert_eq!(shape.ys().first().copied(), Some(0.0));
        prop_assert_eq!(shape.ys().last().copied(), Some(0.0));
    }

    #[test]
    fn sample_set_addition_commutes(
        a in prop::collection::vec(-1e6f64..1e6, 6..100),
        b in prop::collection::vec(-1e6f64..1e6, 6..100),
    ) {
        let a = SampleSetDist::make(a).unwrap();
        let b = SampleSetDist::make(b).unwrap();
        let ab = a.map2(&b, |x, y| Ok(x + y)).unwrap();
        let ba = b.map2(&a, |x, y| Ok(x + y)).unwrap();
        prop_assert_eq!(ab, ba);
    }
}
