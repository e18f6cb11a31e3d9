use super::*;
use crate::{Domain, ValueTags};
use pretty_assertions::assert_eq;
use sq_dist::SymbolicDist;

fn numbers(xs: &[f64]) -> Value {
    Value::array(xs.iter().copied().map(Value::number).collect())
}

#[test]
fn test_display_scalars() {
    assert_eq!(Value::void().to_string(), "()");
    assert_eq!(Value::number(3.0).to_string(), "3");
    assert_eq!(Value::number(0.5).to_string(), "0.5");
    assert_eq!(Value::bool(true).to_string(), "true");
    assert_eq!(Value::string("hi").to_string(), "'hi'");
}

#[test]
fn test_display_containers() {
    assert_eq!(numbers(&[1.0, 2.0]).to_string(), "[1, 2]");
    let mut map = ValueMap::new();
    map.insert("b".to_string(), Value::number(1.0));
    map.insert("a".to_string(), Value::string("x"));
    assert_eq!(Value::dict(map).to_string(), "{b: 1, a: 'x'}");
}

#[test]
fn test_display_dates_and_durations() {
    assert_eq!(Value::date(0.0).to_string(), "Thu Jan 01 1970");
    assert_eq!(Value::date(f64::NAN).to_string(), "Invalid Date");
    assert_eq!(Value::duration(3.0 * MS_PER_DAY).to_string(), "3 days");
    assert_eq!(Value::duration(90.0 * MS_PER_MINUTE).to_string(), "1.5 hours");
    assert_eq!(Value::duration(250.0).to_string(), "250 ms");
}

#[test]
fn test_display_dist() {
    let value = Value::dist(SymbolicDist::normal(1.0, 2.0).unwrap());
    assert_eq!(value.to_string(), "Normal(1,2)");
    assert_eq!(value.type_name(), "Dist");
}

#[test]
fn test_is_equal_ignores_tags() {
    let tags = ValueTags {
        name: Some("x".to_string()),
        ..ValueTags::default()
    };
    let plain = Value::number(1.0);
    let tagged = plain.with_tags(&tags);
    assert!(plain.is_equal(&tagged));
    assert_ne!(plain, tagged);
    assert_eq!(tagged.tags().and_then(|t| t.name.as_deref()), Some("x"));
}

#[test]
fn test_is_equal_structural() {
    assert!(numbers(&[1.0, 2.0]).is_equal(&numbers(&[1.0, 2.0])));
    assert!(!numbers(&[1.0, 2.0]).is_equal(&numbers(&[2.0, 1.0])));
    assert!(!Value::number(1.0).is_equal(&Value::string("1")));

    let mut a = ValueMap::new();
    a.insert("x".to_string(), Value::number(1.0));
    a.insert("y".to_string(), Value::number(2.0));
    let mut b = ValueMap::new();
    b.insert("y".to_string(), Value::number(2.0));
    b.insert("x".to_string(), Value::number(1.0));
    assert!(Value::dict(a).is_equal(&Value::dict(b)));
}

#[test]
fn test_with_tags_merges() {
    let first = ValueTags {
        name: Some("a".to_string()),
        doc: Some("docs".to_string()),
        ..ValueTags::default()
    };
    let second = ValueTags {
        name: Some("b".to_string()),
        ..ValueTags::default()
    };
    let value = Value::number(1.0).with_tags(&first).with_tags(&second);
    let tags = value.tags().unwrap();
    assert_eq!(tags.name.as_deref(), Some("b"));
    assert_eq!(tags.doc.as_deref(), Some("docs"));
    assert!(Value::number(1.0)
        .replace_tags(ValueTags::default())
        .tags()
        .is_none());
}

#[test]
fn test_heap_address_shared_by_clones() {
    let value = Value::string("shared");
    let copy = value.clone();
    assert_eq!(value.heap_address(), copy.heap_address());
    assert_eq!(Value::number(1.0).heap_address(), None);
}

#[test]
fn test_domain_from_annotation() {
    let domain = Domain::from_annotation(&numbers(&[0.0, 10.0])).unwrap();
    assert_eq!(domain.to_string(), "Number.rangeDomain(0, 10)");
    assert!(domain.contains(&Value::number(5.0)));
    assert!(!domain.contains(&Value::number(11.0)));
    assert!(Domain::from_annotation(&numbers(&[10.0, 0.0])).is_err());
    assert!(Domain::from_annotation(&Value::string("x")).is_err());

    let err = domain.validate("x", &Value::number(11.0)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Parameter x must be in domain Number.rangeDomain(0, 10), got 11"
    );
}
