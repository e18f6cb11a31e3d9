use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sq_dist::Env;
use sq_eval::Reducer;
use sq_value::{ValueMap, ValueTags};

fn evaluate(source: &str, registry: &Registry) -> Value {
    let ast = sq_parse::parse(source, "main").unwrap();
    let expression = sq_compile::compile(&ast, registry, &[]).unwrap();
    Reducer::new(Env::default().with_sample_count(100), registry)
        .evaluate_program(&expression, &Value::void())
        .unwrap()
        .result
}

fn round_trip(value: &Value, registry: &Registry) -> Value {
    let (bundle, entrypoint) = serialize_value(value);
    let bytes = bundle.to_bytes().unwrap();
    let decoded = Bundle::from_bytes(&bytes).unwrap();
    deserialize_value(&decoded, entrypoint, registry).unwrap()
}

#[test]
fn test_round_trip_program_values() {
    let registry = Registry::standard();
    for source in [
        "5",
        "\"hello\"",
        "[1, true, \"x\", {a: [2, 3]}]",
        "normal(5, 2)",
        "SampleSet.fromDist(normal(0, 1))",
        "Date.make(2024, 2, 29)",
        "3days",
        "Number.rangeDomain(0, 10)",
        "Plot.dist(normal(0, 1), {xScale: Scale.log()})",
        "Input.select({name: \"s\", options: [\"a\", \"b\"]})",
    ] {
        let value = evaluate(source, &registry);
        assert_eq!(round_trip(&value, &registry), value, "source: {source}");
    }
}

#[test]
fn test_round_trip_keeps_tags() {
    let registry = Registry::standard();
    let value = evaluate("@name(\"Cost\")\n@hide\nx = 5\nx", &registry);
    let back = round_trip(&value, &registry);
    assert_eq!(back, value);
    assert_eq!(back.tags().unwrap().name.as_deref(), Some("Cost"));
    assert_eq!(back.tags().unwrap().hidden, Some(true));
}

#[test]
fn test_round_trip_lambdas() {
    let registry = Registry::standard();
    let value = evaluate("k = 3\nf(x: [0, 10]) = x * k\nf", &registry);
    let back = round_trip(&value, &registry);
    assert_eq!(back, value);

    let builtin = evaluate("normal", &registry);
    assert_eq!(round_trip(&builtin, &registry), builtin);
}

#[test]
fn test_shared_values_are_written_once() {
    let inner = Value::array(vec![Value::number(1.0), Value::number(2.0)]);
    let outer = Value::array(vec![inner.clone(), inner.clone(), inner]);
    let (bundle, entrypoint) = serialize_value(&outer);
    // Two numbers, one shared inner list, the outer list.
    assert_eq!(bundle.values.len(), 4);

    let registry = Registry::new();
    let back = deserialize_value(&bundle, entrypoint, &registry).unwrap();
    let items = back.as_array().unwrap();
    assert_eq!(items[0].heap_address(), items[1].heap_address());
}

#[test]
fn test_differently_tagged_copies_stay_distinct() {
    let base = Value::string("x");
    let tagged = base.with_tags(&ValueTags {
        name: Some("named".to_string()),
        ..ValueTags::default()
    });
    let pair = Value::array(vec![base, tagged]);
    let registry = Registry::new();
    let (bundle, entrypoint) = serialize_value(&pair);
    assert_eq!(bundle.values.len(), 3);
    assert_eq!(deserialize_value(&bundle, entrypoint, &registry).unwrap(), pair);
}

#[test]
fn test_identical_bodies_are_deduplicated() {
    let registry = Registry::standard();
    let value = evaluate("make(n) = {|x| x + n}\n[make(1), make(2)]", &registry);
    let (bundle, entrypoint) = serialize_value(&value);
    assert_eq!(bundle.lambdas.len(), 2);
    assert_eq!(bundle.expressions.len(), 1);
    assert_eq!(deserialize_value(&bundle, entrypoint, &registry).unwrap(), value);
}

#[test]
fn test_unknown_builtin_is_an_error() {
    let registry = Registry::standard();
    let value = evaluate("normal", &registry);
    let (bundle, entrypoint) = serialize_value(&value);
    let err = deserialize_value(&bundle, entrypoint, &Registry::new()).unwrap_err();
    assert_eq!(err, SerializationError::UnknownBuiltin("normal".to_string()));
}

#[test]
fn test_bad_references_are_errors() {
    let registry = Registry::new();
    let bundle = Bundle {
        values: vec![SerializedValueEntry {
            value: SerializedValue::Array(vec![7]),
            tags: None,
        }],
        ..Bundle::default()
    };
    let entrypoint = Entrypoint {
        kind: EntityKind::Value,
        pos: 0,
    };
    assert_eq!(
        deserialize_value(&bundle, entrypoint, &registry).unwrap_err(),
        SerializationError::OutOfBounds {
            kind: EntityKind::Value,
            index: 7,
            len: 1
        }
    );

    let cyclic = Bundle {
        values: vec![SerializedValueEntry {
            value: SerializedValue::Array(vec![0]),
            tags: None,
        }],
        ..Bundle::default()
    };
    assert!(matches!(
        deserialize_value(&cyclic, entrypoint, &registry),
        Err(SerializationError::Decode(_))
    ));

    let wrong_kind = Entrypoint {
        kind: EntityKind::Lambda,
        pos: 0,
    };
    assert_eq!(
        deserialize_value(&cyclic, wrong_kind, &registry).unwrap_err(),
        SerializationError::TypeMismatch { expected: "value" }
    );
}

#[test]
fn test_garbage_bytes_fail_to_decode() {
    assert!(matches!(
        Bundle::from_bytes(&[0xff, 0x01]),
        Err(SerializationError::Decode(_))
    ));
}

#[test]
fn test_expressions_round_trip() {
    let registry = Registry::standard();
    let ast = sq_parse::parse("f(x) = x * 2\nf(3)", "main").unwrap();
    let expression = sq_compile::compile(&ast, &registry, &[]).unwrap();
    let mut serializer = Serializer::new();
    let entrypoint = serializer.expression(&expression);
    let bundle = Bundle::from_bytes(&serializer.finish().to_bytes().unwrap()).unwrap();
    let back = Deserializer::new(&bundle, &registry)
        .expression_at(entrypoint)
        .unwrap();
    assert_eq!(back, expression);
}

#[test]
fn test_json_dump_mentions_entries() {
    let mut map = ValueMap::new();
    map.insert("answer".to_string(), Value::number(42.0));
    let (bundle, _) = serialize_value(&Value::dict(map));
    let json = bundle.to_json().unwrap();
    assert!(json.contains("answer"));
    assert!(json.contains("42"));
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::void()),
        (-1e9f64..1e9).prop_map(Value::number),
        any::<bool>().prop_map(Value::bool),
        "[a-z]{0,8}".prop_map(Value::string),
        (0f64..4e12).prop_map(Value::date),
    ]
}

fn value_tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..4).prop_map(|pairs| {
                Value::dict(pairs.into_iter().collect())
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_round_trip(value in value_tree()) {
        let registry = Registry::new();
        let back = round_trip(&value, &registry);
        prop_assert!(back == value);
    }
}
