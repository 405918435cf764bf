use cd_json::{
    composite, from_str, parse, to_string, to_string_pretty, to_string_with_options, BoolStyle,
    CodecOptions, Error, Node, TypeRegistry,
};

#[derive(Debug, Default, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

composite! {
    Point => "Point" { x: i32, y: i32 }
}

#[derive(Debug, Default, PartialEq)]
struct Wrapper {
    label: String,
    points: Vec<Option<Box<Point>>>,
}

composite! {
    Wrapper => "Wrapper" { label: String, points: Vec<Option<Box<Point>>> }
}

#[derive(Debug, Default, PartialEq)]
struct Sample {
    s: Option<String>,
    flag: bool,
    ratio: f64,
    counts: Option<Vec<i64>>,
}

composite! {
    Sample => "Sample" { s: Option<String>, flag: bool, ratio: f64, counts: Option<Vec<i64>> }
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<Point>().unwrap();
    registry.register::<Wrapper>().unwrap();
    registry.register::<Sample>().unwrap();
    registry
}

fn wrapper() -> Wrapper {
    Wrapper {
        label: "a".to_string(),
        points: vec![Some(Box::new(Point { x: 1, y: 2 })), None],
    }
}

#[test]
fn test_type_tag_comes_first() {
    let text = to_string(&Point { x: 3, y: 4 }).unwrap();
    assert!(text.starts_with(r#"{"cd_json_type":"Point""#));
}

#[test]
fn test_wrapper_wire_format() {
    assert_eq!(
        to_string(&wrapper()).unwrap(),
        r#"{"cd_json_type":"Wrapper","label":"a","points":[{"cd_json_type":"Point","x":1,"y":2},null]}"#
    );
}

#[test]
fn test_null_leaf_and_absent_collection() {
    let text = to_string(&Sample::default()).unwrap();
    assert_eq!(
        text,
        r#"{"cd_json_type":"Sample","s":null,"flag":false,"ratio":0.0,"counts":null}"#
    );
}

#[test]
fn test_output_is_valid_json() {
    let sample = Sample {
        s: Some("tab\there \"quoted\" back\\slash \u{1}".to_string()),
        flag: true,
        ratio: 2.5e-8,
        counts: Some(vec![i64::MIN, 0, i64::MAX]),
    };
    for text in [to_string(&sample).unwrap(), to_string_pretty(&wrapper()).unwrap()] {
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(json.get("cd_json_type").is_some());
    }

    let json: serde_json::Value = serde_json::from_str(&to_string(&sample).unwrap()).unwrap();
    assert_eq!(json["s"], serde_json::json!(sample.s.as_deref().unwrap()));
    assert_eq!(json["counts"][0], serde_json::json!(i64::MIN));
}

#[test]
fn test_reads_serde_json_output() {
    let json = serde_json::json!({
        "cd_json_type": "Wrapper",
        "label": "from \"serde\" / json",
        "points": [{"cd_json_type": "Point", "x": -3, "y": 8}, null]
    });
    let compact: Wrapper = from_str(&registry(), &serde_json::to_string(&json).unwrap()).unwrap();
    let pretty: Wrapper = from_str(&registry(), &serde_json::to_string_pretty(&json).unwrap()).unwrap();
    assert_eq!(compact, pretty);
    assert_eq!(compact.label, "from \"serde\" / json");
    assert_eq!(compact.points[0].as_deref(), Some(&Point { x: -3, y: 8 }));
}

#[test]
fn test_pretty_format() {
    let text = to_string_pretty(&Point { x: 1, y: 2 }).unwrap();
    assert_eq!(text, "{\n  \"cd_json_type\": \"Point\",\n  \"x\": 1,\n  \"y\": 2\n}");

    let text = to_string_with_options(&Point { x: 1, y: 2 }, CodecOptions::pretty().with_indent(4)).unwrap();
    assert_eq!(text, "{\n    \"cd_json_type\": \"Point\",\n    \"x\": 1,\n    \"y\": 2\n}");
}

#[test]
fn test_empty_collection_in_pretty_output() {
    let text = to_string_pretty(&Wrapper::default()).unwrap();
    assert!(text.contains("\"points\": []"));
}

#[test]
fn test_boolean_styles() {
    let sample = Sample {
        flag: true,
        ..Sample::default()
    };
    let literal = to_string(&sample).unwrap();
    assert!(literal.contains(r#""flag":true"#));

    let sentinel = to_string_with_options(&sample, CodecOptions::new().with_bool_style(BoolStyle::Sentinel)).unwrap();
    assert!(sentinel.contains(r#""flag":"TRUE""#));

    for text in [literal, sentinel] {
        assert!(from_str::<Sample>(&registry(), &text).unwrap().flag);
    }
    let lower = r#"{"cd_json_type":"Sample","flag":"true"}"#;
    assert!(from_str::<Sample>(&registry(), lower).unwrap().flag);
}

#[test]
fn test_non_finite_floats() {
    for (value, encoded) in [
        (f64::INFINITY, r#""ratio":"Infinity""#),
        (f64::NEG_INFINITY, r#""ratio":"-Infinity""#),
        (f64::NAN, r#""ratio":"NaN""#),
    ] {
        let sample = Sample {
            ratio: value,
            ..Sample::default()
        };
        let text = to_string(&sample).unwrap();
        assert!(text.contains(encoded), "{text}");
        let back: Sample = from_str(&registry(), &text).unwrap();
        assert!(back.ratio == value || (back.ratio.is_nan() && value.is_nan()));
    }
}

#[test]
fn test_integers_read_into_float_fields() {
    let back: Sample = from_str(&registry(), r#"{"cd_json_type":"Sample","ratio":3}"#).unwrap();
    assert_eq!(back.ratio, 3.0);
    let back: Point = from_str(&registry(), r#"{"cd_json_type":"Point","x":4.0}"#).unwrap();
    assert_eq!(back.x, 4);
}

#[test]
fn test_parse_node_tree() {
    let node = parse(r#"{"cd_json_type":"Point","x":1,"extra":{"inner":[true,null,"s"]}}"#).unwrap();
    let object = node.as_object().unwrap();
    assert_eq!(object.type_tag(), Some("Point"));
    let extra = object.get("extra").and_then(Node::as_object).unwrap();
    assert_eq!(extra.type_tag(), None);
    assert_eq!(
        extra.get("inner"),
        Some(&Node::Array(vec![Node::Bool(true), Node::Null, Node::Str("s".into())]))
    );
}

#[test]
fn test_malformed_inputs() {
    let cases = [
        r#"{"cd_json_type":"Point","x":1"#,
        r#"{"cd_json_type":"Point","x":1]"#,
        r#"{"cd_json_type":"Point" "x":1}"#,
        r#"{"cd_json_type":"Point","x":}"#,
        r#"{"cd_json_type":"Point","x":1,}"#,
        r#"{"cd_json_type":"Point","x":"1}"#,
        r#"{"cd_json_type":"Point"}{"#,
        r#"{x:1}"#,
        "",
    ];
    for text in cases {
        match from_str::<Point>(&registry(), text) {
            Err(Error::Format { .. }) => {}
            other => panic!("{text:?} gave {other:?}"),
        }
    }
}

#[test]
fn test_arrays_of_arrays_rejected() {
    let err = parse(r#"{"cd_json_type":"Sample","counts":[[1,2],[3]]}"#).unwrap_err();
    assert!(matches!(err, Error::UnsupportedShape(_)));
}
