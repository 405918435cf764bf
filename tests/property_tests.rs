//! Property-based tests - round trips of generated object graphs
//!
//! These complement the integration tests by checking that whatever the serializer
//! writes, the reader reconstructs into an equal graph.

use cd_json::{
    composite, from_str, parse, to_string, to_string_with_options, BoolStyle, CodecOptions,
    TypeRegistry,
};
use proptest::prelude::*;

#[derive(Debug, Default, Clone, PartialEq)]
struct Cell {
    label: String,
    weight: f64,
    enabled: bool,
}

composite! {
    Cell => "prop.Cell" { label: String, weight: f64, enabled: bool }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Grid {
    id: i64,
    small: i16,
    unsigned: u32,
    title: Option<String>,
    cells: Vec<Cell>,
    holes: Vec<Option<Box<Cell>>>,
    scores: Option<Vec<f64>>,
}

composite! {
    Grid => "prop.Grid" {
        id: i64,
        small: i16,
        unsigned: u32,
        title: Option<String>,
        cells: Vec<Cell>,
        holes: Vec<Option<Box<Cell>>>,
        scores: Option<Vec<f64>>,
    }
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register::<Cell>().unwrap();
    registry.register::<Grid>().unwrap();
    registry
}

fn finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |f| f.is_finite())
}

fn cell() -> impl Strategy<Value = Cell> {
    (any::<String>(), finite(), any::<bool>()).prop_map(|(label, weight, enabled)| Cell {
        label,
        weight,
        enabled,
    })
}

fn grid() -> impl Strategy<Value = Grid> {
    (
        any::<i64>(),
        any::<i16>(),
        any::<u32>(),
        proptest::option::of(any::<String>()),
        prop::collection::vec(cell(), 0..6),
        prop::collection::vec(proptest::option::of(cell().prop_map(Box::new)), 0..4),
        proptest::option::of(prop::collection::vec(finite(), 0..8)),
    )
        .prop_map(|(id, small, unsigned, title, cells, holes, scores)| Grid {
            id,
            small,
            unsigned,
            title,
            cells,
            holes,
            scores,
        })
}

fn options() -> impl Strategy<Value = CodecOptions> {
    (any::<bool>(), 1usize..5, any::<bool>()).prop_map(|(pretty, indent, sentinel)| {
        let options = if pretty { CodecOptions::pretty() } else { CodecOptions::new() };
        let style = if sentinel { BoolStyle::Sentinel } else { BoolStyle::Literal };
        options.with_indent(indent).with_bool_style(style)
    })
}

proptest! {
    #[test]
    fn prop_cell_roundtrip(value in cell()) {
        let text = to_string(&value).unwrap();
        let back: Cell = from_str(&registry(), &text).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_grid_roundtrip_any_options(value in grid(), options in options()) {
        let text = to_string_with_options(&value, options).unwrap();
        let back: Grid = from_str(&registry(), &text).unwrap();
        prop_assert_eq!(back, value);
    }

    #[test]
    fn prop_pretty_and_compact_parse_alike(value in grid()) {
        let compact = parse(&to_string(&value).unwrap()).unwrap();
        let pretty = parse(&to_string_with_options(&value, CodecOptions::pretty()).unwrap()).unwrap();
        prop_assert_eq!(compact, pretty);
    }

    #[test]
    fn prop_output_is_json(value in grid()) {
        let text = to_string(&value).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        prop_assert_eq!(json["cd_json_type"].as_str(), Some("prop.Grid"));
        prop_assert_eq!(json["id"].as_i64(), Some(value.id));
    }

    #[test]
    fn prop_nan_weight(label in any::<String>()) {
        let value = Cell { label, weight: f64::NAN, enabled: true };
        let back: Cell = from_str(&registry(), &to_string(&value).unwrap()).unwrap();
        prop_assert!(back.weight.is_nan());
        prop_assert_eq!(back.label, value.label);
    }

    #[test]
    fn prop_garbage_never_panics(text in "\\PC{0,40}") {
        let _ = parse(&text);
        let _ = from_str::<Grid>(&registry(), &text);
    }
}
