//! Game data loading against the shipped document and broken inputs

use std::path::Path;

use blockfall::core::{load_catalog, parse_catalog, ColorPair, ConfigError, NamedColor};
use blockfall::types::{ColorId, Point};

#[test]
fn shipped_data_loads() {
    let catalog = load_catalog(Path::new(env!("CARGO_MANIFEST_DIR")).join("data.json")).unwrap();
    let names: Vec<&str> = catalog.type_names().collect();
    assert_eq!(names, vec!["Tetrominoes", "Trominoes"]);

    let tetrominoes = catalog.piece_type("Tetrominoes").unwrap();
    assert_eq!(tetrominoes.len(), 7);
    assert!(tetrominoes.iter().all(|t| t.offsets().len() == 4));
    // Every piece spawns without blocks above the field.
    assert!(tetrominoes.iter().flat_map(|t| t.offsets()).all(|p| p.y >= 0));

    assert_eq!(
        catalog.color(ColorId(1)),
        Some(ColorPair {
            fg: NamedColor::Cyan,
            bg: NamedColor::Black,
        })
    );
}

#[test]
fn missing_file_reports_the_path() {
    let err = load_catalog("no/such/data.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("no/such/data.json"));
}

#[test]
fn unknown_color_name_is_a_parse_error() {
    let doc = r#"{"colors":[{"id":1,"fg":"orange","bg":"black"}],"types":[]}"#;
    assert!(matches!(parse_catalog(doc), Err(ConfigError::Parse(_))));
}

#[test]
fn structural_problems_are_invalid() {
    let cases = [
        r#"{"colors":[],"types":[]}"#,
        r#"{"colors":[],"types":[{"name":"A","polyominoes":[]}]}"#,
        r#"{"colors":[{"id":1,"fg":"red","bg":"black"}],"types":[{"name":"A","polyominoes":[{"color":1,"blocks":[]}]}]}"#,
        r#"{"colors":[{"id":1,"fg":"red","bg":"black"}],"types":[{"name":"A","polyominoes":[{"color":1,"blocks":[[0,0],[0,0]]}]}]}"#,
        r#"{"colors":[{"id":1,"fg":"red","bg":"black"}],"types":[{"name":"A","polyominoes":[{"color":2,"blocks":[[0,0]]}]}]}"#,
        r#"{"colors":[{"id":1,"fg":"red","bg":"black"},{"id":1,"fg":"blue","bg":"black"}],"types":[{"name":"A","polyominoes":[{"color":1,"blocks":[[0,0]]}]}]}"#,
        r#"{"colors":[{"id":1,"fg":"red","bg":"black"}],"types":[{"name":"A","polyominoes":[{"color":1,"blocks":[[0,0]]}]},{"name":"A","polyominoes":[{"color":1,"blocks":[[0,0]]}]}]}"#,
        r#"{"colors":[{"id":1,"fg":"red","bg":"black"}],"types":[{"name":"A","polyominoes":[{"color":1,"blocks":[[2147483647,0]]}]}]}"#,
        r#"{"colors":[{"id":1,"fg":"red","bg":"black"}],"types":[{"name":"A","polyominoes":[{"color":1,"blocks":[[0,-2147483648]]}]}]}"#,
    ];
    for doc in cases {
        match parse_catalog(doc) {
            Err(ConfigError::Invalid(reason)) => assert!(!reason.is_empty()),
            other => panic!("expected invalid for {doc}: {other:?}"),
        }
    }
}

#[test]
fn block_offsets_keep_their_order() {
    let doc = r#"{"colors":[{"id":3,"fg":"green","bg":"black"}],
        "types":[{"name":"S","polyominoes":[{"color":3,"blocks":[[0,0],[1,0],[-1,1],[0,1]]}]}]}"#;
    let catalog = parse_catalog(doc).unwrap();
    let s = &catalog.piece_type("S").unwrap()[0];
    assert_eq!(s.color(), ColorId(3));
    assert_eq!(
        s.offsets(),
        &[Point::new(0, 0), Point::new(1, 0), Point::new(-1, 1), Point::new(0, 1)]
    );
}
