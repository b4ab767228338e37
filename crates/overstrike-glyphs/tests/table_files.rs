use overstrike_glyphs::{GlyphGeometry, GlyphKey, GlyphLibrary, GlyphTableError, KeyFilter};
use serde_json::json;
use std::fs;

fn block(value: f32) -> serde_json::Value {
    let geometry = GlyphGeometry::default();
    let hist = vec![value; geometry.bins];
    let row = vec![hist; geometry.cols];
    json!(vec![row; geometry.rows])
}

#[test]
fn pair_table_loads_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pairs.json");
    let table = json!({
        "  ": block(0.0),
        "/\\": block(0.3),
        "X-": block(0.6),
        "O ": block(0.4),
    });
    fs::write(&path, table.to_string()).expect("write");

    let lib = GlyphLibrary::load_json(&path, GlyphGeometry::default()).expect("load");
    assert_eq!(lib.len(), 4);
    assert!(lib.has_pairs());
    let glyph = lib.lookup(&GlyphKey::Pair('X', '-')).expect("X-");
    assert!((glyph.mean_luminance - 0.6).abs() < 1e-6);

    let filter = KeyFilter {
        left: Some("X".into()),
        right: None,
    };
    let keys: Vec<String> = lib
        .keys_matching(&filter)
        .iter()
        .map(|k| k.to_string())
        .collect();
    assert_eq!(keys, vec!["  ".to_string(), "X-".to_string()]);
}

#[test]
fn wrong_geometry_names_the_glyph() {
    let table = json!({ "#": block(0.5) });
    let narrow = GlyphGeometry {
        cols: 2,
        ..GlyphGeometry::default()
    };
    let err = GlyphLibrary::from_json_str(&table.to_string(), narrow).unwrap_err();
    match err {
        GlyphTableError::Shape {
            key,
            axis,
            expected,
            got,
        } => {
            assert_eq!(key, "#");
            assert_eq!(axis, "columns");
            assert_eq!((expected, got), (2, 3));
        }
        other => panic!("unexpected error: {other}"),
    }
}
