//! Serde serialization/deserialization round-trip tests.
//!
//! These tests verify that the public model types can be serialized to JSON
//! and deserialized back, producing equal values.

#![cfg(feature = "serde")]

use lvfont_core::*;

/// Helper: serialize to JSON string, deserialize back, assert equality.
fn roundtrip<T>(value: &T)
where
    T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let json = serde_json::to_string(value).expect("serialize failed");
    let restored: T = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(*value, restored, "round-trip mismatch for JSON: {json}");
}

#[test]
fn test_serde_glyph_with_bitmap() {
    let bitmap = GlyphBitmap::from_samples(2, 2, Bpp::Four, vec![0, 5, 10, 15]).unwrap();
    roundtrip(&Glyph {
        unicode: 0x41,
        bitmap_index: 12,
        adv_w: 142,
        box_w: 2,
        box_h: 2,
        ofs_x: -1,
        ofs_y: 3,
        bitmap: Some(bitmap),
    });
}

#[test]
fn test_serde_cmap_ranges() {
    roundtrip(&CmapRange::tiny(32, 95, 1));
    roundtrip(&CmapRange {
        range_start: 0x41,
        range_length: 11,
        glyph_id_start: 100,
        list_length: 3,
        encoding: CmapEncoding::SparseFull {
            unicode_offsets: vec![0, 5, 10],
            glyph_offsets: vec![2, 3, 4],
        },
    });
}

#[test]
fn test_serde_metadata() {
    roundtrip(&FontMetadata {
        name: "lv_font_test_16".to_string(),
        kind: Some(FontKind::Binary),
        font_size: 16,
        line_height: 17,
        base_line: 3,
        bpp: 4,
        subpixel: SubpixelMode::Horizontal,
        compression: Compression::Unknown(9),
        underline_position: -1,
        underline_thickness: 1,
        kern_scale: 16,
        head: Some(HeadTable {
            ascent: 14,
            descent: -3,
            ..HeadTable::default()
        }),
    });
}

#[test]
fn test_serde_warning() {
    roundtrip(
        &DecodeWarning::with_code(DecodeWarningCode::OutOfBounds, "glyph data overruns glyf")
            .on("glyph 3"),
    );
    roundtrip(&DecodeWarning::with_code(
        DecodeWarningCode::Other("custom".to_string()),
        "custom",
    ));
}

#[test]
fn test_serde_model_drops_index() {
    let mut model = FontModel::with_kind(FontKind::Source);
    model.glyphs_mut().push(Glyph::default());
    model.glyphs_mut().push(Glyph {
        adv_w: 64,
        ..Glyph::default()
    });
    model.push_cmap_range(CmapRange::tiny(0x41, 1, 1));
    model.push_kern_pair(KernPair {
        left: 1,
        right: 1,
        value: -4,
    });
    model.set_glyph_bitmap(vec![0xAB, 0xCD]);

    let json = serde_json::to_string(&model).unwrap();
    let mut restored: FontModel = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, model);
    assert!(!restored.is_indexed());
    restored.build_index();
    assert_eq!(restored.glyph_id(0x41), Some(1));
}

#[test]
fn test_serde_bitmap_roundtrip_keeps_samples() {
    let bitmap = GlyphBitmap::from_samples(3, 1, Bpp::Two, vec![0, 2, 3]).unwrap();
    let json = serde_json::to_string(&bitmap).unwrap();
    let restored: GlyphBitmap = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.get(2, 0), Some(3));
    assert_eq!(restored.row(0), Some(&[0u8, 2, 3][..]));
}

#[test]
fn test_serde_bitmap_rejects_short_samples() {
    let json = r#"{"width":5,"height":5,"bpp":"Four","samples":[]}"#;
    let err = serde_json::from_str::<GlyphBitmap>(json).unwrap_err();
    assert!(err.to_string().contains("5x5"), "{err}");
}

#[test]
fn test_serde_bitmap_rejects_sample_above_depth() {
    let json = r#"{"width":2,"height":1,"bpp":"One","samples":[0,2]}"#;
    assert!(serde_json::from_str::<GlyphBitmap>(json).is_err());
}

#[test]
fn test_serde_glyph_with_inconsistent_bitmap_fails() {
    let json = r#"{"unicode":65,"bitmap_index":0,"adv_w":96,"box_w":2,"box_h":2,
        "ofs_x":0,"ofs_y":0,"bitmap":{"width":2,"height":2,"bpp":"Eight","samples":[1,2,3]}}"#;
    assert!(serde_json::from_str::<Glyph>(json).is_err());
}
