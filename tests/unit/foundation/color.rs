use super::*;
use serde_json::json;

#[test]
fn parses_hex_rgb_and_rgba() {
    let c: Color = serde_json::from_value(json!("#ff00ff")).unwrap();
    assert_eq!(c, Color::rgb(255, 0, 255));

    let c: Color = serde_json::from_value(json!("#0000FF80")).unwrap();
    assert_eq!(c, Color::rgba(0, 0, 255, 128));

    assert!(serde_json::from_value::<Color>(json!("#fff")).is_err());
    assert!(serde_json::from_value::<Color>(json!("#gg0000")).is_err());
}

#[test]
fn parses_channel_object_with_unit_alpha() {
    let c: Color =
        serde_json::from_value(json!({"red": 255, "green": 165, "blue": 0})).unwrap();
    assert_eq!(c, Color::rgb(255, 165, 0));

    let c: Color =
        serde_json::from_value(json!({"red": 1, "green": 2, "blue": 3, "alpha": 0.5})).unwrap();
    assert_eq!(c.a, 128);
}

#[test]
fn parses_byte_arrays() {
    let c: Color = serde_json::from_value(json!([1, 2, 3])).unwrap();
    assert_eq!(c, Color::rgb(1, 2, 3));
    let c: Color = serde_json::from_value(json!([1, 2, 3, 4])).unwrap();
    assert_eq!(c, Color::rgba(1, 2, 3, 4));
    assert!(serde_json::from_value::<Color>(json!([1, 2])).is_err());
}

#[test]
fn serializes_as_hex_and_reads_back() {
    let c = Color::rgba(0x12, 0xab, 0x00, 0x7f);
    let v = serde_json::to_value(c).unwrap();
    assert_eq!(v, json!("#12ab007f"));
    let back: Color = serde_json::from_value(v).unwrap();
    assert_eq!(back, c);
}
