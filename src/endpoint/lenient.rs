// Serde helpers for catalog payloads that are inconsistent about scalar types.
//
// Use with `#[serde(deserialize_with = "...")]`.

use serde::de::{Deserializer, Error};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FloatOrString {
    Float(f64),
    Str(String),
}

/// Integer, also accepted as a numeric string (`"42"`).
pub fn int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n),
        IntOrString::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| D::Error::custom(format!("expected integer, got {:?}", s))),
    }
}

/// Float, also accepted as a numeric string (`"240.5"`).
pub fn float_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match FloatOrString::deserialize(deserializer)? {
        FloatOrString::Float(n) => Ok(n),
        FloatOrString::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| D::Error::custom(format!("expected number, got {:?}", s))),
    }
}

/// String, also accepted as an integer rendered in decimal.
pub fn string_or_int<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(n) => Ok(n.to_string()),
        IntOrString::Str(s) => Ok(s),
    }
}

/// Boolean transmitted as an integer: odd is `true`, even is `false`.
pub fn bool_from_parity<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let n = int_or_string(deserializer)?;
    Ok(n.rem_euclid(2) == 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "int_or_string")]
        count: i64,
        #[serde(deserialize_with = "float_or_string")]
        width: f64,
        #[serde(deserialize_with = "string_or_int")]
        name: String,
        #[serde(deserialize_with = "bool_from_parity")]
        flag: bool,
    }

    fn probe(value: serde_json::Value) -> Result<Probe, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn test_native_types_decode() {
        let p = probe(json!({"count": 3, "width": 1.5, "name": "abc", "flag": 1})).unwrap();
        assert_eq!(p.count, 3);
        assert_eq!(p.width, 1.5);
        assert_eq!(p.name, "abc");
        assert!(p.flag);
    }

    #[test]
    fn test_string_encoded_numbers_decode() {
        let p = probe(json!({"count": "17", "width": "240", "name": 65535, "flag": 0})).unwrap();
        assert_eq!(p.count, 17);
        assert_eq!(p.width, 240.0);
        assert_eq!(p.name, "65535");
        assert!(!p.flag);
    }

    #[test]
    fn test_parity_booleans() {
        for (raw, expected) in [(2, false), (3, true), (10, false), (-1, true), (-4, false)] {
            let p = probe(json!({"count": 0, "width": 0, "name": "", "flag": raw})).unwrap();
            assert_eq!(p.flag, expected, "flag {}", raw);
        }
    }

    #[test]
    fn test_non_numeric_string_rejected() {
        assert!(probe(json!({"count": "many", "width": 0, "name": "", "flag": 0})).is_err());
        assert!(probe(json!({"count": 0, "width": "wide", "name": "", "flag": 0})).is_err());
        assert!(probe(json!({"count": 0, "width": 0, "name": true, "flag": 0})).is_err());
    }
}
