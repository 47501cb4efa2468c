//! JSON stands in for the host: documents become the values a script would pass.
//!
//! - `null`, booleans and strings map directly,
//! - integral numbers that fit `i64` become integers, everything else floats,
//! - arrays become tables; `null` elements are holes inside the array's length, and
//!   trailing `null`s shorten it,
//! - objects become tables with no positional part; a `"__tostring"` member becomes
//!   the table's render hook.

use anyhow::{Context, Result};
use rez::{Number, Table, Value};

pub const RENDER_KEY: &str = "__tostring";

/// Parses an input document. Empty or all-whitespace input means "no argument".
pub fn parse_input(bytes: &[u8]) -> Result<Option<Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let doc: serde_json::Value = serde_json::from_slice(bytes).context("parse input JSON")?;
    Ok(Some(value_from_json(&doc)))
}

pub fn value_from_json(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => Value::Number(number_from_json(n)),
        serde_json::Value::String(s) => Value::from(s.as_str()),
        serde_json::Value::Array(items) => {
            Table::from_values(items.iter().map(value_from_json)).into_value()
        }
        serde_json::Value::Object(map) => {
            let mut table = Table::new();
            if let Some(rendered) = map.get(RENDER_KEY) {
                table = table.with_render(value_from_json(rendered));
            }
            table.into_value()
        }
    }
}

fn number_from_json(n: &serde_json::Number) -> Number {
    match n.as_i64() {
        Some(i) => Number::Integer(i),
        None => Number::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}

/// Call arguments for an optional input value.
pub fn call_args(input: Option<Value>) -> Vec<Value> {
    input.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rez::stringify;

    fn parse(s: &str) -> Option<Value> {
        parse_input(s.as_bytes()).expect("parse")
    }

    #[test]
    fn empty_input_is_absent() {
        assert_eq!(parse(""), None);
        assert_eq!(parse(" \n\t"), None);
        assert_eq!(parse("null"), Some(Value::Nil));
    }

    #[test]
    fn scalars() {
        assert_eq!(parse("true"), Some(Value::from(true)));
        assert_eq!(parse("\"a<b\""), Some(Value::from("a<b")));
        assert_eq!(parse("42"), Some(Value::from(42)));
        assert_eq!(parse("-7"), Some(Value::from(-7)));
        assert_eq!(parse("2.5"), Some(Value::from(2.5)));
        assert_eq!(
            parse("18446744073709551615"),
            Some(Value::from(18446744073709551615u64 as f64))
        );
    }

    #[test]
    fn arrays_are_tables_with_holes() {
        let v = parse(r#"["a", null, "c"]"#).expect("value");
        let seq = v.as_sequence().expect("sequence");
        assert_eq!(seq.reported_len(), 3);
        assert_eq!(seq.element(2), None);
        assert_eq!(v.type_name(), "table");

        let v = parse(r#"["a", null, "c", null]"#).expect("value");
        assert_eq!(v.as_sequence().map(|s| s.reported_len()), Some(1));
    }

    #[test]
    fn objects_are_tables_with_optional_render_hook() {
        let v = parse(r#"{"__tostring": "<R>"}"#).expect("value");
        assert_eq!(stringify(&v), b"<R>");

        let v = parse(r#"{"a": 1}"#).expect("value");
        assert_eq!(v.as_sequence().map(|s| s.reported_len()), Some(0));
        let text = String::from_utf8(stringify(&v)).expect("utf8");
        assert!(text.starts_with("table: 0x"), "{text}");
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_input(b"[1,").unwrap_err();
        assert!(format!("{err:#}").contains("parse input JSON"));
    }

    #[test]
    fn call_args_from_optional_input() {
        assert!(call_args(None).is_empty());
        assert_eq!(call_args(Some(Value::Nil)), vec![Value::Nil]);
    }
}
