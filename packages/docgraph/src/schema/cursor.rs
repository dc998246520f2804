//! Opaque page-boundary tokens: base64 of the JSON array `[sortKeyValue]`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;

pub type Cursor = String;

pub type CursorResult<T> = Result<T, CursorError>;

#[derive(thiserror::Error, Debug)]
pub enum CursorError {
    #[error("Cursor is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("Cursor does not hold a JSON value: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cursor must hold a one-element array")]
    Shape,
}

pub fn encode_cursor(value: &Value) -> Cursor {
    let json = Value::Array(vec![value.clone()]).to_string();
    STANDARD.encode(json.as_bytes())
}

pub fn decode_cursor(cursor: &str) -> CursorResult<Value> {
    let bytes = STANDARD.decode(cursor.trim())?;
    match serde_json::from_slice::<Value>(&bytes)? {
        Value::Array(mut values) if !values.is_empty() => Ok(values.swap_remove(0)),
        _ => Err(CursorError::Shape),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use insta::assert_snapshot;
    use serde_json::json;

    #[test]
    fn test_cursor_format_is_stable() {
        assert_snapshot!(encode_cursor(&json!("a")), @"WyJhIl0=");
    }

    #[test]
    fn test_decode_inverts_encode() {
        for value in [
            json!("2023-01-02 10:11:12.000000"),
            json!(42),
            json!(-3.5),
            json!(null),
            json!("Ünïcödé"),
        ] {
            assert_eq!(decode_cursor(&encode_cursor(&value)).unwrap(), value);
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_matches!(decode_cursor("%%%"), Err(CursorError::Encoding(_)));
        assert_matches!(
            decode_cursor(&STANDARD.encode("not json")),
            Err(CursorError::Json(_))
        );
        assert_matches!(decode_cursor(&STANDARD.encode("[]")), Err(CursorError::Shape));
    }
}
