//! Forgiving field readers for editor JSON.
//!
//! Saved documents come from a browser editor and from older plugin versions, so
//! field types drift: levels arrive as strings, captions as numbers, list items
//! as bare strings. These helpers coerce instead of rejecting the whole document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Stringify a JSON scalar. Null, arrays and objects become empty.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(value_to_string(&other)),
    })
}

/// Header level. Numeric strings are read like `parseInt`; anything else is 1.
pub fn level<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(level_from_value(&value))
}

fn level_from_value(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(1),
        Value::String(s) => {
            let trimmed = s.trim_start();
            let sign_len = usize::from(trimmed.starts_with('-') || trimmed.starts_with('+'));
            let digits = trimmed[sign_len..]
                .chars()
                .take_while(char::is_ascii_digit)
                .count();
            trimmed[..sign_len + digits].parse().unwrap_or(1)
        }
        _ => 1,
    }
}

/// JavaScript-style truthiness, used for `checked` flags.
pub fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(is_truthy(&value))
}

pub fn opt_truthy<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(is_truthy(&other)),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Table grid. Rows that are not arrays are dropped, cells are stringified.
pub fn rows<'de, D>(deserializer: D) -> Result<Vec<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(rows) = value else {
        return Ok(Vec::new());
    };
    Ok(rows
        .iter()
        .filter_map(|row| match row {
            Value::Array(cells) => Some(cells.iter().map(value_to_string).collect()),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn levels_follow_parse_int() {
        assert_eq!(level_from_value(&json!(3)), 3);
        assert_eq!(level_from_value(&json!("2")), 2);
        assert_eq!(level_from_value(&json!("4px")), 4);
        assert_eq!(level_from_value(&json!(2.9)), 2);
        assert_eq!(level_from_value(&json!("abc")), 1);
        assert_eq!(level_from_value(&json!(null)), 1);
    }

    #[test]
    fn scalars_stringify() {
        assert_eq!(value_to_string(&json!(42)), "42");
        assert_eq!(value_to_string(&json!(true)), "true");
        assert_eq!(value_to_string(&json!(null)), "");
        assert_eq!(value_to_string(&json!({"a": 1})), "");
    }
}
