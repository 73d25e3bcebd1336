//! Text forms for JSON values written into CSV cells.
//!
//! Nested values are written in the Python literal style the reports have
//! always used (`['a', 'b']`, `{'k': 'v'}`), which the field normalizer
//! knows how to read back.

use serde_json::Value;

/// Python-literal rendering of any JSON value.
pub fn python_repr(value: &Value) -> String {
    let mut out = String::new();
    write_repr(value, &mut out);
    out
}

/// Cell text for a value: scalars as plain text, nested values via
/// [`python_repr`], null as `null_text`.
pub fn cell_text(value: &Value, null_text: &str) -> String {
    match value {
        Value::Null => null_text.to_string(),
        Value::String(s) => s.clone(),
        _ => python_repr(value),
    }
}

fn write_repr(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_str_repr(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_str_repr(key, out);
                out.push_str(": ");
                write_repr(item, out);
            }
            out.push('}');
        }
    }
}

fn write_str_repr(s: &str, out: &mut String) {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_and_dict_repr() {
        assert_eq!(python_repr(&json!(["a", "b"])), "['a', 'b']");
        assert_eq!(
            python_repr(&json!({"contractId": "C-1", "active": true, "parent": null})),
            "{'contractId': 'C-1', 'active': True, 'parent': None}"
        );
        assert_eq!(python_repr(&json!([])), "[]");
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(python_repr(&json!("it's")), "\"it's\"");
        assert_eq!(python_repr(&json!("say \"hi\" it's")), "'say \"hi\" it\\'s'");
    }

    #[test]
    fn test_cell_text_scalars() {
        assert_eq!(cell_text(&json!("X"), ""), "X");
        assert_eq!(cell_text(&json!(42), ""), "42");
        assert_eq!(cell_text(&json!(false), ""), "False");
        assert_eq!(cell_text(&Value::Null, "-"), "-");
        assert_eq!(cell_text(&json!({"timezoneValue": "GMT 0"}), ""), "{'timezoneValue': 'GMT 0'}");
    }
}
