//! Tagged attribute values, the `{"S": ..}` / `{"N": ..}` / `{"M": ..}` wire
//! shape exported template records use.
//!
//! Decoding happens in two steps. [`AttributeValue::from_json`] picks the tag
//! (precedence `S`, `N`, `BOOL`, `NULL`, `L`, `M`; a tag whose payload has the
//! wrong JSON type is skipped). [`AttributeValue::to_native`] then resolves it to a
//! [`Native`] value. Neither step can fail.

use serde_json::Value;

/// One tagged value as it appears on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    S(String),
    /// Numbers travel as strings and are parsed on unwrap.
    N(String),
    Bool(bool),
    Null,
    L(Vec<AttributeValue>),
    M(Vec<(String, AttributeValue)>),
    /// No recognized tag.
    Untagged,
}

/// Resolved, untagged value.
#[derive(Debug, Clone, PartialEq)]
pub enum Native {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Native>),
    Map(Vec<(String, Native)>),
}

fn decode_s(payload: &Value) -> Option<AttributeValue> {
    payload.as_str().map(|s| AttributeValue::S(s.to_string()))
}

fn decode_n(payload: &Value) -> Option<AttributeValue> {
    match payload {
        Value::String(s) => Some(AttributeValue::N(s.clone())),
        Value::Number(n) => Some(AttributeValue::N(n.to_string())),
        _ => None,
    }
}

fn decode_bool(payload: &Value) -> Option<AttributeValue> {
    payload.as_bool().map(AttributeValue::Bool)
}

fn decode_null(payload: &Value) -> Option<AttributeValue> {
    (payload.as_bool() == Some(true)).then_some(AttributeValue::Null)
}

fn decode_l(payload: &Value) -> Option<AttributeValue> {
    payload
        .as_array()
        .map(|items| AttributeValue::L(items.iter().map(AttributeValue::from_json).collect()))
}

fn decode_m(payload: &Value) -> Option<AttributeValue> {
    payload.as_object().map(|fields| {
        AttributeValue::M(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
                .collect(),
        )
    })
}

type TagDecoder = fn(&Value) -> Option<AttributeValue>;

const DECODERS: &[(&str, TagDecoder)] = &[
    ("S", decode_s),
    ("N", decode_n),
    ("BOOL", decode_bool),
    ("NULL", decode_null),
    ("L", decode_l),
    ("M", decode_m),
];

impl AttributeValue {
    pub fn from_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Untagged;
        };
        DECODERS
            .iter()
            .find_map(|(tag, decode)| obj.get(*tag).and_then(decode))
            .unwrap_or(Self::Untagged)
    }

    /// Resolve to a native value. `None` means absent.
    pub fn to_native(&self) -> Option<Native> {
        match self {
            Self::S(s) => Some(Native::String(s.clone())),
            Self::N(n) => Some(Native::Number(parse_number(n))),
            Self::Bool(b) => Some(Native::Bool(*b)),
            Self::Null => Some(Native::Null),
            // Absent elements read back as null inside a list.
            Self::L(items) => Some(Native::List(
                items
                    .iter()
                    .map(|item| item.to_native().unwrap_or(Native::Null))
                    .collect(),
            )),
            Self::M(fields) => Some(Native::Map(
                fields
                    .iter()
                    .filter_map(|(k, v)| v.to_native().map(|n| (k.clone(), n)))
                    .collect(),
            )),
            Self::Untagged => None,
        }
    }
}

/// Decode and unwrap a raw JSON value in one go.
pub fn unwrap_json(value: &Value) -> Option<Native> {
    AttributeValue::from_json(value).to_native()
}

/// Numeric parse with JavaScript `Number()` rules: surrounding whitespace is
/// ignored, the empty string is zero, `0x`/`0o`/`0b` prefixes are honoured, and
/// anything else unparseable is NaN.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    match unsigned {
        "Infinity" => {
            return if s.starts_with('-') {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            }
        }
        // Rust accepts these spellings, JavaScript does not.
        other if other.eq_ignore_ascii_case("inf")
            || other.eq_ignore_ascii_case("infinity")
            || other.eq_ignore_ascii_case("nan") =>
        {
            return f64::NAN
        }
        _ => {}
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

impl Native {
    /// JavaScript truthiness.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::List(_) | Self::Map(_) => true,
        }
    }

    /// JavaScript `String(value)`.
    pub fn to_js_string(&self) -> String {
        match self {
            Self::Null => "null".into(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::List(items) => join_list(items, ","),
            Self::Map(_) => "[object Object]".into(),
        }
    }

    /// Field lookup on a map; `None` for anything else.
    pub fn get(&self, key: &str) -> Option<&Native> {
        match self {
            Self::Map(fields) => fields.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Native]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// JavaScript `Array.prototype.join`: null elements become empty strings.
pub fn join_list(items: &[Native], sep: &str) -> String {
    items
        .iter()
        .map(|item| match item {
            Native::Null => String::new(),
            other => other.to_js_string(),
        })
        .collect::<Vec<_>>()
        .join(sep)
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.into()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tag_precedence_prefers_s() {
        let v = AttributeValue::from_json(&json!({"N": "4", "S": "four"}));
        assert_eq!(v, AttributeValue::S("four".into()));
    }

    #[test]
    fn wrong_payload_type_falls_through() {
        let v = AttributeValue::from_json(&json!({"S": 4, "BOOL": true}));
        assert_eq!(v, AttributeValue::Bool(true));
        assert_eq!(AttributeValue::from_json(&json!({"NULL": false})), AttributeValue::Untagged);
    }

    #[test]
    fn nested_map_and_list_unwrap() {
        let native = unwrap_json(&json!({
            "M": {
                "temperature": {"N": "0.5"},
                "system_prompt": {"L": [{"S": "You are..."}]},
                "junk": {"X": 1}
            }
        }))
        .unwrap();
        assert_eq!(native.get("temperature"), Some(&Native::Number(0.5)));
        assert_eq!(
            native.get("system_prompt").and_then(Native::as_list),
            Some(&[Native::String("You are...".into())][..])
        );
        assert!(native.get("junk").is_none());
    }

    #[test]
    fn untagged_is_absent() {
        assert_eq!(unwrap_json(&json!({"X": "y"})), None);
        assert_eq!(unwrap_json(&json!("bare")), None);
        assert_eq!(unwrap_json(&json!({"NULL": true})), Some(Native::Null));
    }

    #[test]
    fn number_parse_follows_js() {
        assert_eq!(parse_number(" 0.25 "), 0.25);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("0x10"), 16.0);
        assert_eq!(parse_number("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_number("abc").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("1,5").is_nan());
    }

    #[test]
    fn js_string_forms() {
        assert_eq!(Native::Number(3.0).to_js_string(), "3");
        assert_eq!(Native::Number(0.5).to_js_string(), "0.5");
        assert_eq!(
            Native::List(vec![Native::String("a".into()), Native::Null]).to_js_string(),
            "a,"
        );
        assert!(!Native::String(String::new()).truthy());
        assert!(!Native::Number(f64::NAN).truthy());
        assert!(Native::List(vec![]).truthy());
    }
}
