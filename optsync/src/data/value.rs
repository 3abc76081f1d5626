use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};

/// Scalar leaf value stored in a [`ConfigTree`](super::tree::ConfigTree).
///
/// Numbers keep the `serde_json` representation so integers stay integers
/// when serialized (`12`, not `12.0`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean flag.
    Bool(bool),
    /// Integer or floating-point number.
    Number(Number),
    /// UTF-8 string.
    String(String),
}

impl Scalar {
    /// Build a floating-point scalar. Returns `None` for NaN and infinities,
    /// which JSON cannot represent.
    pub fn float(v: f64) -> Option<Self> {
        Number::from_f64(v).map(Scalar::Number)
    }

    /// Convert a JSON value into a scalar, if it is one.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::String(s) => Some(Scalar::String(s.clone())),
            _ => None,
        }
    }

    /// Convert into a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::String(s) => Value::String(s.clone()),
        }
    }

    /// Short name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::String(_) => "string",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => n.as_i64(),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Number(Number::from(v))
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(Number::from(v))
    }
}

impl From<u64> for Scalar {
    fn from(v: u64) -> Self {
        Scalar::Number(Number::from(v))
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_rejects_containers() {
        assert_eq!(Scalar::from_json(&json!(12)), Some(Scalar::from(12)));
        assert_eq!(Scalar::from_json(&json!("dark")), Some(Scalar::from("dark")));
        assert_eq!(Scalar::from_json(&json!(true)), Some(Scalar::from(true)));
        assert_eq!(Scalar::from_json(&json!(null)), None);
        assert_eq!(Scalar::from_json(&json!([1, 2])), None);
        assert_eq!(Scalar::from_json(&json!({"a": 1})), None);
    }

    #[test]
    fn test_integer_stays_integer() {
        let text = serde_json::to_string(&Scalar::from(12)).unwrap();
        assert_eq!(text, "12");
        let text = serde_json::to_string(&Scalar::float(1.5).unwrap()).unwrap();
        assert_eq!(text, "1.5");
    }

    #[test]
    fn test_float_rejects_nan() {
        assert!(Scalar::float(f64::NAN).is_none());
        assert!(Scalar::float(f64::INFINITY).is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Scalar::from("Consolas").to_string(), "Consolas");
        assert_eq!(Scalar::from(false).to_string(), "false");
        assert_eq!(Scalar::from(14).to_string(), "14");
    }
}
