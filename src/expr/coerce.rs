use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ExpressionError, Value};
use crate::metrics::ValueType;

/// Quality-gate style level value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Ok,
    Warn,
    Error,
}

impl Level {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OK" => Some(Self::Ok),
            "WARN" | "WARNING" => Some(Self::Warn),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A metric value coerced to its declared type, ready to be recorded as a measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasureValue {
    Int(i32),
    Long(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Rating(u8),
    Level(Level),
}

impl fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Long(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Rating(r) => write!(f, "{}", rating_letter(*r)),
            Self::Level(l) => write!(f, "{l}"),
        }
    }
}

fn rating_letter(rating: u8) -> char {
    char::from(b'A' + rating.saturating_sub(1).min(4))
}

/// Coerce a raw value to the metric's declared type.
pub fn coerce(value: &Value, target: ValueType) -> Result<MeasureValue, ExpressionError> {
    let fail = || ExpressionError::ValueCoercion {
        value: format!("{} '{}'", value.type_name(), value),
        target,
    };

    match target {
        ValueType::Int => {
            let n = value.as_number().ok_or_else(fail)?.round();
            if n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
                return Err(fail());
            }
            Ok(MeasureValue::Int(n as i32))
        }
        ValueType::Millisec | ValueType::WorkDur => {
            let n = value.as_number().ok_or_else(fail)?.round();
            // i64::MAX is not exactly representable; 2^63 is the first value out of range.
            if n.abs() >= 9_223_372_036_854_775_808.0 {
                return Err(fail());
            }
            Ok(MeasureValue::Long(n as i64))
        }
        ValueType::Float | ValueType::Percent => {
            value.as_number().map(MeasureValue::Float).ok_or_else(fail)
        }
        ValueType::Bool => match value {
            Value::Bool(b) => Ok(MeasureValue::Bool(*b)),
            Value::Text(s) if s.trim().eq_ignore_ascii_case("true") => Ok(MeasureValue::Bool(true)),
            Value::Text(s) if s.trim().eq_ignore_ascii_case("false") => {
                Ok(MeasureValue::Bool(false))
            }
            _ => Err(fail()),
        },
        ValueType::String | ValueType::Data | ValueType::Distrib => {
            Ok(MeasureValue::Text(value.to_string()))
        }
        ValueType::Rating => {
            if let Value::Text(s) = value {
                if let [letter @ b'A'..=b'E'] = s.trim().to_ascii_uppercase().as_bytes() {
                    return Ok(MeasureValue::Rating(letter - b'A' + 1));
                }
            }
            let n = value.as_number().ok_or_else(fail)?.round();
            if !(1.0..=5.0).contains(&n) {
                return Err(fail());
            }
            Ok(MeasureValue::Rating(n as u8))
        }
        ValueType::Level => match value {
            Value::Text(s) => Level::from_str_lenient(s)
                .map(MeasureValue::Level)
                .ok_or_else(fail),
            _ => Err(fail()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_rounds_and_parses_text() {
        assert_eq!(coerce(&Value::Number(7.6), ValueType::Int), Ok(MeasureValue::Int(8)));
        assert_eq!(coerce(&Value::from("12"), ValueType::Int), Ok(MeasureValue::Int(12)));
        assert!(coerce(&Value::from("twelve"), ValueType::Int).is_err());
        assert!(coerce(&Value::Bool(true), ValueType::Int).is_err());
        assert!(coerce(&Value::Number(1e12), ValueType::Int).is_err());
    }

    #[test]
    fn durations_are_long() {
        assert_eq!(
            coerce(&Value::Number(1e12), ValueType::Millisec),
            Ok(MeasureValue::Long(1_000_000_000_000))
        );
        assert_eq!(
            coerce(&Value::Number(30.0), ValueType::WorkDur),
            Ok(MeasureValue::Long(30))
        );
    }

    #[test]
    fn float_and_percent() {
        assert_eq!(coerce(&Value::Number(4.5), ValueType::Float), Ok(MeasureValue::Float(4.5)));
        assert_eq!(
            coerce(&Value::from("87.5"), ValueType::Percent),
            Ok(MeasureValue::Float(87.5))
        );
    }

    #[test]
    fn bool_is_strict() {
        assert_eq!(coerce(&Value::Bool(false), ValueType::Bool), Ok(MeasureValue::Bool(false)));
        assert_eq!(coerce(&Value::from("TRUE"), ValueType::Bool), Ok(MeasureValue::Bool(true)));
        assert!(coerce(&Value::Number(1.0), ValueType::Bool).is_err());
        assert!(coerce(&Value::from("yes"), ValueType::Bool).is_err());
    }

    #[test]
    fn strings_stringify() {
        assert_eq!(
            coerce(&Value::Number(8.0), ValueType::String),
            Ok(MeasureValue::Text("8".into()))
        );
        assert_eq!(
            coerce(&Value::Bool(true), ValueType::Data),
            Ok(MeasureValue::Text("true".into()))
        );
    }

    #[test]
    fn rating_range_and_letters() {
        assert_eq!(coerce(&Value::Number(4.0), ValueType::Rating), Ok(MeasureValue::Rating(4)));
        assert_eq!(coerce(&Value::from("b"), ValueType::Rating), Ok(MeasureValue::Rating(2)));
        assert!(coerce(&Value::Number(0.0), ValueType::Rating).is_err());
        assert!(coerce(&Value::Number(6.0), ValueType::Rating).is_err());
        assert_eq!(MeasureValue::Rating(2).to_string(), "B");
    }

    #[test]
    fn level_from_text_only() {
        assert_eq!(
            coerce(&Value::from("warn"), ValueType::Level),
            Ok(MeasureValue::Level(Level::Warn))
        );
        assert!(coerce(&Value::Number(1.0), ValueType::Level).is_err());
        assert!(coerce(&Value::from("FAILED"), ValueType::Level).is_err());
    }

    #[test]
    fn coercion_error_names_target() {
        let err = coerce(&Value::from("abc"), ValueType::Int).unwrap_err();
        assert_eq!(err.to_string(), "Cannot coerce string 'abc' to INT");
    }
}
