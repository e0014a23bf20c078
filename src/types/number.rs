use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric field of a `SG_` record (factor, offset, min, max).
///
/// DBC files write these either as integers (`1`, `-40`) or as floating point
/// literals (`0.125`, `1E-3`). The lexical shape picks the variant:
/// a token containing `.`, `e` or `E` is a [`Number::Float`], anything else is a
/// [`Number::Int`]. Integers that do not fit in an `i64` become floats. Keeping
/// the tag lets the serializer write the value back in the same shape, so a
/// reparse yields an identical signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Value as `f64`, used by the codec for scaling.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Int(0)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

/// Error returned when a token is not a valid integer or float literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseNumberError {
    pub token: String,
}

impl fmt::Display for ParseNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a number", self.token)
    }
}

impl std::error::Error for ParseNumberError {}

impl FromStr for Number {
    type Err = ParseNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token: &str = s.trim();
        let err = || ParseNumberError {
            token: token.to_string(),
        };
        if token.contains(['.', 'e', 'E']) {
            token.parse::<f64>().map(Number::Float).map_err(|_| err())
        } else if let Ok(v) = token.parse::<i64>() {
            Ok(Number::Int(v))
        } else {
            // Integers beyond i64 (e.g. an unsigned 64-bit max) are kept as floats.
            let digits: &str = token.strip_prefix(['-', '+']).unwrap_or(token);
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                token.parse::<f64>().map(Number::Float).map_err(|_| err())
            } else {
                Err(err())
            }
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{v}"),
            // Debug keeps a '.' or an exponent, so the value reparses as a float.
            Number::Float(v) => write!(f, "{v:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexical_shape_selects_variant() {
        assert_eq!("1".parse::<Number>().unwrap(), Number::Int(1));
        assert_eq!("-40".parse::<Number>().unwrap(), Number::Int(-40));
        assert_eq!("0.5".parse::<Number>().unwrap(), Number::Float(0.5));
        assert_eq!("1E-3".parse::<Number>().unwrap(), Number::Float(0.001));
        assert_eq!("2e2".parse::<Number>().unwrap(), Number::Float(200.0));
        assert!("abc".parse::<Number>().is_err());
        assert!("1.2.3".parse::<Number>().is_err());
    }

    #[test]
    fn oversized_integer_becomes_float() {
        let max: Number = "18446744073709551615".parse().unwrap();
        assert_eq!(max, Number::Float(18446744073709551615.0));
        assert_eq!(max.to_string().parse::<Number>().unwrap(), max);
        assert!("-99999999999999999999".parse::<Number>().unwrap().is_float());
        assert!("inf".parse::<Number>().is_err());
        assert!("-".parse::<Number>().is_err());
    }

    #[test]
    fn display_keeps_float_shape() {
        assert_eq!(Number::Float(1.0).to_string(), "1.0");
        assert_eq!(Number::Float(0.125).to_string(), "0.125");
        assert_eq!(Number::Int(255).to_string(), "255");

        let reparsed: Number = Number::Float(1e-7).to_string().parse().unwrap();
        assert_eq!(reparsed, Number::Float(1e-7));
    }

    #[test]
    fn as_f64_covers_both_variants() {
        assert_eq!(Number::Int(-3).as_f64(), -3.0);
        assert_eq!(Number::Float(2.5).as_f64(), 2.5);
        assert!(Number::Float(2.5).is_float());
        assert!(!Number::default().is_float());
    }
}
