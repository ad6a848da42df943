use std::cmp::Ordering;
use std::fmt;

/// A decoded folder-name token: integer, float, or raw text.
///
/// The type is inferred, never declared: a token without a decimal point that parses as an
/// integer is [`ParameterValue::Int`], anything else that parses as a float literal is
/// [`ParameterValue::Float`], and the rest stays [`ParameterValue::Text`].
///
/// Values are totally ordered: every numeric value sorts before every text value, numerics
/// compare by magnitude (`2 == 2.0`), and text compares lexicographically.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    /// Whole number token such as `30`.
    Int(i64),
    /// Token with a decimal point or exponent, such as `0.65`.
    Float(f64),
    /// Anything else, such as `euler`.
    Text(String),
}

impl ParameterValue {
    /// Infer a typed value from a raw token.
    pub fn parse(token: &str) -> Self {
        if !token.contains('.')
            && let Ok(v) = token.parse::<i64>()
        {
            return Self::Int(v);
        }
        match token.parse::<f64>() {
            Ok(v) => Self::Float(v),
            Err(_) => Self::Text(token.to_string()),
        }
    }

    /// Numeric view of the value, `None` for text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Text(_) => None,
        }
    }

    /// Axis label text for this value.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

/// `true` when `token` reads as a float literal.
pub fn is_numeric_token(token: &str) -> bool {
    token.parse::<f64>().is_ok()
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            // Keep a trailing `.0` so `7.0` and `7` stay distinguishable in labels.
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl Ord for ParameterValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Text(_), _) => Ordering::Greater,
            (_, Self::Text(_)) => Ordering::Less,
            _ => {
                // Mixed or float pairs. Integers beyond 2^53 compare through f64 here.
                let a = self.as_f64().unwrap_or_default();
                let b = other.as_f64().unwrap_or_default();
                a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
            }
        }
    }
}

impl PartialOrd for ParameterValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ParameterValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParameterValue {}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/params/value.rs"]
mod tests;
