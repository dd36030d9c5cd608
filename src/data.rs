use std::fmt;

use serde::{Deserialize, Serialize};

/// A single spreadsheet cell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Value {
    /// Builds a cell from raw text, mapping blank input to [`Value::Empty`].
    pub fn from_raw(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Value::Empty
        } else {
            Value::Text(raw.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Numeric reading of the cell. Text is trimmed and parsed; anything that
    /// does not parse to a finite number reads as missing.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if n.is_finite() => Some(*n),
            Value::Number(_) | Value::Empty => None,
            Value::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|parsed| parsed.is_finite()),
        }
    }

    /// Coerces the cell to [`Value::Number`], or [`Value::Empty`] when it has no
    /// numeric reading.
    pub fn coerce_numeric(&self) -> Value {
        self.to_number().map_or(Value::Empty, Value::Number)
    }

    /// Label used when grouping by this cell; missing cells do not form a group.
    pub fn group_label(&self) -> Option<String> {
        match self {
            Value::Empty => None,
            other => Some(other.as_display()),
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format_number(*n),
            Value::Empty => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::from_raw(value)
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
