use std::ops::RangeInclusive;

use crate::error::Failure;
use crate::value::Value;

use super::{Raw, SwitchFlag, ValueSpec, ValueType, require_token};

/// Signed integer with optional inclusive bounds.
///
/// Bounds show up in the type name, so the default failure message already
/// explains them (`Expected type integer at least 0, got "-1"`). When
/// `min > max` no value is accepted.
///
/// # Examples
///
/// ```
/// use optschema_core::{Integer, Raw, SwitchFlag, Value, ValueType};
///
/// let small = Integer::range(-3..=6);
/// assert_eq!(small.name(), "integer between -3 and 6");
/// assert_eq!(small.parse(SwitchFlag::Primary, Raw::Token("6")), Ok(Value::Integer(6)));
/// assert!(small.parse(SwitchFlag::Primary, Raw::Token("7")).is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Integer {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Integer {
    /// Unbounded integer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Integer `>= min`.
    pub fn at_least(min: i64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// Integer `<= max`.
    pub fn at_most(max: i64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Integer within `range`.
    pub fn range(range: RangeInclusive<i64>) -> Self {
        Self {
            min: Some(*range.start()),
            max: Some(*range.end()),
        }
    }

    fn in_bounds(&self, n: i64) -> bool {
        self.min.is_none_or(|min| n >= min) && self.max.is_none_or(|max| n <= max)
    }
}

impl ValueType for Integer {
    fn name(&self) -> String {
        match (self.min, self.max) {
            (None, None) => "integer".to_string(),
            (Some(min), None) => format!("integer at least {min}"),
            (None, Some(max)) => format!("integer at most {max}"),
            (Some(min), Some(max)) => format!("integer between {min} and {max}"),
        }
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let n: i64 = require_token(raw)?
            .parse()
            .map_err(|_| Failure::Generic)?;
        if self.in_bounds(n) {
            Ok(Value::Integer(n))
        } else {
            Err(Failure::Generic)
        }
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Integer {
            min: self.min,
            max: self.max,
        }
    }
}

/// Finite floating point number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Float;

impl ValueType for Float {
    fn name(&self) -> String {
        "float".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let n: f64 = require_token(raw)?
            .parse()
            .map_err(|_| Failure::Generic)?;
        // `inf`/`nan` are accepted by `str::parse` but are not numeric literals.
        if n.is_finite() {
            Ok(Value::Float(n))
        } else {
            Err(Failure::Generic)
        }
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Float
    }
}
