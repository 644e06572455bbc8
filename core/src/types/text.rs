use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Failure, Message};
use crate::value::Value;

use super::{Raw, SwitchFlag, ValueSpec, ValueType, require_token};

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?i)[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("valid UUID regex")
});

/// Any token, taken verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Text;

impl ValueType for Text {
    fn name(&self) -> String {
        "string".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        Ok(Value::String(require_token(raw)?.to_string()))
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::String
    }
}

/// One of an ordered list of symbols.
///
/// Matching is exact and case-sensitive; the first listed symbol equal to
/// the token wins.
///
/// # Examples
///
/// ```
/// use optschema_core::{Failure, OneOf, Raw, SwitchFlag, Value, ValueType};
///
/// let mode = OneOf::new(["fast", "slow"]);
/// assert_eq!(mode.name(), "enum (fast, slow)");
/// assert_eq!(
///     mode.parse(SwitchFlag::Primary, Raw::Token("slow")),
///     Ok(Value::Symbol("slow".into()))
/// );
/// let Err(Failure::Message(msg)) = mode.parse(SwitchFlag::Primary, Raw::Token("Fast")) else {
///     panic!("expected a message");
/// };
/// assert_eq!(msg.to_string(), r#"Expected one of (fast, slow), got "Fast""#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOf {
    values: Vec<String>,
}

impl OneOf {
    /// Creates an enumeration over `values`, in the given order.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Allowed symbols in declaration order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    fn listing(&self) -> String {
        format!("({})", self.values.join(", "))
    }
}

impl ValueType for OneOf {
    fn name(&self) -> String {
        format!("enum {}", self.listing())
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let token = require_token(raw)?;
        self.values
            .iter()
            .find(|value| value.as_str() == token)
            .map(|value| Value::Symbol(value.clone()))
            .ok_or_else(|| {
                Failure::Message(
                    Message::new()
                        .push("Expected one of ")
                        .push(self.listing())
                        .push(", got ")
                        .push(format!("{token:?}")),
                )
            })
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Enum {
            values: self.values.clone(),
        }
    }
}

/// Canonical 8-4-4-4-12 hexadecimal identifier, case-insensitive.
///
/// The token is returned unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uuid;

impl ValueType for Uuid {
    fn name(&self) -> String {
        "UUID".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let token = require_token(raw)?;
        if UUID_PATTERN.is_match(token) {
            Ok(Value::String(token.to_string()))
        } else {
            Err(Failure::Generic)
        }
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Uuid
    }
}
