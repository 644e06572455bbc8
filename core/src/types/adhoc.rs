use std::fmt;
use std::sync::Arc;

use crate::error::Failure;
use crate::value::Value;

use super::{Raw, SwitchFlag, ValueSpec, ValueType, require_token};

type ParseFn = dyn Fn(&str) -> Result<Value, Failure> + Send + Sync;

/// One-off value type built from a closure.
///
/// Useful for inline conversions that do not deserve their own
/// [`ValueType`] implementation.
///
/// # Examples
///
/// ```
/// use optschema_core::{AdHoc, Failure, Raw, SwitchFlag, Value, ValueType};
///
/// let even = AdHoc::new("even integer", |token| match token.parse::<i64>() {
///     Ok(n) if n % 2 == 0 => Ok(Value::Integer(n)),
///     _ => Err(Failure::Generic),
/// });
/// assert_eq!(even.name(), "even integer");
/// assert_eq!(even.parse(SwitchFlag::Primary, Raw::Token("4")), Ok(Value::Integer(4)));
/// assert!(even.parse(SwitchFlag::Primary, Raw::Token("3")).is_err());
/// ```
#[derive(Clone)]
pub struct AdHoc {
    name: String,
    parse: Arc<ParseFn>,
    spec: Option<ValueSpec>,
}

impl AdHoc {
    /// Creates a type called `name` that converts tokens with `parse`.
    pub fn new<F>(name: impl Into<String>, parse: F) -> Self
    where
        F: Fn(&str) -> Result<Value, Failure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            parse: Arc::new(parse),
            spec: None,
        }
    }

    /// Overrides the structural description (defaults to a custom spec
    /// carrying the type name).
    pub fn with_spec(mut self, spec: ValueSpec) -> Self {
        self.spec = Some(spec);
        self
    }
}

impl fmt::Debug for AdHoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdHoc")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

impl ValueType for AdHoc {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        (self.parse)(require_token(raw)?)
    }

    fn spec(&self) -> ValueSpec {
        self.spec.clone().unwrap_or_else(|| ValueSpec::Custom {
            description: self.name.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Message;

    #[test]
    fn test_message_failures_pass_through() {
        let ty = AdHoc::new("hostname", |token| {
            if token.contains(' ') {
                Err(Failure::message(Message::from("hostnames cannot contain spaces")))
            } else {
                Ok(Value::String(token.to_string()))
            }
        });
        assert_eq!(
            ty.parse(SwitchFlag::Primary, Raw::Token("a b")),
            Err(Failure::message("hostnames cannot contain spaces"))
        );
    }

    #[test]
    fn test_default_spec_is_custom() {
        let ty = AdHoc::new("thing", |t| Ok(Value::String(t.to_string())));
        assert_eq!(
            ty.spec(),
            ValueSpec::Custom {
                description: "thing".to_string()
            }
        );
        let ty = ty.with_spec(ValueSpec::String);
        assert_eq!(ty.spec(), ValueSpec::String);
    }
}
