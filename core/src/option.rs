//! A single declared option.
//!
//! An [`OptionSchema`] ties a name and its short aliases to a value type,
//! and adds the per-option policy the engine applies after parsing:
//! requiredness, uniqueness and a chain of [`Validator`]s.

use std::fmt;
use std::sync::Arc;

use crate::error::{Failure, Message, SchemaError};
use crate::types::{Raw, SwitchFlag, TypeParams, ValueType, resolve_type};
use crate::value::Value;

type CheckFn = dyn Fn(&Value) -> Result<(), Failure> + Send + Sync;

/// Named check run against a successfully parsed value.
///
/// A check returning [`Failure::Generic`] is reported as
/// `Value <value> failed validation <name>`.
///
/// # Examples
///
/// ```
/// use optschema_core::{Failure, Validator, Value};
///
/// let even = Validator::predicate("even", |v| v.as_i64().is_some_and(|n| n % 2 == 0));
/// assert!(even.check(&Value::Integer(4)).is_ok());
/// assert_eq!(even.check(&Value::Integer(3)), Err(Failure::Generic));
/// ```
#[derive(Clone)]
pub struct Validator {
    name: String,
    check: Arc<CheckFn>,
}

impl Validator {
    /// Creates a validator that may fail with its own message.
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), Failure> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Creates a validator from a boolean predicate. `false` is a generic
    /// failure.
    pub fn predicate<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(name, move |value| {
            if predicate(value) {
                Ok(())
            } else {
                Err(Failure::Generic)
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the check.
    pub fn check(&self, value: &Value) -> Result<(), Failure> {
        (self.check)(value)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Declaration of one command-line option.
///
/// Options are unique by default: when supplied several times only the last
/// value is kept. Cumulative types (such as [`Count`](crate::Count)) are
/// always unique, whatever [`multiple`](OptionSchema::multiple) says.
///
/// # Examples
///
/// ```
/// use optschema_core::{Boolean, Integer, OptionSchema};
///
/// let verbose = OptionSchema::new("verbose", Boolean).alias('v').doc("Chatty output");
/// assert_eq!(verbose.docs(), "  - --verbose, --no-verbose, -v - boolean - Chatty output");
///
/// let jobs = OptionSchema::new("jobs", Integer::at_least(1)).required();
/// assert_eq!(jobs.primary_switch(), "--jobs");
/// assert_eq!(jobs.docs(), "  - --jobs - integer at least 1, required");
/// ```
#[derive(Debug, Clone)]
pub struct OptionSchema {
    name: String,
    aliases: Vec<char>,
    value_type: Arc<dyn ValueType>,
    doc: Option<String>,
    required: bool,
    unique: bool,
    validators: Vec<Validator>,
}

impl OptionSchema {
    /// Declares an option called `name` holding values of `value_type`.
    pub fn new(name: impl Into<String>, value_type: impl ValueType + 'static) -> Self {
        Self::with_type(name, Arc::new(value_type))
    }

    /// Declares an option from an already shared value type.
    pub fn with_type(name: impl Into<String>, value_type: Arc<dyn ValueType>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            value_type,
            doc: None,
            required: false,
            unique: true,
            validators: Vec::new(),
        }
    }

    /// Declares an option whose type is given by a shorthand name such as
    /// `:integer` or `base64`.
    ///
    /// # Errors
    ///
    /// Fails when the type name or its parameters cannot be resolved.
    pub fn from_alias(
        name: impl Into<String>,
        type_name: &str,
        params: &TypeParams,
    ) -> Result<Self, SchemaError> {
        Ok(Self::with_type(name, resolve_type(type_name, params)?))
    }

    /// Adds a short alias (`-c`).
    pub fn alias(mut self, alias: char) -> Self {
        self.aliases.push(alias);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Marks the option as mandatory.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Keeps every occurrence instead of only the last one.
    pub fn multiple(mut self) -> Self {
        self.unique = false;
        self
    }

    /// Appends a validator; validators run in declaration order.
    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[char] {
        &self.aliases
    }

    pub fn value_type(&self) -> &dyn ValueType {
        self.value_type.as_ref()
    }

    pub fn doc_text(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether repeated occurrences collapse to the last one.
    pub fn is_unique(&self) -> bool {
        self.unique || self.value_type.cumulative()
    }

    /// Switch strings this option answers to, as produced by its type.
    pub fn switches(&self) -> Vec<(String, SwitchFlag)> {
        self.value_type.switches(&self.name, &self.aliases)
    }

    /// First declared switch, used when reporting an option never supplied.
    pub fn primary_switch(&self) -> String {
        self.switches()
            .into_iter()
            .next()
            .map(|(switch, _)| switch)
            .unwrap_or_else(|| crate::types::long_switch(&self.name))
    }

    /// Parses `raw` with the option's type, then runs the validator chain,
    /// stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the message to report against the switch that fired.
    pub fn parse_and_validate(&self, flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Message> {
        let value = self
            .value_type
            .parse(flag, raw)
            .map_err(|failure| match failure {
                Failure::Generic => Message::new()
                    .push("Expected type ")
                    .push(self.value_type.name())
                    .push(", got ")
                    .push(raw.to_string()),
                Failure::Message(message) => message,
            })?;

        for validator in &self.validators {
            match validator.check(&value) {
                Ok(()) => {}
                Err(Failure::Generic) => {
                    return Err(Message::new()
                        .push("Value ")
                        .push(value.to_string())
                        .push(" failed validation ")
                        .push(validator.name()));
                }
                Err(Failure::Message(message)) => return Err(message),
            }
        }
        Ok(value)
    }

    /// One documentation line:
    /// `  - <switch>, <switch> - <type name>[, required][ - <doc>]`.
    pub fn docs(&self) -> String {
        let switches: Vec<String> = self.switches().into_iter().map(|(s, _)| s).collect();
        let mut line = format!("  - {} - {}", switches.join(", "), self.value_type.name());
        if self.required {
            line.push_str(", required");
        }
        if let Some(doc) = &self.doc {
            line.push_str(" - ");
            line.push_str(doc);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Count, Integer, OneOf, Text};

    #[test]
    fn test_generic_type_failure_message() {
        let opt = OptionSchema::new("count", Integer::range(3..=7));
        let err = opt
            .parse_and_validate(SwitchFlag::Primary, Raw::Token("9"))
            .unwrap_err();
        assert_eq!(err.to_string(), r#"Expected type integer between 3 and 7, got "9""#);
    }

    #[test]
    fn test_type_message_replaces_default() {
        let opt = OptionSchema::new("mode", OneOf::new(["fast", "slow"]));
        let err = opt
            .parse_and_validate(SwitchFlag::Primary, Raw::Token("medium"))
            .unwrap_err();
        assert_eq!(err.to_string(), r#"Expected one of (fast, slow), got "medium""#);
    }

    #[test]
    fn test_validators_short_circuit_in_order() {
        let opt = OptionSchema::new("name", Text)
            .validate(Validator::predicate("non_empty", |v| {
                v.as_str().is_some_and(|s| !s.is_empty())
            }))
            .validate(Validator::new("never", |_| {
                Err(Failure::message("second validator ran"))
            }));

        let err = opt
            .parse_and_validate(SwitchFlag::Primary, Raw::Token(""))
            .unwrap_err();
        assert_eq!(err.to_string(), r#"Value "" failed validation non_empty"#);

        let err = opt
            .parse_and_validate(SwitchFlag::Primary, Raw::Token("x"))
            .unwrap_err();
        assert_eq!(err.to_string(), "second validator ran");
    }

    #[test]
    fn test_cumulative_type_is_always_unique() {
        assert!(!OptionSchema::new("tag", Text).multiple().is_unique());
        assert!(OptionSchema::new("verbosity", Count).multiple().is_unique());
    }

    #[test]
    fn test_from_alias() {
        let params = TypeParams {
            min: Some(1),
            max: Some(4),
            ..TypeParams::default()
        };
        let opt = OptionSchema::from_alias("level", ":integer", &params).unwrap().alias('l');
        assert_eq!(opt.docs(), "  - --level, -l - integer between 1 and 4");
        assert!(OptionSchema::from_alias("level", ":matrix", &params).is_err());
    }

    #[test]
    fn test_primary_switch_uses_dashes() {
        let opt = OptionSchema::new("dry_run", Text).alias('n');
        assert_eq!(opt.primary_switch(), "--dry-run");
    }
}
