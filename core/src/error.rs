//! Error types for schema construction and argument parsing.
//!
//! Two families of failure exist:
//!
//! - [`SchemaError`]: the declared options are inconsistent (empty names,
//!   colliding switches, unknown shorthand types). Raised once, while the
//!   schema is being built.
//! - [`ParseError`]: the argument vector does not satisfy the schema. Every
//!   problem found during a single parse is collected, in encounter order,
//!   into one aggregated error.

use std::fmt;

use thiserror::Error;

/// Displayable text built from an ordered sequence of fragments.
///
/// Messages are concatenated on display. Value types and validators use
/// them to describe a failure without committing to a single formatted
/// string up front.
///
/// # Examples
///
/// ```
/// use optschema_core::Message;
///
/// let msg = Message::new().push("Expected one of ").push("(fast, slow)");
/// assert_eq!(msg.to_string(), "Expected one of (fast, slow)");
/// assert_eq!(msg.fragments().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    fragments: Vec<String>,
}

impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment.
    pub fn push(mut self, fragment: impl Into<String>) -> Self {
        self.fragments.push(fragment.into());
        self
    }

    /// Returns the fragments in display order.
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            f.write_str(fragment)?;
        }
        Ok(())
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::new().push(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::new().push(text)
    }
}

/// Outcome of a rejected value, returned by value types and validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Rejected without detail; the engine synthesizes a default message.
    Generic,
    /// Rejected with a message that replaces the default one.
    Message(Message),
}

impl Failure {
    /// Shorthand for [`Failure::Message`].
    pub fn message(message: impl Into<Message>) -> Self {
        Self::Message(message.into())
    }
}

/// A single problem attributed to the switch that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchError {
    /// The switch as it appeared on the command line (or the primary switch
    /// for options that were never supplied).
    pub switch: String,
    /// Human-readable explanation.
    pub message: Message,
}

/// Aggregated parse failure.
///
/// Errors are kept in the order they were found. The `Display` rendering is a
/// count header followed by one `<switch> : <message>` line per error.
///
/// # Examples
///
/// ```
/// use optschema_core::ParseError;
///
/// let mut err = ParseError::new();
/// err.push("--bogus", "Unknown option");
/// err.push("--name", "Missing argument of type string");
/// assert_eq!(
///     err.to_string(),
///     "2 errors found!\n--bogus : Unknown option\n--name : Missing argument of type string"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseError {
    errors: Vec<SwitchError>,
}

impl ParseError {
    /// Creates an empty error list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error for `switch`.
    pub fn push(&mut self, switch: impl Into<String>, message: impl Into<Message>) {
        self.errors.push(SwitchError {
            switch: switch.into(),
            message: message.into(),
        });
    }

    /// Returns the collected errors in encounter order.
    pub fn errors(&self) -> &[SwitchError] {
        &self.errors
    }

    /// Number of collected errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` when nothing has been collected.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "{} {noun} found!", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n{} : {}", error.switch, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

impl IntoIterator for ParseError {
    type Item = SwitchError;
    type IntoIter = std::vec::IntoIter<SwitchError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

/// Schema construction errors.
///
/// Each variant describes a declaration problem detected while building a
/// [`Schema`](crate::Schema) or resolving a shorthand type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// Option name is empty or whitespace-only.
    #[error("option name cannot be empty")]
    EmptyName,
    /// Alias is not usable as a short switch (e.g., `-` or whitespace).
    #[error("invalid alias '{alias}' for option '{option}'")]
    InvalidAlias {
        /// Option declaring the alias.
        option: String,
        /// Offending alias character.
        alias: char,
    },
    /// Two different options produce the same switch string.
    #[error("switch {switch} is declared by both '{first}' and '{second}'")]
    SwitchCollision {
        /// The colliding switch.
        switch: String,
        /// Option that declared it first.
        first: String,
        /// Option that declared it again.
        second: String,
    },
    /// Shorthand type name is not recognized.
    #[error("unknown type: {0}")]
    UnknownType(String),
    /// Type parameters are inconsistent with the type.
    #[error("invalid parameters for type {type_name}: {reason}")]
    InvalidParams {
        /// Shorthand type name being resolved.
        type_name: String,
        /// What is wrong with the parameters.
        reason: String,
    },
}
