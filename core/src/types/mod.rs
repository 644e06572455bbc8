//! The value type contract and the built-in value types.
//!
//! A value type turns the raw token captured after a switch into a typed
//! [`Value`]. Types are stateless: every operation is a pure function of the
//! type's own parameters, the [`SwitchFlag`] identifying which switch form
//! fired, and the [`Raw`] input.
//!
//! Only [`name`](ValueType::name), [`parse`](ValueType::parse) and
//! [`spec`](ValueType::spec) are required. The remaining hooks have defaults
//! suitable for any type that takes exactly one argument:
//!
//! - [`capture`](ValueType::capture): `true`, consume the next token.
//! - [`switches`](ValueType::switches): `--long-name` plus `-a` per alias.
//! - [`cumulative`](ValueType::cumulative): `false`.
//!
//! # Example
//!
//! ```
//! use optschema_core::{Failure, Raw, SwitchFlag, Value, ValueSpec, ValueType};
//!
//! #[derive(Debug)]
//! struct Port;
//!
//! impl ValueType for Port {
//!     fn name(&self) -> String {
//!         "port".to_string()
//!     }
//!
//!     fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
//!         let token = raw.token().ok_or(Failure::Generic)?;
//!         let port: u16 = token.parse().map_err(|_| Failure::Generic)?;
//!         Ok(Value::Integer(i64::from(port)))
//!     }
//!
//!     fn spec(&self) -> ValueSpec {
//!         ValueSpec::Custom { description: "TCP port".to_string() }
//!     }
//! }
//!
//! assert_eq!(Port.switches("listen_port", &['p'])[0].0, "--listen-port");
//! assert!(Port.parse(SwitchFlag::Primary, Raw::Token("8080")).is_ok());
//! ```

mod adhoc;
mod alias;
mod boolean;
mod bytes;
mod datetime;
mod number;
mod text;
mod uri;

use std::fmt;

use serde::Serialize;

use crate::error::Failure;
use crate::value::Value;

pub use adhoc::AdHoc;
pub use alias::{TypeParams, resolve_type};
pub use boolean::{Boolean, Count};
pub use bytes::{Bytes, Encoding, LetterCase, Padding};
pub use datetime::{IsoDate, IsoDateTime, IsoNaiveDateTime, IsoTime};
pub use number::{Float, Integer};
pub use text::{OneOf, Text, Uuid};
pub use uri::{UriOutput, UriPart, UriType};

/// Identifies which declared switch form fired.
///
/// Most types only ever see [`SwitchFlag::Primary`]. Types emitting several
/// mutually exclusive forms from [`ValueType::switches`] tag each form with a
/// distinct flag and branch on it in `capture`/`parse`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SwitchFlag {
    /// The plain form (`--name`, `-n`).
    Primary,
    /// The negated form (`--no-name`).
    Negated,
    /// Free tag for user-defined forms.
    Custom(u16),
}

/// Input handed to [`ValueType::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Raw<'a> {
    /// Token captured after the switch.
    Token(&'a str),
    /// Nothing was captured ([`ValueType::capture`] returned `false`).
    Absent,
    /// Occurrence tally for [`cumulative`](ValueType::cumulative) types.
    Tally(u64),
}

impl<'a> Raw<'a> {
    /// Returns the captured token, if any.
    pub fn token(self) -> Option<&'a str> {
        match self {
            Self::Token(token) => Some(token),
            _ => None,
        }
    }
}

impl fmt::Display for Raw<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(token) => write!(f, "{token:?}"),
            Self::Absent => f.write_str("nothing"),
            Self::Tally(n) => write!(f, "{n}"),
        }
    }
}

/// Structural description of the values a type produces.
///
/// The parse engine never inspects it; it exists for documentation and
/// code generation tooling built on top of [`Schema::describe`](crate::Schema::describe).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueSpec {
    Boolean,
    Count,
    Integer { min: Option<i64>, max: Option<i64> },
    Float,
    String,
    Enum { values: Vec<String> },
    Uuid,
    Bytes { encoding: Encoding },
    Date,
    Time,
    DateTime,
    NaiveDateTime,
    Uri { structured: bool },
    Custom { description: String },
}

/// Contract implemented by every option value kind.
pub trait ValueType: fmt::Debug + Send + Sync {
    /// Human name used in messages and docs (e.g., `integer between 3 and 7`).
    fn name(&self) -> String;

    /// Converts the raw input into a value.
    ///
    /// Returning [`Failure::Generic`] makes the engine report
    /// `Expected type <name>, got <raw>`.
    fn parse(&self, flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure>;

    /// Structural description of the produced value.
    fn spec(&self) -> ValueSpec;

    /// Whether the switch consumes the following token.
    fn capture(&self, _flag: SwitchFlag) -> bool {
        true
    }

    /// Switch strings for an option called `name` with the given aliases.
    fn switches(&self, name: &str, aliases: &[char]) -> Vec<(String, SwitchFlag)> {
        default_switches(name, aliases)
    }

    /// Whether repeated occurrences accumulate into a tally.
    ///
    /// Cumulative types receive [`Raw::Tally`] instead of a token and are
    /// always resolved as unique options.
    fn cumulative(&self) -> bool {
        false
    }
}

/// Long switch for `name`, with underscores turned into dashes.
pub fn long_switch(name: &str) -> String {
    format!("--{}", name.replace('_', "-"))
}

/// Short switch for a single-character alias.
pub fn short_switch(alias: char) -> String {
    format!("-{alias}")
}

/// One long switch for `name` plus one short switch per alias, all
/// tagged [`SwitchFlag::Primary`].
pub fn default_switches(name: &str, aliases: &[char]) -> Vec<(String, SwitchFlag)> {
    std::iter::once(long_switch(name))
        .chain(aliases.iter().copied().map(short_switch))
        .map(|switch| (switch, SwitchFlag::Primary))
        .collect()
}

pub(crate) fn require_token(raw: Raw<'_>) -> Result<&str, Failure> {
    raw.token().ok_or(Failure::Generic)
}
