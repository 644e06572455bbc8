//! Declarative command-line option parsing with aggregated errors.
//!
//! This crate parses an argument vector against a declared set of options
//! and either returns the typed values plus leftover positional arguments,
//! or a single report listing every problem found:
//!
//! - [`ValueType`]: the contract every option value kind implements, with
//!   built-in types for booleans, counters, numbers, strings, enums, UUIDs,
//!   byte codecs, ISO-8601 dates and times, and URIs.
//! - [`OptionSchema`]: one option with its aliases, type, requiredness,
//!   uniqueness policy and [`Validator`] chain.
//! - [`Schema`]: the frozen option set and the single-pass parser.
//! - [`ParseError`]: the aggregated `<switch> : <message>` report.
//!
//! Schemas can also be declared as data through [`SchemaConfig`].
//!
//! # Example
//!
//! ```
//! use optschema_core::*;
//!
//! let schema = Schema::builder()
//!     .option(OptionSchema::new("verbose", Boolean).alias('v'))
//!     .option(OptionSchema::new("mode", OneOf::new(["fast", "slow"])))
//!     .option(OptionSchema::new("tag", Text).multiple())
//!     .build()
//!     .unwrap();
//!
//! let parsed = schema.parse(&["-v", "--tag", "a", "--tag", "b", "rest"]).unwrap();
//! assert_eq!(parsed.rest, vec!["rest"]);
//! assert_eq!(parsed.get("verbose"), Some(&Value::Bool(true)));
//! assert_eq!(parsed.get_all("tag").len(), 2);
//!
//! let err = schema.parse(&["--mode", "medium"]).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "1 error found!\n--mode : Expected one of (fast, slow), got \"medium\""
//! );
//! ```

mod config;
mod error;
mod option;
mod schema;
mod types;
mod value;

pub use config::{OptionConfig, SchemaConfig};
pub use error::{Failure, Message, ParseError, SchemaError, SwitchError};
pub use option::{OptionSchema, Validator};
pub use schema::{OptionDescription, Parsed, Schema, SchemaBuilder, USAGE_EXIT_CODE};
pub use types::*;
pub use value::{Uri, Value};
