//! The option schema and its parse algorithm.
//!
//! A [`Schema`] is assembled with a [`SchemaBuilder`] and frozen by
//! [`SchemaBuilder::build`], which validates every declaration and builds
//! the switch table once. [`Schema::parse`] then scans an argument vector
//! left to right in a single pass:
//!
//! 1. Tokens that are not switch-shaped go to the leftover list.
//! 2. Unknown switches are reported and scanning continues with the next
//!    token.
//! 3. Known switches capture the following token when their type asks for
//!    one, then parse and validate it.
//!
//! Afterwards required options that never appeared are reported, and if
//! nothing went wrong repeated occurrences of unique options are collapsed.
//! Every problem found is collected into one [`ParseError`].

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::{ParseError, SchemaError};
use crate::option::OptionSchema;
use crate::types::{Raw, SwitchFlag, ValueSpec};
use crate::value::Value;

/// Exit status used by [`Schema::parse_or_exit`].
pub const USAGE_EXIT_CODE: i32 = 2;

const SEPARATOR: &str = "--";

/// Incremental schema declaration.
///
/// Declaring an option with a name already present replaces the earlier
/// declaration, keeping its position.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    options: Vec<OptionSchema>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an option.
    pub fn option(mut self, option: OptionSchema) -> Self {
        match self.options.iter_mut().find(|o| o.name() == option.name()) {
            Some(existing) => *existing = option,
            None => self.options.push(option),
        }
        self
    }

    /// Validates the declarations and builds the switch table.
    ///
    /// # Errors
    ///
    /// Fails on an empty option name, an alias that cannot form a short
    /// switch, or two options producing the same switch string.
    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut table: HashMap<String, (usize, SwitchFlag)> = HashMap::new();

        for (index, option) in self.options.iter().enumerate() {
            if option.name().trim().is_empty() {
                return Err(SchemaError::EmptyName);
            }
            if let Some(&alias) = option
                .aliases()
                .iter()
                .find(|a| **a == '-' || a.is_whitespace() || a.is_control())
            {
                return Err(SchemaError::InvalidAlias {
                    option: option.name().to_string(),
                    alias,
                });
            }

            for (switch, flag) in option.switches() {
                match table.get(&switch) {
                    Some(&(other, _)) if other != index => {
                        return Err(SchemaError::SwitchCollision {
                            switch,
                            first: self.options[other].name().to_string(),
                            second: option.name().to_string(),
                        });
                    }
                    Some(_) => {}
                    None => {
                        table.insert(switch, (index, flag));
                    }
                }
            }
        }

        debug!(
            options = self.options.len(),
            switches = table.len(),
            "built switch table"
        );
        Ok(Schema {
            options: self.options,
            table,
        })
    }
}

/// Successful parse result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parsed {
    /// Positional arguments, in order.
    pub rest: Vec<String>,
    /// `(option name, value)` pairs in chronological order.
    pub options: Vec<(String, Value)>,
}

impl Parsed {
    /// Last value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// Every value recorded for `name`, oldest first.
    pub fn get_all(&self, name: &str) -> Vec<&Value> {
        self.options
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, value)| value)
            .collect()
    }
}

/// Serializable summary of one option, for documentation tooling.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionDescription {
    pub name: String,
    pub switches: Vec<String>,
    pub type_name: String,
    pub spec: ValueSpec,
    pub required: bool,
    pub unique: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// Frozen set of options with a prebuilt switch table.
///
/// # Examples
///
/// ```
/// use optschema_core::{Boolean, Integer, OptionSchema, Schema, Text, Value};
///
/// let schema = Schema::builder()
///     .option(OptionSchema::new("count", Integer::at_least(0)))
///     .option(OptionSchema::new("name", Text).required())
///     .option(OptionSchema::new("verbose", Boolean).alias('v'))
///     .build()
///     .unwrap();
///
/// let parsed = schema.parse(&["-v", "--name", "ada", "file.txt"]).unwrap();
/// assert_eq!(parsed.rest, vec!["file.txt"]);
/// assert_eq!(parsed.get("verbose"), Some(&Value::Bool(true)));
///
/// let err = schema.parse(&["--count", "-1", "pos1"]).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "2 errors found!\n\
///      --count : Expected type integer at least 0, got \"-1\"\n\
///      --name : Missing argument of type string"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    options: Vec<OptionSchema>,
    table: HashMap<String, (usize, SwitchFlag)>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Declared options, in declaration order.
    pub fn options(&self) -> &[OptionSchema] {
        &self.options
    }

    /// Looks an option up by name.
    pub fn option(&self, name: &str) -> Option<&OptionSchema> {
        self.options.iter().find(|o| o.name() == name)
    }

    /// Number of distinct switch strings the schema answers to.
    pub fn switch_count(&self) -> usize {
        self.table.len()
    }

    fn looks_like_switch(&self, token: &str) -> bool {
        token.starts_with("--") || self.table.contains_key(token)
    }

    /// Parses `argv` against the schema.
    ///
    /// # Errors
    ///
    /// Returns every problem found, in encounter order, followed by the
    /// required options that were never supplied.
    pub fn parse<S: AsRef<str>>(&self, argv: &[S]) -> Result<Parsed, ParseError> {
        let mut rest = Vec::new();
        let mut entries: Vec<(usize, Value)> = Vec::new();
        let mut errors = ParseError::new();
        let mut seen: HashSet<usize> = HashSet::new();
        let mut tallies: HashMap<usize, u64> = HashMap::new();

        let mut cursor = 0;
        while cursor < argv.len() {
            let token = argv[cursor].as_ref();
            cursor += 1;

            if token == SEPARATOR {
                rest.extend(argv[cursor..].iter().map(|t| t.as_ref().to_string()));
                break;
            }
            if !is_switch_candidate(token) {
                rest.push(token.to_string());
                continue;
            }
            let Some(&(index, flag)) = self.table.get(token) else {
                trace!(token, "unknown switch");
                errors.push(token, "Unknown option");
                continue;
            };

            let option = &self.options[index];
            let value_type = option.value_type();
            seen.insert(index);
            trace!(token, option = option.name(), "dispatching switch");

            let raw = if value_type.cumulative() {
                let tally = tallies.entry(index).or_insert(0);
                *tally += 1;
                Raw::Tally(*tally)
            } else if value_type.capture(flag) {
                match argv.get(cursor).map(|next| next.as_ref()) {
                    Some(next) if !self.looks_like_switch(next) => {
                        cursor += 1;
                        Raw::Token(next)
                    }
                    _ => {
                        errors.push(token, missing_argument(option));
                        continue;
                    }
                }
            } else {
                Raw::Absent
            };

            match option.parse_and_validate(flag, raw) {
                Ok(value) => entries.push((index, value)),
                Err(message) => errors.push(token, message),
            }
        }

        for (index, option) in self.options.iter().enumerate() {
            if option.is_required() && !seen.contains(&index) {
                errors.push(option.primary_switch(), missing_argument(option));
            }
        }

        debug!(
            parsed = entries.len(),
            rest = rest.len(),
            errors = errors.len(),
            "parse finished"
        );
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Parsed {
            rest,
            options: self.resolve_uniqueness(entries),
        })
    }

    /// Like [`parse`](Self::parse), but prints the report to stderr and
    /// exits with [`USAGE_EXIT_CODE`] on failure.
    pub fn parse_or_exit<S: AsRef<str>>(&self, argv: &[S]) -> Parsed {
        match self.parse(argv) {
            Ok(parsed) => parsed,
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(USAGE_EXIT_CODE);
            }
        }
    }

    // Unique options keep only their last occurrence, in that occurrence's
    // chronological slot.
    fn resolve_uniqueness(&self, entries: Vec<(usize, Value)>) -> Vec<(String, Value)> {
        let mut last: HashMap<usize, usize> = HashMap::new();
        for (position, (index, _)) in entries.iter().enumerate() {
            last.insert(*index, position);
        }

        entries
            .into_iter()
            .enumerate()
            .filter(|(position, (index, _))| {
                !self.options[*index].is_unique() || last.get(index) == Some(position)
            })
            .map(|(_, (index, value))| (self.options[index].name().to_string(), value))
            .collect()
    }

    /// Documentation lines for every option, in declaration order.
    pub fn docs(&self) -> String {
        self.options
            .iter()
            .map(OptionSchema::docs)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Serializable description of every option.
    pub fn describe(&self) -> Vec<OptionDescription> {
        self.options
            .iter()
            .map(|option| OptionDescription {
                name: option.name().to_string(),
                switches: option.switches().into_iter().map(|(s, _)| s).collect(),
                type_name: option.value_type().name(),
                spec: option.value_type().spec(),
                required: option.is_required(),
                unique: option.is_unique(),
                doc: option.doc_text().map(str::to_string),
            })
            .collect()
    }
}

fn is_switch_candidate(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

fn missing_argument(option: &OptionSchema) -> String {
    format!("Missing argument of type {}", option.value_type().name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Failure;
    use crate::option::Validator;
    use crate::types::{Boolean, Count, Float, Integer, OneOf, Text};

    fn schema() -> Schema {
        Schema::builder()
            .option(OptionSchema::new("verbose", Boolean).alias('v'))
            .option(OptionSchema::new("level", Count).alias('l'))
            .option(OptionSchema::new("offset", Integer::new()).alias('o'))
            .option(OptionSchema::new("tag", Text).alias('t').multiple())
            .option(OptionSchema::new("name", Text))
            .build()
            .unwrap()
    }

    fn messages(err: &ParseError) -> Vec<String> {
        err.errors()
            .iter()
            .map(|e| format!("{} : {}", e.switch, e.message))
            .collect()
    }

    #[test]
    fn test_replacing_option_keeps_position() {
        let schema = Schema::builder()
            .option(OptionSchema::new("a", Text))
            .option(OptionSchema::new("b", Text))
            .option(OptionSchema::new("a", Integer::new()))
            .build()
            .unwrap();
        let names: Vec<_> = schema.options().iter().map(|o| o.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(schema.option("a").unwrap().value_type().name(), "integer");
    }

    #[test]
    fn test_build_rejects_switch_collision() {
        let err = Schema::builder()
            .option(OptionSchema::new("verbose", Boolean).alias('v'))
            .option(OptionSchema::new("version", Boolean).alias('v'))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::SwitchCollision {
                switch: "-v".to_string(),
                first: "verbose".to_string(),
                second: "version".to_string(),
            }
        );
    }

    #[test]
    fn test_build_rejects_negated_form_collision() {
        // `--no-color` from the boolean clashes with an option named no_color.
        let err = Schema::builder()
            .option(OptionSchema::new("color", Boolean))
            .option(OptionSchema::new("no_color", Text))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::SwitchCollision { ref switch, .. } if switch == "--no-color"));
    }

    #[test]
    fn test_build_rejects_bad_names_and_aliases() {
        assert_eq!(
            Schema::builder().option(OptionSchema::new(" ", Text)).build().unwrap_err(),
            SchemaError::EmptyName
        );
        assert_eq!(
            Schema::builder()
                .option(OptionSchema::new("x", Text).alias('-'))
                .build()
                .unwrap_err(),
            SchemaError::InvalidAlias {
                option: "x".to_string(),
                alias: '-'
            }
        );
    }

    #[test]
    fn test_negated_boolean() {
        let parsed = schema().parse(&["--verbose", "--no-verbose"]).unwrap();
        assert_eq!(parsed.options, vec![("verbose".to_string(), Value::Bool(false))]);
    }

    #[test]
    fn test_count_tallies_occurrences() {
        let parsed = schema().parse(&["-l", "--level", "x", "-l"]).unwrap();
        assert_eq!(parsed.options, vec![("level".to_string(), Value::Count(3))]);
        assert_eq!(parsed.rest, vec!["x"]);
    }

    #[test]
    fn test_negative_number_is_captured() {
        let parsed = schema().parse(&["--offset", "-12"]).unwrap();
        assert_eq!(parsed.get("offset"), Some(&Value::Integer(-12)));
    }

    #[test]
    fn test_known_short_switch_is_not_captured() {
        let err = schema().parse(&["--name", "-v"]).unwrap_err();
        assert_eq!(messages(&err), vec!["--name : Missing argument of type string"]);
    }

    #[test]
    fn test_missing_argument_at_end() {
        let err = schema().parse(&["--offset"]).unwrap_err();
        assert_eq!(messages(&err), vec!["--offset : Missing argument of type integer"]);
    }

    #[test]
    fn test_unknown_switch_does_not_consume_next_token() {
        let err = schema().parse(&["--bogus", "-v", "--nope"]).unwrap_err();
        assert_eq!(
            messages(&err),
            vec!["--bogus : Unknown option", "--nope : Unknown option"]
        );
    }

    #[test]
    fn test_separator_ends_switch_processing() {
        let parsed = schema().parse(&["a", "--", "-v", "--name", "b"]).unwrap();
        assert_eq!(parsed.rest, vec!["a", "-v", "--name", "b"]);
        assert!(parsed.options.is_empty());
    }

    #[test]
    fn test_separator_after_capturing_switch_is_missing_argument() {
        let err = schema().parse(&["--name", "--", "x"]).unwrap_err();
        assert_eq!(messages(&err), vec!["--name : Missing argument of type string"]);
    }

    #[test]
    fn test_lone_dash_is_positional() {
        let parsed = schema().parse(&["-", "--name", "-"]).unwrap();
        assert_eq!(parsed.rest, vec!["-"]);
        assert_eq!(parsed.get("name"), Some(&Value::String("-".to_string())));
    }

    #[test]
    fn test_unique_keeps_last_in_its_own_slot() {
        let parsed = schema()
            .parse(&["--name", "a", "-t", "x", "--name", "b", "-t", "y"])
            .unwrap();
        assert_eq!(
            parsed.options,
            vec![
                ("tag".to_string(), Value::String("x".into())),
                ("name".to_string(), Value::String("b".into())),
                ("tag".to_string(), Value::String("y".into())),
            ]
        );
        assert_eq!(parsed.get_all("tag").len(), 2);
    }

    #[test]
    fn test_validator_failure_is_reported_on_switch() {
        let schema = Schema::builder()
            .option(
                OptionSchema::new("ratio", Float)
                    .alias('r')
                    .validate(Validator::new("unit", |v| match v.as_f64() {
                        Some(x) if (0.0..=1.0).contains(&x) => Ok(()),
                        _ => Err(Failure::message("ratio must be within [0, 1]")),
                    })),
            )
            .build()
            .unwrap();
        let err = schema.parse(&["-r", "1.5"]).unwrap_err();
        assert_eq!(messages(&err), vec!["-r : ratio must be within [0, 1]"]);
    }

    #[test]
    fn test_required_missing_follows_scan_errors() {
        let schema = Schema::builder()
            .option(OptionSchema::new("first", Text).required())
            .option(OptionSchema::new("mode", OneOf::new(["a", "b"])))
            .option(OptionSchema::new("second", Text).required())
            .build()
            .unwrap();
        let err = schema.parse(&["--mode", "c", "--bogus"]).unwrap_err();
        assert_eq!(
            messages(&err),
            vec![
                r#"--mode : Expected one of (a, b), got "c""#,
                "--bogus : Unknown option",
                "--first : Missing argument of type string",
                "--second : Missing argument of type string",
            ]
        );
    }

    #[test]
    fn test_describe() {
        let description = schema().describe();
        assert_eq!(description.len(), 5);
        assert_eq!(description[0].switches, vec!["--verbose", "--no-verbose", "-v"]);
        assert_eq!(description[1].spec, ValueSpec::Count);
        assert!(!description[3].unique);
        assert_eq!(schema().switch_count(), 10);
    }

    #[test]
    fn test_schema_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
        assert_send_sync::<SchemaBuilder>();
        assert_send_sync::<Parsed>();

        let schema = std::sync::Arc::new(schema());
        let handles: Vec<_> = (0..4)
            .map(|n| {
                let schema = std::sync::Arc::clone(&schema);
                std::thread::spawn(move || {
                    let offset = n.to_string();
                    schema.parse(&["--offset", offset.as_str()]).map(|p| p.options)
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            let options = handle.join().unwrap().unwrap();
            assert_eq!(options, vec![("offset".to_string(), Value::Integer(n as i64))]);
        }
    }
}
