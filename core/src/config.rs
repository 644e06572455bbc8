//! Declarative schema description.
//!
//! A schema can be written as data instead of code and turned into a
//! [`Schema`] with [`SchemaConfig::into_schema`]. Type names use the
//! shorthand accepted by [`resolve_type`](crate::resolve_type), and type
//! parameters sit next to the other option fields. Validators are code and
//! cannot be declared here.
//!
//! # Example YAML
//!
//! ```yaml
//! options:
//!   - name: verbose
//!     type: boolean
//!     alias: [v]
//!   - name: mode
//!     type: enum
//!     values: [fast, slow]
//!     doc: Processing mode
//!   - name: tag
//!     type: string
//!     unique: false
//!   - name: endpoint
//!     type: uri
//!     required: true
//!     required_parts: [scheme, host, port]
//!     as: struct
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::option::OptionSchema;
use crate::schema::Schema;
use crate::types::TypeParams;

fn default_unique() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

/// One declared option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionConfig {
    /// Option name; underscores become dashes in the long switch.
    pub name: String,
    /// Shorthand type name (`integer`, `:uuid`, ...).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Single-character short aliases.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alias: Vec<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// `false` keeps every occurrence.
    #[serde(default = "default_unique", skip_serializing_if = "is_true")]
    pub unique: bool,
    /// Type parameters (`min`, `values`, `padding`, ...).
    #[serde(flatten)]
    pub params: TypeParams,
    /// Keys matching neither an option field nor a type parameter.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub unknown: BTreeMap<String, serde_json::Value>,
}

impl OptionConfig {
    /// Resolves the type and builds the option.
    ///
    /// # Errors
    ///
    /// Fails on unrecognized keys, or when the type name or parameters
    /// cannot be resolved.
    pub fn into_option(self) -> Result<OptionSchema, SchemaError> {
        if let Some(key) = self.unknown.keys().next() {
            return Err(SchemaError::InvalidParams {
                type_name: self.type_name,
                reason: format!("parameter '{key}' is not supported"),
            });
        }
        let mut option = OptionSchema::from_alias(self.name, &self.type_name, &self.params)?;
        for alias in self.alias {
            option = option.alias(alias);
        }
        if let Some(doc) = self.doc {
            option = option.doc(doc);
        }
        if self.required {
            option = option.required();
        }
        if !self.unique {
            option = option.multiple();
        }
        Ok(option)
    }
}

/// A whole schema as data.
///
/// # Examples
///
/// ```
/// use optschema_core::{SchemaConfig, Value};
///
/// let config: SchemaConfig = serde_json::from_str(
///     r#"{"options": [{"name": "jobs", "type": "integer", "min": 1, "alias": ["j"]}]}"#,
/// )
/// .unwrap();
/// let schema = config.into_schema().unwrap();
/// let parsed = schema.parse(&["-j", "4"]).unwrap();
/// assert_eq!(parsed.get("jobs"), Some(&Value::Integer(4)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub options: Vec<OptionConfig>,
}

impl SchemaConfig {
    /// Builds the described schema.
    ///
    /// # Errors
    ///
    /// Returns the first type resolution or schema construction error.
    pub fn into_schema(self) -> Result<Schema, SchemaError> {
        self.options
            .into_iter()
            .try_fold(Schema::builder(), |builder, option| {
                Ok(builder.option(option.into_option()?))
            })?
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{UriOutput, UriPart};
    use crate::value::Value;

    fn config(json: &str) -> SchemaConfig {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_flattened_params() {
        let config = config(
            r#"{"options": [{"name": "endpoint", "type": "uri",
                "required_parts": ["scheme", "port"], "as": "struct"}]}"#,
        );
        let option = &config.options[0];
        assert!(option.unique);
        assert!(!option.required);
        assert_eq!(
            option.params.required_parts,
            Some(vec![UriPart::Scheme, UriPart::Port])
        );
        assert_eq!(option.params.output, Some(UriOutput::Struct));
    }

    #[test]
    fn test_unknown_part_name_fails_to_deserialize() {
        let result: Result<SchemaConfig, _> = serde_json::from_str(
            r#"{"options": [{"name": "u", "type": "uri", "required_parts": ["hostname"]}]}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_into_schema_applies_policies() {
        let schema = config(
            r#"{"options": [
                {"name": "tag", "type": "string", "unique": false, "alias": ["t"]},
                {"name": "name", "type": ":string", "required": true, "doc": "Who"}
            ]}"#,
        )
        .into_schema()
        .unwrap();

        assert_eq!(
            schema.docs(),
            "  - --tag, -t - string\n  - --name - string, required - Who"
        );
        let parsed = schema.parse(&["-t", "a", "--name", "x", "-t", "b"]).unwrap();
        assert_eq!(
            parsed.get_all("tag"),
            vec![&Value::String("a".into()), &Value::String("b".into())]
        );
    }

    #[test]
    fn test_into_schema_reports_type_errors() {
        let err = config(r#"{"options": [{"name": "x", "type": "enum"}]}"#)
            .into_schema()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidParams { .. }));

        let err = config(r#"{"options": [{"name": "x", "type": "base64", "case": "upper"}]}"#)
            .into_schema()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidParams { .. }));
    }

    #[test]
    fn test_misspelled_keys_are_rejected() {
        let config = config(
            r#"{"options": [{"name": "jobs", "type": "integer", "mni": 5, "requried": true}]}"#,
        );
        assert_eq!(
            config.options[0].unknown.keys().collect::<Vec<_>>(),
            vec!["mni", "requried"]
        );
        assert_eq!(
            config.into_schema().unwrap_err(),
            SchemaError::InvalidParams {
                type_name: "integer".to_string(),
                reason: "parameter 'mni' is not supported".to_string(),
            }
        );
    }

    #[test]
    fn test_numeric_enum_values() {
        let schema = config(r#"{"options": [{"name": "level", "type": "enum", "values": [1, 2]}]}"#)
            .into_schema()
            .unwrap();
        let parsed = schema.parse(&["--level", "2"]).unwrap();
        assert_eq!(parsed.get("level"), Some(&Value::Symbol("2".to_string())));
    }

    #[test]
    fn test_known_keys_are_not_unknown() {
        let config = config(
            r#"{"options": [{"name": "endpoint", "type": "uri", "alias": ["e"],
                "required": true, "required_parts": ["host"], "as": "string"}]}"#,
        );
        assert!(config.options[0].unknown.is_empty());
        assert!(config.into_schema().is_ok());
    }

    #[test]
    fn test_serialize_omits_defaults() {
        let option = OptionConfig {
            name: "jobs".to_string(),
            type_name: "integer".to_string(),
            alias: Vec::new(),
            doc: None,
            required: false,
            unique: true,
            params: TypeParams {
                min: Some(1),
                ..TypeParams::default()
            },
            unknown: BTreeMap::new(),
        };
        let json = serde_json::to_value(&option).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "jobs", "type": "integer", "required": false, "min": 1})
        );
    }
}
