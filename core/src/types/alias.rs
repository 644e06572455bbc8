//! Shorthand type names.
//!
//! Declarative schemas name their value types with short strings
//! (`integer`, `uuid`, `base64`, ...) plus a flat bag of optional
//! parameters. [`resolve_type`] turns such a pair into a concrete
//! [`ValueType`], rejecting parameters the type does not understand.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SchemaError;

use super::{
    Boolean, Bytes, Count, Encoding, Float, Integer, IsoDate, IsoDateTime, IsoNaiveDateTime,
    IsoTime, LetterCase, OneOf, Padding, Text, UriOutput, UriPart, UriType, Uuid, ValueType,
};

/// Optional parameters accompanying a shorthand type name.
///
/// # Examples
///
/// ```
/// use optschema_core::TypeParams;
///
/// let params: TypeParams = serde_json::from_str(r#"{"min": 1, "max": 9}"#).unwrap();
/// assert_eq!(params.min, Some(1));
/// assert!(params.values.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeParams {
    /// Inclusive lower bound (`integer`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Inclusive upper bound (`integer`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Allowed symbols (`enum`). Numbers and booleans are kept in their
    /// string form, which is what tokens are matched against.
    #[serde(
        deserialize_with = "symbols",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub values: Vec<String>,
    /// Letter case policy (`base16`, `base32`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case: Option<LetterCase>,
    /// Padding policy (`base32`, `base64`, `url_base64`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<Padding>,
    /// Mandatory URI components (`uri`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_parts: Option<Vec<UriPart>>,
    /// Produced URI shape (`uri`).
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub output: Option<UriOutput>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

fn symbols<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let scalars = Vec::<Scalar>::deserialize(deserializer)?;
    Ok(scalars
        .into_iter()
        .map(|scalar| match scalar {
            Scalar::Text(text) => text,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(x) => x.to_string(),
            Scalar::Bool(b) => b.to_string(),
        })
        .collect())
}

impl TypeParams {
    fn present(&self) -> Vec<&'static str> {
        let mut present = Vec::new();
        if self.min.is_some() {
            present.push("min");
        }
        if self.max.is_some() {
            present.push("max");
        }
        if !self.values.is_empty() {
            present.push("values");
        }
        if self.case.is_some() {
            present.push("case");
        }
        if self.padding.is_some() {
            present.push("padding");
        }
        if self.required_parts.is_some() {
            present.push("required_parts");
        }
        if self.output.is_some() {
            present.push("as");
        }
        present
    }

    fn only(&self, type_name: &str, allowed: &[&str]) -> Result<(), SchemaError> {
        match self.present().into_iter().find(|p| !allowed.contains(p)) {
            Some(param) => Err(SchemaError::InvalidParams {
                type_name: type_name.to_string(),
                reason: format!("parameter '{param}' is not supported"),
            }),
            None => Ok(()),
        }
    }

    fn bytes(&self, encoding: Encoding) -> Bytes {
        Bytes::new(encoding)
            .with_case(self.case.unwrap_or_default())
            .with_padding(self.padding.unwrap_or_default())
    }
}

/// Resolves a shorthand type name (optionally prefixed with `:`) into a
/// value type.
///
/// # Errors
///
/// Returns [`SchemaError::UnknownType`] for unrecognized names and
/// [`SchemaError::InvalidParams`] when `params` carries parameters the type
/// does not accept, or an `enum` has no values.
///
/// # Examples
///
/// ```
/// use optschema_core::{TypeParams, resolve_type};
///
/// let params = TypeParams { min: Some(0), ..TypeParams::default() };
/// assert_eq!(resolve_type(":integer", &params).unwrap().name(), "integer at least 0");
/// assert!(resolve_type("uuid", &params).is_err());
/// assert!(resolve_type("bogus", &TypeParams::default()).is_err());
/// ```
pub fn resolve_type(type_name: &str, params: &TypeParams) -> Result<Arc<dyn ValueType>, SchemaError> {
    let name = type_name.trim().trim_start_matches(':').to_ascii_lowercase();
    let resolved: Arc<dyn ValueType> = match name.as_str() {
        "boolean" | "bool" => {
            params.only(&name, &[])?;
            Arc::new(Boolean)
        }
        "count" => {
            params.only(&name, &[])?;
            Arc::new(Count)
        }
        "integer" | "int" => {
            params.only(&name, &["min", "max"])?;
            Arc::new(Integer {
                min: params.min,
                max: params.max,
            })
        }
        "float" => {
            params.only(&name, &[])?;
            Arc::new(Float)
        }
        "string" | "str" => {
            params.only(&name, &[])?;
            Arc::new(Text)
        }
        "enum" => {
            params.only(&name, &["values"])?;
            if params.values.is_empty() {
                return Err(SchemaError::InvalidParams {
                    type_name: name.clone(),
                    reason: "at least one value is required".to_string(),
                });
            }
            Arc::new(OneOf::new(params.values.iter().cloned()))
        }
        "uuid" => {
            params.only(&name, &[])?;
            Arc::new(Uuid)
        }
        "base16" | "hex" => {
            params.only(&name, &["case"])?;
            Arc::new(params.bytes(Encoding::Base16))
        }
        "base32" => {
            params.only(&name, &["case", "padding"])?;
            Arc::new(params.bytes(Encoding::Base32))
        }
        "base64" => {
            params.only(&name, &["padding"])?;
            Arc::new(params.bytes(Encoding::Base64))
        }
        "url_base64" | "base64url" => {
            params.only(&name, &["padding"])?;
            Arc::new(params.bytes(Encoding::UrlBase64))
        }
        "date" => {
            params.only(&name, &[])?;
            Arc::new(IsoDate)
        }
        "time" => {
            params.only(&name, &[])?;
            Arc::new(IsoTime)
        }
        "datetime" => {
            params.only(&name, &[])?;
            Arc::new(IsoDateTime)
        }
        "naive_datetime" => {
            params.only(&name, &[])?;
            Arc::new(IsoNaiveDateTime)
        }
        "uri" | "url" => {
            params.only(&name, &["required_parts", "as"])?;
            let mut uri = UriType::new().output(params.output.unwrap_or_default());
            if let Some(parts) = &params.required_parts {
                uri = uri.require(parts.iter().copied());
            }
            Arc::new(uri)
        }
        _ => return Err(SchemaError::UnknownType(type_name.to_string())),
    };
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Raw, SwitchFlag};
    use crate::value::Value;

    fn resolve(name: &str) -> Arc<dyn ValueType> {
        resolve_type(name, &TypeParams::default()).unwrap()
    }

    #[test]
    fn test_aliases_resolve_to_same_type() {
        for (a, b) in [
            ("bool", "boolean"),
            ("int", "integer"),
            ("str", "string"),
            ("hex", "base16"),
            ("base64url", "url_base64"),
            ("url", "uri"),
        ] {
            assert_eq!(resolve(a).name(), resolve(b).name(), "{a} vs {b}");
            assert_eq!(resolve(a).spec(), resolve(b).spec(), "{a} vs {b}");
        }
    }

    #[test]
    fn test_leading_colon_and_case_are_ignored() {
        assert_eq!(resolve(":UUID").name(), "UUID");
        assert_eq!(resolve(":naive_datetime").name(), "ISO-8601 naive datetime");
    }

    #[test]
    fn test_enum_requires_values() {
        let err = resolve_type("enum", &TypeParams::default()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidParams { .. }));

        let params = TypeParams {
            values: vec!["fast".into(), "slow".into()],
            ..TypeParams::default()
        };
        assert_eq!(resolve_type("enum", &params).unwrap().name(), "enum (fast, slow)");
    }

    #[test]
    fn test_enum_values_accept_scalars() {
        let params: TypeParams =
            serde_json::from_str(r#"{"values": [1, "two", 2.5, true]}"#).unwrap();
        assert_eq!(params.values, vec!["1", "two", "2.5", "true"]);

        let ty = resolve_type("enum", &params).unwrap();
        assert_eq!(ty.name(), "enum (1, two, 2.5, true)");
        assert_eq!(
            ty.parse(SwitchFlag::Primary, Raw::Token("1")),
            Ok(Value::Symbol("1".to_string()))
        );
    }

    #[test]
    fn test_rejects_inapplicable_params() {
        let params = TypeParams {
            case: Some(LetterCase::Upper),
            ..TypeParams::default()
        };
        assert_eq!(
            resolve_type("base64", &params).unwrap_err(),
            SchemaError::InvalidParams {
                type_name: "base64".to_string(),
                reason: "parameter 'case' is not supported".to_string(),
            }
        );
        assert!(resolve_type("base32", &params).is_ok());
    }

    #[test]
    fn test_uri_params() {
        let params: TypeParams =
            serde_json::from_str(r#"{"required_parts": ["path"], "as": "struct"}"#).unwrap();
        let ty = resolve_type("uri", &params).unwrap();
        let value = ty.parse(SwitchFlag::Primary, Raw::Token("/just/a/path")).unwrap();
        assert!(matches!(value, Value::Uri(_)));
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            resolve_type("matrix", &TypeParams::default()).unwrap_err(),
            SchemaError::UnknownType("matrix".to_string())
        );
    }
}
