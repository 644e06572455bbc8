//! Parsed option values.
//!
//! Every value type produces one [`Value`]. Values serialize with [`serde`]
//! (untagged, so JSON output reads naturally) and display in an
//! inspect-like form used by validation messages.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::Serialize;

/// A value produced by parsing one switch occurrence.
///
/// # Examples
///
/// ```
/// use optschema_core::Value;
///
/// assert_eq!(Value::Integer(-3).to_string(), "-3");
/// assert_eq!(Value::String("a b".into()).to_string(), "\"a b\"");
/// assert_eq!(Value::Symbol("fast".into()).as_str(), Some("fast"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean switch state.
    Bool(bool),
    /// Number of times a counting switch occurred.
    Count(u64),
    /// Signed integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Free-form or validated text.
    String(String),
    /// One of an enumerated set of symbols.
    Symbol(String),
    /// Decoded bytes.
    Bytes(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Instant normalized to UTC.
    DateTime(chrono::DateTime<Utc>),
    /// Date and time without offset.
    NaiveDateTime(chrono::NaiveDateTime),
    /// Structured URI.
    Uri(Uri),
}

impl Value {
    /// Returns the boolean, if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number for [`Value::Integer`] and [`Value::Count`].
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Count(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Returns the number for [`Value::Float`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text for [`Value::String`] and [`Value::Symbol`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bytes for [`Value::Bytes`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Count(n) => write!(f, "{n}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Symbol(s) => f.write_str(s),
            Self::Bytes(bytes) => {
                f.write_str("0x")?;
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Time(t) => write!(f, "{}", t.format("%H:%M:%S%.f")),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::NaiveDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Self::Uri(uri) => write!(f, "{uri}"),
        }
    }
}

/// URI split into its RFC 3986 components.
///
/// Absent components are `None`; present-but-empty components (such as the
/// query in `http://host/?`) are `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Uri {
    pub scheme: Option<String>,
    pub userinfo: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub path: Option<String>,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}:")?;
        }
        if self.host.is_some() || self.userinfo.is_some() || self.port.is_some() {
            f.write_str("//")?;
            if let Some(userinfo) = &self.userinfo {
                write!(f, "{userinfo}@")?;
            }
            if let Some(host) = &self.host {
                if host.contains(':') {
                    write!(f, "[{host}]")?;
                } else {
                    f.write_str(host)?;
                }
            }
            if let Some(port) = self.port {
                write!(f, ":{port}")?;
            }
        }
        if let Some(path) = &self.path {
            f.write_str(path)?;
        }
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}
