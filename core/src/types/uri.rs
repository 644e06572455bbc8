use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Failure, Message};
use crate::value::{Uri, Value};

use super::{Raw, SwitchFlag, ValueSpec, ValueType, require_token};

// RFC 3986 Appendix B.
static URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:(?P<scheme>[^:/?#]+):)?(?://(?P<authority>[^/?#]*))?(?P<path>[^?#]*)(?:\?(?P<query>[^#]*))?(?:#(?P<fragment>.*))?$",
    )
    .expect("valid URI regex")
});

/// Named URI component, in canonical reporting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UriPart {
    Scheme,
    Userinfo,
    Host,
    Port,
    Path,
    Query,
    Fragment,
}

impl UriPart {
    /// All parts in canonical order.
    pub const ALL: [UriPart; 7] = [
        Self::Scheme,
        Self::Userinfo,
        Self::Host,
        Self::Port,
        Self::Path,
        Self::Query,
        Self::Fragment,
    ];

    /// Looks a part up by its lowercase name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|part| part.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheme => "scheme",
            Self::Userinfo => "userinfo",
            Self::Host => "host",
            Self::Port => "port",
            Self::Path => "path",
            Self::Query => "query",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for UriPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the value produced by [`UriType`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UriOutput {
    /// The validated token, unchanged.
    #[default]
    String,
    /// A [`Uri`] with every component split out.
    Struct,
}

/// URI with a configurable set of mandatory components.
///
/// By default a scheme and a host are required. A `port` requirement is met
/// by an explicit port or by a scheme with a well-known default port.
///
/// # Examples
///
/// ```
/// use optschema_core::{Failure, Raw, SwitchFlag, UriPart, UriType, ValueType};
///
/// let ty = UriType::new().require([UriPart::Scheme, UriPart::Port, UriPart::Path]);
/// assert!(ty.parse(SwitchFlag::Primary, Raw::Token("https://example.com/x")).is_ok());
///
/// let Err(Failure::Message(msg)) = ty.parse(SwitchFlag::Primary, Raw::Token("//example.com")) else {
///     panic!("expected a message");
/// };
/// assert_eq!(msg.to_string(), r#"URI "//example.com" is missing scheme, port, path"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriType {
    required: Vec<UriPart>,
    output: UriOutput,
}

impl Default for UriType {
    fn default() -> Self {
        Self {
            required: vec![UriPart::Scheme, UriPart::Host],
            output: UriOutput::String,
        }
    }
}

impl UriType {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the set of mandatory components.
    pub fn require(mut self, parts: impl IntoIterator<Item = UriPart>) -> Self {
        self.required = parts.into_iter().collect();
        self
    }

    /// Selects the produced value shape.
    pub fn output(mut self, output: UriOutput) -> Self {
        self.output = output;
        self
    }

    fn missing(&self, uri: &Uri) -> Vec<UriPart> {
        UriPart::ALL
            .into_iter()
            .filter(|part| self.required.contains(part))
            .filter(|part| !has_part(uri, *part))
            .collect()
    }
}

impl ValueType for UriType {
    fn name(&self) -> String {
        "URI".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let token = require_token(raw)?;
        let uri = split_uri(token).ok_or(Failure::Generic)?;
        let missing = self.missing(&uri);
        if !missing.is_empty() {
            let parts: Vec<&str> = missing.iter().map(|part| part.as_str()).collect();
            return Err(Failure::Message(
                Message::new()
                    .push(format!("URI {token:?} is missing "))
                    .push(parts.join(", ")),
            ));
        }
        Ok(match self.output {
            UriOutput::String => Value::String(token.to_string()),
            UriOutput::Struct => Value::Uri(uri),
        })
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Uri {
            structured: self.output == UriOutput::Struct,
        }
    }
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme.to_ascii_lowercase().as_str() {
        "ftp" => Some(21),
        "sftp" | "ssh" => Some(22),
        "tftp" => Some(69),
        "http" | "ws" => Some(80),
        "ldap" => Some(389),
        "https" | "wss" => Some(443),
        _ => None,
    }
}

fn has_part(uri: &Uri, part: UriPart) -> bool {
    match part {
        UriPart::Scheme => uri.scheme.is_some(),
        UriPart::Userinfo => uri.userinfo.is_some(),
        UriPart::Host => uri.host.as_deref().is_some_and(|host| !host.is_empty()),
        UriPart::Port => {
            uri.port.is_some() || uri.scheme.as_deref().and_then(default_port).is_some()
        }
        UriPart::Path => uri.path.is_some(),
        UriPart::Query => uri.query.is_some(),
        UriPart::Fragment => uri.fragment.is_some(),
    }
}

/// Splits `input` into components. Returns `None` for an unparseable port.
fn split_uri(input: &str) -> Option<Uri> {
    let caps = URI_PATTERN.captures(input)?;
    let text = |name: &str| caps.name(name).map(|m| m.as_str().to_string());

    let mut uri = Uri {
        scheme: text("scheme"),
        path: text("path").filter(|path| !path.is_empty()),
        query: text("query"),
        fragment: text("fragment"),
        ..Uri::default()
    };

    if let Some(authority) = caps.name("authority").map(|m| m.as_str()) {
        let (userinfo, hostport) = match authority.rsplit_once('@') {
            Some((userinfo, hostport)) => (Some(userinfo.to_string()), hostport),
            None => (None, authority),
        };
        let (host, port) = split_host_port(hostport)?;
        uri.userinfo = userinfo;
        uri.host = Some(host.to_string());
        uri.port = port;
    }

    Some(uri)
}

fn split_host_port(hostport: &str) -> Option<(&str, Option<u16>)> {
    let (host, port) = if let Some(rest) = hostport.strip_prefix('[') {
        let (host, after) = rest.split_once(']')?;
        match after {
            "" => (host, None),
            _ => (host, Some(after.strip_prefix(':')?)),
        }
    } else {
        match hostport.rsplit_once(':') {
            // Unbracketed hosts cannot contain a colon.
            Some((host, _)) if host.contains(':') => return None,
            Some((host, port)) => (host, Some(port)),
            None => (hostport, None),
        }
    };

    match port {
        None | Some("") => Some((host, None)),
        Some(port) => Some((host, Some(port.parse().ok()?))),
    }
}
