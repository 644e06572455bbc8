use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use serde::{Deserialize, Serialize};

use crate::error::Failure;
use crate::value::Value;

use super::{Raw, SwitchFlag, ValueSpec, ValueType, require_token};

const PADDING_OPTIONAL: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const PADDING_REQUIRED: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::RequireCanonical);

const STANDARD_OPTIONAL: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PADDING_OPTIONAL);
const STANDARD_REQUIRED: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PADDING_REQUIRED);
const URL_SAFE_OPTIONAL: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_OPTIONAL);
const URL_SAFE_REQUIRED: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PADDING_REQUIRED);

/// Byte-to-text encoding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Base16,
    Base32,
    Base64,
    UrlBase64,
}

/// Letter case accepted by base-16 and base-32 decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterCase {
    Upper,
    Lower,
    #[default]
    Mixed,
}

/// Padding policy for base-32 and base-64 decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    /// Padded and unpadded input are both accepted.
    #[default]
    Optional,
    /// Input must carry canonical `=` padding.
    Required,
}

/// Encoded binary data, decoded to [`Value::Bytes`].
///
/// The case policy only applies to base-16 and base-32; the padding policy
/// only applies to base-32 and the base-64 variants. Inapplicable policies
/// are ignored.
///
/// # Examples
///
/// ```
/// use optschema_core::{Bytes, LetterCase, Raw, SwitchFlag, Value, ValueType};
///
/// let hex = Bytes::base16().with_case(LetterCase::Lower);
/// assert_eq!(hex.parse(SwitchFlag::Primary, Raw::Token("cafe")), Ok(Value::Bytes(vec![0xca, 0xfe])));
/// assert!(hex.parse(SwitchFlag::Primary, Raw::Token("CAFE")).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bytes {
    pub encoding: Encoding,
    pub case: LetterCase,
    pub padding: Padding,
}

impl Bytes {
    /// Decoder for `encoding` with default policies.
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            case: LetterCase::default(),
            padding: Padding::default(),
        }
    }

    pub fn base16() -> Self {
        Self::new(Encoding::Base16)
    }

    pub fn base32() -> Self {
        Self::new(Encoding::Base32)
    }

    pub fn base64() -> Self {
        Self::new(Encoding::Base64)
    }

    pub fn url_base64() -> Self {
        Self::new(Encoding::UrlBase64)
    }

    /// Restricts the accepted letter case.
    pub fn with_case(mut self, case: LetterCase) -> Self {
        self.case = case;
        self
    }

    /// Sets the padding policy.
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    fn decode(&self, input: &str) -> Option<Vec<u8>> {
        match (self.encoding, self.padding) {
            (Encoding::Base16, _) => decode_base16(input, self.case),
            (Encoding::Base32, padding) => decode_base32(input, self.case, padding),
            (Encoding::Base64, Padding::Optional) => STANDARD_OPTIONAL.decode(input).ok(),
            (Encoding::Base64, Padding::Required) => STANDARD_REQUIRED.decode(input).ok(),
            (Encoding::UrlBase64, Padding::Optional) => URL_SAFE_OPTIONAL.decode(input).ok(),
            (Encoding::UrlBase64, Padding::Required) => URL_SAFE_REQUIRED.decode(input).ok(),
        }
    }
}

impl ValueType for Bytes {
    fn name(&self) -> String {
        let base = match self.encoding {
            Encoding::Base16 => "base16",
            Encoding::Base32 => "base32",
            Encoding::Base64 => "base64",
            Encoding::UrlBase64 => "url-safe base64",
        };
        match (self.encoding, self.case) {
            (Encoding::Base16 | Encoding::Base32, LetterCase::Upper) => format!("uppercase {base}"),
            (Encoding::Base16 | Encoding::Base32, LetterCase::Lower) => format!("lowercase {base}"),
            _ => base.to_string(),
        }
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        self.decode(require_token(raw)?)
            .map(Value::Bytes)
            .ok_or(Failure::Generic)
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Bytes {
            encoding: self.encoding,
        }
    }
}

fn hex_digit(c: u8, case: LetterCase) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' if case != LetterCase::Lower => Some(c - b'A' + 10),
        b'a'..=b'f' if case != LetterCase::Upper => Some(c - b'a' + 10),
        _ => None,
    }
}

fn decode_base16(input: &str, case: LetterCase) -> Option<Vec<u8>> {
    if input.len() % 2 != 0 {
        return None;
    }
    input
        .as_bytes()
        .chunks(2)
        .map(|pair| Some((hex_digit(pair[0], case)? << 4) | hex_digit(pair[1], case)?))
        .collect()
}

fn base32_digit(c: u8, case: LetterCase) -> Option<u8> {
    match c {
        b'A'..=b'Z' if case != LetterCase::Lower => Some(c - b'A'),
        b'a'..=b'z' if case != LetterCase::Upper => Some(c - b'a'),
        b'2'..=b'7' => Some(c - b'2' + 26),
        _ => None,
    }
}

// RFC 4648 §6 alphabet. Trailing bits must be zero.
fn decode_base32(input: &str, case: LetterCase, padding: Padding) -> Option<Vec<u8>> {
    let data = input.trim_end_matches('=');
    let pad = input.len() - data.len();
    let expected_pad = match data.len() % 8 {
        0 => 0,
        2 => 6,
        4 => 4,
        5 => 3,
        7 => 1,
        _ => return None,
    };
    let padded_ok = pad == expected_pad && input.len() % 8 == 0;
    match padding {
        Padding::Required if !padded_ok => return None,
        Padding::Optional if pad != 0 && !padded_ok => return None,
        _ => {}
    }

    let mut out = Vec::with_capacity(data.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for c in data.bytes() {
        buffer = (buffer << 5) | u32::from(base32_digit(c, case)?);
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    if buffer != 0 {
        return None;
    }
    Some(out)
}
