use std::{borrow::Cow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const HEX_PREFIX: &str = "0x";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("hex string {0:?} is missing the 0x prefix")]
    MissingPrefix(String),
    #[error("hex string {0:?} has an odd number of digits")]
    OddLength(String),
    #[error("hex string {0:?} contains a non-hex character")]
    InvalidDigit(String),
}

/// How hex strings read back from stored block documents are interpreted.
///
/// `Strict` requires the `0x` prefix and reads an odd number of digits as a quantity with its
/// leading zero dropped (`"0x1"` is `[0x01]`), the way Ethereum JSON writes quantities.
/// `Legacy` accepts the inconsistent encodings found in older stored blocks, see
/// [`normalize_legacy_hex`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HexPolicy {
    #[default]
    Strict,
    Legacy,
}

impl fmt::Display for HexPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HexPolicy::Strict => write!(f, "strict"),
            HexPolicy::Legacy => write!(f, "legacy"),
        }
    }
}

impl FromStr for HexPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strict" => Ok(HexPolicy::Strict),
            "legacy" => Ok(HexPolicy::Legacy),
            _ => Err(format!("unknown hex policy {s:?}, expected `strict` or `legacy`")),
        }
    }
}

/// Normalizes a hex string written by older block producers into bare hex digits.
///
/// Those producers wrote the same quantity either as `0x`-prefixed hex or with a bare `x`
/// delimiter in front of an odd number of digits. There is no tag telling the two apart, so
/// the parity of the payload decides: if stripping `0x` leaves an even number of characters
/// the prefix is dropped, otherwise only the `x` is removed, which keeps the leading `0` as
/// padding (`"0xa"` becomes `"0a"`).
///
/// The result is not validated; an odd-length or non-hex result fails in [`decode_legacy_hex`].
pub fn normalize_legacy_hex(s: &str) -> Cow<'_, str> {
    let payload = s.strip_prefix(HEX_PREFIX).unwrap_or(s);
    if payload.len() % 2 == 0 {
        Cow::Borrowed(payload)
    } else {
        log::trace!("Treating {s:?} as bare-x delimited hex");
        Cow::Owned(s.replacen('x', "", 1))
    }
}

pub fn decode_legacy_hex(s: &str) -> Result<Vec<u8>, HexError> {
    decode_digits(&normalize_legacy_hex(s), s)
}

/// Decodes `0x`-prefixed hex. An odd number of digits is left-padded with a zero.
pub fn decode_prefixed_hex(s: &str) -> Result<Vec<u8>, HexError> {
    let payload = s.strip_prefix(HEX_PREFIX).ok_or_else(|| HexError::MissingPrefix(s.to_owned()))?;
    if payload.len() % 2 == 1 {
        decode_digits(&format!("0{payload}"), s)
    } else {
        decode_digits(payload, s)
    }
}

pub fn decode_hex(s: &str, policy: HexPolicy) -> Result<Vec<u8>, HexError> {
    match policy {
        HexPolicy::Strict => decode_prefixed_hex(s),
        HexPolicy::Legacy => decode_legacy_hex(s),
    }
}

/// Encodes bytes as `0x` followed by two lowercase hex digits per byte.
pub fn encode_prefixed_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("{HEX_PREFIX}{}", ::hex::encode(bytes))
}

fn decode_digits(digits: &str, original: &str) -> Result<Vec<u8>, HexError> {
    ::hex::decode(digits).map_err(|err| match err {
        ::hex::FromHexError::OddLength => HexError::OddLength(original.to_owned()),
        _ => HexError::InvalidDigit(original.to_owned()),
    })
}
