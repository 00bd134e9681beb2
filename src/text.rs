//! The `text` module provides the `Text` type. Strings in the project file are
//! raw UTF-16LE bytes with no BOM, and a trailing `00 00` may or may not be
//! present. We hold a `String` whenever the bytes are valid UTF-16 (keeping any
//! trailing NUL characters so re-encoding is byte-exact), and revert to holding
//! the raw bytes when they are not.

use log::warn;
use std::borrow::Cow;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Text {
    /// A string decoded from well-formed UTF-16LE bytes.
    Utf16(String),
    /// Bytes that are not valid UTF-16LE (odd length or bad surrogates).
    Raw(Vec<u8>),
}

impl Default for Text {
    fn default() -> Self {
        Text::Utf16(String::new())
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Text::Utf16(s) => Display::fmt(s.trim_end_matches('\0'), f),
            Text::Raw(b) => write!(f, "{}", String::from_utf8_lossy(b)),
        }
    }
}

impl From<Vec<u8>> for Text {
    fn from(bytes: Vec<u8>) -> Self {
        if bytes.len() % 2 != 0 {
            warn!("odd-length string payload, keeping raw bytes");
            return Text::Raw(bytes);
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        match String::from_utf16(&units) {
            Ok(s) => Text::Utf16(s),
            Err(_) => {
                warn!("non UTF-16 string encountered, keeping raw bytes");
                Text::Raw(bytes)
            }
        }
    }
}

impl From<String> for Text {
    fn from(s: String) -> Self {
        Text::Utf16(s)
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Self {
        Text::Utf16(s.into())
    }
}

impl Text {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Text::Utf16(s.into())
    }

    /// The exact bytes this string serializes to.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Text::Utf16(s) => s
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes().to_vec())
                .collect(),
            Text::Raw(b) => b.clone(),
        }
    }

    pub fn as_str(&self) -> Cow<'_, str> {
        match self {
            Text::Utf16(s) => Cow::Borrowed(s.as_str()),
            Text::Raw(b) => String::from_utf8_lossy(b),
        }
    }
}
