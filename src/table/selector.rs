//! Selector kinds and values used to key dissector tables.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Width of the unsigned integer keys of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UintWidth {
    /// One byte.
    U8,
    /// Two bytes.
    U16,
    /// Three bytes.
    U24,
    /// Four bytes.
    U32,
}

impl UintWidth {
    /// Width in bytes.
    #[must_use]
    pub const fn bytes(self) -> u8 {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U24 => 3,
            Self::U32 => 4,
        }
    }

    /// Largest key representable at this width.
    #[must_use]
    pub const fn max(self) -> u32 {
        match self {
            Self::U8 => 0xff,
            Self::U16 => 0xffff,
            Self::U24 => 0x00ff_ffff,
            Self::U32 => u32::MAX,
        }
    }
}

/// How string keys are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StringCase {
    /// Exact comparison.
    Sensitive,
    /// ASCII and Unicode lowercase folding before comparison.
    Insensitive,
}

/// Kind of selector a table is keyed by. Fixed when the table is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectorKind {
    /// Unsigned integers of the given width.
    Uint(UintWidth),
    /// Strings compared as described.
    String(StringCase),
    /// 128-bit GUIDs.
    Guid,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(width) => write!(f, "uint{}", u32::from(width.bytes()) * 8),
            Self::String(StringCase::Sensitive) => f.write_str("string"),
            Self::String(StringCase::Insensitive) => f.write_str("case-insensitive string"),
            Self::Guid => f.write_str("guid"),
        }
    }
}

/// A 128-bit globally unique identifier.
///
/// ```
/// use dissect_core::table::Guid;
///
/// let guid: Guid = "e3514235-4b06-11d1-ab04-00c04fc2dcd2".parse().expect("valid guid");
/// assert_eq!(guid.data1, 0xe351_4235);
/// assert_eq!(guid.to_string(), "e3514235-4b06-11d1-ab04-00c04fc2dcd2");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Guid {
    /// First group, 32 bits.
    pub data1: u32,
    /// Second group, 16 bits.
    pub data2: u16,
    /// Third group, 16 bits.
    pub data3: u16,
    /// Final eight bytes.
    pub data4: [u8; 8],
}

impl Guid {
    /// Construct a GUID from its four groups.
    #[must_use]
    pub const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        Self {
            data1,
            data2,
            data3,
            data4,
        }
    }

    /// Decode the mixed-endian wire form used by DCE/RPC and COM, where the
    /// first three groups are little-endian.
    #[must_use]
    pub fn from_bytes_le(bytes: [u8; 16]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..]);
        Self {
            data1: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_le_bytes([bytes[4], bytes[5]]),
            data3: u16::from_le_bytes([bytes[6], bytes[7]]),
            data4,
        }
    }

    /// Decode the big-endian (RFC 4122) wire form.
    #[must_use]
    pub fn from_bytes_be(bytes: [u8; 16]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..]);
        Self {
            data1: u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            data2: u16::from_be_bytes([bytes[4], bytes[5]]),
            data3: u16::from_be_bytes([bytes[6], bytes[7]]),
            data4,
        }
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.data4;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
            self.data1, self.data2, self.data3, d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7]
        )
    }
}

/// Error returned when parsing a [`Guid`] from text fails.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid guid `{0}`")]
pub struct ParseGuidError(String);

impl FromStr for Guid {
    type Err = ParseGuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseGuidError(s.to_owned());
        let groups: Vec<&str> = s.split('-').collect();
        let [g1, g2, g3, g4, g5] = groups.as_slice() else {
            return Err(invalid());
        };
        let widths = [(g1, 8), (g2, 4), (g3, 4), (g4, 4), (g5, 12)];
        // `from_str_radix` tolerates a sign prefix, so check digits up front.
        if widths
            .iter()
            .any(|(group, width)| group.len() != *width || !group.bytes().all(|b| b.is_ascii_hexdigit()))
        {
            return Err(invalid());
        }
        let data1 = u32::from_str_radix(g1, 16).map_err(|_| invalid())?;
        let data2 = u16::from_str_radix(g2, 16).map_err(|_| invalid())?;
        let data3 = u16::from_str_radix(g3, 16).map_err(|_| invalid())?;
        let tail = format!("{g4}{g5}");
        let mut data4 = [0u8; 8];
        for (i, byte) in data4.iter_mut().enumerate() {
            let pair = tail.get(i * 2..i * 2 + 2).ok_or_else(invalid)?;
            *byte = u8::from_str_radix(pair, 16).map_err(|_| invalid())?;
        }
        Ok(Self::new(data1, data2, data3, data4))
    }
}

/// A value used to pick a binding in a dissector table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Selector {
    /// Integer key such as a port number.
    Uint(u32),
    /// String key such as a media type.
    String(String),
    /// GUID key such as a DCE/RPC interface.
    Guid(Guid),
}

impl Selector {
    /// Name of this selector's kind, for diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Uint(_) => "uint",
            Self::String(_) => "string",
            Self::Guid(_) => "guid",
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uint(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Guid(value) => write!(f, "{value}"),
        }
    }
}

impl From<u8> for Selector {
    fn from(value: u8) -> Self { Self::Uint(value.into()) }
}

impl From<u16> for Selector {
    fn from(value: u16) -> Self { Self::Uint(value.into()) }
}

impl From<u32> for Selector {
    fn from(value: u32) -> Self { Self::Uint(value) }
}

impl From<&str> for Selector {
    fn from(value: &str) -> Self { Self::String(value.to_owned()) }
}

impl From<String> for Selector {
    fn from(value: String) -> Self { Self::String(value) }
}

impl From<Guid> for Selector {
    fn from(value: Guid) -> Self { Self::Guid(value) }
}
