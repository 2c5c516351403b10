//! MAC address type used for emulated hosts.
//!
//! Host MACs are derived from plain integers, so besides parsing and
//! formatting the type converts to and from the low 48 bits of a `u64`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A 6-octet MAC address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Mac(pub [u8; 6]);

/// Errors which can occur while converting a string to a [`Mac`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MacParseError {
    #[error("invalid string representation of mac address: {0}")]
    Invalid(String),
}

impl Mac {
    /// Largest integer that still fits in 48 bits
    pub const MAX_VALUE: u64 = 0xffff_ffff_ffff;

    /// Build a MAC from an integer, `None` if it needs more than 48 bits.
    pub fn from_u64(value: u64) -> Option<Mac> {
        if value > Self::MAX_VALUE {
            return None;
        }
        let bytes = value.to_be_bytes();
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&bytes[2..]);
        Some(Mac(octets))
    }

    pub fn to_u64(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |acc, octet| (acc << 8) | u64::from(*octet))
    }
}

impl From<[u8; 6]> for Mac {
    fn from(value: [u8; 6]) -> Self {
        Mac(value)
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for Mac {
    type Err = MacParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || MacParseError::Invalid(value.to_string());

        let mut octets = [0u8; 6];
        let mut count = 0;
        for part in value.trim().split(':') {
            if count == octets.len() || part.len() != 2 {
                return Err(invalid());
            }
            if !part.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            octets[count] = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
            count += 1;
        }

        if count != octets.len() {
            return Err(invalid());
        }
        Ok(Mac(octets))
    }
}

impl Serialize for Mac {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Mac {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
