use crate::item::{ItemId, ItemOptions, OptionValue};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;
use xxhash_rust::xxh3::Xxh3;

/// Row-id format version byte used by the canonical digest encoding.
const ROW_ID_VERSION: u8 = 1;

/// Stable XXH3 seed used by row-id hashing across releases.
const ROW_ID_SEED: u64 = 0;

///
/// RowId
///
/// Content-derived identity of a cart line: the 128-bit XXH3 digest of the
/// canonical encoding of `(id, options)`. Options are hashed in sorted key
/// order, so insertion order never affects identity. Two items with the
/// same id and option set always collapse onto the same row id.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct RowId([u8; 16]);

impl RowId {
    pub const LEN: usize = 16;

    /// Derive the row id for an item identity and option set.
    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn derive(id: &ItemId, options: &ItemOptions) -> Self {
        let mut h = Xxh3::with_seed(ROW_ID_SEED);
        feed_u8(&mut h, ROW_ID_VERSION);

        match id {
            ItemId::Int(n) => {
                feed_u8(&mut h, 0x01);
                h.update(&n.to_be_bytes());
            }
            ItemId::Text(s) => {
                feed_u8(&mut h, 0x02);
                feed_str(&mut h, s);
            }
        }

        // BTreeMap iteration is already canonical key order.
        feed_u32(&mut h, options.len() as u32);
        for (key, value) in options.iter() {
            feed_u8(&mut h, 0xFD);
            feed_str(&mut h, key);
            feed_u8(&mut h, 0xFE);
            feed_option_value(&mut h, value);
        }

        Self(h.digest128().to_be_bytes())
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }
}

fn feed_u8(h: &mut Xxh3, x: u8) {
    h.update(&[x]);
}

fn feed_u32(h: &mut Xxh3, x: u32) {
    h.update(&x.to_be_bytes());
}

// Strings are length-framed so adjacent fields cannot collide.
#[expect(clippy::cast_possible_truncation)]
fn feed_str(h: &mut Xxh3, s: &str) {
    feed_u32(h, s.len() as u32);
    h.update(s.as_bytes());
}

fn feed_option_value(h: &mut Xxh3, value: &OptionValue) {
    feed_u8(h, value.canonical_tag());

    match value {
        OptionValue::Text(s) => feed_str(h, s),
        OptionValue::Int(n) => h.update(&n.to_be_bytes()),
        OptionValue::Bool(b) => feed_u8(h, u8::from(*b)),
        OptionValue::Decimal(d) => {
            let normalized = d.normalize();

            // encode (sign, scale, mantissa) deterministically:
            feed_u8(h, u8::from(normalized.is_sign_negative()));
            feed_u32(h, normalized.scale());
            h.update(&normalized.mantissa().to_be_bytes());
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

///
/// RowIdParseError
///

#[derive(Debug, ThisError)]
pub enum RowIdParseError {
    #[error("row id must be {} hex characters, found {found}", RowId::LEN * 2)]
    InvalidLength { found: usize },
    #[error("row id contains a non-hex character")]
    InvalidHex,
}

impl FromStr for RowId {
    type Err = RowIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::LEN * 2 {
            return Err(RowIdParseError::InvalidLength { found: s.len() });
        }

        let mut bytes = [0u8; Self::LEN];
        for (i, chunk) in s.as_bytes().chunks_exact(2).enumerate() {
            let pair = std::str::from_utf8(chunk).map_err(|_| RowIdParseError::InvalidHex)?;
            bytes[i] = u8::from_str_radix(pair, 16).map_err(|_| RowIdParseError::InvalidHex)?;
        }

        Ok(Self(bytes))
    }
}

// Serde:
// - Human-readable formats (e.g. JSON) use the hex string for API ergonomics.
// - Non-human-readable formats (e.g. CBOR persistence) use the raw 16 bytes.
impl Serialize for RowId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            return serializer.serialize_str(&self.to_string());
        }

        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for RowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct BytesVisitor;

        impl serde::de::Visitor<'_> for BytesVisitor {
            type Value = RowId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} row-id bytes", RowId::LEN)
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let bytes: [u8; RowId::LEN] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &self))?;
                Ok(RowId(bytes))
            }
        }

        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            return s.parse::<Self>().map_err(serde::de::Error::custom);
        }

        deserializer.deserialize_bytes(BytesVisitor)
    }
}

///
/// TESTS
///
