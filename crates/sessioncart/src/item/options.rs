use derive_more::{Deref, DerefMut};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

///
/// OptionValue
///
/// One purchase-time variation value (size, color, weight, ...). Each kind
/// carries a stable tag byte so row-id hashing never conflates kinds.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum OptionValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Decimal(Decimal),
}

impl OptionValue {
    /// Canonical tag byte fed into the row-id digest ahead of the payload.
    /// Frozen; changing a tag changes every derived row id.
    #[must_use]
    pub const fn canonical_tag(&self) -> u8 {
        match self {
            Self::Text(_) => 0x10,
            Self::Int(_) => 0x11,
            Self::Bool(_) => 0x12,
            Self::Decimal(_) => 0x13,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Decimal(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Decimal> for OptionValue {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

///
/// ItemOptions
///
/// Ordered option set for one cart line, keyed by option name. Backed by a
/// sorted map, so identity hashing sees a canonical key order regardless of
/// how callers inserted entries.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Deserialize, Eq, PartialEq, Serialize,
)]
pub struct ItemOptions(BTreeMap<String, OptionValue>);

impl ItemOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert for fixture and call-site ergonomics.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl FromIterator<(String, OptionValue)> for ItemOptions {
    fn from_iter<I: IntoIterator<Item = (String, OptionValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<BTreeMap<String, OptionValue>> for ItemOptions {
    fn from(map: BTreeMap<String, OptionValue>) -> Self {
        Self(map)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_iterate_in_sorted_key_order() {
        let options = ItemOptions::new()
            .with("size", "XL")
            .with("color", "red")
            .with("gift", true);

        let keys: Vec<&str> = options.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["color", "gift", "size"]);
    }

    #[test]
    fn with_replaces_existing_keys() {
        let options = ItemOptions::new().with("size", "M").with("size", "XL");

        assert_eq!(options.len(), 1);
        assert_eq!(options.get("size"), Some(&OptionValue::Text("XL".into())));
    }

    #[test]
    fn option_values_round_trip_through_cbor() {
        let options = ItemOptions::new()
            .with("size", "XL")
            .with("count", 3i64)
            .with("gift", false)
            .with("weight", Decimal::new(125, 2));

        let bytes = crate::serialize::serialize(&options).expect("serialize");
        let back: ItemOptions = crate::serialize::deserialize(&bytes).expect("deserialize");

        assert_eq!(back, options);
    }
}
