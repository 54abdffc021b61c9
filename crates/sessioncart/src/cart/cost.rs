///
/// CostType
///
/// Well-known extra-cost kinds. Stored under the lowercased variant name,
/// so typed and raw-string callers address the same accumulator.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CostType {
    Shipping,
    Transaction,
}

impl CostType {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::Transaction => "transaction",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Shipping => "shipping cost",
            Self::Transaction => "transaction cost",
        }
    }
}

///
/// CostKey
///
/// Normalized accumulator key: a typed [`CostType`] or any raw string.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct CostKey(String);

impl CostKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<CostType> for CostKey {
    fn from(cost_type: CostType) -> Self {
        Self(cost_type.key().to_string())
    }
}

impl From<&str> for CostKey {
    fn from(s: &str) -> Self {
        Self(s.to_lowercase())
    }
}

impl From<String> for CostKey {
    fn from(s: String) -> Self {
        Self(s.to_lowercase())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_and_raw_keys_normalize_to_the_same_accumulator() {
        assert_eq!(CostKey::from(CostType::Shipping), CostKey::from("Shipping"));
        assert_eq!(CostKey::from("SHIPPING").as_str(), "shipping");
        assert_eq!(
            CostKey::from(CostType::Transaction).as_str(),
            "transaction"
        );
    }

    #[test]
    fn descriptions_label_the_known_kinds() {
        assert_eq!(CostType::Shipping.description(), "shipping cost");
        assert_eq!(CostType::Transaction.description(), "transaction cost");
    }
}
