mod options;

pub use options::{ItemOptions, OptionValue};

use crate::{buyable::Purchasable, config::NumberFormat, format::number_format, row_id::RowId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// ItemError
///
/// InvalidArgument family: raised at construction or quantity-set time,
/// never on derived-field reads.
///

#[derive(Debug, Eq, PartialEq, ThisError)]
pub enum ItemError {
    #[error("item identifier must not be empty")]
    InvalidIdentifier,

    #[error("item name must not be empty")]
    InvalidName,

    #[error("item price must not be negative")]
    InvalidPrice,

    #[error("item quantity must be at least 1, found {found}")]
    InvalidQuantity { found: i64 },
}

///
/// ItemId
///
/// External product identifier, numeric or textual. Text identifiers must
/// be non-empty; the two kinds hash under distinct row-id tags.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for ItemId {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

///
/// ItemAttributes
///
/// Explicit attribute-set entry point for building a line item, the typed
/// replacement for a raw attribute mapping. Quantity is required here.
///

#[derive(Clone, Debug)]
pub struct ItemAttributes {
    pub id: ItemId,
    pub name: String,
    pub price: Decimal,
    pub qty: i64,
    pub options: ItemOptions,
}

///
/// ItemPatch
///
/// Selective field overwrite for an existing line item. Absent fields keep
/// their current values. A patched quantity is applied unchecked so a
/// non-positive value can flow into cart-level removal.
///

#[derive(Clone, Debug, Default)]
pub struct ItemPatch {
    pub id: Option<ItemId>,
    pub qty: Option<i64>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub options: Option<ItemOptions>,
}

impl ItemPatch {
    #[must_use]
    pub fn id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub const fn qty(mut self, qty: i64) -> Self {
        self.qty = Some(qty);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub const fn price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn options(mut self, options: impl Into<ItemOptions>) -> Self {
        self.options = Some(options.into());
        self
    }
}

///
/// LineItem
///
/// One purchasable entry in a cart: immutable-identity (row id derived from
/// id + options, recomputed on any identity-affecting mutation), mutable
/// quantity, full-precision unit price excluding tax.
///
/// Invariants:
/// - `qty >= 1` on every checked set
/// - `price >= 0`, `name` and textual ids non-empty at construction
/// - derived monetary reads are computed at access time, never cached
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct LineItem {
    row_id: RowId,
    id: ItemId,
    name: String,
    qty: i64,
    price: Decimal,
    options: ItemOptions,
    tax_rate: Decimal,
    associated: Option<String>,
}

impl LineItem {
    /// Validating constructor; all other entry points converge here.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: Decimal,
        options: ItemOptions,
    ) -> Result<Self, ItemError> {
        let id = id.into();
        let name = name.into();

        if matches!(&id, ItemId::Text(s) if s.is_empty()) {
            return Err(ItemError::InvalidIdentifier);
        }
        if name.is_empty() {
            return Err(ItemError::InvalidName);
        }
        if price < Decimal::ZERO {
            return Err(ItemError::InvalidPrice);
        }

        let row_id = RowId::derive(&id, &options);

        Ok(Self {
            row_id,
            id,
            name,
            qty: 1,
            price,
            options,
            tax_rate: Decimal::ZERO,
            associated: None,
        })
    }

    /// Build from a purchasable capability, passing the options through for
    /// context-sensitive identity, description, and pricing.
    pub fn from_buyable(item: &dyn Purchasable, options: ItemOptions) -> Result<Self, ItemError> {
        Self::new(
            item.identifier(&options),
            item.description(&options),
            item.price(&options),
            options,
        )
    }

    /// Build from an explicit attribute set, including quantity.
    pub fn from_attributes(attrs: ItemAttributes) -> Result<Self, ItemError> {
        let mut item = Self::new(attrs.id, attrs.name, attrs.price, attrs.options)?;
        item.set_quantity(attrs.qty)?;

        Ok(item)
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[must_use]
    pub const fn row_id(&self) -> RowId {
        self.row_id
    }

    #[must_use]
    pub const fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn quantity(&self) -> i64 {
        self.qty
    }

    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    #[must_use]
    pub const fn options(&self) -> &ItemOptions {
        &self.options
    }

    #[must_use]
    pub const fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Loosely-bound entity name recorded by association, if any.
    #[must_use]
    pub fn associated(&self) -> Option<&str> {
        self.associated.as_deref()
    }

    // ---------------------------------------------------------------------
    // Mutation
    // ---------------------------------------------------------------------

    /// Set the quantity; fails for anything below 1.
    pub fn set_quantity(&mut self, qty: i64) -> Result<(), ItemError> {
        if qty < 1 {
            return Err(ItemError::InvalidQuantity { found: qty });
        }
        self.qty = qty;

        Ok(())
    }

    // Unchecked set used by the cart's scalar-quantity update path, where a
    // non-positive value means "remove the item".
    pub(crate) const fn set_quantity_unchecked(&mut self, qty: i64) {
        self.qty = qty;
    }

    /// Refresh id, name, and price from the capability. Quantity and options
    /// are untouched; the row id is recomputed because the id may change.
    pub fn update_from_buyable(&mut self, item: &dyn Purchasable) {
        self.id = item.identifier(&self.options);
        self.name = item.description(&self.options);
        self.price = item.price(&self.options);
        self.row_id = RowId::derive(&self.id, &self.options);
    }

    /// Apply a selective patch; identity is recomputed iff id or options
    /// were part of the patch.
    pub fn update_from_attributes(&mut self, patch: ItemPatch) {
        let identity_changed = patch.id.is_some() || patch.options.is_some();

        if let Some(id) = patch.id {
            self.id = id;
        }
        if let Some(qty) = patch.qty {
            self.set_quantity_unchecked(qty);
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(options) = patch.options {
            self.options = options;
        }

        if identity_changed {
            self.row_id = RowId::derive(&self.id, &self.options);
        }
    }

    /// Record a loose entity reference for later on-demand resolution.
    /// Existence is checked on the cart's associate path, not here.
    pub fn associate(&mut self, entity: impl Into<String>) {
        self.associated = Some(entity.into());
    }

    /// Set the tax rate (percent). Pure setter, no validation.
    pub const fn set_tax_rate(&mut self, rate: Decimal) {
        self.tax_rate = rate;
    }

    // ---------------------------------------------------------------------
    // Derived monetary reads (computed at access time, never cached)
    // ---------------------------------------------------------------------

    /// Tax for one unit: `price * tax_rate / 100`.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        self.price * self.tax_rate / Decimal::ONE_HUNDRED
    }

    /// Unit price including tax.
    #[must_use]
    pub fn price_with_tax(&self) -> Decimal {
        self.price + self.tax()
    }

    /// Line subtotal excluding tax: `qty * price`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.qty) * self.price
    }

    /// Line total including tax: `qty * price_with_tax`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        Decimal::from(self.qty) * self.price_with_tax()
    }

    /// Tax for the whole line: `tax * qty`.
    #[must_use]
    pub fn tax_total(&self) -> Decimal {
        self.tax() * Decimal::from(self.qty)
    }

    // ---------------------------------------------------------------------
    // Formatting accessors (presentation only; values stay full precision)
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn price_formatted(&self, format: &NumberFormat) -> String {
        number_format(self.price, format)
    }

    #[must_use]
    pub fn price_with_tax_formatted(&self, format: &NumberFormat) -> String {
        number_format(self.price_with_tax(), format)
    }

    #[must_use]
    pub fn tax_formatted(&self, format: &NumberFormat) -> String {
        number_format(self.tax(), format)
    }

    #[must_use]
    pub fn tax_total_formatted(&self, format: &NumberFormat) -> String {
        number_format(self.tax_total(), format)
    }

    #[must_use]
    pub fn subtotal_formatted(&self, format: &NumberFormat) -> String {
        number_format(self.subtotal(), format)
    }

    #[must_use]
    pub fn total_formatted(&self, format: &NumberFormat) -> String {
        number_format(self.total(), format)
    }

    /// Lossy outward projection for API responses. Omits tax rate and
    /// association; round-tripping a view does not reconstruct an item.
    #[must_use]
    pub fn view(&self) -> ItemView {
        ItemView {
            row_id: self.row_id,
            id: self.id.clone(),
            name: self.name.clone(),
            qty: self.qty,
            price: self.price,
            options: self.options.clone(),
            tax: self.tax(),
            subtotal: self.subtotal(),
        }
    }
}

///
/// ItemView
///
/// Serializable projection of one cart line for external consumption.
///

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemView {
    pub row_id: RowId,
    pub id: ItemId,
    pub name: String,
    pub qty: i64,
    pub price: Decimal,
    pub options: ItemOptions,
    pub tax: Decimal,
    pub subtotal: Decimal,
}

impl ItemView {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Widget;

    impl Purchasable for Widget {
        fn identifier(&self, _options: &ItemOptions) -> ItemId {
            ItemId::Int(1)
        }

        fn description(&self, _options: &ItemOptions) -> String {
            "Widget".to_string()
        }

        fn price(&self, _options: &ItemOptions) -> Decimal {
            Decimal::new(1000, 2)
        }

        fn entity_name(&self) -> &str {
            "widget"
        }
    }

    fn widget_item() -> LineItem {
        LineItem::new(1, "Widget", Decimal::new(1000, 2), ItemOptions::default())
            .expect("valid item")
    }

    #[test]
    fn construction_validates_identifier_name_and_price() {
        assert_eq!(
            LineItem::new("", "Widget", Decimal::ONE, ItemOptions::default()).unwrap_err(),
            ItemError::InvalidIdentifier,
        );
        assert_eq!(
            LineItem::new(1, "", Decimal::ONE, ItemOptions::default()).unwrap_err(),
            ItemError::InvalidName,
        );
        assert_eq!(
            LineItem::new(1, "Widget", Decimal::NEGATIVE_ONE, ItemOptions::default()).unwrap_err(),
            ItemError::InvalidPrice,
        );
    }

    #[test]
    fn zero_price_is_valid() {
        let item = LineItem::new(1, "Freebie", Decimal::ZERO, ItemOptions::default())
            .expect("zero price is allowed");
        assert_eq!(item.price(), Decimal::ZERO);
    }

    #[test]
    fn set_quantity_rejects_values_below_one() {
        let mut item = widget_item();
        assert_eq!(
            item.set_quantity(0).unwrap_err(),
            ItemError::InvalidQuantity { found: 0 }
        );
        assert_eq!(
            item.set_quantity(-3).unwrap_err(),
            ItemError::InvalidQuantity { found: -3 }
        );

        item.set_quantity(5).expect("valid quantity");
        assert_eq!(item.quantity(), 5);
    }

    #[test]
    fn derived_reads_follow_price_and_rate_changes() {
        let mut item = widget_item();
        item.set_quantity(2).expect("quantity");
        item.set_tax_rate(Decimal::new(10, 0));

        assert_eq!(item.tax(), Decimal::new(100, 2));
        assert_eq!(item.price_with_tax(), Decimal::new(1100, 2));
        assert_eq!(item.subtotal(), Decimal::new(2000, 2));
        assert_eq!(item.tax_total(), Decimal::new(200, 2));
        assert_eq!(item.total(), Decimal::new(2200, 2));

        // never cached: a rate change shows up in every derived read
        item.set_tax_rate(Decimal::new(20, 0));
        assert_eq!(item.tax(), Decimal::new(200, 2));
        assert_eq!(item.total(), Decimal::new(2400, 2));
    }

    #[test]
    fn item_total_decomposes_into_subtotal_plus_tax_total() {
        let mut item = widget_item();
        item.set_quantity(3).expect("quantity");
        item.set_tax_rate(Decimal::new(21, 0));

        assert_eq!(item.total(), item.subtotal() + item.tax_total());
    }

    #[test]
    fn from_attributes_applies_quantity() {
        let item = LineItem::from_attributes(ItemAttributes {
            id: ItemId::from("sku-1"),
            name: "Gadget".to_string(),
            price: Decimal::new(995, 2),
            qty: 4,
            options: ItemOptions::new().with("size", "M"),
        })
        .expect("valid attributes");

        assert_eq!(item.quantity(), 4);
        assert_eq!(item.options().len(), 1);
    }

    #[test]
    fn from_attributes_rejects_non_positive_quantity() {
        let err = LineItem::from_attributes(ItemAttributes {
            id: ItemId::from(1),
            name: "Gadget".to_string(),
            price: Decimal::ONE,
            qty: 0,
            options: ItemOptions::default(),
        })
        .unwrap_err();

        assert_eq!(err, ItemError::InvalidQuantity { found: 0 });
    }

    #[test]
    fn update_from_buyable_refreshes_fields_and_identity() {
        let mut item = LineItem::new(9, "Old name", Decimal::ONE, ItemOptions::default())
            .expect("valid item");
        item.set_quantity(3).expect("quantity");
        let old_row_id = item.row_id();

        item.update_from_buyable(&Widget);

        assert_eq!(item.id(), &ItemId::Int(1));
        assert_eq!(item.name(), "Widget");
        assert_eq!(item.price(), Decimal::new(1000, 2));
        assert_eq!(item.quantity(), 3, "quantity must be untouched");
        assert_ne!(item.row_id(), old_row_id, "id change must recompute identity");
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut item = widget_item();
        let row_id = item.row_id();

        item.update_from_attributes(ItemPatch::default().price(Decimal::new(1250, 2)).qty(7));

        assert_eq!(item.price(), Decimal::new(1250, 2));
        assert_eq!(item.quantity(), 7);
        assert_eq!(item.name(), "Widget");
        assert_eq!(item.row_id(), row_id, "identity untouched without id/options");
    }

    #[test]
    fn patch_recomputes_identity_when_id_or_options_change() {
        let mut item = widget_item();
        let row_id = item.row_id();

        item.update_from_attributes(ItemPatch::default().id(2));
        let after_id = item.row_id();
        assert_ne!(after_id, row_id);

        item.update_from_attributes(
            ItemPatch::default().options(ItemOptions::new().with("size", "XL")),
        );
        assert_ne!(item.row_id(), after_id);
    }

    #[test]
    fn view_is_a_lossy_projection() {
        let mut item = widget_item();
        item.set_quantity(2).expect("quantity");
        item.set_tax_rate(Decimal::new(10, 0));
        item.associate("product");

        let view = item.view();
        assert_eq!(view.row_id, item.row_id());
        assert_eq!(view.qty, 2);
        assert_eq!(view.tax, Decimal::new(100, 2));
        assert_eq!(view.subtotal, Decimal::new(2000, 2));

        let json = view.to_json().expect("json");
        assert!(json.contains("\"Widget\""));
        assert!(!json.contains("tax_rate"), "tax rate is not part of the view");
        assert!(!json.contains("associated"));
    }

    #[test]
    fn persistence_round_trip_preserves_every_field() {
        let mut item = widget_item();
        item.set_quantity(2).expect("quantity");
        item.set_tax_rate(Decimal::new(19, 0));
        item.associate("product");

        let bytes = crate::serialize::serialize(&item).expect("serialize");
        let back: LineItem = crate::serialize::deserialize(&bytes).expect("deserialize");

        assert_eq!(back, item);
    }

    fn arb_item_id() -> impl Strategy<Value = ItemId> {
        prop_oneof![
            any::<i64>().prop_map(ItemId::Int),
            "[a-z0-9-]{1,12}".prop_map(ItemId::Text),
        ]
    }

    fn arb_options() -> impl Strategy<Value = Vec<(String, OptionValue)>> {
        proptest::collection::vec(
            (
                "[a-z]{1,8}",
                prop_oneof![
                    "[a-zA-Z0-9 ]{0,10}".prop_map(OptionValue::Text),
                    any::<i64>().prop_map(OptionValue::Int),
                    any::<bool>().prop_map(OptionValue::Bool),
                ],
            ),
            0..5,
        )
    }

    proptest! {
        // Row id is a pure function of (id, option set): independent of
        // entry order and of every non-identity field.
        #[test]
        fn row_id_is_pure_over_id_and_sorted_options(
            id in arb_item_id(),
            entries in arb_options(),
            price in 0u64..1_000_000,
            qty in 1i64..1_000,
        ) {
            let forward: ItemOptions = entries.clone().into_iter().collect();
            let mut reversed_entries = entries;
            reversed_entries.reverse();
            let reversed: ItemOptions = reversed_entries.into_iter().collect();

            let mut a = LineItem::new(id.clone(), "Item", Decimal::from(price), forward)
                .expect("valid item");
            let b = LineItem::new(id, "Other name", Decimal::ZERO, reversed)
                .expect("valid item");
            a.set_quantity(qty).expect("valid quantity");

            prop_assert_eq!(a.row_id(), b.row_id());
        }
    }
}
