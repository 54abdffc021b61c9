mod cost;

pub use cost::{CostKey, CostType};

use crate::{
    DEFAULT_INSTANCE,
    buyable::Purchasable,
    config::{CartConfig, FormatOverrides},
    error::CartError,
    events::{CartEvent, EventSink, NullSink},
    format::number_format,
    item::{ItemAttributes, ItemId, ItemOptions, ItemPatch, LineItem},
    resolver::ResolverRegistry,
    row_id::RowId,
    serialize::{deserialize, serialize},
    store::{self, CartContent, CartTable, SessionStore, StoredCart},
};
use indexmap::IndexMap;
use rust_decimal::Decimal;

///
/// Cart
///
/// Session-scoped cart handle bound to injected collaborators: a session
/// store holding the live content, a durable table for store/restore, and
/// a notification sink. Every operation is one synchronous
/// read-modify-write cycle against the session store; the cart caches
/// nothing across calls.
///
/// Mutation requires `&mut self`, so within one process the borrow checker
/// already serializes access to a cart instance. Sharing one instance
/// across request handlers needs an explicit lock around the cart or
/// shared `Rc<RefCell<_>>` store handles; the restore path's
/// read-then-delete stays non-atomic either way.
///

pub struct Cart<S, T, E = NullSink>
where
    S: SessionStore,
    T: CartTable,
    E: EventSink,
{
    session: S,
    table: T,
    events: E,
    registry: ResolverRegistry,
    config: CartConfig,
    instance: String,
}

impl<S, T> Cart<S, T>
where
    S: SessionStore,
    T: CartTable,
{
    /// Create a cart on the default instance with a no-op event sink and
    /// default configuration.
    pub fn new(session: S, table: T) -> Self {
        Self {
            session,
            table,
            events: NullSink,
            registry: ResolverRegistry::new(),
            config: CartConfig::default(),
            instance: DEFAULT_INSTANCE.to_string(),
        }
    }
}

impl<S, T, E> Cart<S, T, E>
where
    S: SessionStore,
    T: CartTable,
    E: EventSink,
{
    // ---------------------------------------------------------------------
    // Construction policy (builder-style)
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn with_events<E2: EventSink>(self, events: E2) -> Cart<S, T, E2> {
        Cart {
            session: self.session,
            table: self.table,
            events,
            registry: self.registry,
            config: self.config,
            instance: self.instance,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CartConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ResolverRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &CartConfig {
        &self.config
    }

    // ---------------------------------------------------------------------
    // Instance partitioning
    // ---------------------------------------------------------------------

    /// Switch the logical partition; `None` selects the default instance.
    pub fn set_instance(&mut self, instance: Option<&str>) {
        self.instance = match instance {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_INSTANCE.to_string(),
        };
    }

    #[must_use]
    pub fn current_instance(&self) -> &str {
        &self.instance
    }

    // ---------------------------------------------------------------------
    // Adding items
    // ---------------------------------------------------------------------

    /// Add via the purchasable capability; the candidate is associated with
    /// the buyable's entity name for later on-demand resolution.
    pub fn add_buyable(
        &mut self,
        item: &dyn Purchasable,
        qty: i64,
        options: ItemOptions,
    ) -> Result<LineItem, CartError> {
        let mut candidate = LineItem::from_buyable(item, options)?;
        candidate.set_quantity(qty)?;
        candidate.associate(item.entity_name());

        self.insert_candidate(candidate)
    }

    /// Batch form of [`add_buyable`](Self::add_buyable), one unit each.
    pub fn add_buyables(&mut self, items: &[&dyn Purchasable]) -> Result<Vec<LineItem>, CartError> {
        items
            .iter()
            .map(|item| self.add_buyable(*item, 1, ItemOptions::default()))
            .collect()
    }

    /// Add from an explicit attribute set (quantity required).
    pub fn add_attributes(&mut self, attrs: ItemAttributes) -> Result<LineItem, CartError> {
        let candidate = LineItem::from_attributes(attrs)?;

        self.insert_candidate(candidate)
    }

    /// Add from explicit scalars.
    pub fn add_item(
        &mut self,
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: Decimal,
        qty: i64,
        options: ItemOptions,
    ) -> Result<LineItem, CartError> {
        let mut candidate = LineItem::new(id, name, price, options)?;
        candidate.set_quantity(qty)?;

        self.insert_candidate(candidate)
    }

    // Shared add tail: apply the configured default tax rate, merge
    // quantities when the row id already exists, upsert, notify, persist.
    fn insert_candidate(&mut self, mut item: LineItem) -> Result<LineItem, CartError> {
        item.set_tax_rate(self.config.tax_rate);

        let mut content = self.read_content();
        if let Some(existing) = content.items.get(&item.row_id()) {
            item.set_quantity(existing.quantity() + item.quantity())?;
        }
        content.items.insert(item.row_id(), item.clone());

        self.events.emit(CartEvent::Added(item.view()));
        self.write_content(content);

        Ok(item)
    }

    // ---------------------------------------------------------------------
    // Updating items
    // ---------------------------------------------------------------------

    /// Replace the quantity directly. A value below 1 removes the item and
    /// returns `None`.
    pub fn update_quantity(
        &mut self,
        row_id: RowId,
        qty: i64,
    ) -> Result<Option<LineItem>, CartError> {
        let mut item = self.get(row_id)?;
        item.set_quantity_unchecked(qty);

        self.finish_update(row_id, item)
    }

    /// Refresh the item from the purchasable capability.
    pub fn update_from_buyable(
        &mut self,
        row_id: RowId,
        buyable: &dyn Purchasable,
    ) -> Result<Option<LineItem>, CartError> {
        let mut item = self.get(row_id)?;
        item.update_from_buyable(buyable);

        self.finish_update(row_id, item)
    }

    /// Apply a selective attribute patch.
    pub fn update_attributes(
        &mut self,
        row_id: RowId,
        patch: ItemPatch,
    ) -> Result<Option<LineItem>, CartError> {
        let mut item = self.get(row_id)?;
        item.update_from_attributes(patch);

        self.finish_update(row_id, item)
    }

    // Shared update tail. When the mutation changed the item's identity,
    // drop the old entry and merge quantities with any entry already under
    // the new row id (a merge below 1 fails like any checked set).
    fn finish_update(
        &mut self,
        row_id: RowId,
        mut item: LineItem,
    ) -> Result<Option<LineItem>, CartError> {
        let mut content = self.read_content();

        if row_id != item.row_id() {
            content.items.shift_remove(&row_id);

            if let Some(existing) = content.items.get(&item.row_id()) {
                item.set_quantity(existing.quantity() + item.quantity())?;
            }
        }

        if item.quantity() <= 0 {
            // Removal branch: `remove` emits `cart.removed` itself and the
            // `cart.updated` notification is deliberately never sent when
            // the quantity drops to zero.
            self.remove(item.row_id())?;
            return Ok(None);
        }

        content.items.insert(item.row_id(), item.clone());

        self.events.emit(CartEvent::Updated(item.view()));
        self.write_content(content);

        Ok(Some(item))
    }

    // ---------------------------------------------------------------------
    // Removal and lookup
    // ---------------------------------------------------------------------

    /// Remove the item under the given row id.
    pub fn remove(&mut self, row_id: RowId) -> Result<(), CartError> {
        let item = self.get(row_id)?;

        let mut content = self.read_content();
        content.items.shift_remove(&row_id);

        self.events.emit(CartEvent::Removed(item.view()));
        self.write_content(content);

        Ok(())
    }

    /// Fetch a copy of the item under the given row id.
    pub fn get(&self, row_id: RowId) -> Result<LineItem, CartError> {
        self.read_content()
            .items
            .get(&row_id)
            .cloned()
            .ok_or(CartError::InvalidRowId { row_id })
    }

    /// Current item mapping, in insertion order. Empty when the store has
    /// nothing for this instance; never fails.
    #[must_use]
    pub fn content(&self) -> IndexMap<RowId, LineItem> {
        self.read_content().items
    }

    /// Sum of quantities across the cart (not a distinct-item count).
    #[must_use]
    pub fn count(&self) -> i64 {
        self.read_content()
            .items
            .values()
            .map(LineItem::quantity)
            .sum()
    }

    /// Items satisfying a caller-supplied predicate, in insertion order.
    #[must_use]
    pub fn search(&self, predicate: impl Fn(&LineItem) -> bool) -> Vec<LineItem> {
        self.read_content()
            .items
            .into_values()
            .filter(|item| predicate(item))
            .collect()
    }

    /// Destroy the current instance's session record entirely, items and
    /// extra costs included.
    pub fn destroy(&mut self) {
        let key = self.storage_key();
        self.session.remove(&key);
    }

    // ---------------------------------------------------------------------
    // Aggregates
    // ---------------------------------------------------------------------

    /// Grand total: `Σ(qty · price_with_tax)` plus every extra cost.
    #[must_use]
    pub fn total(&self) -> Decimal {
        let content = self.read_content();

        let items: Decimal = content.items.values().map(LineItem::total).sum();
        let costs: Decimal = content.costs.values().copied().sum();

        items + costs
    }

    /// Total tax: `Σ(qty · tax)`. Extra costs are not taxed.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        self.read_content()
            .items
            .values()
            .map(LineItem::tax_total)
            .sum()
    }

    /// Subtotal excluding tax and extra costs: `Σ(qty · price)`.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.read_content()
            .items
            .values()
            .map(LineItem::subtotal)
            .sum()
    }

    /// Current accumulated value for a named extra cost (0 when unset).
    #[must_use]
    pub fn cost(&self, key: impl Into<CostKey>) -> Decimal {
        let key = key.into();

        self.read_content()
            .costs
            .get(key.as_str())
            .copied()
            .unwrap_or_default()
    }

    /// Accumulate onto a named extra cost and persist the new sum.
    pub fn add_cost(&mut self, key: impl Into<CostKey>, amount: Decimal) {
        let key = key.into();

        let mut content = self.read_content();
        *content
            .costs
            .entry(key.into_string())
            .or_insert(Decimal::ZERO) += amount;

        self.write_content(content);
    }

    // ---------------------------------------------------------------------
    // Formatted aggregates (presentation only)
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn total_formatted(&self, overrides: &FormatOverrides) -> String {
        number_format(self.total(), &overrides.resolve(&self.config.format))
    }

    #[must_use]
    pub fn tax_formatted(&self, overrides: &FormatOverrides) -> String {
        number_format(self.tax(), &overrides.resolve(&self.config.format))
    }

    #[must_use]
    pub fn subtotal_formatted(&self, overrides: &FormatOverrides) -> String {
        number_format(self.subtotal(), &overrides.resolve(&self.config.format))
    }

    #[must_use]
    pub fn cost_formatted(&self, key: impl Into<CostKey>, overrides: &FormatOverrides) -> String {
        number_format(self.cost(key), &overrides.resolve(&self.config.format))
    }

    // ---------------------------------------------------------------------
    // Association and per-item tax
    // ---------------------------------------------------------------------

    /// Associate the item with a named entity. Fails with `UnknownModel`
    /// when no resolver is registered under the name.
    pub fn associate(&mut self, row_id: RowId, name: impl Into<String>) -> Result<(), CartError> {
        let name = name.into();
        if !self.registry.contains(&name) {
            return Err(CartError::UnknownModel { name });
        }

        let mut item = self.get(row_id)?;
        item.associate(name);

        let mut content = self.read_content();
        content.items.insert(item.row_id(), item);
        self.write_content(content);

        Ok(())
    }

    /// Resolve the live record behind an associated item on demand. `None`
    /// when the item has no association or the resolver finds no record.
    pub fn entity(&self, row_id: RowId) -> Result<Option<serde_json::Value>, CartError> {
        let item = self.get(row_id)?;

        Ok(item
            .associated()
            .and_then(|name| self.registry.resolve(name, item.id())))
    }

    /// Set the tax rate (percent) for one item and persist.
    pub fn set_tax(&mut self, row_id: RowId, rate: Decimal) -> Result<(), CartError> {
        let mut item = self.get(row_id)?;
        item.set_tax_rate(rate);

        let mut content = self.read_content();
        content.items.insert(item.row_id(), item);
        self.write_content(content);

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Durable store / restore
    // ---------------------------------------------------------------------

    /// Persist the current item mapping under a caller-chosen identifier.
    pub fn store(&mut self, identifier: &str) -> Result<(), CartError> {
        let content = self.read_content();

        if self.table.exists(identifier) {
            return Err(CartError::AlreadyStored {
                identifier: identifier.to_string(),
            });
        }

        let bytes = serialize(&content.items)?;
        self.table.insert(StoredCart {
            identifier: identifier.to_string(),
            instance: self.instance.clone(),
            content: bytes,
        });

        self.events.emit(CartEvent::Stored {
            identifier: identifier.to_string(),
        });

        Ok(())
    }

    /// Restore a previously stored cart. Unknown identifiers are a silent
    /// no-op. Stored items are upserted into the instance the cart was
    /// stored under; the durable row is consumed.
    pub fn restore(&mut self, identifier: &str) -> Result<(), CartError> {
        let Some(row) = self.table.find(identifier) else {
            return Ok(());
        };

        let stored_items: IndexMap<RowId, LineItem> = deserialize(&row.content)?;

        let original_instance = self.instance.clone();
        self.set_instance(Some(&row.instance));

        let mut content = self.read_content();
        for (row_id, item) in stored_items {
            content.items.insert(row_id, item);
        }

        self.events.emit(CartEvent::Restored {
            identifier: identifier.to_string(),
        });
        self.write_content(content);

        self.set_instance(Some(&original_instance));

        // Delete after read and write-back: the two table round trips are
        // not atomic. A crash in between leaves the row behind, and a
        // retried restore would apply it a second time.
        self.table.delete(identifier);

        Ok(())
    }

    // ---------------------------------------------------------------------
    // Session plumbing
    // ---------------------------------------------------------------------

    fn storage_key(&self) -> String {
        store::storage_key(&self.instance)
    }

    fn read_content(&self) -> CartContent {
        self.session.get(&self.storage_key()).unwrap_or_default()
    }

    fn write_content(&mut self, content: CartContent) {
        let key = self.storage_key();
        self.session.put(&key, content);
    }
}
