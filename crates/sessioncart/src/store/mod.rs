mod table;

pub use table::{CartTable, MemoryCartTable, StoredCart};

use crate::{SESSION_KEY_PREFIX, item::LineItem, row_id::RowId};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Session key for one cart instance: `"cart." + instance`.
#[must_use]
pub fn storage_key(instance: &str) -> String {
    format!("{SESSION_KEY_PREFIX}.{instance}")
}

///
/// CartContent
///
/// The full session record for one cart instance: the row-id-keyed item
/// mapping (insertion order preserved for display) plus the named extra
/// costs. This is what every operation reads, mutates, and writes back.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct CartContent {
    pub items: IndexMap<RowId, LineItem>,
    pub costs: IndexMap<String, Decimal>,
}

impl CartContent {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.costs.is_empty()
    }
}

///
/// SessionStore
///
/// External session collaborator holding one [`CartContent`] per storage
/// key. The store is the source of truth: the cart never caches content
/// across calls.
///

pub trait SessionStore {
    fn get(&self, key: &str) -> Option<CartContent>;
    fn put(&mut self, key: &str, content: CartContent);
    fn has(&self, key: &str) -> bool;
    fn remove(&mut self, key: &str);
}

// Shared-handle form for splitting one session between carts. Interior
// mutability keeps this a single-threaded serialization point; concurrent
// mutation of a shared cart stays out of scope.
impl<S: SessionStore> SessionStore for Rc<RefCell<S>> {
    fn get(&self, key: &str) -> Option<CartContent> {
        self.borrow().get(key)
    }

    fn put(&mut self, key: &str, content: CartContent) {
        self.borrow_mut().put(key, content);
    }

    fn has(&self, key: &str) -> bool {
        self.borrow().has(key)
    }

    fn remove(&mut self, key: &str) {
        self.borrow_mut().remove(key);
    }
}

///
/// MemorySessionStore
///

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, CartContent>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<CartContent> {
        self.entries.get(key).cloned()
    }

    fn put(&mut self, key: &str, content: CartContent) {
        self.entries.insert(key.to_string(), content);
    }

    fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

///
/// TESTS
///
