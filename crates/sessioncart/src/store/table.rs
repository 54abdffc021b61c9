use std::{cell::RefCell, collections::HashMap, rc::Rc};

///
/// StoredCart
///
/// One durable row: a caller-chosen identifier, the instance name the cart
/// was stored under, and the serialized item mapping.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StoredCart {
    pub identifier: String,
    pub instance: String,
    pub content: Vec<u8>,
}

///
/// CartTable
///
/// Durable-table collaborator for store/restore. Rows are keyed by
/// identifier; restore consumes its row (delete-after-read, two round
/// trips, not atomic).
///

pub trait CartTable {
    fn insert(&mut self, row: StoredCart);
    fn find(&self, identifier: &str) -> Option<StoredCart>;
    fn exists(&self, identifier: &str) -> bool;
    fn delete(&mut self, identifier: &str);
}

// Shared-handle form, mirroring the session store: one table can back
// several carts within a single-threaded context.
impl<T: CartTable> CartTable for Rc<RefCell<T>> {
    fn insert(&mut self, row: StoredCart) {
        self.borrow_mut().insert(row);
    }

    fn find(&self, identifier: &str) -> Option<StoredCart> {
        self.borrow().find(identifier)
    }

    fn exists(&self, identifier: &str) -> bool {
        self.borrow().exists(identifier)
    }

    fn delete(&mut self, identifier: &str) {
        self.borrow_mut().delete(identifier);
    }
}

///
/// MemoryCartTable
///

#[derive(Debug, Default)]
pub struct MemoryCartTable {
    rows: HashMap<String, StoredCart>,
}

impl MemoryCartTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl CartTable for MemoryCartTable {
    fn insert(&mut self, row: StoredCart) {
        self.rows.insert(row.identifier.clone(), row);
    }

    fn find(&self, identifier: &str) -> Option<StoredCart> {
        self.rows.get(identifier).cloned()
    }

    fn exists(&self, identifier: &str) -> bool {
        self.rows.contains_key(identifier)
    }

    fn delete(&mut self, identifier: &str) {
        self.rows.remove(identifier);
    }
}

///
/// TESTS
///
