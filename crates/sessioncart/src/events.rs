//! Notification boundary.
//!
//! Cart logic never talks to an event bus directly; every notification
//! flows through [`CartEvent`] and the [`EventSink`] trait. Delivery is
//! fire-and-forget and emission order matches call order.

use crate::item::ItemView;
use std::{cell::RefCell, rc::Rc};

///
/// CartEvent
///

#[derive(Clone, Debug)]
pub enum CartEvent {
    Added(ItemView),
    Updated(ItemView),
    Removed(ItemView),
    Stored { identifier: String },
    Restored { identifier: String },
}

impl CartEvent {
    /// Stable wire name for bus integrations.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Added(_) => "cart.added",
            Self::Updated(_) => "cart.updated",
            Self::Removed(_) => "cart.removed",
            Self::Stored { .. } => "cart.stored",
            Self::Restored { .. } => "cart.restored",
        }
    }
}

///
/// EventSink
///

pub trait EventSink {
    fn emit(&self, event: CartEvent);
}

///
/// NullSink
///
/// Default sink for carts that have no notification consumer.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: CartEvent) {}
}

///
/// RecordingSink
///
/// Sink that appends every event to a shared buffer. Clones share the
/// buffer, so a test can hand one clone to the cart and inspect the other.
///

#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    events: Rc<RefCell<Vec<CartEvent>>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<CartEvent> {
        self.events.borrow().clone()
    }

    /// Recorded event names, in emission order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.events.borrow().iter().map(CartEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: CartEvent) {
        self.events.borrow_mut().push(event);
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_preserves_emission_order_across_clones() {
        let sink = RecordingSink::new();
        let handle = sink.clone();

        handle.emit(CartEvent::Stored {
            identifier: "abc".to_string(),
        });
        handle.emit(CartEvent::Restored {
            identifier: "abc".to_string(),
        });

        assert_eq!(sink.names(), vec!["cart.stored", "cart.restored"]);

        sink.clear();
        assert!(sink.events().is_empty());
    }
}
