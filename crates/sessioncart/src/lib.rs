//! Session-scoped shopping cart runtime: line items with content-derived
//! row identity, decimal cart arithmetic, and store/restore persistence
//! against injected session/durable-table collaborators.
#![warn(unreachable_pub)]

pub mod buyable;
pub mod cart;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod item;
pub mod resolver;
pub mod row_id;
pub mod serialize;
pub mod store;

///
/// CONSTANTS
///

/// Session key prefix for cart instances.
///
/// Every instance's session record lives under `"cart." + instance_name`,
/// keeping cart state out of the way of other session consumers.
pub const SESSION_KEY_PREFIX: &str = "cart";

/// Default cart instance name used when no explicit instance is selected.
pub const DEFAULT_INSTANCE: &str = "default";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, stores, serializers, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        buyable::Purchasable,
        cart::{Cart, CostKey, CostType},
        item::{ItemId, ItemOptions, LineItem, OptionValue},
        row_id::RowId,
    };
}
