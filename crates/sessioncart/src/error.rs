use crate::{item::ItemError, row_id::RowId, serialize::SerializeError};
use thiserror::Error as ThisError;

///
/// CartError
///
/// Central error surface for cart operations. Every failure is a local,
/// synchronous validation error reported to the caller before any mutation
/// becomes visible; nothing here is retryable or caught internally.
///

#[derive(Debug, ThisError)]
pub enum CartError {
    /// InvalidArgument family raised at item construction or quantity-set time.
    #[error(transparent)]
    Item(#[from] ItemError),

    /// Lookup, update, or removal against a row id the cart does not contain.
    #[error("the cart does not contain row id {row_id}")]
    InvalidRowId { row_id: RowId },

    /// Association to an entity name the resolver registry cannot resolve.
    #[error("unknown entity '{name}': no resolver registered")]
    UnknownModel { name: String },

    /// `store` called with an identifier that already has a durable row.
    #[error("a cart with identifier '{identifier}' was already stored")]
    AlreadyStored { identifier: String },

    /// Encoding failure on the durable store/restore path.
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

impl CartError {
    #[must_use]
    pub const fn is_invalid_row_id(&self) -> bool {
        matches!(self, Self::InvalidRowId { .. })
    }
}
