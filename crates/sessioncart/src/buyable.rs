use crate::item::{ItemId, ItemOptions};
use rust_decimal::Decimal;

///
/// Purchasable
///
/// Capability exposed by anything that can be put in a cart. The option
/// set is passed through every accessor so implementations can vary
/// identity, description, or price per variation (e.g. size-dependent
/// pricing).
///

pub trait Purchasable {
    /// External identifier of the purchasable.
    fn identifier(&self, options: &ItemOptions) -> ItemId;

    /// Display description or title.
    fn description(&self, options: &ItemOptions) -> String;

    /// Unit price excluding tax.
    fn price(&self, options: &ItemOptions) -> Decimal;

    /// Entity name used for loose association; must match the name the
    /// corresponding resolver is registered under.
    fn entity_name(&self) -> &str;
}
