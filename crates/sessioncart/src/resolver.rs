use crate::item::ItemId;
use std::collections::HashMap;

///
/// EntityResolver
///
/// Capability for looking up the live record behind an associated cart
/// item on demand. The record is a self-describing JSON value: the cart
/// stores only the entity name and the item id, never the record itself.
///

pub trait EntityResolver {
    fn resolve(&self, id: &ItemId) -> Option<serde_json::Value>;
}

///
/// ResolverRegistry
///
/// Explicit name-to-resolver registry, replacing stringly-typed type
/// resolution: an association is valid only when a resolver is registered
/// under the entity name.
///

#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<String, Box<dyn EntityResolver>>,
}

impl ResolverRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver under an entity name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, resolver: Box<dyn EntityResolver>) {
        self.resolvers.insert(name.into(), resolver);
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, resolver: Box<dyn EntityResolver>) -> Self {
        self.register(name, resolver);
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.resolvers.contains_key(name)
    }

    /// Resolve a record through the named resolver. `None` when the name is
    /// unregistered or the resolver finds no record.
    #[must_use]
    pub fn resolve(&self, name: &str, id: &ItemId) -> Option<serde_json::Value> {
        self.resolvers.get(name)?.resolve(id)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct ProductResolver;

    impl EntityResolver for ProductResolver {
        fn resolve(&self, id: &ItemId) -> Option<serde_json::Value> {
            match id {
                ItemId::Int(1) => Some(json!({ "id": 1, "name": "Widget" })),
                _ => None,
            }
        }
    }

    #[test]
    fn registry_resolves_registered_names_only() {
        let registry = ResolverRegistry::new().with("product", Box::new(ProductResolver));

        assert!(registry.contains("product"));
        assert!(!registry.contains("order"));

        let record = registry
            .resolve("product", &ItemId::Int(1))
            .expect("record for id 1");
        assert_eq!(record["name"], "Widget");

        assert!(registry.resolve("product", &ItemId::Int(2)).is_none());
        assert!(registry.resolve("order", &ItemId::Int(1)).is_none());
    }
}
