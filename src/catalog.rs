// 📚 Catalog Store - the immutable source collection
//
// Supplied whole by the data source, validated once, never mutated afterwards.
// Order is the data source's order; filtering never reorders it.

use crate::entities::Listing;
use crate::error::{CatalogError, CatalogResult};
use std::collections::HashSet;

/// Outbound navigation ("subscribe", "open account").
///
/// The catalog hands over the entity's affiliate URL untouched.
pub trait Navigator {
    fn open(&mut self, url: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone)]
pub struct Catalog<E> {
    entities: Vec<E>,
}

impl<E: Listing> Catalog<E> {
    /// Build a catalog, rejecting duplicate ids and out-of-range attributes
    pub fn new(entities: Vec<E>) -> CatalogResult<Self> {
        let mut seen = HashSet::new();

        for entity in &entities {
            if !seen.insert(entity.id()) {
                return Err(CatalogError::DuplicateId(entity.id().to_string()));
            }
            entity.validate().map_err(|reason| CatalogError::InvalidEntity {
                id: entity.id().to_string(),
                reason,
            })?;
        }

        tracing::debug!(catalog = E::CATALOG, count = entities.len(), "catalog loaded");
        Ok(Catalog { entities })
    }

    pub fn empty() -> Self {
        Catalog { entities: Vec::new() }
    }

    pub fn as_slice(&self) -> &[E] {
        &self.entities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&E> {
        self.entities.iter().find(|e| e.id() == id)
    }

    /// Send the visitor to the entity's affiliate page
    pub fn dispatch_affiliate(&self, id: &str, navigator: &mut dyn Navigator) -> anyhow::Result<()> {
        let entity = self
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        tracing::info!(catalog = E::CATALOG, id, url = entity.affiliate_url(), "dispatching affiliate link");
        navigator.open(entity.affiliate_url())
    }
}

impl<'a, E> IntoIterator for &'a Catalog<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Broker, Provider, RiskLevel};

    #[derive(Default)]
    struct RecordingNavigator {
        opened: Vec<String>,
    }

    impl Navigator for RecordingNavigator {
        fn open(&mut self, url: &str) -> anyhow::Result<()> {
            self.opened.push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let a = Provider::new("A", &[], RiskLevel::Low, 1).with_id("1");
        let b = Provider::new("B", &[], RiskLevel::Low, 1).with_id("1");

        let err = Catalog::new(vec![a, b]).unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("1".to_string()));
    }

    #[test]
    fn test_invalid_entity_rejected() {
        let mut broker = Broker::new("B", &[], &[], 10).with_id("b1");
        broker.rating = 9.0;

        match Catalog::new(vec![broker]) {
            Err(CatalogError::InvalidEntity { id, .. }) => assert_eq!(id, "b1"),
            other => panic!("expected InvalidEntity, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_preserves_order() {
        let catalog = Catalog::new(vec![
            Broker::new("First", &[], &[], 10).with_id("b"),
            Broker::new("Second", &[], &[], 10).with_id("a"),
        ])
        .unwrap();

        let names: Vec<_> = catalog.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(catalog.get("a").unwrap().name, "Second");
        assert!(catalog.get("zzz").is_none());
    }

    #[test]
    fn test_dispatch_affiliate_passes_url_through() {
        let mut provider = Provider::new("Alpha", &[], RiskLevel::Low, 1).with_id("p1");
        provider.affiliate_url = "https://alphasignals.com/subscribe?ref=Hub".to_string();
        let catalog = Catalog::new(vec![provider]).unwrap();

        let mut nav = RecordingNavigator::default();
        catalog.dispatch_affiliate("p1", &mut nav).unwrap();
        assert_eq!(nav.opened, vec!["https://alphasignals.com/subscribe?ref=Hub"]);

        let err = catalog.dispatch_affiliate("nope", &mut nav).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CatalogError>(),
            Some(&CatalogError::NotFound("nope".to_string()))
        );
        assert_eq!(nav.opened.len(), 1);
    }
}
