// src/integrations/metadata/catalog.rs
//
// In-memory metadata source.
// Backs the replay binary and demos; hosts with a real metadata service
// implement MetadataResolver themselves.

use std::path::Path;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use log::debug;

use super::resolver::MetadataResolver;
use crate::domain::{Item, ItemRef};
use crate::error::{EngineResult, MetadataError};

/// Resolver answering from a fixed list of known items
#[derive(Debug, Default)]
pub struct CatalogResolver {
    items: RwLock<Vec<Item>>,
}

impl CatalogResolver {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    /// Load a JSON array of items
    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let items: Vec<Item> = serde_json::from_str(&raw)?;
        debug!("Loaded {} catalog items from {}", items.len(), path.display());
        Ok(Self::new(items))
    }

    /// Add or replace the entry for an item
    pub fn insert(&self, item: Item) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.retain(|existing| !existing.reference.matches(&item.reference));
        items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of every known item
    pub fn items(&self) -> Vec<Item> {
        self.items.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn lookup(&self, reference: &ItemRef) -> Result<Item, MetadataError> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        items
            .iter()
            .find(|item| item.matches(reference))
            .map(|item| Item {
                reference: reference.clone(),
                fetched_at: Some(Utc::now()),
                ..item.clone()
            })
            .ok_or_else(|| MetadataError::NotFound(reference.to_string()))
    }
}

#[async_trait]
impl MetadataResolver for CatalogResolver {
    async fn resolve(&self, reference: &ItemRef) -> Result<Item, MetadataError> {
        self.lookup(reference)
    }

    async fn refresh(&self, item: &Item) -> Result<Item, MetadataError> {
        self.lookup(&item.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_resolves_matching_reference() {
        let catalog = CatalogResolver::new(vec![Item::new(
            ItemRef::episode("Mob Psycho 100", Some(1), 1).with_id("anilist", "21507"),
            Some(1_440_000),
        )]);

        let reference = ItemRef::episode("Mob Psycho", Some(1), 1).with_id("anilist", "21507");
        let item = catalog.resolve(&reference).await.unwrap();

        assert_eq!(item.duration, Some(1_440_000));
        assert_eq!(item.reference, reference);
        assert!(item.fetched_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_reference_is_not_found() {
        let catalog = CatalogResolver::default();
        let err = catalog.resolve(&ItemRef::movie("Nothing")).await.unwrap_err();
        assert!(matches!(err, MetadataError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_insert_replaces_matching_entry() {
        let catalog = CatalogResolver::default();
        catalog.insert(Item::new(ItemRef::movie("Summer Wars"), None));
        catalog.insert(Item::new(ItemRef::movie("summer wars"), Some(114_000)));
        assert_eq!(catalog.len(), 1);

        let refreshed = catalog
            .refresh(&Item::new(ItemRef::movie("Summer Wars"), None))
            .await
            .unwrap();
        assert_eq!(refreshed.duration, Some(114_000));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"reference": {{"kind": "movie", "title": "Wolf Children"}}, "duration": 117000}}]"#
        )
        .unwrap();

        let catalog = CatalogResolver::from_json_file(file.path()).unwrap();
        assert_eq!(catalog.len(), 1);
    }
}
