// src/integrations/metadata/resolver.rs
//
// Metadata Resolver - contract with the metadata lookup service
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Never touches sessions; returns resolved Items only
// - May be slow or fail; callers decide what a failure means

use async_trait::async_trait;

use crate::domain::{Item, ItemRef};
use crate::error::MetadataError;

/// Resolves raw item references into descriptive metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// Resolve a reference into metadata, including duration when known
    async fn resolve(&self, reference: &ItemRef) -> Result<Item, MetadataError>;

    /// Best-effort refresh of already resolved metadata
    async fn refresh(&self, item: &Item) -> Result<Item, MetadataError>;
}
