// src/integrations/metadata/mod.rs

pub mod catalog;
pub mod refresh;
pub mod resolver;

pub use catalog::CatalogResolver;
pub use refresh::RefreshPolicy;
pub use resolver::MetadataResolver;

#[cfg(test)]
pub use resolver::MockMetadataResolver;
