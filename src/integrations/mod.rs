// src/integrations/mod.rs
//
// External Integrations Module
//
// Contracts with the collaborators the engine consumes but does not own:
// the metadata lookup service and the enablement toggle.

pub mod enablement;
pub mod metadata;

pub use enablement::{EnablementGate, EnablementToggle};
pub use metadata::{CatalogResolver, MetadataResolver, RefreshPolicy};
