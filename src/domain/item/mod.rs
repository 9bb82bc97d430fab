pub mod entity;

pub use entity::{Item, ItemKind, ItemRef};
