/// Registry storage for urun
///
/// Holds the typed entry models and the JSON document they are persisted as.

pub mod json_store;
pub mod models;

pub use json_store::{load_or_empty, JsonFileStore, Loaded, RegistryStore};
pub use models::*;

#[cfg(test)]
pub use json_store::MemoryStore;
