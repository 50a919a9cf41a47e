/// urun library
///
/// Core functionality for the alias launcher: a persisted alias registry,
/// query resolution and fire-and-forget launching.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod platform;
pub mod shell;
pub mod store;

// Re-exports for convenience
pub use config::Config;
pub use error::{Result, UrunError};
pub use store::JsonFileStore;
