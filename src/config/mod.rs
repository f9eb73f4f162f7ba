//! Configuration module for clipping
//!
//! This module provides the `ClipConfig` settings type, its defaults and the
//! key-value stores it is persisted in.

// Sub-modules
pub mod store;
pub mod types;

// Re-exports for public API
pub use store::{ConfigStore, JsonFileStore, MemoryStore};
pub use types::{CONFIG_KEYS, ClipConfig, ImageMode, initialize_defaults};
