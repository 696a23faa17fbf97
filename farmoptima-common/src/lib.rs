//! # FarmOptima Common Library
//!
//! Shared code for the FarmOptima crates:
//! - Domain records (fields, machines, field work, repairs)
//! - Persisted store with one slot per collection
//! - Store events (EventBus)
//! - Collection editors
//! - Snapshot export/import
//! - Configuration loading
//! - Utility functions

pub mod config;
pub mod editors;
pub mod error;
pub mod events;
pub mod models;
pub mod snapshot;
pub mod store;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use store::FarmStore;
