//! Test infrastructure for the persistence layer.
//!
//! This module provides reusable fixtures for exercising document store
//! backends and authorization providers.

pub mod fixtures;

// Re-export commonly used items
pub use fixtures::*;
