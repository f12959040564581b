//! Common test utilities for gateway testing.
//!
//! - [`harness`] - Gateway test harness
//! - [`fixtures`] - Seed documents and authorization grants

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;
