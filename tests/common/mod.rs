//! Common test utilities for Stratum contract and scenario tests.
//!
//! This module provides:
//! - `CountingRepository`: Repository wrapper that counts loads, injects
//!   failures and runs one-shot hooks
//! - Fixtures: Reusable definition chains

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::*;
pub use repository::*;
