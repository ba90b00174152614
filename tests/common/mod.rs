//! Common test utilities for Slipway CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project directory with a local-transport deployment root

#![allow(dead_code)]

pub mod env;

pub use env::*;
