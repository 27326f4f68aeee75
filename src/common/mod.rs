//! Common types, traits, and error definitions for rust_autonomy
//!
//! This module provides the foundational building blocks used across
//! all estimation and control algorithms in this crate.

pub mod angle;
pub mod error;
pub mod traits;
pub mod types;

pub use angle::*;
pub use error::*;
pub use traits::*;
pub use types::*;
