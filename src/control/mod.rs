//! Control algorithms module
//!
//! Classical control exercises on state-space realizations.

pub mod transfer_function;

// Re-exports
pub use transfer_function::TransferFunction;
