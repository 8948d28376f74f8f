//! Shared types for the order repository workspace.

pub mod types;

pub use types::OrderId;
