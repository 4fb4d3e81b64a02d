//! # sharereg-types
//!
//! Shared types, errors, and configuration for the **ShareRegistry** protocol.
//!
//! This crate is the leaf dependency of the workspace: every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`Address`], [`OperationId`], [`RegistryNumber`], [`Shares`]
//! - **Entrypoint names**: [`EntrypointKind`]
//! - **Receipts**: [`OperationReceipt`], [`DeliveredMessage`]
//! - **Configuration**: [`RegistryConfig`], [`CustodyPolicy`], [`FabricConfig`], [`GovernanceConfig`]
//! - **Errors**: [`RegistryError`] with `SR_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod config;
pub mod constants;
pub mod entrypoint;
pub mod error;
pub mod ids;
pub mod receipt;

// Re-export all primary types at crate root for ergonomic imports:
//   use sharereg_types::{Address, EntrypointKind, RegistryError, ...};

pub use config::*;
pub use entrypoint::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;

// Constants are accessed via `sharereg_types::constants::FOO`
// (not re-exported to avoid name collisions).
