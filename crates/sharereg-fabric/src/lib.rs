//! # sharereg-fabric
//!
//! Execution environment for ShareRegistry registries.
//!
//! - [`Fabric`]: deploys registries and runs top-level calls, delivering
//!   cascading messages FIFO with all-or-nothing rollback
//! - [`Governance`]: company factory and company-ID directory
//! - [`SupplyAudit`]: conservation, ledger and eligibility checks
//! - [`telemetry`]: tracing subscriber setup

pub mod fabric;
pub mod governance;
pub mod supply_audit;
pub mod telemetry;

pub use fabric::Fabric;
pub use governance::Governance;
pub use supply_audit::{IssuerSupply, SupplyAudit};
pub use telemetry::{LogFormat, init_tracing};
