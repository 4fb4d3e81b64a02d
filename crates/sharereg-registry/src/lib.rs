//! # sharereg-registry
//!
//! **Registry state machine**: one instance per company, owning issuance
//! counters, the eligibility map, the active share ledger, the unclaimed
//! certificate pool, and custody slots for other registries' certificates.
//!
//! ## Architecture
//!
//! A [`Registry`] handles one [`Entrypoint`] at
//! a time:
//! 1. Privileged entrypoints obtain an [`AdminCapability`] once, at dispatch
//! 2. The handler validates, then mutates local state
//! 3. Certificates move through [`CertificateSlot`]s by take-then-put
//! 4. Calls to other registries are recorded in an [`Outbox`], never made directly
//!
//! ## Entrypoints
//!
//! ```text
//! issue / add_owner / remove_owner / configure_company   (admin, local)
//! claim / claim_direct        ──▶ receive(certificate)          (to claimant)
//! claim_on_behalf             ──▶ claim                         (to source)
//! transfer                    ──▶ update_ledger, receive        (to issuer, to destination)
//! ```

pub mod auth;
pub mod certificate;
mod claim;
mod custody;
pub mod entrypoint;
mod issuance;
pub mod outbox;
pub mod registry;
pub mod slot;
pub mod view;

pub use auth::AdminCapability;
pub use certificate::Certificate;
pub use entrypoint::{Entrypoint, Message};
pub use outbox::Outbox;
pub use registry::Registry;
pub use slot::CertificateSlot;
pub use view::{CertificateView, LedgerView};
