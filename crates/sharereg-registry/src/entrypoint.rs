//! Entrypoint payloads: the wire contract between callers and registries.
//!
//! Every top-level call and every inter-registry message carries exactly one
//! [`Entrypoint`]. Messages are one-way; there is no return channel.

use serde::{Deserialize, Serialize};
use sharereg_types::{Address, EntrypointKind, RegistryNumber, Shares};

use crate::certificate::Certificate;

/// A call into a registry, with its payload.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entrypoint", rename_all = "snake_case")]
pub enum Entrypoint {
    /// Admin: mint `amount` into the unclaimed pool.
    Issue { amount: Shares },
    /// Admin: set the pending claim of `owner` (overwrites).
    AddOwner { owner: Address, amount: Shares },
    /// Admin: clear the pending claim of `owner`.
    RemoveOwner { owner: Address },
    /// Eligible owner: claim own allocation.
    Claim,
    /// Anyone: ask `source` to process a claim on behalf of the called registry.
    ClaimOnBehalf { source: Address },
    /// Admin: process the claim of `destination`.
    ClaimDirect { destination: Address },
    /// Anyone: take custody of a certificate issued by `issuer`.
    Receive {
        issuer: Address,
        certificate: Certificate,
    },
    /// Sender must equal `from`: move an active ledger balance.
    UpdateLedger {
        from: Address,
        to: Address,
        amount: Shares,
    },
    /// Admin: move custodied shares of `issuing_registry` to `destination`.
    Transfer {
        issuing_registry: Address,
        amount: Shares,
        destination: Address,
    },
    /// Admin: rotate the admin identity.
    ChangeAdmin { new_admin: Address },
    /// Admin: set registry number and max shares.
    ConfigureCompany {
        registry_number: RegistryNumber,
        max_shares: Shares,
    },
    /// Admin: change max shares.
    ChangeMaxShares { new_max_shares: Shares },
}

impl Entrypoint {
    #[must_use]
    pub fn kind(&self) -> EntrypointKind {
        match self {
            Self::Issue { .. } => EntrypointKind::Issue,
            Self::AddOwner { .. } => EntrypointKind::AddOwner,
            Self::RemoveOwner { .. } => EntrypointKind::RemoveOwner,
            Self::Claim => EntrypointKind::Claim,
            Self::ClaimOnBehalf { .. } => EntrypointKind::ClaimOnBehalf,
            Self::ClaimDirect { .. } => EntrypointKind::ClaimDirect,
            Self::Receive { .. } => EntrypointKind::Receive,
            Self::UpdateLedger { .. } => EntrypointKind::UpdateLedger,
            Self::Transfer { .. } => EntrypointKind::Transfer,
            Self::ChangeAdmin { .. } => EntrypointKind::ChangeAdmin,
            Self::ConfigureCompany { .. } => EntrypointKind::ConfigureCompany,
            Self::ChangeMaxShares { .. } => EntrypointKind::ChangeMaxShares,
        }
    }
}

/// A one-way call enqueued by a registry for later delivery.
///
/// The sender is implicit: the fabric stamps the emitting registry's
/// address when it delivers the message.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub target: Address,
    pub entrypoint: Entrypoint,
}

impl Message {
    #[must_use]
    pub fn new(target: Address, entrypoint: Entrypoint) -> Self {
        Self { target, entrypoint }
    }
}
