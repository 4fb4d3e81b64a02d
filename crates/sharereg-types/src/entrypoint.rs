//! Entrypoint names shared by receipts, errors and logs.
//!
//! The payload-carrying enum lives next to the registry that consumes it;
//! this crate only needs the name.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Payload-free name of an entrypoint, for logs and receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrypointKind {
    Issue,
    AddOwner,
    RemoveOwner,
    Claim,
    ClaimOnBehalf,
    ClaimDirect,
    Receive,
    UpdateLedger,
    Transfer,
    ChangeAdmin,
    ConfigureCompany,
    ChangeMaxShares,
}

impl EntrypointKind {
    /// Whether only the registry admin may invoke this entrypoint.
    #[must_use]
    pub fn is_admin_only(self) -> bool {
        matches!(
            self,
            Self::Issue
                | Self::AddOwner
                | Self::RemoveOwner
                | Self::ClaimDirect
                | Self::Transfer
                | Self::ChangeAdmin
                | Self::ConfigureCompany
                | Self::ChangeMaxShares
        )
    }
}

impl fmt::Display for EntrypointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Issue => "issue",
            Self::AddOwner => "add_owner",
            Self::RemoveOwner => "remove_owner",
            Self::Claim => "claim",
            Self::ClaimOnBehalf => "claim_on_behalf",
            Self::ClaimDirect => "claim_direct",
            Self::Receive => "receive",
            Self::UpdateLedger => "update_ledger",
            Self::Transfer => "transfer",
            Self::ChangeAdmin => "change_admin",
            Self::ConfigureCompany => "configure_company",
            Self::ChangeMaxShares => "change_max_shares",
        };
        f.write_str(name)
    }
}
