//! The per-company registry state machine.
//!
//! A [`Registry`] is a single-threaded sequential state machine: the fabric
//! hands it one [`Entrypoint`] at a time via [`Registry::handle`], the
//! handler validates, mutates local state, and returns an [`Outbox`] of
//! messages for other registries. A handler never observes another
//! registry's state.
//!
//! Entrypoint bodies live in sibling modules:
//! - `issuance`: issue, eligibility, and configuration entrypoints
//! - `claim`: claim, claim on behalf, claim direct
//! - `custody`: receive, ledger synchronization, transfer

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sharereg_types::{
    Address, CustodyPolicy, RegistryConfig, RegistryNumber, Result, Shares, constants,
};

use crate::{
    auth::AdminCapability, certificate::Certificate, entrypoint::Entrypoint, outbox::Outbox,
    slot::CertificateSlot, view::LedgerView,
};

/// One company's capitalization table.
#[derive(Debug, Serialize, Deserialize)]
pub struct Registry {
    /// This registry's own address; the issuer of its certificates.
    pub(crate) address: Address,
    pub(crate) admin: Address,
    pub(crate) registry_number: Option<RegistryNumber>,
    pub(crate) max_shares: Option<Shares>,
    pub(crate) custody_policy: CustodyPolicy,
    /// Monotonically non-decreasing, `<= max_shares`.
    pub(crate) issued_shares: Shares,
    /// Always equals the sum of `owners_map` values.
    pub(crate) allocated_shares: Shares,
    /// Addresses that may claim, with their pending amount.
    pub(crate) owners_map: BTreeMap<Address, Shares>,
    /// Who holds claimed shares of this registry.
    pub(crate) active_share_ledger: BTreeMap<Address, Shares>,
    /// Pool of not-yet-claimed certificates of this registry's own shares.
    pub(crate) unclaimed: CertificateSlot<u64>,
    /// Certificates issued by other registries, keyed by issuer.
    pub(crate) custody: CertificateSlot<Address>,
}

impl Registry {
    /// Create a registry living at `address`, administered by `admin`.
    #[must_use]
    pub fn new(address: Address, admin: Address, config: RegistryConfig) -> Self {
        Self {
            address,
            admin,
            registry_number: config.registry_number,
            max_shares: config.max_shares,
            custody_policy: config.custody_policy,
            issued_shares: 0,
            allocated_shares: 0,
            owners_map: BTreeMap::new(),
            active_share_ledger: BTreeMap::new(),
            unclaimed: CertificateSlot::new(),
            custody: CertificateSlot::new(),
        }
    }

    /// Run one entrypoint invocation from `sender`.
    ///
    /// On success returns the messages to deliver, in enqueue order. On
    /// error the caller must discard the whole operation.
    pub fn handle(&mut self, sender: Address, entrypoint: Entrypoint) -> Result<Outbox> {
        let kind = entrypoint.kind();
        let mut outbox = Outbox::new();

        match entrypoint {
            Entrypoint::Issue { amount } => {
                let cap = self.authorize(sender)?;
                self.issue(&cap, amount)?;
            }
            Entrypoint::AddOwner { owner, amount } => {
                let cap = self.authorize(sender)?;
                self.add_owner(&cap, owner, amount)?;
            }
            Entrypoint::RemoveOwner { owner } => {
                let cap = self.authorize(sender)?;
                self.remove_owner(&cap, owner)?;
            }
            Entrypoint::Claim => self.claim(sender, &mut outbox)?,
            Entrypoint::ClaimOnBehalf { source } => self.claim_on_behalf(source, &mut outbox),
            Entrypoint::ClaimDirect { destination } => {
                let cap = self.authorize(sender)?;
                self.claim_direct(&cap, destination, &mut outbox)?;
            }
            Entrypoint::Receive {
                issuer,
                certificate,
            } => self.receive(issuer, certificate)?,
            Entrypoint::UpdateLedger { from, to, amount } => {
                self.update_ledger(sender, from, to, amount)?;
            }
            Entrypoint::Transfer {
                issuing_registry,
                amount,
                destination,
            } => {
                let cap = self.authorize(sender)?;
                self.transfer(&cap, issuing_registry, amount, destination, &mut outbox)?;
            }
            Entrypoint::ChangeAdmin { new_admin } => {
                let cap = self.authorize(sender)?;
                self.change_admin(&cap, new_admin)?;
            }
            Entrypoint::ConfigureCompany {
                registry_number,
                max_shares,
            } => {
                let cap = self.authorize(sender)?;
                self.configure_company(&cap, registry_number, max_shares)?;
            }
            Entrypoint::ChangeMaxShares { new_max_shares } => {
                let cap = self.authorize(sender)?;
                self.change_max_shares(&cap, new_max_shares)?;
            }
        }

        tracing::debug!(
            registry = %self.address,
            sender = %sender,
            entrypoint = %kind,
            emitted = outbox.len(),
            "Entrypoint handled"
        );
        Ok(outbox)
    }

    /// Check `caller` against the current admin.
    ///
    /// # Errors
    /// Returns `NotAdmin` if `caller` is not the admin.
    pub fn authorize(&self, caller: Address) -> Result<AdminCapability> {
        AdminCapability::grant(self.address, &self.admin, caller)
    }

    /// Reject a capability granted by another registry or to a replaced admin.
    pub(crate) fn require(&self, cap: &AdminCapability) -> Result<()> {
        cap.verify(&self.address, &self.admin)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn admin(&self) -> Address {
        self.admin
    }

    #[must_use]
    pub fn registry_number(&self) -> Option<RegistryNumber> {
        self.registry_number
    }

    #[must_use]
    pub fn max_shares(&self) -> Option<Shares> {
        self.max_shares
    }

    #[must_use]
    pub fn custody_policy(&self) -> CustodyPolicy {
        self.custody_policy
    }

    #[must_use]
    pub fn issued_shares(&self) -> Shares {
        self.issued_shares
    }

    #[must_use]
    pub fn allocated_shares(&self) -> Shares {
        self.allocated_shares
    }

    /// Pending (unclaimed) allocation of `owner`, if eligible.
    #[must_use]
    pub fn pending_claim(&self, owner: &Address) -> Option<Shares> {
        self.owners_map.get(owner).copied()
    }

    #[must_use]
    pub fn owners(&self) -> &BTreeMap<Address, Shares> {
        &self.owners_map
    }

    /// Claimed shares of this registry held by `holder` (zero if absent).
    #[must_use]
    pub fn active_balance(&self, holder: &Address) -> Shares {
        self.active_share_ledger.get(holder).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn active_share_ledger(&self) -> &BTreeMap<Address, Shares> {
        &self.active_share_ledger
    }

    /// Amount left in the unclaimed pool.
    #[must_use]
    pub fn unclaimed_amount(&self) -> Shares {
        self.unclaimed.amount(&constants::UNCLAIMED_POOL_KEY)
    }

    #[must_use]
    pub fn unclaimed_certificate(&self) -> Option<&Certificate> {
        self.unclaimed.get(&constants::UNCLAIMED_POOL_KEY)
    }

    /// Amount of `issuer`'s shares held in custody here.
    #[must_use]
    pub fn custodied_amount(&self, issuer: &Address) -> Shares {
        self.custody.amount(issuer)
    }

    #[must_use]
    pub fn custody(&self) -> &CertificateSlot<Address> {
        &self.custody
    }

    /// Serializable snapshot of the registry's share state.
    #[must_use]
    pub fn ledger_view(&self) -> LedgerView {
        LedgerView::of(self)
    }

    /// Persist the full state as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restore a registry persisted with [`Registry::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
