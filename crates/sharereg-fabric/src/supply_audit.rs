//! Supply audit over a whole fabric.
//!
//! Three properties are checked per issuing registry:
//! ```text
//! conservation: issued == unclaimed + Σ held(certificates of issuer, anywhere)
//! ledger:       Σ active_share_ledger == issued - unclaimed
//!               ∀ holder: active_share_ledger[holder] == held(holder)
//! eligibility:  allocated == Σ owners_map  ∧  allocated <= issued
//! ```
//!
//! "Held" counts registry custody slots and external holdings. Under the
//! overwrite custody policy a second delivery to the same holder destroys
//! the first certificate, and conservation fails; the audit reports it.

use std::collections::BTreeMap;

use sharereg_types::{Address, RegistryError, Result, Shares};

use crate::fabric::Fabric;

/// Accounting for one issuer, gathered from every place its shares can live.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuerSupply {
    pub issued: Shares,
    pub unclaimed: Shares,
    pub allocated: Shares,
    /// Σ of the issuer's eligibility entries.
    pub eligible: u128,
    /// The issuer's own record of who holds claimed shares.
    pub ledger: BTreeMap<Address, Shares>,
    /// What each holder actually has in custody or external holdings.
    pub held: BTreeMap<Address, u128>,
    /// `false` if certificates name an issuer that is not a registry.
    pub known: bool,
}

/// Point-in-time audit of every issuer in a fabric.
#[derive(Debug, Clone, Default)]
pub struct SupplyAudit {
    issuers: BTreeMap<Address, IssuerSupply>,
}

impl SupplyAudit {
    /// Gather balances from every registry and external holding.
    #[must_use]
    pub fn of(fabric: &Fabric) -> Self {
        let mut issuers: BTreeMap<Address, IssuerSupply> = BTreeMap::new();

        for registry in fabric.registries() {
            let supply = issuers.entry(registry.address()).or_default();
            supply.known = true;
            supply.issued = registry.issued_shares();
            supply.unclaimed = registry.unclaimed_amount();
            supply.allocated = registry.allocated_shares();
            supply.eligible = registry.owners().values().map(|&v| u128::from(v)).sum();
            supply.ledger = registry.active_share_ledger().clone();
        }

        for registry in fabric.registries() {
            for (issuer, cert) in registry.custody().iter() {
                *issuers
                    .entry(*issuer)
                    .or_default()
                    .held
                    .entry(registry.address())
                    .or_default() += u128::from(cert.amount());
            }
        }
        for (recipient, cert) in fabric.external_holdings() {
            *issuers
                .entry(cert.issuer())
                .or_default()
                .held
                .entry(*recipient)
                .or_default() += u128::from(cert.amount());
        }

        Self { issuers }
    }

    /// Shares the issuer has created.
    #[must_use]
    pub fn expected_supply(&self, issuer: &Address) -> u128 {
        self.issuers
            .get(issuer)
            .map_or(0, |s| u128::from(s.issued))
    }

    /// Shares of the issuer that still exist somewhere.
    #[must_use]
    pub fn actual_supply(&self, issuer: &Address) -> u128 {
        self.issuers.get(issuer).map_or(0, |s| {
            u128::from(s.unclaimed) + s.held.values().sum::<u128>()
        })
    }

    #[must_use]
    pub fn issuer(&self, issuer: &Address) -> Option<&IssuerSupply> {
        self.issuers.get(issuer)
    }

    /// Every issuer seen, registry or not.
    pub fn tracked_issuers(&self) -> impl Iterator<Item = &Address> {
        self.issuers.keys()
    }

    /// Check all three properties for one issuer.
    ///
    /// # Errors
    /// Returns [`RegistryError::SupplyInvariantViolation`] naming the first
    /// property that fails.
    pub fn verify(&self, issuer: &Address) -> Result<()> {
        let Some(s) = self.issuers.get(issuer) else {
            return Ok(());
        };
        if !s.known {
            return Err(violation(format!(
                "Issuer {issuer}: certificates held but no such registry"
            )));
        }

        let expected = self.expected_supply(issuer);
        let actual = self.actual_supply(issuer);
        if actual != expected {
            return Err(violation(format!(
                "Issuer {issuer}: actual supply {actual} != issued {expected} \
                 (unclaimed={}, held={})",
                s.unclaimed,
                actual - u128::from(s.unclaimed),
            )));
        }

        let ledger_total: u128 = s.ledger.values().map(|&v| u128::from(v)).sum();
        let claimed = u128::from(s.issued) - u128::from(s.unclaimed);
        if ledger_total != claimed {
            return Err(violation(format!(
                "Issuer {issuer}: ledger total {ledger_total} != claimed {claimed}"
            )));
        }
        for (holder, &recorded) in &s.ledger {
            let held = s.held.get(holder).copied().unwrap_or(0);
            if u128::from(recorded) != held {
                return Err(violation(format!(
                    "Issuer {issuer}: ledger says {holder} holds {recorded}, actually {held}"
                )));
            }
        }

        if u128::from(s.allocated) != s.eligible {
            return Err(violation(format!(
                "Issuer {issuer}: allocated {} != Σ eligibility {}",
                s.allocated, s.eligible
            )));
        }
        if s.allocated > s.issued {
            return Err(violation(format!(
                "Issuer {issuer}: allocated {} exceeds issued {}",
                s.allocated, s.issued
            )));
        }
        Ok(())
    }

    /// Check every tracked issuer.
    ///
    /// # Errors
    /// The first violation found, in issuer address order.
    pub fn verify_all(&self) -> Result<()> {
        for issuer in self.issuers.keys() {
            if let Err(err) = self.verify(issuer) {
                tracing::error!(issuer = %issuer, error = %err, "Supply audit failed");
                return Err(err);
            }
        }
        tracing::debug!(issuers = self.issuers.len(), "Supply audit passed");
        Ok(())
    }
}

fn violation(reason: String) -> RegistryError {
    RegistryError::SupplyInvariantViolation { reason }
}

impl Fabric {
    /// Audit the current state. See [`SupplyAudit`].
    #[must_use]
    pub fn audit(&self) -> SupplyAudit {
        SupplyAudit::of(self)
    }
}
