//! Read-only snapshot of a registry's share state.

use serde::{Deserialize, Serialize};
use sharereg_types::{Address, RegistryNumber, Shares};

use crate::{certificate::Certificate, registry::Registry};

/// Tag and amount of a certificate, without the certificate itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateView {
    pub issuer: Address,
    pub content: RegistryNumber,
    pub amount: Shares,
}

impl From<&Certificate> for CertificateView {
    fn from(cert: &Certificate) -> Self {
        Self {
            issuer: cert.issuer(),
            content: cert.content(),
            amount: cert.amount(),
        }
    }
}

/// Everything an observer can learn about a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerView {
    pub address: Address,
    pub admin: Address,
    pub registry_number: Option<RegistryNumber>,
    pub max_shares: Option<Shares>,
    pub issued_shares: Shares,
    pub allocated_shares: Shares,
    /// Owners allowed to claim, with their pending amount.
    pub eligible_claimants: Vec<(Address, Shares)>,
    /// The unclaimed pool, if any shares remain in it.
    pub unclaimed_pool: Option<CertificateView>,
    /// Certificates of other registries held in custody, keyed by issuer.
    pub held_external_shares: Vec<(Address, CertificateView)>,
    /// Holders of this registry's claimed shares.
    pub share_ledger: Vec<(Address, Shares)>,
}

impl LedgerView {
    pub(crate) fn of(reg: &Registry) -> Self {
        Self {
            address: reg.address(),
            admin: reg.admin(),
            registry_number: reg.registry_number(),
            max_shares: reg.max_shares(),
            issued_shares: reg.issued_shares(),
            allocated_shares: reg.allocated_shares(),
            eligible_claimants: reg.owners().iter().map(|(a, n)| (*a, *n)).collect(),
            unclaimed_pool: reg.unclaimed_certificate().map(CertificateView::from),
            held_external_shares: reg
                .custody()
                .iter()
                .map(|(issuer, cert)| (*issuer, CertificateView::from(cert)))
                .collect(),
            share_ledger: reg
                .active_share_ledger()
                .iter()
                .map(|(a, n)| (*a, *n))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use sharereg_types::RegistryConfig;

    use crate::entrypoint::Entrypoint;

    use super::*;

    #[test]
    fn view_reflects_claims_and_custody() {
        let admin = Address::from_label("admin");
        let user = Address::from_label("u1");
        let foreign = Address::from_label("c9");
        let mut reg = Registry::new(
            Address::from_label("c1"),
            admin,
            RegistryConfig::company(123_456, 2500),
        );
        reg.handle(admin, Entrypoint::Issue { amount: 1000 }).unwrap();
        reg.handle(admin, Entrypoint::AddOwner { owner: user, amount: 400 })
            .unwrap();
        let _ = reg.handle(user, Entrypoint::Claim).unwrap();
        reg.handle(
            foreign,
            Entrypoint::Receive {
                issuer: foreign,
                certificate: Certificate::issue(foreign, 9, 50),
            },
        )
        .unwrap();

        let view = reg.ledger_view();
        assert_eq!(view.issued_shares, 1000);
        assert!(view.eligible_claimants.is_empty());
        assert_eq!(view.unclaimed_pool.unwrap().amount, 600);
        assert_eq!(view.share_ledger, vec![(user, 400)]);
        assert_eq!(view.held_external_shares.len(), 1);
        assert_eq!(view.held_external_shares[0].1.amount, 50);

        let json = serde_json::to_string(&view).unwrap();
        let back: LedgerView = serde_json::from_str(&json).unwrap();
        assert_eq!(view, back);
    }
}
