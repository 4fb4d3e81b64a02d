//! Custody and cross-registry transfer.
//!
//! A registry holds certificates issued by *other* registries in its custody
//! slots. Moving them uses a two-message protocol:
//!
//! ```text
//!   custodian ──(1) update_ledger(from=custodian, to=dest, n)──▶ issuer
//!   custodian ──(2) receive(issuer, certificate(n))────────────▶ dest
//! ```
//!
//! Message 1 is always enqueued before message 2. Both are only safe under
//! the fabric's all-or-nothing operation semantics: if either fails, the
//! custodian's split is rolled back with them.

use sharereg_types::{Address, CustodyPolicy, RegistryError, Result, Shares};

use crate::{
    auth::AdminCapability, certificate::Certificate, entrypoint::Entrypoint, outbox::Outbox,
    registry::Registry,
};

impl Registry {
    /// Take custody of `certificate`, declared as issued by `issuer`.
    ///
    /// Under [`CustodyPolicy::Overwrite`] a certificate already held for
    /// `issuer` is destroyed and replaced; under [`CustodyPolicy::Join`] the
    /// two are joined.
    ///
    /// # Errors
    /// Returns `IssuerMismatch` if `certificate` was not created by `issuer`.
    pub fn receive(&mut self, issuer: Address, certificate: Certificate) -> Result<()> {
        if certificate.issuer() != issuer {
            return Err(RegistryError::IssuerMismatch {
                declared: issuer,
                actual: certificate.issuer(),
            });
        }
        let amount = certificate.amount();

        match self.custody_policy {
            CustodyPolicy::Overwrite => {
                if let Some(previous) = self.custody.take_and_clear(&issuer) {
                    let destroyed = previous.burn();
                    if destroyed > 0 {
                        tracing::warn!(
                            registry = %self.address,
                            issuer = %issuer,
                            destroyed,
                            "Custodied certificate overwritten"
                        );
                    }
                }
                self.custody.put(issuer, certificate)?;
            }
            CustodyPolicy::Join => self.custody.put_joined(issuer, certificate)?,
        }

        tracing::info!(
            registry = %self.address,
            issuer = %issuer,
            amount,
            held = self.custodied_amount(&issuer),
            "Certificate received"
        );
        Ok(())
    }

    /// Move `amount` of this registry's shares from `from` to `to` in the
    /// active ledger.
    ///
    /// Only `from` itself may send this, so one custodian cannot rewrite
    /// another custodian's balance.
    ///
    /// # Errors
    /// - `LedgerSenderMismatch` if `sender != from`
    /// - `NotInLedger` if `from` holds nothing
    /// - `InsufficientLedgerBalance` if `from` holds less than `amount`
    pub fn update_ledger(
        &mut self,
        sender: Address,
        from: Address,
        to: Address,
        amount: Shares,
    ) -> Result<()> {
        if sender != from {
            return Err(RegistryError::LedgerSenderMismatch { sender, from });
        }
        let balance = *self
            .active_share_ledger
            .get(&from)
            .ok_or(RegistryError::NotInLedger(from))?;
        if balance < amount {
            return Err(RegistryError::InsufficientLedgerBalance {
                needed: amount,
                available: balance,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .active_balance(&to)
            .checked_add(amount)
            .ok_or(RegistryError::Overflow {
                context: "active_share_ledger",
            })?;

        if balance == amount {
            self.active_share_ledger.remove(&from);
        } else {
            self.active_share_ledger.insert(from, balance - amount);
        }
        self.active_share_ledger.insert(to, credited);

        tracing::info!(
            registry = %self.address,
            from = %from,
            to = %to,
            amount,
            "Share ledger updated"
        );
        Ok(())
    }

    /// Send `amount` of custodied `issuing_registry` shares to `destination`.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is zero
    /// - `MissingCustodiedCertificate` if nothing of that issuer is held
    /// - `InsufficientCustody` if less than `amount` is held
    pub fn transfer(
        &mut self,
        cap: &AdminCapability,
        issuing_registry: Address,
        amount: Shares,
        destination: Address,
        outbox: &mut Outbox,
    ) -> Result<()> {
        self.require(cap)?;
        if amount == 0 {
            return Err(RegistryError::InvalidAmount {
                reason: "cannot transfer zero shares".to_string(),
            });
        }
        if !self.custody.is_occupied(&issuing_registry) {
            return Err(RegistryError::MissingCustodiedCertificate(issuing_registry));
        }
        let held = self.custody.amount(&issuing_registry);
        if amount > held {
            return Err(RegistryError::InsufficientCustody {
                issuer: issuing_registry,
                needed: amount,
                available: held,
            });
        }

        let custodied = self
            .custody
            .take_and_clear(&issuing_registry)
            .ok_or(RegistryError::MissingCustodiedCertificate(issuing_registry))?;
        let transferable = if amount < held {
            let (rest, sent) = custodied.split(held - amount, amount)?;
            self.custody.put(issuing_registry, rest)?;
            sent
        } else {
            custodied
        };

        outbox.send(
            issuing_registry,
            Entrypoint::UpdateLedger {
                from: self.address,
                to: destination,
                amount,
            },
        );
        outbox.send(
            destination,
            Entrypoint::Receive {
                issuer: issuing_registry,
                certificate: transferable,
            },
        );

        tracing::info!(
            registry = %self.address,
            issuer = %issuing_registry,
            destination = %destination,
            amount,
            remaining = self.custodied_amount(&issuing_registry),
            "Shares transferred"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sharereg_types::RegistryConfig;

    use crate::entrypoint::Message;

    use super::*;

    fn admin() -> Address {
        Address::from_label("admin")
    }

    fn issuer() -> Address {
        Address::from_label("c1")
    }

    fn custodian(policy: CustodyPolicy) -> (Registry, AdminCapability) {
        let reg = Registry::new(
            Address::from_label("c2"),
            admin(),
            RegistryConfig::company(777, 100).with_custody_policy(policy),
        );
        let cap = reg.authorize(admin()).unwrap();
        (reg, cap)
    }

    fn cert(amount: Shares) -> Certificate {
        Certificate::issue(issuer(), 123_456, amount)
    }

    fn ledger_with(holder: Address, amount: Shares) -> Registry {
        let mut reg = Registry::new(issuer(), admin(), RegistryConfig::company(123_456, 2500));
        reg.active_share_ledger.insert(holder, amount);
        reg
    }

    #[test]
    fn receive_stores_certificate() {
        let (mut reg, _) = custodian(CustodyPolicy::Overwrite);
        reg.receive(issuer(), cert(300)).unwrap();
        assert_eq!(reg.custodied_amount(&issuer()), 300);
    }

    #[test]
    fn receive_overwrites_by_default() {
        let (mut reg, _) = custodian(CustodyPolicy::Overwrite);
        reg.receive(issuer(), cert(300)).unwrap();
        reg.receive(issuer(), cert(200)).unwrap();
        assert_eq!(reg.custodied_amount(&issuer()), 200);
    }

    #[test]
    fn receive_joins_under_join_policy() {
        let (mut reg, _) = custodian(CustodyPolicy::Join);
        reg.receive(issuer(), cert(300)).unwrap();
        reg.receive(issuer(), cert(200)).unwrap();
        assert_eq!(reg.custodied_amount(&issuer()), 500);
    }

    #[test]
    fn receive_rejects_misdeclared_issuer() {
        let (mut reg, _) = custodian(CustodyPolicy::Join);
        let err = reg
            .receive(Address::from_label("c3"), cert(300))
            .unwrap_err();
        assert!(matches!(err, RegistryError::IssuerMismatch { .. }));
        assert!(reg.custody().is_empty());
    }

    #[test]
    fn update_ledger_moves_balance() {
        let c2 = Address::from_label("c2");
        let c3 = Address::from_label("c3");
        let mut reg = ledger_with(c2, 300);

        reg.update_ledger(c2, c2, c3, 200).unwrap();
        assert_eq!(reg.active_balance(&c2), 100);
        assert_eq!(reg.active_balance(&c3), 200);

        reg.update_ledger(c2, c2, c3, 100).unwrap();
        assert!(!reg.active_share_ledger().contains_key(&c2));
        assert_eq!(reg.active_balance(&c3), 300);
    }

    #[test]
    fn update_ledger_requires_sender_to_be_from() {
        let c2 = Address::from_label("c2");
        let mallory = Address::from_label("mallory");
        let mut reg = ledger_with(c2, 300);

        let err = reg.update_ledger(mallory, c2, mallory, 300).unwrap_err();
        assert!(matches!(err, RegistryError::LedgerSenderMismatch { .. }));
        assert_eq!(reg.active_balance(&c2), 300);
    }

    #[test]
    fn update_ledger_rejects_unknown_and_overdrawn() {
        let c2 = Address::from_label("c2");
        let c3 = Address::from_label("c3");
        let mut reg = ledger_with(c2, 300);

        let err = reg.update_ledger(c3, c3, c2, 1).unwrap_err();
        assert!(matches!(err, RegistryError::NotInLedger(_)));

        let err = reg.update_ledger(c2, c2, c3, 301).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InsufficientLedgerBalance {
                needed: 301,
                available: 300
            }
        ));
    }

    #[test]
    fn update_ledger_to_self_is_noop() {
        let c2 = Address::from_label("c2");
        let mut reg = ledger_with(c2, 300);
        reg.update_ledger(c2, c2, c2, 300).unwrap();
        assert_eq!(reg.active_balance(&c2), 300);
    }

    fn unpack(messages: Vec<Message>) -> (Message, Message) {
        let mut it = messages.into_iter();
        let first = it.next().expect("update_ledger message");
        let second = it.next().expect("receive message");
        assert!(it.next().is_none());
        (first, second)
    }

    #[test]
    fn partial_transfer_splits_and_sends_two_messages() {
        let (mut reg, cap) = custodian(CustodyPolicy::Overwrite);
        let dest = Address::from_label("c3");
        reg.receive(issuer(), cert(300)).unwrap();

        let mut outbox = Outbox::new();
        reg.transfer(&cap, issuer(), 200, dest, &mut outbox).unwrap();
        assert_eq!(reg.custodied_amount(&issuer()), 100);

        let (first, second) = unpack(outbox.into_messages());
        assert_eq!(first.target, issuer());
        assert_eq!(
            first.entrypoint,
            Entrypoint::UpdateLedger {
                from: reg.address(),
                to: dest,
                amount: 200
            }
        );
        assert_eq!(second.target, dest);
        assert_eq!(
            second.entrypoint,
            Entrypoint::Receive {
                issuer: issuer(),
                certificate: cert(200)
            }
        );
    }

    #[test]
    fn full_transfer_empties_slot() {
        let (mut reg, cap) = custodian(CustodyPolicy::Overwrite);
        reg.receive(issuer(), cert(300)).unwrap();

        let mut outbox = Outbox::new();
        reg.transfer(&cap, issuer(), 300, Address::from_label("c3"), &mut outbox)
            .unwrap();
        assert!(!reg.custody().is_occupied(&issuer()));
        assert_eq!(outbox.len(), 2);
    }

    #[test]
    fn transfer_without_custody_fails() {
        let (mut reg, cap) = custodian(CustodyPolicy::Overwrite);
        let mut outbox = Outbox::new();
        let err = reg
            .transfer(&cap, issuer(), 10, Address::from_label("c3"), &mut outbox)
            .unwrap_err();
        assert!(matches!(err, RegistryError::MissingCustodiedCertificate(_)));
        assert!(outbox.is_empty());
    }

    #[test]
    fn transfer_more_than_held_fails() {
        let (mut reg, cap) = custodian(CustodyPolicy::Overwrite);
        reg.receive(issuer(), cert(300)).unwrap();
        let mut outbox = Outbox::new();
        let err = reg
            .transfer(&cap, issuer(), 301, Address::from_label("c3"), &mut outbox)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InsufficientCustody { .. }));
        assert_eq!(reg.custodied_amount(&issuer()), 300);
        assert!(outbox.is_empty());
    }

    #[test]
    fn transfer_zero_fails() {
        let (mut reg, cap) = custodian(CustodyPolicy::Overwrite);
        reg.receive(issuer(), cert(300)).unwrap();
        let err = reg
            .transfer(&cap, issuer(), 0, Address::from_label("c3"), &mut Outbox::new())
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAmount { .. }));
    }
}
