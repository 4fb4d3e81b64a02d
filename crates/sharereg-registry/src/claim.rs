//! Claim entrypoints.
//!
//! A claim moves an eligible owner's allocation out of the unclaimed pool:
//! the pool certificate is split, the remainder goes back into the pool,
//! the claimed piece is sent to the claimant's `receive` entrypoint, and
//! the active ledger records the claimant as holder.

use sharereg_types::{Address, RegistryError, Result, constants};

use crate::{auth::AdminCapability, entrypoint::Entrypoint, outbox::Outbox, registry::Registry};

impl Registry {
    /// The sender claims its own allocation.
    ///
    /// # Errors
    /// See [`Registry::claim_direct`].
    pub fn claim(&mut self, sender: Address, outbox: &mut Outbox) -> Result<()> {
        self.process_claim(sender, outbox)
    }

    /// Ask `source` to process a claim for this registry.
    ///
    /// The relayed `claim` arrives at `source` with this registry as the
    /// sender, so this registry is the claimant there.
    pub fn claim_on_behalf(&self, source: Address, outbox: &mut Outbox) {
        outbox.send(source, Entrypoint::Claim);
        tracing::info!(
            registry = %self.address,
            source = %source,
            "Claim relayed"
        );
    }

    /// The admin processes `destination`'s claim.
    ///
    /// # Errors
    /// - `NotEligible` / `NothingToClaim` if `destination` has no positive allocation
    /// - `MissingUnclaimedCertificate` if the pool is empty
    /// - `InsufficientUnclaimed` if the pool holds less than the allocation
    pub fn claim_direct(
        &mut self,
        cap: &AdminCapability,
        destination: Address,
        outbox: &mut Outbox,
    ) -> Result<()> {
        self.require(cap)?;
        self.process_claim(destination, outbox)
    }

    fn process_claim(&mut self, claimant: Address, outbox: &mut Outbox) -> Result<()> {
        let key = constants::UNCLAIMED_POOL_KEY;

        // 1. Validate everything before touching state
        let claimable = *self
            .owners_map
            .get(&claimant)
            .ok_or(RegistryError::NotEligible(claimant))?;
        if claimable == 0 {
            return Err(RegistryError::NothingToClaim(claimant));
        }
        if !self.unclaimed.is_occupied(&key) {
            return Err(RegistryError::MissingUnclaimedCertificate);
        }
        let pooled = self.unclaimed.amount(&key);
        if pooled < claimable {
            return Err(RegistryError::InsufficientUnclaimed {
                needed: claimable,
                available: pooled,
            });
        }
        let allocated =
            self.allocated_shares
                .checked_sub(claimable)
                .ok_or(RegistryError::Underflow {
                    context: "allocated_shares",
                })?;
        let held = self
            .active_balance(&claimant)
            .checked_add(claimable)
            .ok_or(RegistryError::Overflow {
                context: "active_share_ledger",
            })?;

        // 2. Split the pool certificate
        let pool = self
            .unclaimed
            .take_and_clear(&key)
            .ok_or(RegistryError::MissingUnclaimedCertificate)?;
        let (remainder, claimed) = pool.split(pooled - claimable, claimable)?;
        if remainder.amount() > 0 {
            self.unclaimed.put(key, remainder)?;
        } else {
            remainder.burn();
        }

        // 3. Bookkeeping
        self.owners_map.remove(&claimant);
        self.allocated_shares = allocated;
        self.active_share_ledger.insert(claimant, held);

        // 4. Hand off the claimed certificate
        outbox.send(
            claimant,
            Entrypoint::Receive {
                issuer: claimed.issuer(),
                certificate: claimed,
            },
        );

        tracing::info!(
            registry = %self.address,
            claimant = %claimant,
            amount = claimable,
            unclaimed = self.unclaimed_amount(),
            "Shares claimed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sharereg_types::{EntrypointKind, RegistryConfig, Shares};

    use crate::{certificate::Certificate, entrypoint::Message};

    use super::*;

    fn admin() -> Address {
        Address::from_label("admin")
    }

    fn setup(issued: Shares) -> (Registry, AdminCapability) {
        let mut reg = Registry::new(
            Address::from_label("c1"),
            admin(),
            RegistryConfig::company(123_456, 2500),
        );
        let cap = reg.authorize(admin()).unwrap();
        reg.issue(&cap, issued).unwrap();
        (reg, cap)
    }

    fn sent_certificate(messages: Vec<Message>) -> (Address, Address, Certificate) {
        let mut messages = messages.into_iter();
        let msg = messages.next().expect("one message");
        assert!(messages.next().is_none(), "exactly one message");
        match msg.entrypoint {
            Entrypoint::Receive {
                issuer,
                certificate,
            } => (msg.target, issuer, certificate),
            other => panic!("expected receive, got {:?}", other.kind()),
        }
    }

    #[test]
    fn claim_splits_pool_and_sends_certificate() {
        let (mut reg, cap) = setup(2200);
        let user = Address::from_label("u2");
        reg.add_owner(&cap, user, 1000).unwrap();

        let mut outbox = Outbox::new();
        reg.claim(user, &mut outbox).unwrap();

        assert_eq!(reg.unclaimed_amount(), 1200);
        assert_eq!(reg.active_balance(&user), 1000);
        assert_eq!(reg.pending_claim(&user), None);
        assert_eq!(reg.allocated_shares(), 0);

        let (target, issuer, cert) = sent_certificate(outbox.into_messages());
        assert_eq!(target, user);
        assert_eq!(issuer, reg.address());
        assert_eq!(cert.issuer(), reg.address());
        assert_eq!(cert.content(), 123_456);
        assert_eq!(cert.amount(), 1000);
    }

    #[test]
    fn second_claim_fails() {
        let (mut reg, cap) = setup(2200);
        let user = Address::from_label("u1");
        reg.add_owner(&cap, user, 500).unwrap();
        let _ = reg.handle(user, Entrypoint::Claim).unwrap();

        let err = reg.handle(user, Entrypoint::Claim).unwrap_err();
        assert!(matches!(err, RegistryError::NotEligible(a) if a == user));
        assert_eq!(reg.unclaimed_amount(), 1700);
    }

    #[test]
    fn ineligible_claim_fails_without_state_change() {
        let (mut reg, _) = setup(2200);
        let mut outbox = Outbox::new();
        let err = reg
            .claim(Address::from_label("stranger"), &mut outbox)
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotEligible(_)));
        assert!(outbox.is_empty());
        assert_eq!(reg.unclaimed_amount(), 2200);
    }

    #[test]
    fn zero_allocation_cannot_claim() {
        let (mut reg, cap) = setup(2200);
        let user = Address::from_label("u0");
        reg.add_owner(&cap, user, 0).unwrap();
        let err = reg.claim(user, &mut Outbox::new()).unwrap_err();
        assert!(matches!(err, RegistryError::NothingToClaim(_)));
        assert_eq!(reg.pending_claim(&user), Some(0));
    }

    #[test]
    fn claim_with_empty_pool_keeps_eligibility() {
        let (mut reg, cap) = setup(500);
        let u1 = Address::from_label("u1");
        let u2 = Address::from_label("u2");
        reg.add_owner(&cap, u1, 500).unwrap();
        let _ = reg.handle(u1, Entrypoint::Claim).unwrap();
        // Whole pool claimed: the slot is now empty
        assert!(reg.unclaimed_certificate().is_none());

        // Allocation headroom is measured against issued shares
        reg.add_owner(&cap, u2, 500).unwrap();
        let err = reg.claim(u2, &mut Outbox::new()).unwrap_err();
        assert!(matches!(err, RegistryError::MissingUnclaimedCertificate));
        assert_eq!(reg.pending_claim(&u2), Some(500));
        assert_eq!(reg.allocated_shares(), 500);
    }

    #[test]
    fn claim_larger_than_pool_rejected() {
        let (mut reg, cap) = setup(1000);
        let u1 = Address::from_label("u1");
        let u2 = Address::from_label("u2");
        reg.add_owner(&cap, u1, 600).unwrap();
        let _ = reg.handle(u1, Entrypoint::Claim).unwrap();
        reg.add_owner(&cap, u2, 900).unwrap();

        let err = reg.claim(u2, &mut Outbox::new()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InsufficientUnclaimed {
                needed: 900,
                available: 400
            }
        ));
        assert_eq!(reg.unclaimed_amount(), 400);
    }

    #[test]
    fn claim_direct_targets_destination() {
        let (mut reg, cap) = setup(2200);
        let dest = Address::from_label("c2");
        reg.add_owner(&cap, dest, 300).unwrap();

        let outbox = reg
            .handle(admin(), Entrypoint::ClaimDirect { destination: dest })
            .unwrap();
        let (target, _, cert) = sent_certificate(outbox.into_messages());
        assert_eq!(target, dest);
        assert_eq!(cert.amount(), 300);
        assert_eq!(reg.active_balance(&dest), 300);
    }

    #[test]
    fn repeated_claims_accumulate_in_ledger() {
        let (mut reg, cap) = setup(2200);
        let user = Address::from_label("u1");
        reg.add_owner(&cap, user, 200).unwrap();
        let _ = reg.handle(user, Entrypoint::Claim).unwrap();
        reg.add_owner(&cap, user, 300).unwrap();
        let _ = reg.handle(user, Entrypoint::Claim).unwrap();
        assert_eq!(reg.active_balance(&user), 500);
        assert_eq!(reg.unclaimed_amount(), 1700);
    }

    #[test]
    fn claim_on_behalf_relays_claim_to_source() {
        let (mut reg, _) = setup(100);
        let source = Address::from_label("c9");
        let outbox = reg
            .handle(Address::from_label("anyone"), Entrypoint::ClaimOnBehalf { source })
            .unwrap();
        let messages = outbox.into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].target, source);
        assert_eq!(messages[0].entrypoint.kind(), EntrypointKind::Claim);
    }
}
