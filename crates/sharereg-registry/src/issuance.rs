//! Issuance, eligibility, and company configuration entrypoints.
//!
//! All of these are admin-only and purely local: none emits a message.
//! Every check runs before the first mutation, so a rejected call leaves
//! the registry untouched.

use sharereg_types::{Address, RegistryError, RegistryNumber, Result, Shares, constants};

use crate::{auth::AdminCapability, certificate::Certificate, registry::Registry};

impl Registry {
    /// Mint `amount` new shares into the unclaimed pool.
    ///
    /// The fresh certificate is joined with whatever the pool already holds.
    ///
    /// # Errors
    /// - `NotConfigured` if registry number or max shares is unset
    /// - `InvalidAmount` if `amount` is zero
    /// - `MaxSharesExceeded` if `issued_shares + amount > max_shares`
    pub fn issue(&mut self, cap: &AdminCapability, amount: Shares) -> Result<()> {
        self.require(cap)?;
        let content = self.registry_number.ok_or(RegistryError::NotConfigured {
            missing: "registry_number",
        })?;
        let max = self.max_shares.ok_or(RegistryError::NotConfigured {
            missing: "max_shares",
        })?;
        if amount == 0 {
            return Err(RegistryError::InvalidAmount {
                reason: "cannot issue zero shares".to_string(),
            });
        }
        let issued = self
            .issued_shares
            .checked_add(amount)
            .filter(|total| *total <= max)
            .ok_or(RegistryError::MaxSharesExceeded {
                requested: amount,
                issued: self.issued_shares,
                max,
            })?;

        let fresh = Certificate::issue(self.address, content, amount);
        self.unclaimed
            .put_joined(constants::UNCLAIMED_POOL_KEY, fresh)?;
        self.issued_shares = issued;

        tracing::info!(
            registry = %self.address,
            amount,
            issued = self.issued_shares,
            unclaimed = self.unclaimed_amount(),
            "Shares issued"
        );
        Ok(())
    }

    /// Make `owner` eligible to claim `amount` shares.
    ///
    /// A repeated call for the same owner replaces the pending amount.
    /// Headroom is checked against the allocation *including* the entry
    /// being replaced.
    ///
    /// # Errors
    /// Returns `InsufficientIssued` if `amount + allocated_shares > issued_shares`.
    pub fn add_owner(&mut self, cap: &AdminCapability, owner: Address, amount: Shares) -> Result<()> {
        self.require(cap)?;
        let insufficient = RegistryError::InsufficientIssued {
            requested: amount,
            allocated: self.allocated_shares,
            issued: self.issued_shares,
        };
        let requested_total = amount
            .checked_add(self.allocated_shares)
            .ok_or(RegistryError::Overflow {
                context: "allocated_shares",
            })?;
        if requested_total > self.issued_shares {
            return Err(insufficient);
        }

        let previous = self.owners_map.get(&owner).copied().unwrap_or(0);
        // Cannot overflow: bounded by `requested_total`.
        let allocated = self
            .allocated_shares
            .checked_sub(previous)
            .ok_or(RegistryError::Underflow {
                context: "allocated_shares",
            })?
            + amount;

        self.owners_map.insert(owner, amount);
        self.allocated_shares = allocated;

        tracing::info!(
            registry = %self.address,
            owner = %owner,
            amount,
            replaced = previous,
            allocated = self.allocated_shares,
            "Share owner added"
        );
        Ok(())
    }

    /// Remove `owner`'s pending allocation.
    ///
    /// # Errors
    /// - `NotEligible` if `owner` has no entry
    /// - `Underflow` if the allocation counter would go negative
    pub fn remove_owner(&mut self, cap: &AdminCapability, owner: Address) -> Result<()> {
        self.require(cap)?;
        let amount = *self
            .owners_map
            .get(&owner)
            .ok_or(RegistryError::NotEligible(owner))?;
        let allocated =
            self.allocated_shares
                .checked_sub(amount)
                .ok_or(RegistryError::Underflow {
                    context: "allocated_shares",
                })?;

        self.owners_map.remove(&owner);
        self.allocated_shares = allocated;

        tracing::info!(
            registry = %self.address,
            owner = %owner,
            amount,
            allocated = self.allocated_shares,
            "Share owner removed"
        );
        Ok(())
    }

    /// Hand admin rights to `new_admin`. Capabilities granted to the
    /// previous admin stop working.
    pub fn change_admin(&mut self, cap: &AdminCapability, new_admin: Address) -> Result<()> {
        self.require(cap)?;
        self.admin = new_admin;
        tracing::info!(
            registry = %self.address,
            previous = %cap.caller(),
            admin = %new_admin,
            "Admin changed"
        );
        Ok(())
    }

    /// Set the registry number and max shares.
    ///
    /// # Errors
    /// - `RegistryNumberLocked` if shares exist and the number would change
    /// - `MaxSharesBelowIssued` if `max_shares < issued_shares`
    pub fn configure_company(
        &mut self,
        cap: &AdminCapability,
        registry_number: RegistryNumber,
        max_shares: Shares,
    ) -> Result<()> {
        self.require(cap)?;
        if self.issued_shares > 0 {
            if let Some(current) = self.registry_number {
                if current != registry_number {
                    return Err(RegistryError::RegistryNumberLocked { current });
                }
            }
        }
        self.check_max_shares(max_shares)?;

        self.registry_number = Some(registry_number);
        self.max_shares = Some(max_shares);

        tracing::info!(
            registry = %self.address,
            registry_number,
            max_shares,
            "Company configured"
        );
        Ok(())
    }

    /// Change the upper bound on issued shares.
    ///
    /// # Errors
    /// Returns `MaxSharesBelowIssued` if `new_max < issued_shares`.
    pub fn change_max_shares(&mut self, cap: &AdminCapability, new_max: Shares) -> Result<()> {
        self.require(cap)?;
        self.check_max_shares(new_max)?;
        self.max_shares = Some(new_max);
        tracing::info!(registry = %self.address, max_shares = new_max, "Max shares changed");
        Ok(())
    }

    fn check_max_shares(&self, max: Shares) -> Result<()> {
        if max < self.issued_shares {
            return Err(RegistryError::MaxSharesBelowIssued {
                requested: max,
                issued: self.issued_shares,
            });
        }
        Ok(())
    }
}
