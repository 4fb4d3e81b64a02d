//! Company factory.
//!
//! [`Governance`] originates a configured registry per company and keeps a
//! directory from company ID to registry address. The directory is owned
//! state passed around explicitly; there is no process-wide registry list.

use std::collections::BTreeMap;

use sharereg_types::{
    Address, GovernanceConfig, RegistryConfig, RegistryError, RegistryNumber, Result, Shares,
};

use crate::fabric::Fabric;

/// The company factory and its directory.
#[derive(Debug)]
pub struct Governance {
    /// Originator address of every registry this factory deploys.
    address: Address,
    admin: Address,
    directory: BTreeMap<RegistryNumber, Address>,
}

impl Governance {
    #[must_use]
    pub fn new(address: Address, config: GovernanceConfig) -> Self {
        Self {
            address,
            admin: config.admin,
            directory: BTreeMap::new(),
        }
    }

    /// Deploy a registry for `company_id` with `shares` as its maximum and
    /// `admin` as its administrator.
    ///
    /// # Errors
    /// - `NotGovernanceAdmin` if `sender` is not the governance admin
    /// - `CompanyExists` if `company_id` is already in the directory
    pub fn create_company(
        &mut self,
        fabric: &mut Fabric,
        sender: Address,
        company_id: RegistryNumber,
        shares: Shares,
        admin: Address,
    ) -> Result<Address> {
        if sender != self.admin {
            return Err(RegistryError::NotGovernanceAdmin { caller: sender });
        }
        if self.directory.contains_key(&company_id) {
            return Err(RegistryError::CompanyExists(company_id));
        }

        let registry = fabric.originate(
            self.address,
            admin,
            RegistryConfig::company(company_id, shares),
        )?;
        self.directory.insert(company_id, registry);

        tracing::info!(
            company_id,
            registry = %registry,
            max_shares = shares,
            admin = %admin,
            "Company created"
        );
        Ok(registry)
    }

    /// Registry address of `company_id`, if created.
    #[must_use]
    pub fn lookup(&self, company_id: RegistryNumber) -> Option<Address> {
        self.directory.get(&company_id).copied()
    }

    #[must_use]
    pub fn directory(&self) -> &BTreeMap<RegistryNumber, Address> {
        &self.directory
    }

    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    #[must_use]
    pub fn admin(&self) -> Address {
        self.admin
    }
}
