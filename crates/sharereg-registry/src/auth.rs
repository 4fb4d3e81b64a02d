//! Admin authorization capability.
//!
//! Privileged registry operations take an [`AdminCapability`] instead of
//! re-checking the sender themselves. The only way to obtain one is
//! [`Registry::authorize`](crate::Registry::authorize), and the capability
//! is bound to the registry that granted it: privileged methods reject a
//! capability granted elsewhere, or to an admin that has since been
//! replaced.

use sharereg_types::{Address, RegistryError, Result};

/// Proof that the current caller is the admin of one specific registry.
///
/// Not `Clone`/`Copy` and not constructible outside this crate; it lives
/// only as long as the invocation that produced it.
#[derive(Debug)]
pub struct AdminCapability {
    registry: Address,
    caller: Address,
}

impl AdminCapability {
    /// Grant the capability for `registry` if `caller` is `admin`.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotAdmin`] otherwise.
    pub(crate) fn grant(registry: Address, admin: &Address, caller: Address) -> Result<Self> {
        if caller == *admin {
            Ok(Self { registry, caller })
        } else {
            Err(RegistryError::NotAdmin { caller })
        }
    }

    /// Check that this capability still authorizes `admin` on `registry`.
    ///
    /// # Errors
    /// Returns [`RegistryError::NotAdmin`] if it was granted for another
    /// registry or to a different admin.
    pub(crate) fn verify(&self, registry: &Address, admin: &Address) -> Result<()> {
        if self.registry == *registry && self.caller == *admin {
            Ok(())
        } else {
            Err(RegistryError::NotAdmin {
                caller: self.caller,
            })
        }
    }

    /// The registry this capability was granted by.
    #[must_use]
    pub fn registry(&self) -> Address {
        self.registry
    }

    /// The admin identity this capability was granted to.
    #[must_use]
    pub fn caller(&self) -> Address {
        self.caller
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Address {
        Address::from_label("c1")
    }

    #[test]
    fn admin_gets_capability() {
        let admin = Address::from_label("admin");
        let cap = AdminCapability::grant(registry(), &admin, admin).unwrap();
        assert_eq!(cap.caller(), admin);
        assert_eq!(cap.registry(), registry());
        assert!(cap.verify(&registry(), &admin).is_ok());
    }

    #[test]
    fn non_admin_rejected() {
        let admin = Address::from_label("admin");
        let mallory = Address::from_label("mallory");
        let err = AdminCapability::grant(registry(), &admin, mallory).unwrap_err();
        assert!(matches!(err, RegistryError::NotAdmin { caller } if caller == mallory));
    }

    #[test]
    fn capability_is_bound_to_registry_and_admin() {
        let admin = Address::from_label("admin");
        let cap = AdminCapability::grant(registry(), &admin, admin).unwrap();
        assert!(cap.verify(&Address::from_label("c2"), &admin).is_err());
        assert!(cap.verify(&registry(), &Address::from_label("successor")).is_err());
    }
}
