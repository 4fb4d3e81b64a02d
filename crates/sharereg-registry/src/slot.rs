//! Keyed single-occupancy certificate storage.
//!
//! A [`CertificateSlot`] holds at most one certificate per key. Updates go
//! through `take_and_clear` followed by `put` (or `put_joined`) inside one
//! registry invocation, so no other operation ever observes a half-updated
//! slot and no certificate is replaced without first being taken out.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sharereg_types::{RegistryError, Result, Shares};

use crate::certificate::Certificate;

/// Zero-or-one certificate per key.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Ord + Serialize",
    deserialize = "K: Ord + Deserialize<'de>"
))]
pub struct CertificateSlot<K> {
    slots: BTreeMap<K, Certificate>,
}

impl<K: Ord + Copy + fmt::Display> CertificateSlot<K> {
    /// Create an empty slot map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Remove and return the certificate under `key`, leaving it empty.
    pub fn take_and_clear(&mut self, key: &K) -> Option<Certificate> {
        self.slots.remove(key)
    }

    /// Install `certificate` under an empty `key`.
    ///
    /// # Errors
    /// Returns [`RegistryError::SlotOccupied`] if `key` already holds a
    /// certificate. The rejected certificate is dropped along with the
    /// aborted invocation.
    pub fn put(&mut self, key: K, certificate: Certificate) -> Result<()> {
        if self.slots.contains_key(&key) {
            return Err(RegistryError::SlotOccupied {
                key: key.to_string(),
            });
        }
        self.slots.insert(key, certificate);
        Ok(())
    }

    /// Install `certificate`, joining it with whatever `key` already holds.
    ///
    /// # Errors
    /// Returns [`RegistryError::CertificateMismatch`] if the held certificate
    /// has a different `(issuer, content)`.
    pub fn put_joined(&mut self, key: K, certificate: Certificate) -> Result<()> {
        let merged = match self.take_and_clear(&key) {
            Some(existing) => existing.join(certificate)?,
            None => certificate,
        };
        self.put(key, merged)
    }

    /// Amount held under `key` (zero when empty).
    #[must_use]
    pub fn amount(&self, key: &K) -> Shares {
        self.slots.get(key).map_or(0, Certificate::amount)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<&Certificate> {
        self.slots.get(key)
    }

    #[must_use]
    pub fn is_occupied(&self, key: &K) -> bool {
        self.slots.contains_key(key)
    }

    /// Iterate over `(key, certificate)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Certificate)> {
        self.slots.iter()
    }

    /// Number of occupied keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<K: Ord + Copy + fmt::Display> Default for CertificateSlot<K> {
    fn default() -> Self {
        Self::new()
    }
}
