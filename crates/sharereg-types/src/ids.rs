//! Identifiers used throughout ShareRegistry.
//!
//! An [`Address`] is a 32-byte identity shared by external accounts and
//! registries alike. Operation IDs use UUIDv7 for time-ordered sorting.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{RegistryError, constants};

/// Company registry number, also the content tag carried by certificates.
pub type RegistryNumber = u64;

/// A count of shares. Always a natural number.
pub type Shares = u64;

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// Unforgeable identity of a caller or a registry.
///
/// Serialized as a lowercase hex string so it can key JSON maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Address(pub [u8; 32]);

impl Address {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Deterministic account address for a human-readable label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::ACCOUNT_ADDRESS_DOMAIN);
        hasher.update(label.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Address of the `nonce`-th registry originated by `originator`.
    ///
    /// Every replica derives the same address for the same origination.
    #[must_use]
    pub fn originated(originator: &Address, nonce: u64) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::ORIGINATED_ADDRESS_DOMAIN);
        hasher.update(originator.0);
        hasher.update(nonce.to_le_bytes());
        Self(hasher.finalize().into())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "addr:{}", hex::encode(&self.0[..8]))
    }
}

impl FromStr for Address {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = hex::decode(s).map_err(|e| RegistryError::Serialization(e.to_string()))?;
        let bytes: [u8; 32] = raw.try_into().map_err(|raw: Vec<u8>| {
            RegistryError::Serialization(format!("address must be 32 bytes, got {}", raw.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Address {
    /// Random address for unit tests. **Never use in production.**
    pub fn random() -> Self {
        Self(rand::random::<[u8; 32]>())
    }
}

// ---------------------------------------------------------------------------
// OperationId
// ---------------------------------------------------------------------------

/// Identifier of a committed top-level operation. Uses UUIDv7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OperationId(pub Uuid);

impl OperationId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
