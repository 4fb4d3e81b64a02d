//! Configuration types for registries, the fabric, and governance.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Address, RegistryError, RegistryNumber, Result, Shares, constants};

/// What a registry does when it receives a certificate of an issuer it
/// already holds in custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustodyPolicy {
    /// Replace the held certificate; the replaced amount is destroyed.
    #[default]
    Overwrite,
    /// Join the incoming certificate into the held one.
    Join,
}

/// Per-registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Company registry number; the content tag of issued certificates.
    #[serde(default)]
    pub registry_number: Option<RegistryNumber>,
    /// Upper bound on `issued_shares`.
    #[serde(default)]
    pub max_shares: Option<Shares>,
    #[serde(default)]
    pub custody_policy: CustodyPolicy,
}

impl RegistryConfig {
    /// A configured company with the default custody policy.
    #[must_use]
    pub fn company(registry_number: RegistryNumber, max_shares: Shares) -> Self {
        Self {
            registry_number: Some(registry_number),
            max_shares: Some(max_shares),
            custody_policy: CustodyPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_custody_policy(mut self, policy: CustodyPolicy) -> Self {
        self.custody_policy = policy;
        self
    }
}

/// Messaging fabric configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricConfig {
    /// Internal messages a single top-level call may cascade into.
    pub max_messages_per_operation: usize,
    /// Committed receipts retained; the oldest are dropped first.
    pub receipt_history_limit: usize,
}

impl Default for FabricConfig {
    fn default() -> Self {
        Self {
            max_messages_per_operation: constants::DEFAULT_MAX_MESSAGES_PER_OPERATION,
            receipt_history_limit: constants::DEFAULT_RECEIPT_HISTORY_LIMIT,
        }
    }
}

/// Governance (company factory) configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Identity allowed to create companies.
    pub admin: Address,
}

/// Parse any configuration struct from JSON.
///
/// # Errors
/// Returns [`RegistryError::Configuration`] if the JSON is malformed.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).map_err(|e| RegistryError::Configuration(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_unconfigured() {
        let cfg = RegistryConfig::default();
        assert!(cfg.registry_number.is_none());
        assert!(cfg.max_shares.is_none());
        assert_eq!(cfg.custody_policy, CustodyPolicy::Overwrite);
    }

    #[test]
    fn fabric_config_defaults() {
        let cfg = FabricConfig::default();
        assert_eq!(cfg.max_messages_per_operation, 1_000);
        assert_eq!(cfg.receipt_history_limit, 10_000);
    }

    #[test]
    fn registry_config_from_partial_json() {
        let cfg: RegistryConfig =
            from_json(r#"{"registry_number": 123456, "custody_policy": "join"}"#).unwrap();
        assert_eq!(cfg.registry_number, Some(123_456));
        assert_eq!(cfg.max_shares, None);
        assert_eq!(cfg.custody_policy, CustodyPolicy::Join);
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = from_json::<FabricConfig>("{ nope").unwrap_err();
        assert!(matches!(err, RegistryError::Configuration(_)));
    }

    #[test]
    fn governance_config_serde_roundtrip() {
        let cfg = GovernanceConfig {
            admin: Address::from_label("gov-admin"),
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: GovernanceConfig = from_json(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn company_builder() {
        let cfg = RegistryConfig::company(654_321, 1111).with_custody_policy(CustodyPolicy::Join);
        assert_eq!(cfg.registry_number, Some(654_321));
        assert_eq!(cfg.max_shares, Some(1111));
        assert_eq!(cfg.custody_policy, CustodyPolicy::Join);
    }
}
