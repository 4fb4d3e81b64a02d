//! The messaging fabric: all-or-nothing operations over many registries.
//!
//! A top-level call runs the target registry's handler, then delivers every
//! message it enqueued, then every message *those* enqueued, and so on, in
//! FIFO order, with the emitting registry stamped as sender. The operation
//! is complete when the queue is empty.
//!
//! ## Atomicity
//!
//! Before the first handler runs, the fabric takes a detached copy of its
//! full state. If any handler or delivery fails, the copy is swapped back
//! in: the top-level call and every message it caused are discarded
//! together. The two-message
//! transfer protocol depends on this. On a substrate without joint rollback
//! it would need compensation (reserve, commit, compensate) around
//! `update_ledger` and `receive`.
//!
//! ## External recipients
//!
//! A `receive` addressed to something that is not a registry is an external
//! delivery: the certificate leaves the protocol and is only accounted for
//! in [`Fabric::external_amount`]. Any other message to a non-registry
//! aborts the operation.
//!
//! ## Sender identity
//!
//! The fabric stands in for the environment that authenticates callers. A
//! registry never makes a top-level call, so one naming a registry as its
//! sender is rejected before anything runs; so is any top-level `receive`,
//! since external callers hold no certificates.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use sharereg_registry::{Certificate, CertificateSlot, Entrypoint, Message, Registry};
use sharereg_types::{
    Address, DeliveredMessage, FabricConfig, OperationReceipt, RegistryConfig, RegistryError,
    Result, Shares,
};

/// Everything that rolls back together.
#[derive(Debug, Default, Serialize, Deserialize)]
struct FabricState {
    registries: BTreeMap<Address, Registry>,
    /// recipient → issuer → certificate, for deliveries outside the fabric.
    external: BTreeMap<Address, CertificateSlot<Address>>,
    /// Next origination nonce per originator.
    nonces: BTreeMap<Address, u64>,
}

/// Simulated execution environment for a closed set of registries.
pub struct Fabric {
    state: FabricState,
    config: FabricConfig,
    /// Committed receipts, oldest first.
    receipts: VecDeque<OperationReceipt>,
}

impl Fabric {
    /// Create an empty fabric.
    #[must_use]
    pub fn new(config: FabricConfig) -> Self {
        Self {
            state: FabricState::default(),
            config,
            receipts: VecDeque::new(),
        }
    }

    /// Deploy a new registry and return its address.
    ///
    /// The address is derived from `originator` and its origination count,
    /// so the same sequence of originations yields the same addresses.
    ///
    /// # Errors
    /// Returns `RegistryExists` on an address collision.
    pub fn originate(
        &mut self,
        originator: Address,
        admin: Address,
        config: RegistryConfig,
    ) -> Result<Address> {
        let nonce = self.state.nonces.get(&originator).copied().unwrap_or(0);
        let address = Address::originated(&originator, nonce);
        if self.is_registry(&address) {
            return Err(RegistryError::RegistryExists(address));
        }

        self.state
            .registries
            .insert(address, Registry::new(address, admin, config));
        self.state.nonces.insert(originator, nonce + 1);

        tracing::info!(
            registry = %address,
            originator = %originator,
            admin = %admin,
            "Registry originated"
        );
        Ok(address)
    }

    /// Run a top-level call from `sender` to the registry at `target`.
    ///
    /// # Errors
    /// Any error from any handler or delivery in the operation. The fabric
    /// state is then exactly as it was before the call.
    pub fn call(
        &mut self,
        sender: Address,
        target: Address,
        entrypoint: Entrypoint,
    ) -> Result<OperationReceipt> {
        let kind = entrypoint.kind();
        if self.is_registry(&sender) {
            tracing::warn!(
                sender = %sender,
                target = %target,
                entrypoint = %kind,
                "Top-level call impersonating a registry"
            );
            return Err(RegistryError::RegistryImpersonation { sender });
        }
        if matches!(entrypoint, Entrypoint::Receive { .. }) {
            return Err(RegistryError::ForeignCertificate { sender });
        }
        let snapshot = self.snapshot()?;

        match self.execute(sender, target, entrypoint) {
            Ok(messages) => {
                let receipt = OperationReceipt::new(sender, target, kind, messages);
                tracing::info!(
                    operation = %receipt.id,
                    sender = %sender,
                    target = %target,
                    entrypoint = %kind,
                    messages = receipt.messages.len(),
                    digest = receipt.digest_hex(),
                    "Operation committed"
                );
                self.record(receipt.clone());
                Ok(receipt)
            }
            Err(err) => {
                self.state = snapshot;
                tracing::warn!(
                    sender = %sender,
                    target = %target,
                    entrypoint = %kind,
                    error = %err,
                    "Operation rejected, state rolled back"
                );
                Err(err)
            }
        }
    }

    fn execute(
        &mut self,
        sender: Address,
        target: Address,
        entrypoint: Entrypoint,
    ) -> Result<Vec<DeliveredMessage>> {
        let registry = self
            .state
            .registries
            .get_mut(&target)
            .ok_or(RegistryError::UnknownTarget {
                target,
                entrypoint: entrypoint.kind(),
            })?;
        let outbox = registry.handle(sender, entrypoint)?;

        let mut queue: VecDeque<(Address, Message)> = outbox
            .into_messages()
            .into_iter()
            .map(|msg| (target, msg))
            .collect();
        let mut delivered = Vec::new();

        while let Some((from, msg)) = queue.pop_front() {
            if delivered.len() >= self.config.max_messages_per_operation {
                return Err(RegistryError::MessageLimitExceeded {
                    limit: self.config.max_messages_per_operation,
                });
            }
            let to = msg.target;
            let kind = msg.entrypoint.kind();

            let external = match self.state.registries.get_mut(&to) {
                Some(registry) => {
                    let outbox = registry.handle(from, msg.entrypoint)?;
                    queue.extend(outbox.into_messages().into_iter().map(|m| (to, m)));
                    false
                }
                None => {
                    self.deliver_external(to, msg.entrypoint)?;
                    true
                }
            };

            tracing::debug!(
                sender = %from,
                target = %to,
                entrypoint = %kind,
                external,
                "Message delivered"
            );
            delivered.push(DeliveredMessage {
                sender: from,
                target: to,
                entrypoint: kind,
                external,
            });
        }

        Ok(delivered)
    }

    fn deliver_external(&mut self, recipient: Address, entrypoint: Entrypoint) -> Result<()> {
        match entrypoint {
            Entrypoint::Receive {
                issuer,
                certificate,
            } => {
                if certificate.issuer() != issuer {
                    return Err(RegistryError::IssuerMismatch {
                        declared: issuer,
                        actual: certificate.issuer(),
                    });
                }
                tracing::info!(
                    recipient = %recipient,
                    issuer = %issuer,
                    amount = certificate.amount(),
                    "Certificate left the fabric"
                );
                self.state
                    .external
                    .entry(recipient)
                    .or_default()
                    .put_joined(issuer, certificate)
            }
            other => Err(RegistryError::UnknownTarget {
                target: recipient,
                entrypoint: other.kind(),
            }),
        }
    }

    fn record(&mut self, receipt: OperationReceipt) {
        if self.config.receipt_history_limit == 0 {
            return;
        }
        while self.receipts.len() >= self.config.receipt_history_limit {
            self.receipts.pop_front();
        }
        self.receipts.push_back(receipt);
    }

    /// Detached copy of the state. Certificates are not `Clone`, so the
    /// copy goes through serde; it is fully built before anything mutates,
    /// which makes the rollback itself infallible.
    fn snapshot(&self) -> Result<FabricState> {
        let bytes = serde_json::to_vec(&self.state)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| RegistryError::Internal(format!("state snapshot failed: {e}")))
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &FabricConfig {
        &self.config
    }

    #[must_use]
    pub fn is_registry(&self, address: &Address) -> bool {
        self.state.registries.contains_key(address)
    }

    #[must_use]
    pub fn registry(&self, address: &Address) -> Option<&Registry> {
        self.state.registries.get(address)
    }

    /// All registries, in address order.
    pub fn registries(&self) -> impl Iterator<Item = &Registry> {
        self.state.registries.values()
    }

    /// Amount of `issuer`'s shares delivered to the external `recipient`.
    #[must_use]
    pub fn external_amount(&self, recipient: &Address, issuer: &Address) -> Shares {
        self.state
            .external
            .get(recipient)
            .map_or(0, |slot| slot.amount(issuer))
    }

    /// Every externally delivered certificate as `(recipient, certificate)`.
    pub fn external_holdings(&self) -> impl Iterator<Item = (&Address, &Certificate)> {
        self.state
            .external
            .iter()
            .flat_map(|(recipient, slot)| slot.iter().map(move |(_, cert)| (recipient, cert)))
    }

    /// Committed receipts, oldest first.
    pub fn receipts(&self) -> impl Iterator<Item = &OperationReceipt> {
        self.receipts.iter()
    }

    /// Committed receipts in which `address` took part, oldest first.
    #[must_use]
    pub fn history(&self, address: &Address) -> Vec<&OperationReceipt> {
        self.receipts.iter().filter(|r| r.touches(address)).collect()
    }

    /// Persist registries, external holdings and nonces as JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.state)?)
    }

    /// Restore a fabric persisted with [`Fabric::to_json`]. Receipt history
    /// is not persisted.
    pub fn from_json(json: &str, config: FabricConfig) -> Result<Self> {
        Ok(Self {
            state: serde_json::from_str(json)?,
            config,
            receipts: VecDeque::new(),
        })
    }
}

impl Default for Fabric {
    fn default() -> Self {
        Self::new(FabricConfig::default())
    }
}
