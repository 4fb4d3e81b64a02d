//! Operation receipts for the ShareRegistry audit trail.
//!
//! Every committed top-level call produces an [`OperationReceipt`] listing
//! the internal messages it caused, in delivery order, with a SHA-256
//! digest committing to that list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Address, EntrypointKind, OperationId, constants};

/// One delivered call: who sent it, where it went, which entrypoint ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveredMessage {
    pub sender: Address,
    pub target: Address,
    pub entrypoint: EntrypointKind,
    /// `true` if the target was outside the fabric (external delivery).
    pub external: bool,
}

/// Proof that a top-level call and all its cascading messages applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationReceipt {
    pub id: OperationId,
    /// The top-level caller.
    pub sender: Address,
    /// The registry the top-level call targeted.
    pub target: Address,
    pub entrypoint: EntrypointKind,
    /// Internal messages, in delivery order (excludes the top-level call).
    pub messages: Vec<DeliveredMessage>,
    /// SHA-256 over the top-level call and every delivered message.
    pub digest: [u8; 32],
    pub applied_at: DateTime<Utc>,
}

impl OperationReceipt {
    /// Build a receipt, computing its digest.
    #[must_use]
    pub fn new(
        sender: Address,
        target: Address,
        entrypoint: EntrypointKind,
        messages: Vec<DeliveredMessage>,
    ) -> Self {
        let digest = Self::compute_digest(sender, target, entrypoint, &messages);
        Self {
            id: OperationId::new(),
            sender,
            target,
            entrypoint,
            messages,
            digest,
            applied_at: Utc::now(),
        }
    }

    /// Digest over the call tree. Independent of `id` and `applied_at`.
    #[must_use]
    pub fn compute_digest(
        sender: Address,
        target: Address,
        entrypoint: EntrypointKind,
        messages: &[DeliveredMessage],
    ) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::OPERATION_DIGEST_DOMAIN);
        hasher.update(sender.0);
        hasher.update(target.0);
        hasher.update(entrypoint.to_string().as_bytes());
        hasher.update((messages.len() as u64).to_le_bytes());
        for msg in messages {
            hasher.update(msg.sender.0);
            hasher.update(msg.target.0);
            hasher.update(msg.entrypoint.to_string().as_bytes());
            hasher.update([u8::from(msg.external)]);
        }
        hasher.finalize().into()
    }

    /// Whether `address` sent or received any part of this operation.
    #[must_use]
    pub fn touches(&self, address: &Address) -> bool {
        self.sender == *address
            || self.target == *address
            || self
                .messages
                .iter()
                .any(|m| m.sender == *address || m.target == *address)
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(entrypoint: EntrypointKind) -> DeliveredMessage {
        DeliveredMessage {
            sender: Address::from_label("c2"),
            target: Address::from_label("c1"),
            entrypoint,
            external: false,
        }
    }

    #[test]
    fn digest_is_deterministic() {
        let a = OperationReceipt::new(
            Address::from_label("admin"),
            Address::from_label("c2"),
            EntrypointKind::Transfer,
            vec![msg(EntrypointKind::UpdateLedger), msg(EntrypointKind::Receive)],
        );
        let b = OperationReceipt::new(
            Address::from_label("admin"),
            Address::from_label("c2"),
            EntrypointKind::Transfer,
            vec![msg(EntrypointKind::UpdateLedger), msg(EntrypointKind::Receive)],
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.digest, b.digest);
    }

    #[test]
    fn digest_commits_to_message_order() {
        let a = OperationReceipt::compute_digest(
            Address::from_label("admin"),
            Address::from_label("c2"),
            EntrypointKind::Transfer,
            &[msg(EntrypointKind::UpdateLedger), msg(EntrypointKind::Receive)],
        );
        let b = OperationReceipt::compute_digest(
            Address::from_label("admin"),
            Address::from_label("c2"),
            EntrypointKind::Transfer,
            &[msg(EntrypointKind::Receive), msg(EntrypointKind::UpdateLedger)],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn touches_includes_message_endpoints() {
        let receipt = OperationReceipt::new(
            Address::from_label("admin"),
            Address::from_label("c2"),
            EntrypointKind::ClaimOnBehalf,
            vec![msg(EntrypointKind::Claim)],
        );
        assert!(receipt.touches(&Address::from_label("c1")));
        assert!(!receipt.touches(&Address::from_label("c3")));
        assert_eq!(receipt.digest_hex().len(), 64);
    }
}
