//! Error types for the ShareRegistry protocol.
//!
//! All errors use the `SR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Authorization errors
//! - 2xx: Precondition errors
//! - 3xx: Certificate / slot resource-state errors
//! - 4xx: Message delivery errors
//! - 8xx: Invariant errors
//! - 9xx: General / internal errors
//!
//! Any error aborts the whole top-level operation, including every message
//! it has already caused.

use thiserror::Error;

use crate::{Address, EntrypointKind, RegistryNumber, Shares};

/// Coarse classification of a [`RegistryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Wrong caller for an admin-only or self-only entrypoint.
    Authorization,
    /// Missing configuration, missing headroom, absent entries, arithmetic bounds.
    Precondition,
    /// Certificate or slot in a state the operation cannot use.
    ResourceState,
    /// A message could not be routed.
    Delivery,
    /// Invariant breach, configuration or serialization failure.
    Internal,
}

/// Central error enum for all ShareRegistry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    // =================================================================
    // Authorization Errors (1xx)
    // =================================================================
    /// The caller is not the registry admin.
    #[error("SR_ERR_100: Caller not admin: {caller}")]
    NotAdmin { caller: Address },

    /// A ledger update was sent by someone other than the `from` address.
    #[error("SR_ERR_101: Only share owner can update ledger: sender {sender}, from {from}")]
    LedgerSenderMismatch { sender: Address, from: Address },

    /// The caller is not the governance admin.
    #[error("SR_ERR_102: Caller not governance admin: {caller}")]
    NotGovernanceAdmin { caller: Address },

    /// A top-level call named a registry as its sender. Registries only
    /// act through messages the fabric delivers.
    #[error("SR_ERR_103: Top-level call cannot originate from registry {sender}")]
    RegistryImpersonation { sender: Address },

    // =================================================================
    // Precondition Errors (2xx)
    // =================================================================
    /// The registry has no registry number / max shares configured.
    #[error("SR_ERR_200: Registry not configured: {missing}")]
    NotConfigured { missing: &'static str },

    /// Issuing would exceed the configured maximum.
    #[error("SR_ERR_201: Cannot issue {requested} shares: issued {issued}, max {max}")]
    MaxSharesExceeded {
        requested: Shares,
        issued: Shares,
        max: Shares,
    },

    /// Allocating would exceed the issued share count.
    #[error("SR_ERR_202: Not enough shares issued: requested {requested}, allocated {allocated}, issued {issued}")]
    InsufficientIssued {
        requested: Shares,
        allocated: Shares,
        issued: Shares,
    },

    /// The address has no eligibility entry.
    #[error("SR_ERR_203: Address not eligible for claiming shares: {0}")]
    NotEligible(Address),

    /// The eligibility entry exists but holds zero shares.
    #[error("SR_ERR_204: No shares allocated to {0}")]
    NothingToClaim(Address),

    /// The address has no active ledger entry.
    #[error("SR_ERR_205: Source address not in ledger: {0}")]
    NotInLedger(Address),

    /// The active ledger balance is too small.
    #[error("SR_ERR_206: Insufficient shares in ledger: need {needed}, have {available}")]
    InsufficientLedgerBalance { needed: Shares, available: Shares },

    /// The unclaimed pool is too small to satisfy a claim.
    #[error("SR_ERR_207: Insufficient unclaimed shares: need {needed}, have {available}")]
    InsufficientUnclaimed { needed: Shares, available: Shares },

    /// The custodied certificate is too small for the transfer.
    #[error("SR_ERR_208: Insufficient custodied shares of {issuer}: need {needed}, have {available}")]
    InsufficientCustody {
        issuer: Address,
        needed: Shares,
        available: Shares,
    },

    /// A share counter would go below zero.
    #[error("SR_ERR_209: Share counter underflow: {context}")]
    Underflow { context: &'static str },

    /// A share counter would overflow.
    #[error("SR_ERR_210: Share counter overflow: {context}")]
    Overflow { context: &'static str },

    /// The amount is not acceptable for this entrypoint.
    #[error("SR_ERR_211: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// The new maximum is below what has already been issued.
    #[error("SR_ERR_212: Max shares {requested} below issued shares {issued}")]
    MaxSharesBelowIssued { requested: Shares, issued: Shares },

    /// Shares already carry the current registry number.
    #[error("SR_ERR_213: Registry number {current} locked after issuance")]
    RegistryNumberLocked { current: RegistryNumber },

    /// A company with this ID is already in the directory.
    #[error("SR_ERR_214: Company already exists: {0}")]
    CompanyExists(RegistryNumber),

    // =================================================================
    // Resource State Errors (3xx)
    // =================================================================
    /// Two certificates with different (issuer, content) cannot be joined.
    #[error("SR_ERR_300: Certificate mismatch: ({left_issuer}, {left_content}) vs ({right_issuer}, {right_content})")]
    CertificateMismatch {
        left_issuer: Address,
        left_content: RegistryNumber,
        right_issuer: Address,
        right_content: RegistryNumber,
    },

    /// Split amounts do not add up to the certificate amount.
    #[error("SR_ERR_301: Invalid split: keep {keep} + send {send} != amount {amount}")]
    InvalidSplit {
        keep: Shares,
        send: Shares,
        amount: Shares,
    },

    /// `put` into a slot that already holds a certificate.
    #[error("SR_ERR_302: Certificate slot occupied: {key}")]
    SlotOccupied { key: String },

    /// The unclaimed pool holds no certificate.
    #[error("SR_ERR_303: No unclaimed certificate in pool")]
    MissingUnclaimedCertificate,

    /// No certificate of this issuer is held in custody.
    #[error("SR_ERR_304: No custodied certificate for issuer {0}")]
    MissingCustodiedCertificate(Address),

    /// A received certificate was not created by the declared issuer.
    #[error("SR_ERR_305: Certificate issued by {actual}, declared as {declared}")]
    IssuerMismatch { declared: Address, actual: Address },

    /// A top-level caller tried to hand off a certificate it cannot hold.
    #[error("SR_ERR_306: External caller {sender} cannot hand off a certificate")]
    ForeignCertificate { sender: Address },

    // =================================================================
    // Delivery Errors (4xx)
    // =================================================================
    /// A message other than `receive` targets a non-registry address.
    #[error("SR_ERR_400: No {entrypoint} entrypoint at {target}")]
    UnknownTarget {
        target: Address,
        entrypoint: EntrypointKind,
    },

    /// The operation cascaded into too many internal messages.
    #[error("SR_ERR_401: Message limit exceeded: {limit}")]
    MessageLimitExceeded { limit: usize },

    /// A registry already lives at this address.
    #[error("SR_ERR_402: Registry already exists at {0}")]
    RegistryExists(Address),

    // =================================================================
    // Invariant Errors (8xx)
    // =================================================================
    /// Conservation, ledger, or eligibility invariant violated.
    #[error("SR_ERR_800: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("SR_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("SR_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("SR_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl RegistryError {
    /// The taxonomy bucket this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAdmin { .. }
            | Self::LedgerSenderMismatch { .. }
            | Self::NotGovernanceAdmin { .. }
            | Self::RegistryImpersonation { .. } => ErrorKind::Authorization,
            Self::NotConfigured { .. }
            | Self::MaxSharesExceeded { .. }
            | Self::InsufficientIssued { .. }
            | Self::NotEligible(_)
            | Self::NothingToClaim(_)
            | Self::NotInLedger(_)
            | Self::InsufficientLedgerBalance { .. }
            | Self::InsufficientUnclaimed { .. }
            | Self::InsufficientCustody { .. }
            | Self::Underflow { .. }
            | Self::Overflow { .. }
            | Self::InvalidAmount { .. }
            | Self::MaxSharesBelowIssued { .. }
            | Self::RegistryNumberLocked { .. }
            | Self::CompanyExists(_) => ErrorKind::Precondition,
            Self::CertificateMismatch { .. }
            | Self::InvalidSplit { .. }
            | Self::SlotOccupied { .. }
            | Self::MissingUnclaimedCertificate
            | Self::MissingCustodiedCertificate(_)
            | Self::IssuerMismatch { .. }
            | Self::ForeignCertificate { .. } => ErrorKind::ResourceState,
            Self::UnknownTarget { .. }
            | Self::MessageLimitExceeded { .. }
            | Self::RegistryExists(_) => ErrorKind::Delivery,
            Self::SupplyInvariantViolation { .. }
            | Self::Internal(_)
            | Self::Serialization(_)
            | Self::Configuration(_) => ErrorKind::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, RegistryError>;

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
