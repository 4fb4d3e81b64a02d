//! # Certificate: the linear share resource
//!
//! A `Certificate` is an amount-bearing claim on a registry's shares,
//! tagged with an immutable `(issuer, content)` pair. It is **move-only**:
//! there is no `Clone`, and every operation consumes its inputs.
//!
//! ```text
//!                 split(keep, send)
//!   ┌──────────┐ ─────────────────▶ ┌──────────┐ ┌──────────┐
//!   │ (i,c,n)  │                    │ (i,c,k)  │ │ (i,c,s)  │   k + s == n
//!   └──────────┘ ◀───────────────── └──────────┘ └──────────┘
//!                      join
//! ```
//!
//! ## Conservation Properties
//!
//! - **Immutable tag**: `(issuer, content)` survives every split and join
//! - **Amount-preserving**: split and join never change the total amount
//! - **No silent loss**: discarding a certificate requires [`Certificate::burn`]
//! - **Minted only by issuance**: construction is crate-private; persisted
//!   state deserialized through serde is trusted input

use serde::{Deserialize, Serialize};

use sharereg_types::{Address, RegistryError, RegistryNumber, Result, Shares};

/// Non-duplicable, amount-bearing share certificate.
#[must_use = "a certificate must be stored, joined, split, or handed off"]
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    issuer: Address,
    content: RegistryNumber,
    amount: Shares,
}

impl Certificate {
    /// Create a fresh certificate.
    ///
    /// Crate-private: only [`Registry::issue`](crate::Registry::issue)
    /// mints, with `issuer` set to the registry's own address.
    pub(crate) fn issue(issuer: Address, content: RegistryNumber, amount: Shares) -> Self {
        Self {
            issuer,
            content,
            amount,
        }
    }

    /// The registry that created this certificate.
    #[must_use]
    pub fn issuer(&self) -> Address {
        self.issuer
    }

    /// What the certificate represents (the issuer's registry number).
    #[must_use]
    pub fn content(&self) -> RegistryNumber {
        self.content
    }

    #[must_use]
    pub fn amount(&self) -> Shares {
        self.amount
    }

    /// Whether `other` carries the same `(issuer, content)` tag.
    #[must_use]
    pub fn same_kind(&self, other: &Self) -> bool {
        self.issuer == other.issuer && self.content == other.content
    }

    /// Split into `(kept, sent)` pieces with amounts `keep` and `send`.
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidSplit`] unless `keep + send == amount`.
    pub fn split(self, keep: Shares, send: Shares) -> Result<(Self, Self)> {
        if keep.checked_add(send) != Some(self.amount) {
            return Err(RegistryError::InvalidSplit {
                keep,
                send,
                amount: self.amount,
            });
        }
        Ok((
            Self {
                amount: keep,
                ..self
            },
            Self {
                amount: send,
                ..self
            },
        ))
    }

    /// Join two certificates of the same kind into one.
    ///
    /// # Errors
    /// - [`RegistryError::CertificateMismatch`] if the tags differ
    /// - [`RegistryError::Overflow`] if the summed amount overflows
    pub fn join(self, other: Self) -> Result<Self> {
        if !self.same_kind(&other) {
            return Err(RegistryError::CertificateMismatch {
                left_issuer: self.issuer,
                left_content: self.content,
                right_issuer: other.issuer,
                right_content: other.content,
            });
        }
        let amount = self
            .amount
            .checked_add(other.amount)
            .ok_or(RegistryError::Overflow {
                context: "certificate join",
            })?;
        Ok(Self { amount, ..self })
    }

    /// Explicitly destroy this certificate, returning the amount destroyed.
    pub fn burn(self) -> Shares {
        self.amount
    }
}

/// Certificates minted outside any registry, for testing the rejection
/// paths. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl Certificate {
    pub fn dummy(amount: Shares) -> Self {
        Self::issue(Address::random(), 0, amount)
    }

    pub fn counterfeit(issuer: Address, content: RegistryNumber, amount: Shares) -> Self {
        Self::issue(issuer, content, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cert(amount: Shares) -> Certificate {
        Certificate::issue(Address::from_label("registry"), 123_456, amount)
    }

    #[test]
    fn split_preserves_tag() {
        let (rest, sent) = make_cert(300).split(100, 200).unwrap();
        assert_eq!(rest.amount(), 100);
        assert_eq!(sent.amount(), 200);
        assert!(rest.same_kind(&sent));
        assert_eq!(sent.issuer(), Address::from_label("registry"));
        assert_eq!(sent.content(), 123_456);
    }

    #[test]
    fn split_rejects_wrong_total() {
        let err = make_cert(300).split(100, 100).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidSplit {
                keep: 100,
                send: 100,
                amount: 300
            }
        ));
    }

    #[test]
    fn split_rejects_overflowing_parts() {
        let err = make_cert(10).split(u64::MAX, 11).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidSplit { .. }));
    }

    #[test]
    fn split_then_join_is_identity() {
        for keep in [0, 1, 150, 299, 300] {
            let (a, b) = make_cert(300).split(keep, 300 - keep).unwrap();
            assert_eq!(a.join(b).unwrap(), make_cert(300), "keep = {keep}");
        }
    }

    #[test]
    fn join_sums_amounts() {
        let joined = make_cert(1000).join(make_cert(500)).unwrap();
        assert_eq!(joined.amount(), 1500);
    }

    #[test]
    fn join_rejects_different_issuer() {
        let other = Certificate::issue(Address::from_label("elsewhere"), 123_456, 5);
        let err = make_cert(5).join(other).unwrap_err();
        assert!(matches!(err, RegistryError::CertificateMismatch { .. }));
    }

    #[test]
    fn join_rejects_different_content() {
        let other = Certificate::issue(Address::from_label("registry"), 654_321, 5);
        let err = make_cert(5).join(other).unwrap_err();
        assert!(matches!(err, RegistryError::CertificateMismatch { .. }));
    }

    #[test]
    fn join_overflow_is_an_error() {
        let err = make_cert(u64::MAX).join(make_cert(1)).unwrap_err();
        assert!(matches!(err, RegistryError::Overflow { .. }));
    }

    #[test]
    fn burn_reports_amount() {
        assert_eq!(make_cert(42).burn(), 42);
        assert_eq!(Certificate::dummy(7).burn(), 7);
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&make_cert(7)).unwrap();
        let back: Certificate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, make_cert(7));
    }
}
