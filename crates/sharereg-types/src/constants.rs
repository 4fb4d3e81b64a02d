//! System-wide constants for the ShareRegistry protocol.

/// Key of the single well-known entry in a registry's unclaimed pool.
pub const UNCLAIMED_POOL_KEY: u64 = 0;

/// Maximum internal messages a single top-level operation may cascade into.
pub const DEFAULT_MAX_MESSAGES_PER_OPERATION: usize = 1_000;

/// Number of committed operation receipts the fabric retains.
pub const DEFAULT_RECEIPT_HISTORY_LIMIT: usize = 10_000;

/// Domain separator for account addresses derived from a label.
pub const ACCOUNT_ADDRESS_DOMAIN: &[u8] = b"sharereg:account:v1:";

/// Domain separator for originated (registry) addresses.
pub const ORIGINATED_ADDRESS_DOMAIN: &[u8] = b"sharereg:originated:v1:";

/// Domain separator for operation receipt digests.
pub const OPERATION_DIGEST_DOMAIN: &[u8] = b"sharereg:operation:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Protocol name.
pub const PROTOCOL_NAME: &str = "ShareRegistry";
