//! Shared constants for the Colonia backend.
//!
//! Defaults here are used by the storage layer when issuing visitor passes
//! and by the server when no environment override is present.
//!
//! ```
//! use colonia_core::constants::*;
//!
//! assert_eq!(DEFAULT_QR_TTL_HOURS, 24);
//! assert_eq!(DEFAULT_PORT, 8000);
//! ```

// ============================================================================
// Visitor passes
// ============================================================================

/// Lifetime of a freshly issued QR pass, counted from its creation instant.
pub const DEFAULT_QR_TTL_HOURS: i64 = 24;

/// Upper bound for `COLONIA_QR_TTL_HOURS` (one year).
pub const MAX_QR_TTL_HOURS: i64 = 24 * 365;

// ============================================================================
// Accounts
// ============================================================================

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Account type assigned when the client does not send one.
pub const DEFAULT_ACCOUNT_TYPE: i32 = 1;

// ============================================================================
// Residences
// ============================================================================

/// Street name given to residences generated before they are claimed.
pub const PLACEHOLDER_STREET: &str = "Por asignar";

/// Reference text attached to generated residences.
pub const PLACEHOLDER_REFERENCE: &str = "Residencia generada automáticamente";

/// Maximum number of placeholder residences generated per request.
pub const MAX_GENERATED_RESIDENCES: u32 = 500;

// ============================================================================
// Server defaults
// ============================================================================

/// Default SQLite database file.
pub const DEFAULT_DATABASE_PATH: &str = "colonia.db";

/// Default pool size.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default bind host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;
