use sqlx::error::ErrorKind;
use thiserror::Error;
use uuid::Uuid;

/// Storage-specific error types for the Colonia backend.
///
/// These errors represent failures in record-store operations, the
/// visitor-pass procedures and account sign-up.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// No row matched a by-id operation
    #[error("Entity not found: {entity_type} with {field}={value}")]
    NotFound {
        entity_type: String,
        field: String,
        value: String,
    },

    /// A write reported zero affected rows where one was expected
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// The pass validity check rejected the pass
    #[error("Invalid or expired pass: {0}")]
    InvalidOrExpiredPass(Uuid),

    /// The pass passed the validity check but could not be consumed
    #[error("Scan failed for pass {0}")]
    ScanFailure(Uuid),

    /// Sign-up rejected by the credential store
    #[error("Authentication error: {0}")]
    AuthenticationFailure(String),

    /// Data validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referential integrity violation (missing parent, duplicate key)
    #[error("Referential integrity error: {0}")]
    ReferentialIntegrity(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Shorthand for a by-id `NotFound`.
    pub fn not_found(entity_type: &str, id: Uuid) -> Self {
        StorageError::NotFound {
            entity_type: entity_type.to_string(),
            field: "id".to_string(),
            value: id.to_string(),
        }
    }

    /// Classify a failed write, surfacing constraint violations as
    /// domain errors instead of opaque database errors.
    pub fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.kind() {
                ErrorKind::ForeignKeyViolation | ErrorKind::UniqueViolation => {
                    return StorageError::ReferentialIntegrity(db_err.message().to_string());
                }
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    return StorageError::Validation(db_err.message().to_string());
                }
                _ => {}
            }
        }
        StorageError::Database(err)
    }
}

impl From<colonia_core::Error> for StorageError {
    fn from(err: colonia_core::Error) -> Self {
        StorageError::Validation(err.to_string())
    }
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
