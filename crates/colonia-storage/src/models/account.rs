use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use colonia_core::constants::{DEFAULT_ACCOUNT_TYPE, MIN_PASSWORD_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Account ("usuario") registered through sign-up
///
/// The argon2 hash of the password lives in the same row but is never
/// serialized, so an `Account` can be returned to clients as is.
///
/// # Examples
///
/// ```
/// use colonia_storage::models::{Account, NewAccount};
/// use chrono::Utc;
///
/// let request = NewAccount {
///     email: "vecina@example.com".to_string(),
///     password: "secreto123".to_string(),
///     nombre: "Laura".to_string(),
///     apellido: "Méndez".to_string(),
///     telefono: None,
///     tipo_usuario_id: 1,
///     colonia_id: None,
/// };
///
/// let account = Account::register(request, Utc::now()).unwrap();
/// assert!(account.verify_password("secreto123"));
///
/// let json = serde_json::to_value(&account).unwrap();
/// assert!(json.get("password_hash").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,

    /// Login email, unique across accounts
    pub email: String,

    /// PHC-formatted argon2 hash
    #[serde(skip)]
    pub password_hash: Option<String>,

    pub nombre: String,
    pub apellido: String,
    pub telefono: Option<String>,

    /// Account type (1 = resident by convention)
    pub tipo_usuario_id: i32,

    /// Neighborhood the account belongs to, if any
    pub colonia_id: Option<Uuid>,

    pub activo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-up request
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub nombre: String,
    pub apellido: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default = "default_account_type")]
    pub tipo_usuario_id: i32,
    #[serde(default)]
    pub colonia_id: Option<Uuid>,
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("nombre", &self.nombre)
            .field("apellido", &self.apellido)
            .field("telefono", &self.telefono)
            .field("tipo_usuario_id", &self.tipo_usuario_id)
            .field("colonia_id", &self.colonia_id)
            .finish()
    }
}

/// Partial update of an account profile
///
/// Credentials are not patchable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountPatch {
    pub email: Option<String>,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub telefono: Option<String>,
    pub tipo_usuario_id: Option<i32>,
    pub colonia_id: Option<Uuid>,
    pub activo: Option<bool>,
}

fn default_account_type() -> i32 {
    DEFAULT_ACCOUNT_TYPE
}

impl Account {
    /// Validate the credentials of a sign-up request and build the account
    ///
    /// # Errors
    ///
    /// `StorageError::AuthenticationFailure` for a malformed email or a
    /// password shorter than the minimum length.
    pub fn register(request: NewAccount, now: DateTime<Utc>) -> StorageResult<Self> {
        let email = request.email.trim().to_lowercase();
        if !is_plausible_email(&email) {
            return Err(StorageError::AuthenticationFailure(format!(
                "invalid email address: {}",
                request.email
            )));
        }
        if request.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(StorageError::AuthenticationFailure(format!(
                "password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = hash_password(&request.password)?;

        Ok(Self {
            id: Uuid::new_v4(),
            email,
            password_hash: Some(password_hash),
            nombre: request.nombre,
            apellido: request.apellido,
            telefono: request.telefono,
            tipo_usuario_id: request.tipo_usuario_id,
            colonia_id: request.colonia_id,
            activo: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check a candidate password against the stored hash
    pub fn verify_password(&self, candidate: &str) -> bool {
        let Some(stored) = self.password_hash.as_deref() else {
            return false;
        };
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(candidate.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellido)
    }

    pub fn apply_patch(&mut self, patch: AccountPatch, now: DateTime<Utc>) -> StorageResult<()> {
        if let Some(email) = patch.email {
            let email = email.trim().to_lowercase();
            if !is_plausible_email(&email) {
                return Err(StorageError::Validation(format!(
                    "invalid email address: {email}"
                )));
            }
            self.email = email;
        }
        if let Some(v) = patch.nombre {
            self.nombre = v;
        }
        if let Some(v) = patch.apellido {
            self.apellido = v;
        }
        if let Some(v) = patch.telefono {
            self.telefono = Some(v);
        }
        if let Some(v) = patch.tipo_usuario_id {
            self.tipo_usuario_id = v;
        }
        if let Some(v) = patch.colonia_id {
            self.colonia_id = Some(v);
        }
        if let Some(v) = patch.activo {
            self.activo = v;
        }

        self.updated_at = now;
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

fn hash_password(password: &str) -> StorageResult<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| StorageError::Internal(format!("salt generation failed: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StorageError::Internal(format!("password hashing failed: {e}")))
}
