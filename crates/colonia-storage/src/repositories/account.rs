#![allow(async_fn_in_trait)]

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::models::{Account, NewAccount};

/// Repository trait for accounts
pub trait AccountRepository: Send + Sync {
    /// Register a new account with its credentials
    ///
    /// Rejects malformed credentials and already registered emails with
    /// `StorageError::AuthenticationFailure`.
    async fn sign_up(&self, request: NewAccount) -> StorageResult<Account>;

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Account>>;

    async fn find_all(&self) -> StorageResult<Vec<Account>>;

    /// Persist profile columns (credentials are left untouched)
    async fn update(&self, account: &Account) -> StorageResult<()>;

    async fn delete(&self, id: Uuid) -> StorageResult<()>;

    async fn exists_by_email(&self, email: &str) -> StorageResult<bool>;
}

/// SQLite implementation of AccountRepository
pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AccountRepository for SqliteAccountRepository {
    async fn sign_up(&self, request: NewAccount) -> StorageResult<Account> {
        let now = Utc::now();
        let account = tokio::task::spawn_blocking(move || Account::register(request, now))
            .await
            .map_err(|e| StorageError::Internal(format!("spawn_blocking failed for sign-up: {e}")))??;

        if self.exists_by_email(&account.email).await? {
            return Err(StorageError::AuthenticationFailure(format!(
                "email already registered: {}",
                account.email
            )));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO usuarios (
                id, email, password_hash, nombre, apellido, telefono,
                tipo_usuario_id, colonia_id, activo, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.nombre)
        .bind(&account.apellido)
        .bind(&account.telefono)
        .bind(account.tipo_usuario_id)
        .bind(account.colonia_id)
        .bind(account.activo)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // a concurrent sign-up won the race past exists_by_email
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StorageError::AuthenticationFailure(format!(
                    "email already registered: {}",
                    account.email
                ))
            }
            other => StorageError::from_write(other),
        })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::PersistenceFailure(format!(
                "insert of account {} wrote no row",
                account.id
            )));
        }

        info!(account_id = %account.id, "Account registered");
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, nombre, apellido, telefono,
                   tipo_usuario_id, colonia_id, activo, created_at, updated_at
            FROM usuarios
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_all(&self) -> StorageResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, nombre, apellido, telefono,
                   tipo_usuario_id, colonia_id, activo, created_at, updated_at
            FROM usuarios
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn update(&self, account: &Account) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE usuarios
            SET email = ?, nombre = ?, apellido = ?, telefono = ?,
                tipo_usuario_id = ?, colonia_id = ?, activo = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&account.email)
        .bind(&account.nombre)
        .bind(&account.apellido)
        .bind(&account.telefono)
        .bind(account.tipo_usuario_id)
        .bind(account.colonia_id)
        .bind(account.activo)
        .bind(account.updated_at)
        .bind(account.id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Usuario", account.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Usuario", id));
        }

        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> StorageResult<bool> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuarios WHERE email = ?")
            .bind(email.trim().to_lowercase())
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }
}
