#![allow(async_fn_in_trait)]

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::models::ResidenceMembership;

/// Repository trait for account/residence memberships
pub trait MembershipRepository: Send + Sync {
    async fn create(&self, membership: &ResidenceMembership) -> StorageResult<()>;

    async fn find_by_usuario(&self, usuario_id: Uuid) -> StorageResult<Vec<ResidenceMembership>>;

    /// Mark the membership of `usuario_id` in `residencia_id` as verified
    async fn verify(&self, residencia_id: Uuid, usuario_id: Uuid)
    -> StorageResult<ResidenceMembership>;
}

/// SQLite implementation of MembershipRepository
pub struct SqliteMembershipRepository {
    pool: SqlitePool,
}

impl SqliteMembershipRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl MembershipRepository for SqliteMembershipRepository {
    async fn create(&self, membership: &ResidenceMembership) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO residencias_usuarios (
                id, usuario_id, residencia_id, rol, es_principal, verificado,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(membership.id)
        .bind(membership.usuario_id)
        .bind(membership.residencia_id)
        .bind(&membership.rol)
        .bind(membership.es_principal)
        .bind(membership.verificado)
        .bind(membership.created_at)
        .bind(membership.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::PersistenceFailure(format!(
                "insert of membership {} wrote no row",
                membership.id
            )));
        }

        Ok(())
    }

    async fn find_by_usuario(&self, usuario_id: Uuid) -> StorageResult<Vec<ResidenceMembership>> {
        let memberships = sqlx::query_as::<_, ResidenceMembership>(
            r#"
            SELECT id, usuario_id, residencia_id, rol, es_principal, verificado,
                   created_at, updated_at
            FROM residencias_usuarios
            WHERE usuario_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    async fn verify(
        &self,
        residencia_id: Uuid,
        usuario_id: Uuid,
    ) -> StorageResult<ResidenceMembership> {
        let membership = sqlx::query_as::<_, ResidenceMembership>(
            r#"
            UPDATE residencias_usuarios
            SET verificado = 1, updated_at = ?
            WHERE residencia_id = ? AND usuario_id = ?
            RETURNING id, usuario_id, residencia_id, rol, es_principal, verificado,
                      created_at, updated_at
            "#,
        )
        .bind(Utc::now())
        .bind(residencia_id)
        .bind(usuario_id)
        .fetch_optional(&self.pool)
        .await?;

        membership.ok_or_else(|| StorageError::NotFound {
            entity_type: "ResidenciaUsuario".to_string(),
            field: "residencia_id,usuario_id".to_string(),
            value: format!("{residencia_id},{usuario_id}"),
        })
    }
}
