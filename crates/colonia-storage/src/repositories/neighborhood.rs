#![allow(async_fn_in_trait)]

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::models::Neighborhood;

/// Repository trait for neighborhoods
pub trait NeighborhoodRepository: Send + Sync {
    async fn create(&self, colonia: &Neighborhood) -> StorageResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Neighborhood>>;

    async fn find_all(&self) -> StorageResult<Vec<Neighborhood>>;

    async fn update(&self, colonia: &Neighborhood) -> StorageResult<()>;

    /// Delete a neighborhood
    ///
    /// Fails with `ReferentialIntegrity` while residences or announcements
    /// still point at it.
    async fn delete(&self, id: Uuid) -> StorageResult<()>;
}

/// SQLite implementation of NeighborhoodRepository
pub struct SqliteNeighborhoodRepository {
    pool: SqlitePool,
}

impl SqliteNeighborhoodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl NeighborhoodRepository for SqliteNeighborhoodRepository {
    async fn create(&self, colonia: &Neighborhood) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO colonias (id, nombre, direccion, admin_principal_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(colonia.id)
        .bind(&colonia.nombre)
        .bind(&colonia.direccion)
        .bind(colonia.admin_principal_id)
        .bind(colonia.created_at)
        .bind(colonia.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::PersistenceFailure(format!(
                "insert of neighborhood {} wrote no row",
                colonia.id
            )));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Neighborhood>> {
        let colonia = sqlx::query_as::<_, Neighborhood>(
            r#"
            SELECT id, nombre, direccion, admin_principal_id, created_at, updated_at
            FROM colonias
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(colonia)
    }

    async fn find_all(&self) -> StorageResult<Vec<Neighborhood>> {
        let colonias = sqlx::query_as::<_, Neighborhood>(
            r#"
            SELECT id, nombre, direccion, admin_principal_id, created_at, updated_at
            FROM colonias
            ORDER BY nombre
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(colonias)
    }

    async fn update(&self, colonia: &Neighborhood) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE colonias
            SET nombre = ?, direccion = ?, admin_principal_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&colonia.nombre)
        .bind(&colonia.direccion)
        .bind(colonia.admin_principal_id)
        .bind(colonia.updated_at)
        .bind(colonia.id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Colonia", colonia.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM colonias WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Colonia", id));
        }

        Ok(())
    }
}
