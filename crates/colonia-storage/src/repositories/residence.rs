#![allow(async_fn_in_trait)]

use chrono::Utc;
use colonia_core::constants::MAX_GENERATED_RESIDENCES;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::models::Residence;

/// Repository trait for residences
pub trait ResidenceRepository: Send + Sync {
    async fn create(&self, residence: &Residence) -> StorageResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Residence>>;

    async fn find_all(&self) -> StorageResult<Vec<Residence>>;

    async fn find_by_colonia(&self, colonia_id: Uuid) -> StorageResult<Vec<Residence>>;

    /// Residences an account is linked to through its memberships
    async fn find_by_usuario(&self, usuario_id: Uuid) -> StorageResult<Vec<Residence>>;

    async fn update(&self, residence: &Residence) -> StorageResult<()>;

    async fn delete(&self, id: Uuid) -> StorageResult<()>;

    /// Generate `cantidad` unclaimed residences in a neighborhood
    ///
    /// Returns the new ids, which serve as claim codes.
    async fn create_placeholders(&self, colonia_id: Uuid, cantidad: u32)
    -> StorageResult<Vec<Uuid>>;
}

/// SQLite implementation of ResidenceRepository
pub struct SqliteResidenceRepository {
    pool: SqlitePool,
}

impl SqliteResidenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ResidenceRepository for SqliteResidenceRepository {
    async fn create(&self, residence: &Residence) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO residencias (
                id, numero, calle, referencia, ubicacion, colonia_id,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(residence.id)
        .bind(&residence.numero)
        .bind(&residence.calle)
        .bind(&residence.referencia)
        .bind(&residence.ubicacion)
        .bind(residence.colonia_id)
        .bind(residence.created_at)
        .bind(residence.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::PersistenceFailure(format!(
                "insert of residence {} wrote no row",
                residence.id
            )));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Residence>> {
        let residence = sqlx::query_as::<_, Residence>(
            r#"
            SELECT id, numero, calle, referencia, ubicacion, colonia_id,
                   created_at, updated_at
            FROM residencias
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(residence)
    }

    async fn find_all(&self) -> StorageResult<Vec<Residence>> {
        let residences = sqlx::query_as::<_, Residence>(
            r#"
            SELECT id, numero, calle, referencia, ubicacion, colonia_id,
                   created_at, updated_at
            FROM residencias
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(residences)
    }

    async fn find_by_colonia(&self, colonia_id: Uuid) -> StorageResult<Vec<Residence>> {
        let residences = sqlx::query_as::<_, Residence>(
            r#"
            SELECT id, numero, calle, referencia, ubicacion, colonia_id,
                   created_at, updated_at
            FROM residencias
            WHERE colonia_id = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(colonia_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(residences)
    }

    async fn find_by_usuario(&self, usuario_id: Uuid) -> StorageResult<Vec<Residence>> {
        let residences = sqlx::query_as::<_, Residence>(
            r#"
            SELECT r.id, r.numero, r.calle, r.referencia, r.ubicacion, r.colonia_id,
                   r.created_at, r.updated_at
            FROM residencias r
            INNER JOIN residencias_usuarios ru ON ru.residencia_id = r.id
            WHERE ru.usuario_id = ?
            ORDER BY ru.es_principal DESC, ru.created_at DESC
            "#,
        )
        .bind(usuario_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(residences)
    }

    async fn update(&self, residence: &Residence) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE residencias
            SET numero = ?, calle = ?, referencia = ?, ubicacion = ?,
                colonia_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&residence.numero)
        .bind(&residence.calle)
        .bind(&residence.referencia)
        .bind(&residence.ubicacion)
        .bind(residence.colonia_id)
        .bind(residence.updated_at)
        .bind(residence.id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Residencia", residence.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM residencias WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Residencia", id));
        }

        Ok(())
    }

    async fn create_placeholders(
        &self,
        colonia_id: Uuid,
        cantidad: u32,
    ) -> StorageResult<Vec<Uuid>> {
        if cantidad == 0 || cantidad > MAX_GENERATED_RESIDENCES {
            return Err(StorageError::Validation(format!(
                "cantidad must be between 1 and {MAX_GENERATED_RESIDENCES}, got {cantidad}"
            )));
        }

        let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM colonias WHERE id = ?")
            .bind(colonia_id)
            .fetch_one(&self.pool)
            .await?;
        if exists.0 == 0 {
            return Err(StorageError::not_found("Colonia", colonia_id));
        }

        let now = Utc::now();
        let residences: Vec<Residence> = (1..=cantidad)
            .map(|index| Residence::placeholder(colonia_id, index, now))
            .collect();

        // One multi-row INSERT: either every placeholder is written or none.
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO residencias (id, numero, calle, referencia, colonia_id, created_at, updated_at) ",
        );
        builder.push_values(&residences, |mut row, r| {
            row.push_bind(r.id)
                .push_bind(r.numero.clone())
                .push_bind(r.calle.clone())
                .push_bind(r.referencia.clone())
                .push_bind(r.colonia_id)
                .push_bind(r.created_at)
                .push_bind(r.updated_at);
        });

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(StorageError::from_write)?;

        if result.rows_affected() != u64::from(cantidad) {
            return Err(StorageError::PersistenceFailure(format!(
                "expected {cantidad} residences, wrote {}",
                result.rows_affected()
            )));
        }

        info!(colonia_id = %colonia_id, cantidad, "Generated placeholder residences");
        Ok(residences.into_iter().map(|r| r.id).collect())
    }
}
