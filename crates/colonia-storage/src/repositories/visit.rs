#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::filters::VisitFilter;
use crate::models::VisitorPass;

/// Repository trait for visitor passes
///
/// Besides plain row access this exposes the two pass procedures the
/// lifecycle relies on. Both take the evaluation instant explicitly.
pub trait VisitRepository: Send + Sync {
    /// Insert a freshly issued pass
    async fn create(&self, pass: &VisitorPass) -> StorageResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<VisitorPass>>;

    /// List passes matching a filter, newest first
    async fn find_filtered(&self, filter: &VisitFilter) -> StorageResult<Vec<VisitorPass>>;

    /// Persist the patchable columns of an existing pass
    ///
    /// Scan bookkeeping (`escaneado_en`, `escaneo_exitoso`) and the QR token
    /// are never written here.
    async fn update(&self, pass: &VisitorPass) -> StorageResult<()>;

    async fn delete(&self, id: Uuid) -> StorageResult<()>;

    /// True iff the pass exists, is in effect, its QR is active and
    /// unscanned, and it has not expired at `now`
    async fn is_qr_valid(&self, id: Uuid, now: DateTime<Utc>) -> StorageResult<bool>;

    /// Consume the pass if it is still valid at `now`
    ///
    /// Returns `false` when nothing was consumed. The check and the write
    /// happen in one statement, so at most one caller can ever see `true`
    /// for a given pass.
    async fn scan_qr(&self, id: Uuid, now: DateTime<Utc>) -> StorageResult<bool>;
}

/// SQLite implementation of VisitRepository
pub struct SqliteVisitRepository {
    pool: SqlitePool,
}

impl SqliteVisitRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl VisitRepository for SqliteVisitRepository {
    async fn create(&self, pass: &VisitorPass) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO visitas (
                id, nombre_visitante, apellido_visitante, identificacion,
                tipo, fecha_programada, residencia_id, usuario_id,
                codigo_qr, qr_activo, qr_expiracion, activa,
                escaneado_en, escaneo_exitoso, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(pass.id)
        .bind(&pass.nombre_visitante)
        .bind(&pass.apellido_visitante)
        .bind(&pass.identificacion)
        .bind(&pass.tipo)
        .bind(pass.fecha_programada)
        .bind(pass.residencia_id)
        .bind(pass.usuario_id)
        .bind(&pass.codigo_qr)
        .bind(pass.qr_activo)
        .bind(pass.qr_expiracion)
        .bind(pass.activa)
        .bind(pass.escaneado_en)
        .bind(pass.escaneo_exitoso)
        .bind(pass.created_at)
        .bind(pass.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::PersistenceFailure(format!(
                "insert of visit {} wrote no row",
                pass.id
            )));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<VisitorPass>> {
        let pass = sqlx::query_as::<_, VisitorPass>(
            r#"
            SELECT id, nombre_visitante, apellido_visitante, identificacion,
                   tipo, fecha_programada, residencia_id, usuario_id,
                   codigo_qr, qr_activo, qr_expiracion, activa,
                   escaneado_en, escaneo_exitoso, created_at, updated_at
            FROM visitas
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pass)
    }

    async fn find_filtered(&self, filter: &VisitFilter) -> StorageResult<Vec<VisitorPass>> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT id, nombre_visitante, apellido_visitante, identificacion,
                   tipo, fecha_programada, residencia_id, usuario_id,
                   codigo_qr, qr_activo, qr_expiracion, activa,
                   escaneado_en, escaneo_exitoso, created_at, updated_at
            FROM visitas"#,
        );
        filter.push_where(&mut builder);
        builder.push(" ORDER BY created_at DESC");

        let passes = builder
            .build_query_as::<VisitorPass>()
            .fetch_all(&self.pool)
            .await?;

        Ok(passes)
    }

    async fn update(&self, pass: &VisitorPass) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE visitas
            SET nombre_visitante = ?, apellido_visitante = ?, identificacion = ?,
                tipo = ?, fecha_programada = ?, residencia_id = ?, usuario_id = ?,
                qr_activo = ?, qr_expiracion = ?, activa = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&pass.nombre_visitante)
        .bind(&pass.apellido_visitante)
        .bind(&pass.identificacion)
        .bind(&pass.tipo)
        .bind(pass.fecha_programada)
        .bind(pass.residencia_id)
        .bind(pass.usuario_id)
        .bind(pass.qr_activo)
        .bind(pass.qr_expiracion)
        .bind(pass.activa)
        .bind(pass.updated_at)
        .bind(pass.id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Visita", pass.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM visitas WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Visita", id));
        }

        Ok(())
    }

    async fn is_qr_valid(&self, id: Uuid, now: DateTime<Utc>) -> StorageResult<bool> {
        let result: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM visitas
            WHERE id = ?
              AND activa = 1
              AND qr_activo = 1
              AND escaneado_en IS NULL
              AND qr_expiracion > ?
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(visit_id = %id, valid = result.0 > 0, "QR validity checked");
        Ok(result.0 > 0)
    }

    async fn scan_qr(&self, id: Uuid, now: DateTime<Utc>) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE visitas
            SET qr_activo = 0, escaneado_en = ?, escaneo_exitoso = 1, updated_at = ?
            WHERE id = ?
              AND activa = 1
              AND qr_activo = 1
              AND escaneado_en IS NULL
              AND qr_expiracion > ?
            "#,
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use crate::models::NewVisitorPass;
    use crate::test_support::{seed_account, seed_neighborhood, seed_residence};
    use chrono::Duration;
    use colonia_core::VisitKind;

    struct Fixture {
        db: Database,
        residencia_id: Uuid,
        usuario_id: Uuid,
    }

    async fn setup() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        let colonia_id = seed_neighborhood(&db).await;
        let residencia_id = seed_residence(&db, colonia_id).await;
        let usuario_id = seed_account(&db, "residente@example.com").await;
        Fixture {
            db,
            residencia_id,
            usuario_id,
        }
    }

    fn issue(f: &Fixture, now: DateTime<Utc>) -> VisitorPass {
        VisitorPass::issue(
            NewVisitorPass {
                nombre_visitante: "Pedro".to_string(),
                apellido_visitante: "Gómez".to_string(),
                identificacion: None,
                tipo: VisitKind::Service,
                fecha_programada: now + Duration::hours(1),
                residencia_id: f.residencia_id,
                usuario_id: f.usuario_id,
                activa: true,
                qr_expiracion: None,
            },
            Duration::hours(24),
            now,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_pass() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let pass = issue(&f, Utc::now());

        repo.create(&pass).await.unwrap();

        let found = repo.find_by_id(pass.id).await.unwrap().unwrap();
        assert_eq!(found, pass);
        assert_eq!(found.kind().unwrap(), VisitKind::Service);
    }

    #[tokio::test]
    async fn test_create_with_unknown_residence_is_rejected() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let mut pass = issue(&f, Utc::now());
        pass.residencia_id = Uuid::new_v4();

        let result = repo.create(&pass).await;
        assert!(matches!(result, Err(StorageError::ReferentialIntegrity(_))));
    }

    #[tokio::test]
    async fn test_find_missing_pass_returns_none() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());

        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_filtered() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let now = Utc::now();

        let active = issue(&f, now);
        let mut inactive = issue(&f, now + Duration::seconds(1));
        inactive.activa = false;
        repo.create(&active).await.unwrap();
        repo.create(&inactive).await.unwrap();

        let all = repo
            .find_filtered(&VisitFilter::by_residence(f.residencia_id))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, inactive.id);

        let only_active = repo.find_filtered(&VisitFilter::active_only()).await.unwrap();
        assert_eq!(only_active.len(), 1);
        assert_eq!(only_active[0].id, active.id);

        let other = repo
            .find_filtered(&VisitFilter::by_requester(Uuid::new_v4()))
            .await
            .unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_find_filtered_agrees_with_matches() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let now = Utc::now();

        for offset in 0..4 {
            let mut pass = issue(&f, now);
            pass.fecha_programada = now + Duration::days(offset);
            repo.create(&pass).await.unwrap();
        }

        let filter = VisitFilter::scheduled_between(now + Duration::days(1), now + Duration::days(2));
        let rows = repo.find_filtered(&filter).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|p| filter.matches(p)));
    }

    #[tokio::test]
    async fn test_update_missing_pass_is_not_found() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let pass = issue(&f, Utc::now());

        let result = repo.update(&pass).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_pass() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let pass = issue(&f, Utc::now());
        repo.create(&pass).await.unwrap();

        repo.delete(pass.id).await.unwrap();
        assert!(repo.find_by_id(pass.id).await.unwrap().is_none());

        let again = repo.delete(pass.id).await;
        assert!(matches!(again, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_qr_validity_rules() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let now = Utc::now();
        let pass = issue(&f, now);
        repo.create(&pass).await.unwrap();

        assert!(repo.is_qr_valid(pass.id, now).await.unwrap());
        assert!(!repo.is_qr_valid(pass.id, pass.qr_expiracion).await.unwrap());
        assert!(!repo.is_qr_valid(Uuid::new_v4(), now).await.unwrap());

        let mut inactive = pass.clone();
        inactive.activa = false;
        repo.update(&inactive).await.unwrap();
        assert!(!repo.is_qr_valid(pass.id, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_scan_consumes_once() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let now = Utc::now();
        let pass = issue(&f, now);
        repo.create(&pass).await.unwrap();

        assert!(repo.scan_qr(pass.id, now).await.unwrap());
        assert!(!repo.scan_qr(pass.id, now).await.unwrap());

        let scanned = repo.find_by_id(pass.id).await.unwrap().unwrap();
        assert_eq!(scanned.escaneado_en, Some(now));
        assert!(!scanned.qr_activo);
        assert!(scanned.escaneo_exitoso);
        assert!(!repo.is_qr_valid(pass.id, now).await.unwrap());
    }

    #[tokio::test]
    async fn test_scan_expired_pass_does_nothing() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let now = Utc::now();
        let pass = issue(&f, now);
        repo.create(&pass).await.unwrap();

        let later = now + Duration::hours(25);
        assert!(!repo.scan_qr(pass.id, later).await.unwrap());

        let unchanged = repo.find_by_id(pass.id).await.unwrap().unwrap();
        assert_eq!(unchanged.escaneado_en, None);
        assert!(unchanged.qr_activo);
    }

    #[tokio::test]
    async fn test_schema_rejects_reactivating_scanned_pass() {
        let f = setup().await;
        let repo = SqliteVisitRepository::new(f.db.pool().clone());
        let now = Utc::now();
        let pass = issue(&f, now);
        repo.create(&pass).await.unwrap();
        repo.scan_qr(pass.id, now).await.unwrap();

        let mut stale = pass.clone();
        stale.qr_activo = true;
        let result = repo.update(&stale).await;

        assert!(matches!(result, Err(StorageError::Validation(_))));
    }
}
