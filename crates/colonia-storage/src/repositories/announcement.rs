#![allow(async_fn_in_trait)]

use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::models::Announcement;

/// Repository trait for announcements
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, anuncio: &Announcement) -> StorageResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Announcement>>;

    async fn find_all(&self) -> StorageResult<Vec<Announcement>>;

    /// Every announcement of a neighborhood, expired ones included
    async fn find_by_colonia(&self, colonia_id: Uuid) -> StorageResult<Vec<Announcement>>;

    async fn update(&self, anuncio: &Announcement) -> StorageResult<()>;

    async fn delete(&self, id: Uuid) -> StorageResult<()>;
}

/// SQLite implementation of AnnouncementRepository
pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, anuncio: &Announcement) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO anuncios (
                id, titulo, contenido, usuario_id, colonia_id, importante,
                fecha_publicacion, fecha_expiracion, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(anuncio.id)
        .bind(&anuncio.titulo)
        .bind(&anuncio.contenido)
        .bind(anuncio.usuario_id)
        .bind(anuncio.colonia_id)
        .bind(anuncio.importante)
        .bind(anuncio.fecha_publicacion)
        .bind(anuncio.fecha_expiracion)
        .bind(anuncio.created_at)
        .bind(anuncio.updated_at)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::PersistenceFailure(format!(
                "insert of announcement {} wrote no row",
                anuncio.id
            )));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<Announcement>> {
        let anuncio = sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, titulo, contenido, usuario_id, colonia_id, importante,
                   fecha_publicacion, fecha_expiracion, created_at, updated_at
            FROM anuncios
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(anuncio)
    }

    async fn find_all(&self) -> StorageResult<Vec<Announcement>> {
        let anuncios = sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, titulo, contenido, usuario_id, colonia_id, importante,
                   fecha_publicacion, fecha_expiracion, created_at, updated_at
            FROM anuncios
            ORDER BY fecha_publicacion DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(anuncios)
    }

    async fn find_by_colonia(&self, colonia_id: Uuid) -> StorageResult<Vec<Announcement>> {
        let anuncios = sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, titulo, contenido, usuario_id, colonia_id, importante,
                   fecha_publicacion, fecha_expiracion, created_at, updated_at
            FROM anuncios
            WHERE colonia_id = ?
            ORDER BY created_at
            "#,
        )
        .bind(colonia_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(anuncios)
    }

    async fn update(&self, anuncio: &Announcement) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE anuncios
            SET titulo = ?, contenido = ?, importante = ?,
                fecha_publicacion = ?, fecha_expiracion = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&anuncio.titulo)
        .bind(&anuncio.contenido)
        .bind(anuncio.importante)
        .bind(anuncio.fecha_publicacion)
        .bind(anuncio.fecha_expiracion)
        .bind(anuncio.updated_at)
        .bind(anuncio.id)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Anuncio", anuncio.id));
        }

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM anuncios WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Anuncio", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Database;
    use crate::filters::current_announcements;
    use crate::models::{AnnouncementPatch, NewAnnouncement};
    use crate::test_support::{seed_account, seed_neighborhood};
    use chrono::{DateTime, Duration, Utc};

    fn anuncio(
        colonia_id: Uuid,
        usuario_id: Uuid,
        titulo: &str,
        importante: bool,
        expira: Option<DateTime<Utc>>,
    ) -> Announcement {
        Announcement::publish(
            NewAnnouncement {
                titulo: titulo.to_string(),
                contenido: "Detalles".to_string(),
                usuario_id,
                colonia_id,
                importante,
                fecha_publicacion: None,
                fecha_expiracion: expira,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let db = Database::in_memory().await.unwrap();
        let colonia_id = seed_neighborhood(&db).await;
        let usuario_id = seed_account(&db, "admin@example.com").await;
        let repo = SqliteAnnouncementRepository::new(db.pool().clone());

        let mut item = anuncio(colonia_id, usuario_id, "Junta vecinal", false, None);
        repo.create(&item).await.unwrap();
        assert_eq!(repo.find_by_id(item.id).await.unwrap().unwrap(), item);

        item.apply_patch(
            AnnouncementPatch {
                importante: Some(true),
                ..Default::default()
            },
            Utc::now(),
        );
        repo.update(&item).await.unwrap();
        assert!(repo.find_by_id(item.id).await.unwrap().unwrap().importante);
        assert_eq!(repo.find_all().await.unwrap().len(), 1);

        repo.delete(item.id).await.unwrap();
        assert!(repo.find_by_id(item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_current_announcements_for_colonia() {
        let db = Database::in_memory().await.unwrap();
        let colonia_id = seed_neighborhood(&db).await;
        let usuario_id = seed_account(&db, "admin@example.com").await;
        let repo = SqliteAnnouncementRepository::new(db.pool().clone());
        let now = Utc::now();

        repo.create(&anuncio(colonia_id, usuario_id, "vencido", true, Some(now - Duration::days(1))))
            .await
            .unwrap();
        repo.create(&anuncio(colonia_id, usuario_id, "normal", false, None))
            .await
            .unwrap();
        repo.create(&anuncio(colonia_id, usuario_id, "urgente", true, Some(now + Duration::days(1))))
            .await
            .unwrap();

        let fetched = repo.find_by_colonia(colonia_id).await.unwrap();
        assert_eq!(fetched.len(), 3);

        let current = current_announcements(fetched, now);
        let titles: Vec<_> = current.iter().map(|a| a.titulo.as_str()).collect();
        assert_eq!(titles, vec!["urgente", "normal"]);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = Database::in_memory().await.unwrap();
        let repo = SqliteAnnouncementRepository::new(db.pool().clone());

        let item = anuncio(Uuid::new_v4(), Uuid::new_v4(), "nada", false, None);
        assert!(matches!(
            repo.update(&item).await,
            Err(StorageError::NotFound { .. })
        ));
    }
}
