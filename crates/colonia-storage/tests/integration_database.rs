//! Integration tests for the database pool and the pass procedures
//!
//! Uses a file-backed database so several pooled connections race against
//! each other, which an in-memory database cannot exercise.
//!
//! Run with: cargo test --package colonia-storage --test integration_database

use chrono::{Duration, Utc};
use colonia_core::VisitKind;
use colonia_storage::models::{NewAccount, NewNeighborhood, NewResidence, NewVisitorPass};
use colonia_storage::{
    AccountRepository, Database, DatabaseConfig, Neighborhood, NeighborhoodRepository,
    PassController, Residence, ResidenceRepository, SqliteAccountRepository,
    SqliteNeighborhoodRepository, SqliteResidenceRepository, SqliteVisitRepository,
    StorageError, VisitRepository,
};
use std::sync::Arc;
use tokio::sync::Barrier;
use uuid::Uuid;

async fn file_database(dir: &tempfile::TempDir) -> Database {
    let path = dir.path().join("colonia-test.db");
    let config = DatabaseConfig::new(path.to_string_lossy().to_string())
        .max_connections(5)
        .min_connections(1);
    Database::new(config).await.unwrap()
}

/// Neighborhood, residence and account ids for issuing passes
async fn seed(db: &Database) -> (Uuid, Uuid) {
    let colonia = Neighborhood::create(
        NewNeighborhood {
            nombre: "Jardines".to_string(),
            direccion: "Blvd. Norte 1".to_string(),
            admin_principal_id: None,
        },
        Utc::now(),
    )
    .unwrap();
    SqliteNeighborhoodRepository::new(db.pool().clone())
        .create(&colonia)
        .await
        .unwrap();

    let residence = Residence::create(
        NewResidence {
            numero: "42".to_string(),
            calle: "Encino".to_string(),
            referencia: None,
            ubicacion: None,
            colonia_id: colonia.id,
        },
        Utc::now(),
    )
    .unwrap();
    SqliteResidenceRepository::new(db.pool().clone())
        .create(&residence)
        .await
        .unwrap();

    let account = SqliteAccountRepository::new(db.pool().clone())
        .sign_up(NewAccount {
            email: "guardia@example.com".to_string(),
            password: "caseta2025".to_string(),
            nombre: "Mario".to_string(),
            apellido: "Díaz".to_string(),
            telefono: None,
            tipo_usuario_id: 1,
            colonia_id: Some(colonia.id),
        })
        .await
        .unwrap();

    (residence.id, account.id)
}

fn pass_request(residencia_id: Uuid, usuario_id: Uuid) -> NewVisitorPass {
    NewVisitorPass {
        nombre_visitante: "Rosa".to_string(),
        apellido_visitante: "Vega".to_string(),
        identificacion: Some("INE-777".to_string()),
        tipo: VisitKind::Visit,
        fecha_programada: Utc::now() + Duration::hours(1),
        residencia_id,
        usuario_id,
        activa: true,
        qr_expiracion: None,
    }
}

#[tokio::test]
async fn test_in_memory_database() {
    let db = Database::in_memory().await.unwrap();
    db.health_check().await.unwrap();
    db.close().await;
}

#[tokio::test]
async fn test_migration_idempotency() {
    let db = Database::in_memory().await.unwrap();

    db.migrate().await.unwrap();
    db.migrate().await.unwrap();

    let result: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='visitas'")
            .fetch_one(db.pool())
            .await
            .unwrap();

    assert_eq!(result.0, 1);

    db.close().await;
}

#[tokio::test]
async fn test_file_database_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("data").join("colonia.db");

    let db = Database::new(DatabaseConfig::new(path.to_string_lossy().to_string()))
        .await
        .unwrap();
    db.health_check().await.unwrap();

    assert!(path.exists());
    db.close().await;
}

#[tokio::test]
async fn test_concurrent_scans_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir).await;
    let (residencia_id, usuario_id) = seed(&db).await;

    let controller = Arc::new(PassController::new(SqliteVisitRepository::new(
        db.pool().clone(),
    )));
    let pass = controller
        .issue(pass_request(residencia_id, usuario_id))
        .await
        .unwrap();

    const NUM_SCANNERS: usize = 8;
    let barrier = Arc::new(Barrier::new(NUM_SCANNERS));
    let mut handles = vec![];

    for _ in 0..NUM_SCANNERS {
        let controller = controller.clone();
        let barrier = barrier.clone();
        let id = pass.id;

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            controller.scan(id).await
        }));
    }

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results.iter().all(|r| matches!(
        r,
        Ok(_) | Err(StorageError::InvalidOrExpiredPass(_)) | Err(StorageError::ScanFailure(_))
    )));

    let stored = controller.get(pass.id).await.unwrap();
    assert!(stored.escaneado_en.is_some());
    assert!(!stored.qr_activo);

    db.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_sign_ups() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir).await;
    let accounts = Arc::new(SqliteAccountRepository::new(db.pool().clone()));

    const NUM_CLIENTS: usize = 6;
    let barrier = Arc::new(Barrier::new(NUM_CLIENTS));
    let mut handles = vec![];

    for i in 0..NUM_CLIENTS {
        let accounts = accounts.clone();
        let barrier = barrier.clone();

        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            accounts
                .sign_up(NewAccount {
                    email: "Duplicado@Example.com".to_string(),
                    password: format!("clave-{i}-segura"),
                    nombre: "Ana".to_string(),
                    apellido: "Soto".to_string(),
                    telefono: None,
                    tipo_usuario_id: 1,
                    colonia_id: None,
                })
                .await
        }));
    }

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    for result in &results {
        assert!(
            matches!(result, Ok(_) | Err(StorageError::AuthenticationFailure(_))),
            "unexpected sign-up outcome: {result:?}"
        );
    }

    let stored = accounts.find_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].email, "duplicado@example.com");

    db.close().await;
}

#[tokio::test]
async fn test_pass_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db = file_database(&dir).await;
    let (residencia_id, usuario_id) = seed(&db).await;

    let controller = PassController::new(SqliteVisitRepository::new(db.pool().clone()));
    let pass = controller
        .issue(pass_request(residencia_id, usuario_id))
        .await
        .unwrap();
    db.close().await;

    let reopened = file_database(&dir).await;
    let repo = SqliteVisitRepository::new(reopened.pool().clone());

    let found = repo.find_by_id(pass.id).await.unwrap().unwrap();
    assert_eq!(found, pass);
    assert!(repo.is_qr_valid(pass.id, Utc::now()).await.unwrap());

    reopened.close().await;
}
