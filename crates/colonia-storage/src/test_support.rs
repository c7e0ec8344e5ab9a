//! Row seeding helpers shared by the repository tests

use chrono::Utc;
use uuid::Uuid;

use crate::connection::Database;

pub(crate) async fn seed_neighborhood(db: &Database) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO colonias (id, nombre, direccion, created_at, updated_at)
         VALUES (?, 'Las Lomas', 'Av. Central 100', ?, ?)",
    )
    .bind(id)
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await
    .unwrap();
    id
}

pub(crate) async fn seed_residence(db: &Database, colonia_id: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO residencias (id, numero, calle, colonia_id, created_at, updated_at)
         VALUES (?, '12', 'Pino', ?, ?, ?)",
    )
    .bind(id)
    .bind(colonia_id)
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await
    .unwrap();
    id
}

/// Account row without credentials
pub(crate) async fn seed_account(db: &Database, email: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO usuarios (id, email, nombre, apellido, tipo_usuario_id, activo, created_at, updated_at)
         VALUES (?, ?, 'Test', 'User', 1, 1, ?, ?)",
    )
    .bind(id)
    .bind(email)
    .bind(now)
    .bind(now)
    .execute(db.pool())
    .await
    .unwrap();
    id
}
