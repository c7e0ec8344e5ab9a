use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Neighborhood ("colonia") grouping residences and announcements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Neighborhood {
    pub id: Uuid,
    pub nombre: String,
    pub direccion: String,
    /// Main administrator account
    pub admin_principal_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewNeighborhood {
    pub nombre: String,
    pub direccion: String,
    #[serde(default)]
    pub admin_principal_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NeighborhoodPatch {
    pub nombre: Option<String>,
    pub direccion: Option<String>,
    pub admin_principal_id: Option<Uuid>,
}

impl Neighborhood {
    pub fn create(request: NewNeighborhood, now: DateTime<Utc>) -> StorageResult<Self> {
        if request.nombre.trim().is_empty() {
            return Err(StorageError::Validation(
                "nombre must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            nombre: request.nombre,
            direccion: request.direccion,
            admin_principal_id: request.admin_principal_id,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: NeighborhoodPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.nombre {
            self.nombre = v;
        }
        if let Some(v) = patch.direccion {
            self.direccion = v;
        }
        if let Some(v) = patch.admin_principal_id {
            self.admin_principal_id = Some(v);
        }
        self.updated_at = now;
    }
}
