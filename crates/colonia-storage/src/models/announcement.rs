use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TemporalValidity;
use crate::error::{StorageError, StorageResult};

/// Announcement ("anuncio") published to a neighborhood
///
/// An announcement stays current while `fecha_expiracion` is absent or
/// still in the future. Important announcements are listed first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Announcement {
    pub id: Uuid,
    pub titulo: String,
    pub contenido: String,
    /// Author account
    pub usuario_id: Uuid,
    pub colonia_id: Uuid,
    pub importante: bool,
    pub fecha_publicacion: DateTime<Utc>,
    pub fecha_expiracion: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewAnnouncement {
    pub titulo: String,
    pub contenido: String,
    pub usuario_id: Uuid,
    pub colonia_id: Uuid,
    #[serde(default)]
    pub importante: bool,
    /// Defaults to the creation instant
    #[serde(default)]
    pub fecha_publicacion: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fecha_expiracion: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnouncementPatch {
    pub titulo: Option<String>,
    pub contenido: Option<String>,
    pub importante: Option<bool>,
    pub fecha_publicacion: Option<DateTime<Utc>>,
    pub fecha_expiracion: Option<DateTime<Utc>>,
}

impl Announcement {
    pub fn publish(request: NewAnnouncement, now: DateTime<Utc>) -> StorageResult<Self> {
        if request.titulo.trim().is_empty() {
            return Err(StorageError::Validation(
                "titulo must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            titulo: request.titulo,
            contenido: request.contenido,
            usuario_id: request.usuario_id,
            colonia_id: request.colonia_id,
            importante: request.importante,
            fecha_publicacion: request.fecha_publicacion.unwrap_or(now),
            fecha_expiracion: request.fecha_expiracion,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn apply_patch(&mut self, patch: AnnouncementPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.titulo {
            self.titulo = v;
        }
        if let Some(v) = patch.contenido {
            self.contenido = v;
        }
        if let Some(v) = patch.importante {
            self.importante = v;
        }
        if let Some(v) = patch.fecha_publicacion {
            self.fecha_publicacion = v;
        }
        if let Some(v) = patch.fecha_expiracion {
            self.fecha_expiracion = Some(v);
        }
        self.updated_at = now;
    }
}

impl TemporalValidity for Announcement {
    fn is_active(&self) -> bool {
        true
    }

    fn validity_end(&self) -> Option<DateTime<Utc>> {
        self.fecha_expiracion
    }
}
