use chrono::{DateTime, Utc};
use colonia_core::constants::{PLACEHOLDER_REFERENCE, PLACEHOLDER_STREET};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};

/// Residence ("residencia") inside a neighborhood
///
/// `ubicacion` is free-form JSON supplied by clients (coordinates, map
/// hints); it is stored as text and returned untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Residence {
    pub id: Uuid,
    pub numero: String,
    pub calle: String,
    pub referencia: Option<String>,
    pub ubicacion: Option<Json<Value>>,
    pub colonia_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewResidence {
    pub numero: String,
    pub calle: String,
    #[serde(default)]
    pub referencia: Option<String>,
    #[serde(default)]
    pub ubicacion: Option<Value>,
    pub colonia_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResidencePatch {
    pub numero: Option<String>,
    pub calle: Option<String>,
    pub referencia: Option<String>,
    pub ubicacion: Option<Value>,
    pub colonia_id: Option<Uuid>,
}

impl Residence {
    pub fn create(request: NewResidence, now: DateTime<Utc>) -> StorageResult<Self> {
        if request.numero.trim().is_empty() {
            return Err(StorageError::Validation(
                "numero must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            numero: request.numero,
            calle: request.calle,
            referencia: request.referencia,
            ubicacion: request.ubicacion.map(Json),
            colonia_id: request.colonia_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Unclaimed residence generated in bulk for a neighborhood
    ///
    /// Its id doubles as the claim code handed to the future resident.
    pub fn placeholder(colonia_id: Uuid, index: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            numero: format!("Auto-{index}"),
            calle: PLACEHOLDER_STREET.to_string(),
            referencia: Some(PLACEHOLDER_REFERENCE.to_string()),
            ubicacion: None,
            colonia_id,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_patch(&mut self, patch: ResidencePatch, now: DateTime<Utc>) {
        if let Some(v) = patch.numero {
            self.numero = v;
        }
        if let Some(v) = patch.calle {
            self.calle = v;
        }
        if let Some(v) = patch.referencia {
            self.referencia = Some(v);
        }
        if let Some(v) = patch.ubicacion {
            self.ubicacion = Some(Json(v));
        }
        if let Some(v) = patch.colonia_id {
            self.colonia_id = v;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_placeholder_fields() {
        let colonia_id = Uuid::new_v4();
        let residence = Residence::placeholder(colonia_id, 3, Utc::now());

        assert_eq!(residence.numero, "Auto-3");
        assert_eq!(residence.calle, "Por asignar");
        assert_eq!(residence.colonia_id, colonia_id);
    }

    #[test]
    fn test_ubicacion_serializes_as_plain_json() {
        let residence = Residence::create(
            NewResidence {
                numero: "12".to_string(),
                calle: "Pino".to_string(),
                referencia: None,
                ubicacion: Some(json!({"lat": 19.43, "lng": -99.13})),
                colonia_id: Uuid::new_v4(),
            },
            Utc::now(),
        )
        .unwrap();

        let value = serde_json::to_value(&residence).unwrap();
        assert_eq!(value["ubicacion"]["lat"], json!(19.43));
    }
}
