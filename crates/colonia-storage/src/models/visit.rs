use chrono::{DateTime, Duration, Utc};
use colonia_core::VisitKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TemporalValidity;
use crate::error::{StorageError, StorageResult};

/// Visitor pass ("visita") carrying a time-limited QR credential
///
/// # Lifecycle
///
/// - Issued by [`VisitorPass::issue`] with `qr_activo = true` and an
///   expiration (24 hours after creation unless overridden).
/// - Patched field by field through [`VisitorPassPatch`].
/// - Consumed by the `scan_qr` procedure, which sets `escaneado_en`,
///   records `escaneo_exitoso` and clears `qr_activo` in one statement.
///
/// # Invariants
///
/// - `id` never changes after issuance.
/// - `qr_expiracion` is strictly after `created_at`.
/// - Once `escaneado_en` is set it is never cleared, and `qr_activo`
///   stays false.
///
/// # Examples
///
/// ```
/// use colonia_storage::models::{NewVisitorPass, TemporalValidity, VisitorPass};
/// use colonia_core::VisitKind;
/// use chrono::{Duration, Utc};
/// use uuid::Uuid;
///
/// let now = Utc::now();
/// let request = NewVisitorPass {
///     nombre_visitante: "Ana".to_string(),
///     apellido_visitante: "López".to_string(),
///     identificacion: None,
///     tipo: VisitKind::Visit,
///     fecha_programada: now + Duration::hours(1),
///     residencia_id: Uuid::new_v4(),
///     usuario_id: Uuid::new_v4(),
///     activa: true,
///     qr_expiracion: None,
/// };
///
/// let pass = VisitorPass::issue(request, Duration::hours(24), now).unwrap();
/// assert!(pass.qr_activo);
/// assert_eq!(pass.qr_expiracion - pass.created_at, Duration::hours(24));
/// assert!(pass.is_valid_at(now));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VisitorPass {
    /// Pass identifier, generated at issuance
    pub id: Uuid,

    /// Visitor first name
    pub nombre_visitante: String,

    /// Visitor last name
    pub apellido_visitante: String,

    /// Visitor identification document, if provided
    pub identificacion: Option<String>,

    /// Visit kind label ("Visita", "Servicio", "Recurrente")
    ///
    /// Use `kind()` to get the typed value.
    pub tipo: String,

    /// When the visit is expected
    pub fecha_programada: DateTime<Utc>,

    /// Target residence (weak reference)
    pub residencia_id: Uuid,

    /// Requesting account (weak reference)
    pub usuario_id: Uuid,

    /// Opaque QR token, present once issued
    pub codigo_qr: Option<String>,

    /// Whether the QR can still be scanned
    pub qr_activo: bool,

    /// Instant from which the QR is no longer accepted
    pub qr_expiracion: DateTime<Utc>,

    /// Whether the pass is in effect (false for inert/placeholder passes)
    pub activa: bool,

    /// First successful scan
    pub escaneado_en: Option<DateTime<Utc>>,

    /// Outcome of the last scan attempt
    pub escaneo_exitoso: bool,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,

    /// Record last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// Request to issue a new visitor pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewVisitorPass {
    pub nombre_visitante: String,
    pub apellido_visitante: String,
    #[serde(default)]
    pub identificacion: Option<String>,
    pub tipo: VisitKind,
    pub fecha_programada: DateTime<Utc>,
    pub residencia_id: Uuid,
    pub usuario_id: Uuid,
    #[serde(default = "default_true")]
    pub activa: bool,
    /// Explicit expiration; defaults to creation + configured lifetime
    #[serde(default)]
    pub qr_expiracion: Option<DateTime<Utc>>,
}

/// Partial update of a visitor pass
///
/// Only the listed fields are patchable; `id`, the QR token and the scan
/// outcome are owned by issuance and the scan procedure. Absent fields are
/// left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisitorPassPatch {
    pub nombre_visitante: Option<String>,
    pub apellido_visitante: Option<String>,
    pub identificacion: Option<String>,
    pub tipo: Option<VisitKind>,
    pub fecha_programada: Option<DateTime<Utc>>,
    pub residencia_id: Option<Uuid>,
    pub usuario_id: Option<Uuid>,
    pub qr_activo: Option<bool>,
    pub qr_expiracion: Option<DateTime<Utc>>,
    pub activa: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl VisitorPass {
    /// Build a freshly issued pass
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Validation` if a required name is blank or the
    /// expiration is not strictly after the creation instant.
    pub fn issue(
        request: NewVisitorPass,
        default_ttl: Duration,
        now: DateTime<Utc>,
    ) -> StorageResult<Self> {
        if request.nombre_visitante.trim().is_empty() {
            return Err(StorageError::Validation(
                "nombre_visitante must not be empty".to_string(),
            ));
        }
        if request.apellido_visitante.trim().is_empty() {
            return Err(StorageError::Validation(
                "apellido_visitante must not be empty".to_string(),
            ));
        }

        let qr_expiracion = request.qr_expiracion.unwrap_or(now + default_ttl);
        ensure_expiration_after(qr_expiracion, now)?;

        Ok(Self {
            id: Uuid::new_v4(),
            nombre_visitante: request.nombre_visitante,
            apellido_visitante: request.apellido_visitante,
            identificacion: request.identificacion,
            tipo: request.tipo.as_str().to_string(),
            fecha_programada: request.fecha_programada,
            residencia_id: request.residencia_id,
            usuario_id: request.usuario_id,
            codigo_qr: Some(Self::generate_qr_token()),
            qr_activo: true,
            qr_expiracion,
            activa: request.activa,
            escaneado_en: None,
            escaneo_exitoso: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Generate an opaque QR token
    pub fn generate_qr_token() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Typed visit kind
    ///
    /// Rows written by other clients may carry labels outside the known set.
    pub fn kind(&self) -> colonia_core::Result<VisitKind> {
        self.tipo.parse()
    }

    /// Whether the pass has been consumed
    pub fn was_scanned(&self) -> bool {
        self.escaneado_en.is_some()
    }

    /// Apply a patch, enforcing the pass invariants
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Validation` when the patch would re-enable a
    /// scanned QR or move the expiration to or before `created_at`.
    pub fn apply_patch(&mut self, patch: VisitorPassPatch, now: DateTime<Utc>) -> StorageResult<()> {
        if patch.qr_activo == Some(true) && self.was_scanned() {
            return Err(StorageError::Validation(
                "qr_activo cannot be re-enabled on a scanned pass".to_string(),
            ));
        }
        if let Some(expiration) = patch.qr_expiracion {
            ensure_expiration_after(expiration, self.created_at)?;
        }

        if let Some(v) = patch.nombre_visitante {
            self.nombre_visitante = v;
        }
        if let Some(v) = patch.apellido_visitante {
            self.apellido_visitante = v;
        }
        if let Some(v) = patch.identificacion {
            self.identificacion = Some(v);
        }
        if let Some(v) = patch.tipo {
            self.tipo = v.as_str().to_string();
        }
        if let Some(v) = patch.fecha_programada {
            self.fecha_programada = v;
        }
        if let Some(v) = patch.residencia_id {
            self.residencia_id = v;
        }
        if let Some(v) = patch.usuario_id {
            self.usuario_id = v;
        }
        if let Some(v) = patch.qr_activo {
            self.qr_activo = v;
        }
        if let Some(v) = patch.qr_expiracion {
            self.qr_expiracion = v;
        }
        if let Some(v) = patch.activa {
            self.activa = v;
        }

        self.updated_at = now;
        Ok(())
    }
}

fn ensure_expiration_after(expiration: DateTime<Utc>, created_at: DateTime<Utc>) -> StorageResult<()> {
    if expiration <= created_at {
        return Err(StorageError::Validation(format!(
            "qr_expiracion ({expiration}) must be after created_at ({created_at})"
        )));
    }
    Ok(())
}

impl TemporalValidity for VisitorPass {
    fn is_active(&self) -> bool {
        self.activa && self.qr_activo && !self.was_scanned()
    }

    fn validity_end(&self) -> Option<DateTime<Utc>> {
        Some(self.qr_expiracion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_request() -> NewVisitorPass {
        NewVisitorPass {
            nombre_visitante: "Juan".to_string(),
            apellido_visitante: "Pérez".to_string(),
            identificacion: Some("INE-123".to_string()),
            tipo: VisitKind::Visit,
            fecha_programada: Utc::now() + Duration::hours(1),
            residencia_id: Uuid::new_v4(),
            usuario_id: Uuid::new_v4(),
            activa: true,
            qr_expiracion: None,
        }
    }

    #[test]
    fn test_issue_defaults() {
        let now = Utc::now();
        let pass = VisitorPass::issue(new_request(), Duration::hours(24), now).unwrap();

        assert!(pass.qr_activo);
        assert!(pass.activa);
        assert!(pass.codigo_qr.is_some());
        assert_eq!(pass.escaneado_en, None);
        assert!(!pass.escaneo_exitoso);
        assert_eq!(pass.created_at, now);
        assert_eq!(pass.updated_at, now);
        assert_eq!(pass.qr_expiracion - pass.created_at, Duration::hours(24));
        assert_eq!(pass.kind().unwrap(), VisitKind::Visit);
    }

    #[test]
    fn test_issue_respects_explicit_expiration() {
        let now = Utc::now();
        let mut request = new_request();
        request.qr_expiracion = Some(now + Duration::hours(2));

        let pass = VisitorPass::issue(request, Duration::hours(24), now).unwrap();
        assert_eq!(pass.qr_expiracion, now + Duration::hours(2));
    }

    #[test]
    fn test_issue_rejects_expiration_not_after_creation() {
        let now = Utc::now();
        let mut request = new_request();
        request.qr_expiracion = Some(now);

        let result = VisitorPass::issue(request, Duration::hours(24), now);
        assert!(matches!(result, Err(StorageError::Validation(_))));
    }

    #[test]
    fn test_issue_rejects_blank_name() {
        let mut request = new_request();
        request.nombre_visitante = "   ".to_string();

        let result = VisitorPass::issue(request, Duration::hours(24), Utc::now());
        assert!(matches!(result, Err(StorageError::Validation(_))));
    }

    #[test]
    fn test_each_issue_gets_fresh_id_and_token() {
        let now = Utc::now();
        let a = VisitorPass::issue(new_request(), Duration::hours(24), now).unwrap();
        let b = VisitorPass::issue(new_request(), Duration::hours(24), now).unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(a.codigo_qr, b.codigo_qr);
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let mut pass = VisitorPass::issue(new_request(), Duration::hours(24), now).unwrap();

        assert!(pass.is_valid_at(now));
        assert!(!pass.is_valid_at(now + Duration::hours(24)));

        pass.activa = false;
        assert!(!pass.is_valid_at(now));
    }

    #[test]
    fn test_scanned_pass_is_not_valid() {
        let now = Utc::now();
        let mut pass = VisitorPass::issue(new_request(), Duration::hours(24), now).unwrap();
        pass.escaneado_en = Some(now);

        assert!(!pass.is_valid_at(now));
    }

    #[test]
    fn test_apply_patch_updates_fields_and_timestamp() {
        let now = Utc::now();
        let mut pass = VisitorPass::issue(new_request(), Duration::hours(24), now).unwrap();
        let later = now + Duration::minutes(5);

        let patch = VisitorPassPatch {
            nombre_visitante: Some("María".to_string()),
            tipo: Some(VisitKind::Service),
            activa: Some(false),
            ..Default::default()
        };

        pass.apply_patch(patch, later).unwrap();

        assert_eq!(pass.nombre_visitante, "María");
        assert_eq!(pass.tipo, "Servicio");
        assert!(!pass.activa);
        assert_eq!(pass.updated_at, later);
        assert_eq!(pass.created_at, now);
    }

    #[test]
    fn test_apply_patch_cannot_reactivate_scanned_pass() {
        let now = Utc::now();
        let mut pass = VisitorPass::issue(new_request(), Duration::hours(24), now).unwrap();
        pass.escaneado_en = Some(now);
        pass.qr_activo = false;

        let patch = VisitorPassPatch {
            qr_activo: Some(true),
            ..Default::default()
        };

        assert!(matches!(
            pass.apply_patch(patch, now),
            Err(StorageError::Validation(_))
        ));
        assert!(!pass.qr_activo);
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result: Result<VisitorPassPatch, _> =
            serde_json::from_str(r#"{"escaneado_en": "2025-01-01T00:00:00Z"}"#);
        assert!(result.is_err());

        let result: Result<VisitorPassPatch, _> = serde_json::from_str(r#"{"id": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_new_pass_defaults_activa_to_true() {
        let json = r#"{
            "nombre_visitante": "Ana",
            "apellido_visitante": "Ruiz",
            "tipo": "Recurrente",
            "fecha_programada": "2025-06-01T10:00:00Z",
            "residencia_id": "7f1c9a2e-0d4b-4f3e-9b77-5d2a1e6c8f10",
            "usuario_id": "0b5e8d3c-6a1f-4c2d-8e9b-3f7a2d1c5e40"
        }"#;

        let request: NewVisitorPass = serde_json::from_str(json).unwrap();
        assert!(request.activa);
        assert_eq!(request.tipo, VisitKind::Recurring);
        assert!(request.qr_expiracion.is_none());
    }
}
