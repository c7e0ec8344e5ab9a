//! Visitor pass lifecycle
//!
//! Issue, inspect, patch, delete and scan passes on top of a
//! [`VisitRepository`]. Validity is never decided here: scanning first asks
//! the store's `is_qr_valid` procedure and only then calls `scan_qr`.

use chrono::{DateTime, Duration, Utc};
use colonia_core::constants::DEFAULT_QR_TTL_HOURS;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::filters::VisitFilter;
use crate::models::{NewVisitorPass, VisitorPass, VisitorPassPatch};
use crate::repositories::VisitRepository;

/// Drives visitor passes through issue, patch, delete and scan
pub struct PassController<R> {
    repository: R,
    qr_ttl: Duration,
}

impl<R: VisitRepository> PassController<R> {
    /// Controller with the default QR lifetime
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            qr_ttl: Duration::hours(DEFAULT_QR_TTL_HOURS),
        }
    }

    /// Override the lifetime given to passes issued without an explicit
    /// expiration
    pub fn with_qr_ttl(mut self, ttl: Duration) -> Self {
        self.qr_ttl = ttl;
        self
    }

    pub fn qr_ttl(&self) -> Duration {
        self.qr_ttl
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Issue a new pass and persist it
    pub async fn issue(&self, request: NewVisitorPass) -> StorageResult<VisitorPass> {
        let pass = VisitorPass::issue(request, self.qr_ttl, Utc::now())?;
        self.repository.create(&pass).await?;

        info!(
            visit_id = %pass.id,
            residencia_id = %pass.residencia_id,
            tipo = %pass.tipo,
            qr_expiracion = %pass.qr_expiracion,
            "Visitor pass issued"
        );

        Ok(pass)
    }

    pub async fn get(&self, id: Uuid) -> StorageResult<VisitorPass> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| StorageError::not_found("Visita", id))
    }

    pub async fn list(&self, filter: &VisitFilter) -> StorageResult<Vec<VisitorPass>> {
        self.repository.find_filtered(filter).await
    }

    /// Apply a partial update and return the stored pass
    pub async fn update(&self, id: Uuid, patch: VisitorPassPatch) -> StorageResult<VisitorPass> {
        let mut pass = self.get(id).await?;
        pass.apply_patch(patch, Utc::now())?;
        self.repository.update(&pass).await?;

        debug!(visit_id = %id, "Visitor pass updated");
        Ok(pass)
    }

    pub async fn delete(&self, id: Uuid) -> StorageResult<()> {
        self.repository.delete(id).await?;
        info!(visit_id = %id, "Visitor pass deleted");
        Ok(())
    }

    /// Scan a pass now
    pub async fn scan(&self, id: Uuid) -> StorageResult<VisitorPass> {
        self.scan_at(id, Utc::now()).await
    }

    /// Scan a pass at a given instant
    ///
    /// # Errors
    ///
    /// - `InvalidOrExpiredPass` when the validity check fails; nothing is
    ///   written.
    /// - `ScanFailure` when the pass was valid but could not be consumed,
    ///   typically because a concurrent scan consumed it first.
    pub async fn scan_at(&self, id: Uuid, now: DateTime<Utc>) -> StorageResult<VisitorPass> {
        if !self.repository.is_qr_valid(id, now).await? {
            warn!(visit_id = %id, "Scan rejected: pass invalid or expired");
            return Err(StorageError::InvalidOrExpiredPass(id));
        }

        if !self.repository.scan_qr(id, now).await? {
            warn!(visit_id = %id, "Scan failed after successful validity check");
            return Err(StorageError::ScanFailure(id));
        }

        info!(visit_id = %id, "Visitor pass scanned");
        self.get(id).await
    }
}
