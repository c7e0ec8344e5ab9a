//! Storage layer for the Colonia residential-community backend.
//!
//! SQLite-backed persistence for accounts, neighborhoods, residences,
//! memberships, visitor passes and announcements, plus the visitor-pass
//! lifecycle built on top of it.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool manager with embedded migrations
//! - Repository traits per collection ([`VisitRepository`],
//!   [`AccountRepository`], ...) with SQLite implementations
//! - [`PassController`] - Issue, patch, delete and scan visitor passes
//! - [`VisitFilter`] and [`current_announcements`] - Query filters
//!
//! ## Pass procedures
//!
//! Whether a QR pass may be scanned is decided by the store, not by
//! callers. [`VisitRepository::is_qr_valid`] reports validity and
//! [`VisitRepository::scan_qr`] consumes the pass with a single conditional
//! `UPDATE`, so two racing scans can never both succeed.
//!
//! # Examples
//!
//! ```no_run
//! use colonia_storage::{Database, DatabaseConfig, PassController, SqliteVisitRepository};
//! use colonia_storage::models::NewVisitorPass;
//! use colonia_core::VisitKind;
//! use chrono::{Duration, Utc};
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new(DatabaseConfig::new("colonia.db")).await?;
//! let passes = PassController::new(SqliteVisitRepository::new(db.pool().clone()));
//!
//! let pass = passes
//!     .issue(NewVisitorPass {
//!         nombre_visitante: "Ana".to_string(),
//!         apellido_visitante: "López".to_string(),
//!         identificacion: None,
//!         tipo: VisitKind::Visit,
//!         fecha_programada: Utc::now() + Duration::hours(1),
//!         residencia_id: Uuid::new_v4(),
//!         usuario_id: Uuid::new_v4(),
//!         activa: true,
//!         qr_expiracion: None,
//!     })
//!     .await?;
//!
//! let scanned = passes.scan(pass.id).await?;
//! assert!(!scanned.qr_activo);
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod filters;
pub mod lifecycle;
pub mod models;
pub mod repositories;

#[cfg(test)]
mod test_support;

pub use connection::{Database, DatabaseConfig};
pub use error::{StorageError, StorageResult};
pub use filters::{VisitFilter, current_announcements};
pub use lifecycle::PassController;
pub use models::{
    Account, Announcement, Neighborhood, Residence, ResidenceMembership, TemporalValidity,
    VisitorPass,
};
pub use repositories::{
    AccountRepository, AnnouncementRepository, MembershipRepository, NeighborhoodRepository,
    ResidenceRepository, SqliteAccountRepository, SqliteAnnouncementRepository,
    SqliteMembershipRepository, SqliteNeighborhoodRepository, SqliteResidenceRepository,
    SqliteVisitRepository, VisitRepository,
};
