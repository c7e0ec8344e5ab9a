use std::sync::Arc;

use colonia_storage::{
    Database, PassController, SqliteAccountRepository, SqliteAnnouncementRepository,
    SqliteMembershipRepository, SqliteNeighborhoodRepository, SqliteResidenceRepository,
    SqliteVisitRepository,
};

use crate::config::Config;

/// Shared handler state
///
/// Built once at startup; every repository shares the same pool.
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub accounts: Arc<SqliteAccountRepository>,
    pub neighborhoods: Arc<SqliteNeighborhoodRepository>,
    pub residences: Arc<SqliteResidenceRepository>,
    pub memberships: Arc<SqliteMembershipRepository>,
    pub announcements: Arc<SqliteAnnouncementRepository>,
    pub passes: Arc<PassController<SqliteVisitRepository>>,
}

impl AppState {
    pub fn new(database: Database, config: &Config) -> Self {
        let pool = database.pool().clone();

        let passes = PassController::new(SqliteVisitRepository::new(pool.clone()))
            .with_qr_ttl(config.qr_ttl());

        Self {
            accounts: Arc::new(SqliteAccountRepository::new(pool.clone())),
            neighborhoods: Arc::new(SqliteNeighborhoodRepository::new(pool.clone())),
            residences: Arc::new(SqliteResidenceRepository::new(pool.clone())),
            memberships: Arc::new(SqliteMembershipRepository::new(pool.clone())),
            announcements: Arc::new(SqliteAnnouncementRepository::new(pool)),
            passes: Arc::new(passes),
            database,
        }
    }
}
