//! HTTP surface of the Colonia backend.
//!
//! JSON endpoints over accounts, neighborhoods, residences, memberships,
//! visitor passes and announcements. Handlers are thin: they decode the
//! request, call a repository or the [`PassController`] and map the outcome
//! to a response. Failures use the envelope
//! `{"error": {"code": ..., "message": ...}}`.
//!
//! [`PassController`]: colonia_storage::PassController

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use error::AppError;
pub use state::AppState;

use routes::{accounts, announcements, health, neighborhoods, residences, visits};

/// Build the application router with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::welcome))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route(
            "/usuarios",
            get(accounts::list_accounts).post(accounts::sign_up),
        )
        .route(
            "/usuarios/{id}",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
        .route(
            "/colonias",
            get(neighborhoods::list_neighborhoods).post(neighborhoods::create_neighborhood),
        )
        .route(
            "/colonias/{id}",
            get(neighborhoods::get_neighborhood)
                .put(neighborhoods::update_neighborhood)
                .delete(neighborhoods::delete_neighborhood),
        )
        .route(
            "/colonias/{id}/residencias",
            get(neighborhoods::residences_of_neighborhood),
        )
        .route(
            "/colonias/{id}/generar-codigo/{cantidad}",
            post(neighborhoods::generate_residence_codes),
        )
        .route(
            "/residencias",
            get(residences::list_residences).post(residences::create_residence),
        )
        .route(
            "/residencias/{id}",
            get(residences::get_residence)
                .put(residences::update_residence)
                .delete(residences::delete_residence),
        )
        .route("/residencias/usuarios", post(residences::create_membership))
        .route(
            "/residencias/usuarios/{usuario_id}",
            get(residences::residences_of_account),
        )
        .route(
            "/residencias/usuarios/verificar/{residencia_id}/{usuario_id}",
            patch(residences::verify_membership),
        )
        .route("/visitas", get(visits::list_passes).post(visits::issue_pass))
        .route(
            "/visitas/{id}",
            get(visits::get_pass)
                .put(visits::update_pass)
                .delete(visits::delete_pass),
        )
        .route("/visitas/{id}/scan", post(visits::scan_pass))
        .route(
            "/anuncios",
            get(announcements::list_announcements).post(announcements::create_announcement),
        )
        .route(
            "/anuncios/{id}",
            get(announcements::get_announcement)
                .put(announcements::update_announcement)
                .delete(announcements::delete_announcement),
        )
        .route(
            "/anuncios/colonia/{colonia_id}",
            get(announcements::current_for_neighborhood),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
