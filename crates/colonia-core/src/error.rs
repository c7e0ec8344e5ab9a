use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Domain vocabulary errors
    #[error("Invalid visit kind: {0} (expected Visita, Servicio or Recurrente)")]
    InvalidVisitKind(String),

    #[error("Invalid membership role: {0} (expected propietario, residente or inquilino)")]
    InvalidRole(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
