//! Error taxonomy for content loading and lookups.

use thiserror::Error;

use crate::validate::IntegrityReport;

/// Everything that can go wrong between asking for the catalog and
/// rendering a place.
///
/// `Display` is the operator-facing description (logs, CLI). Pages show
/// [`user_message`](ContentError::user_message) instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContentError {
    /// The request did not complete within the client timeout.
    #[error("content request timed out")]
    Timeout,

    /// The endpoint answered with a non-2xx status.
    #[error("content endpoint returned HTTP {status}")]
    Server { status: u16 },

    /// No response was received at all.
    #[error("could not reach content endpoint: {0}")]
    Connection(String),

    /// The body was not a catalog (bad JSON, missing `categories`/`places`).
    #[error("malformed catalog response: {0}")]
    Malformed(String),

    /// The catalog parsed but failed strict validation.
    #[error("catalog failed validation: {0}")]
    Integrity(IntegrityReport),

    /// A place id that is not in the loaded catalog.
    #[error("place not found: {0}")]
    PlaceNotFound(String),
}

impl ContentError {
    /// Message shown to site visitors.
    pub fn user_message(&self) -> String {
        match self {
            ContentError::Timeout => "Tiempo de espera agotado al cargar el contenido".to_string(),
            ContentError::Server { status } => format!("Error del servidor: {}", status),
            ContentError::Connection(_) => "No se pudo conectar con el servidor".to_string(),
            ContentError::Malformed(_) => "Estructura de datos inválida".to_string(),
            ContentError::Integrity(_) => {
                "El contenido de la enciclopedia es inconsistente".to_string()
            }
            ContentError::PlaceNotFound(_) => {
                "El lugar que buscas no existe o ha sido removido".to_string()
            }
        }
    }

    /// Short machine-readable code, used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ContentError::Timeout => "timeout",
            ContentError::Server { .. } => "upstream_error",
            ContentError::Connection(_) => "connection_failed",
            ContentError::Malformed(_) => "malformed_response",
            ContentError::Integrity(_) => "integrity",
            ContentError::PlaceNotFound(_) => "not_found",
        }
    }
}
