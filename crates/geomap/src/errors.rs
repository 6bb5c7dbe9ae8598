// Archivo: errors.rs
// Propósito: definir la taxonomía de errores del mapa y el alias Result<T>
// usado por las APIs del crate.
use thiserror::Error;

/// Errores del basemap y del sincronizador de overlay.
///
/// - `Configuration`: falta la credencial de acceso; fatal para la sesión,
///   se informa una vez y no se reintenta.
/// - `Initialization`: la superficie de render no pudo construirse; fatal,
///   el usuario debe recargar.
/// - `StyleTimeout`: se agotaron los reintentos de §overlay; fatal para ese
///   ciclo de sync, la sesión queda usable tras una recarga.
/// - `Surface`: error propagado por la superficie de render.
#[derive(Error, Debug)]
pub enum MapError {
  #[error("Error de configuración: {0}")]
  Configuration(String),
  #[error("Error de inicialización del mapa: {0}")]
  Initialization(String),
  #[error("Timeout del estilo: {0}")]
  StyleTimeout(String),
  #[error("Error de la superficie de render: {0}")]
  Surface(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, MapError>;
