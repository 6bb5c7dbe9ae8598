// Archivo: errors.rs
// Propósito: errores del log de operaciones y alias Result<T>.
use thiserror::Error;

/// Errores del dominio de operaciones.
///
/// - `DuplicateId`: ya existe un registro con ese id; recuperable, el
///   caller regenera el id o lo trata como ya aplicado.
/// - `Storage`: error al acceder al almacenamiento.
#[derive(Error, Debug)]
pub enum OpsError {
  #[error("Registro duplicado: ya existe una operación con id {0}")]
  DuplicateId(String),
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
}

/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, OpsError>;
