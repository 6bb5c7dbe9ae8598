// record.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tipo de operación de campo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
  Planting,
  Spraying,
  Irrigation,
  Fertilizing,
  Harvesting,
}

impl OperationKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      OperationKind::Planting => "planting",
      OperationKind::Spraying => "spraying",
      OperationKind::Irrigation => "irrigation",
      OperationKind::Fertilizing => "fertilizing",
      OperationKind::Harvesting => "harvesting",
    }
  }
}

impl fmt::Display for OperationKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Detalles opcionales capturados al cierre de la operación.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationDetails {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub seeds_planted: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub yield_kg: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub product: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

/// Registro inmutable de una operación completada.
///
/// Clave primaria `id`; acceso secundario por `field_id` en el log de
/// operaciones. El log no impone orden de escritura por fecha: los lectores
/// ordenan descendente.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
  pub id: String,
  pub field_id: String,
  pub field_name: String,
  pub kind: OperationKind,
  pub date: DateTime<Utc>,
  pub culture: String,
  pub area_ha: f64,
  #[serde(default)]
  pub details: OperationDetails,
}
