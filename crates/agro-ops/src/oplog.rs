// Archivo: oplog.rs
// Propósito: contrato del log de operaciones (`OperationLog`) y la
// implementación en memoria usada por pruebas y por la CLI. El log es
// append-only: una vez escrito, un registro es inmutable.
use crate::errors::{OpsError, Result};
use agro_domain::{OperationDetails, OperationKind, OperationRecord};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Contrato del almacén de operaciones completadas.
///
/// Clave primaria `id`; índice secundario por `field_id`. El log no impone
/// orden de fecha al escribir: las lecturas ordenan descendente. Las
/// escrituras duplicadas se rechazan defensivamente aunque la UI
/// serialice las acciones del usuario.
#[async_trait]
pub trait OperationLog: Send + Sync {
  /// Inserta un registro. Falla con `DuplicateId` si el id ya existe,
  /// dejando exactamente un registro persistido.
  async fn append(&self, record: OperationRecord) -> Result<()>;

  /// Registros de un talhão ordenados por fecha descendente. Lectura pura.
  async fn query_by_field(&self, field_id: &str) -> Result<Vec<OperationRecord>>;

  /// Todos los registros, fecha descendente.
  async fn all(&self) -> Result<Vec<OperationRecord>>;

  /// Inserción masiva única, sólo si el log tiene cero registros. Evita
  /// sembrar duplicados en inicializaciones repetidas. Devuelve cuántos
  /// registros insertó.
  async fn seed_if_empty(&self, records: Vec<OperationRecord>) -> Result<usize>;

  /// Conveniencia sobre `query_by_field`: el match más reciente del tipo.
  async fn last_of_kind(&self, field_id: &str, kind: OperationKind) -> Result<Option<OperationRecord>> {
    let records = self.query_by_field(field_id).await?;
    Ok(records.into_iter().find(|r| r.kind == kind))
  }
}

/// Log en memoria, durable dentro de la sesión.
pub struct InMemoryOperationLog {
  /// Registros por `id`.
  records: Mutex<HashMap<String, OperationRecord>>,
  /// Índice secundario: `field_id` -> ids en orden de inserción.
  by_field: Mutex<HashMap<String, Vec<String>>>,
}

impl InMemoryOperationLog {
  pub fn new() -> Self {
    Self { records: Mutex::new(HashMap::new()), by_field: Mutex::new(HashMap::new()) }
  }

  /// Helper para mapear `Mutex::lock()` en un `Result` con
  /// `OpsError::Storage`.
  fn lock<'a, T>(&'a self, m: &'a Mutex<T>) -> Result<MutexGuard<'a, T>> {
    m.lock().map_err(|e| OpsError::Storage(format!("mutex poisoned: {:?}", e)))
  }

  fn sorted_desc(mut records: Vec<OperationRecord>) -> Vec<OperationRecord> {
    records.sort_by(|a, b| b.date.cmp(&a.date));
    records
  }
}

impl Default for InMemoryOperationLog {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl OperationLog for InMemoryOperationLog {
  async fn append(&self, record: OperationRecord) -> Result<()> {
    let mut records = self.lock(&self.records)?;
    if records.contains_key(&record.id) {
      return Err(OpsError::DuplicateId(record.id.clone()));
    }
    let mut by_field = self.lock(&self.by_field)?;
    by_field.entry(record.field_id.clone()).or_default().push(record.id.clone());
    log::debug!("operación {} registrada para {}", record.id, record.field_id);
    records.insert(record.id.clone(), record);
    Ok(())
  }

  async fn query_by_field(&self, field_id: &str) -> Result<Vec<OperationRecord>> {
    let records = self.lock(&self.records)?;
    let by_field = self.lock(&self.by_field)?;
    let matches = by_field.get(field_id)
                          .map(|ids| ids.iter().filter_map(|id| records.get(id).cloned()).collect())
                          .unwrap_or_default();
    Ok(Self::sorted_desc(matches))
  }

  async fn all(&self) -> Result<Vec<OperationRecord>> {
    let records = self.lock(&self.records)?;
    Ok(Self::sorted_desc(records.values().cloned().collect()))
  }

  async fn seed_if_empty(&self, records: Vec<OperationRecord>) -> Result<usize> {
    {
      let existing = self.lock(&self.records)?;
      if !existing.is_empty() {
        return Ok(0);
      }
    }
    let count = records.len();
    for record in records {
      self.append(record).await?;
    }
    Ok(count)
  }
}

/// Registros de demostración: historial inicial de los dos talhões de la
/// región de Francisco Beltrão/PR. Las fechas no siguen el orden de
/// inserción a propósito: los lectores ordenan.
pub fn demo_seed() -> Vec<OperationRecord> {
  let date = |y, mo, d, h, mi| Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap();
  vec![OperationRecord { id: "op-001".to_string(),
                         field_id: "talhao-123".to_string(),
                         field_name: "Talhão 1".to_string(),
                         kind: OperationKind::Planting,
                         date: date(2024, 10, 15, 8, 0),
                         culture: "Soja".to_string(),
                         area_ha: 85.4,
                         details: OperationDetails { seeds_planted: Some(23_912_000),
                                                     notes: Some("Plantio realizado com sucesso".to_string()),
                                                     ..Default::default() } },
       OperationRecord { id: "op-002".to_string(),
                         field_id: "talhao-123".to_string(),
                         field_name: "Talhão 1".to_string(),
                         kind: OperationKind::Fertilizing,
                         date: date(2024, 9, 20, 10, 30),
                         culture: "Soja".to_string(),
                         area_ha: 85.4,
                         details: OperationDetails { product: Some("NPK 04-14-08".to_string()),
                                                     notes: Some("Adubação de base".to_string()),
                                                     ..Default::default() } },
       OperationRecord { id: "op-003".to_string(),
                         field_id: "talhao-123".to_string(),
                         field_name: "Talhão 1".to_string(),
                         kind: OperationKind::Spraying,
                         date: date(2024, 8, 10, 7, 0),
                         culture: "Soja".to_string(),
                         area_ha: 85.4,
                         details: OperationDetails { product: Some("Glifosato".to_string()),
                                                     notes: Some("Dessecação pré-plantio".to_string()),
                                                     ..Default::default() } },
       OperationRecord { id: "op-004".to_string(),
                         field_id: "talhao-124".to_string(),
                         field_name: "Talhão 2".to_string(),
                         kind: OperationKind::Planting,
                         date: date(2024, 9, 10, 8, 30),
                         culture: "Milho".to_string(),
                         area_ha: 42.3,
                         details: OperationDetails { seeds_planted: Some(2_538_000),
                                                     notes: Some("Plantio com espaçamento de 0.5m".to_string()),
                                                     ..Default::default() } },
       OperationRecord { id: "op-005".to_string(),
                         field_id: "talhao-124".to_string(),
                         field_name: "Talhão 2".to_string(),
                         kind: OperationKind::Irrigation,
                         date: date(2024, 10, 5, 6, 0),
                         culture: "Milho".to_string(),
                         area_ha: 42.3,
                         details: OperationDetails { notes: Some("Irrigação fase V6".to_string()),
                                                     ..Default::default() } },
       OperationRecord { id: "op-006".to_string(),
                         field_id: "talhao-124".to_string(),
                         field_name: "Talhão 2".to_string(),
                         kind: OperationKind::Fertilizing,
                         date: date(2024, 8, 25, 9, 0),
                         culture: "Milho".to_string(),
                         area_ha: 42.3,
                         details: OperationDetails { product: Some("Ureia".to_string()),
                                                     notes: Some("Adubação de cobertura".to_string()),
                                                     ..Default::default() } }]
}
