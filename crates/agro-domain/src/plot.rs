// plot.rs
use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Par `(lon, lat)` en grados decimales, orden GeoJSON.
pub type LonLat = (f64, f64);

/// Estado operativo de un talhão (lote de cultivo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotStatus {
  Active,
  Inactive,
  Maintenance,
}

impl PlotStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      PlotStatus::Active => "active",
      PlotStatus::Inactive => "inactive",
      PlotStatus::Maintenance => "maintenance",
    }
  }
}

/// Caja envolvente `(min_lon, min_lat, max_lon, max_lat)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
  pub min_lon: f64,
  pub min_lat: f64,
  pub max_lon: f64,
  pub max_lat: f64,
}

impl BoundingBox {
  /// Extiende la caja para cubrir también `other`.
  pub fn extend(&mut self, other: &BoundingBox) {
    self.min_lon = self.min_lon.min(other.min_lon);
    self.min_lat = self.min_lat.min(other.min_lat);
    self.max_lon = self.max_lon.max(other.max_lon);
    self.max_lat = self.max_lat.max(other.max_lat);
  }
}

/// Entidad geográfica: un polígono de campo con sus atributos agronómicos.
///
/// Inmutable una vez construido. El anillo debe estar cerrado (primer punto
/// igual al último); la no auto-intersección se asume, no se valida.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPlot {
  id: String,
  name: String,
  ring: Vec<LonLat>,
  area_ha: f64,
  culture: String,
  status: PlotStatus,
  sensor_ids: BTreeSet<String>,
}

impl FieldPlot {
  fn new(id: &str,
         name: &str,
         ring: Vec<LonLat>,
         area_ha: f64,
         culture: &str,
         status: PlotStatus,
         sensor_ids: BTreeSet<String>)
         -> Result<Self, DomainError> {
    if id.trim().is_empty() {
      return Err(DomainError::Validation("El id del talhão no puede estar vacío".to_string()));
    }
    if ring.len() < 4 {
      return Err(DomainError::Validation("El anillo debe tener al menos 4 puntos (cerrado)".to_string()));
    }
    let first = ring[0];
    let last = ring[ring.len() - 1];
    if first != last {
      return Err(DomainError::Validation("El anillo debe estar cerrado (primer punto == último)".to_string()));
    }
    if !(area_ha > 0.0) {
      return Err(DomainError::Validation("area_ha debe ser mayor que cero".to_string()));
    }
    if culture.trim().is_empty() {
      return Err(DomainError::Validation("La cultura no puede estar vacía".to_string()));
    }
    Ok(Self { id: id.to_string(),
              name: name.to_string(),
              ring,
              area_ha,
              culture: culture.to_string(),
              status,
              sensor_ids })
  }

  pub fn from_parts(id: &str,
                    name: &str,
                    ring: Vec<LonLat>,
                    area_ha: f64,
                    culture: &str,
                    status: PlotStatus,
                    sensor_ids: BTreeSet<String>)
                    -> Result<Self, DomainError> {
    Self::new(id, name, ring, area_ha, culture, status, sensor_ids)
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// Anillo cerrado `(lon, lat)`; el último punto repite el primero.
  pub fn ring(&self) -> &[LonLat] {
    &self.ring
  }

  pub fn area_ha(&self) -> f64 {
    self.area_ha
  }

  pub fn culture(&self) -> &str {
    &self.culture
  }

  pub fn status(&self) -> PlotStatus {
    self.status
  }

  pub fn sensor_ids(&self) -> &BTreeSet<String> {
    &self.sensor_ids
  }

  /// Caja envolvente del anillo.
  pub fn bounding_box(&self) -> BoundingBox {
    let mut bb = BoundingBox { min_lon: f64::INFINITY,
                               min_lat: f64::INFINITY,
                               max_lon: f64::NEG_INFINITY,
                               max_lat: f64::NEG_INFINITY };
    for &(lon, lat) in &self.ring {
      bb.min_lon = bb.min_lon.min(lon);
      bb.min_lat = bb.min_lat.min(lat);
      bb.max_lon = bb.max_lon.max(lon);
      bb.max_lat = bb.max_lat.max(lat);
    }
    bb
  }

  /// Punto de referencia del talhão: centro de la caja envolvente. Se usa
  /// como ancla para los puntos de falla simulados.
  pub fn reference_point(&self) -> LonLat {
    let bb = self.bounding_box();
    ((bb.min_lon + bb.max_lon) / 2.0, (bb.min_lat + bb.max_lat) / 2.0)
  }

  /// Prueba punto-en-anillo por conteo de cruces (ray casting).
  ///
  /// Un punto estrictamente dentro del polígono P resuelve a P incluso
  /// cuando dos talhões comparten una arista de borde.
  pub fn contains(&self, lon: f64, lat: f64) -> bool {
    let ring = &self.ring;
    let n = ring.len() - 1; // el último punto duplica el primero
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
      let (xi, yi) = ring[i];
      let (xj, yj) = ring[j];
      if ((yi > lat) != (yj > lat)) && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
        inside = !inside;
      }
      j = i;
    }
    inside
  }
}

impl fmt::Display for FieldPlot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "FieldPlot({}, {:.2} ha, {}, {})",
           self.name, self.area_ha, self.culture, self.status.as_str())
  }
}
