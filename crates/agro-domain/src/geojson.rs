// geojson.rs
//
// Formato de intercambio: colección de features estándar. El almacén de
// talhões ingiere este formato y el sincronizador de overlay lo emite hacia
// la superficie de render.
use crate::{DomainError, FieldPlot, PlotStatus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
  /// Anillos `[ [ [lon, lat], ... ] ]`; sólo se usa el anillo exterior.
  Polygon { coordinates: Vec<Vec<[f64; 2]>> },
  Point { coordinates: [f64; 2] },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
  #[serde(rename = "type")]
  pub kind: String,
  pub geometry: Geometry,
  pub properties: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureCollection {
  #[serde(rename = "type")]
  pub kind: String,
  pub features: Vec<Feature>,
}

impl Feature {
  /// Proyecta un talhão a feature GeoJSON. Las propiedades llevan el bolso
  /// de atributos que la capa de pintura necesita (`status`) más el `id`
  /// para la resolución de clicks.
  pub fn from_plot(plot: &FieldPlot) -> Self {
    let ring: Vec<[f64; 2]> = plot.ring().iter().map(|&(lon, lat)| [lon, lat]).collect();
    Feature { kind: "Feature".to_string(),
              geometry: Geometry::Polygon { coordinates: vec![ring] },
              properties: json!({
                "id": plot.id(),
                "name": plot.name(),
                "area_ha": plot.area_ha(),
                "culture": plot.culture(),
                "status": plot.status().as_str(),
                "sensors": plot.sensor_ids().iter().collect::<Vec<_>>(),
              }) }
  }

  /// Feature puntual sin propiedades (marcadores de falla, sensores).
  pub fn point(lon: f64, lat: f64) -> Self {
    Feature { kind: "Feature".to_string(),
              geometry: Geometry::Point { coordinates: [lon, lat] },
              properties: json!({}) }
  }

  /// Reconstruye el talhão completo desde una feature. Valida cierre del
  /// anillo y área positiva igual que `FieldPlot::from_parts`.
  pub fn to_plot(&self) -> Result<FieldPlot, DomainError> {
    let props = &self.properties;
    let id = props["id"].as_str()
                        .ok_or_else(|| DomainError::Validation("Feature sin propiedad 'id'".to_string()))?;
    let name = props["name"].as_str().unwrap_or(id);
    let area_ha = props["area_ha"].as_f64()
                                  .ok_or_else(|| DomainError::Validation("Feature sin 'area_ha' numérica".to_string()))?;
    let culture = props["culture"].as_str()
                                  .ok_or_else(|| DomainError::Validation("Feature sin 'culture'".to_string()))?;
    let status: PlotStatus = match props.get("status") {
      Some(v) => serde_json::from_value(v.clone())?,
      None => PlotStatus::Active,
    };
    let sensors: BTreeSet<String> = match props.get("sensors") {
      Some(v) => serde_json::from_value(v.clone())?,
      None => BTreeSet::new(),
    };
    let outer = match &self.geometry {
      Geometry::Polygon { coordinates } => coordinates.first()
        .ok_or_else(|| DomainError::Validation("Polígono sin anillo exterior".to_string()))?,
      Geometry::Point { .. } => {
        return Err(DomainError::Validation("La feature de un talhão debe ser un polígono".to_string()))
      }
    };
    let ring = outer.iter().map(|c| (c[0], c[1])).collect();
    FieldPlot::from_parts(id, name, ring, area_ha, culture, status, sensors)
  }
}

impl FeatureCollection {
  pub fn from_plots(plots: &[FieldPlot]) -> Self {
    FeatureCollection { kind: "FeatureCollection".to_string(),
                        features: plots.iter().map(Feature::from_plot).collect() }
  }

  /// Colección de puntos a partir de pares `(lat, lon)` (orden del motor de
  /// progreso; GeoJSON espera `(lon, lat)`).
  pub fn from_latlon_points(points: &[(f64, f64)]) -> Self {
    FeatureCollection { kind: "FeatureCollection".to_string(),
                        features: points.iter().map(|&(lat, lon)| Feature::point(lon, lat)).collect() }
  }

  pub fn to_plots(&self) -> Result<Vec<FieldPlot>, DomainError> {
    self.features.iter().map(Feature::to_plot).collect()
  }
}
