// store.rs
//
// Almacén en memoria de talhões: fuente de verdad de lo que el overlay
// renderiza. Sólo lectura para todos los consumidores una vez cargado.
use crate::{DomainError, FeatureCollection, FieldPlot, PlotStatus};
use std::collections::BTreeSet;

pub struct InMemoryPlotStore {
  plots: Vec<FieldPlot>,
}

impl InMemoryPlotStore {
  pub fn from_plots(plots: Vec<FieldPlot>) -> Self {
    Self { plots }
  }

  /// Carga el almacén desde una colección de features estándar.
  pub fn from_collection(fc: &FeatureCollection) -> Result<Self, DomainError> {
    Ok(Self { plots: fc.to_plots()? })
  }

  pub fn all(&self) -> &[FieldPlot] {
    &self.plots
  }

  pub fn get(&self, id: &str) -> Option<&FieldPlot> {
    self.plots.iter().find(|p| p.id() == id)
  }

  pub fn len(&self) -> usize {
    self.plots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.plots.is_empty()
  }

  pub fn total_area_ha(&self) -> f64 {
    self.plots.iter().map(|p| p.area_ha()).sum()
  }

  pub fn count_by_status(&self, status: PlotStatus) -> usize {
    self.plots.iter().filter(|p| p.status() == status).count()
  }

  /// Dataset de demostración: dos talhões de la región de Francisco
  /// Beltrão/PR con sus anillos reales.
  pub fn demo() -> Self {
    let sensors = |ids: &[&str]| ids.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
    let t1 = FieldPlot::from_parts("talhao-123",
                                   "Talhão 1",
                                   vec![(-52.713382, -26.199400),
                                        (-52.713994, -26.190408),
                                        (-52.701561, -26.190008),
                                        (-52.701346, -26.194661),
                                        (-52.708916, -26.194992),
                                        (-52.708747, -26.197712),
                                        (-52.710932, -26.197836),
                                        (-52.711224, -26.199369),
                                        (-52.713382, -26.199400)],
                                   85.4,
                                   "Soja",
                                   PlotStatus::Active,
                                   sensors(&["sensor-789", "sensor-456"]));
    let t2 = FieldPlot::from_parts("talhao-124",
                                   "Talhão 2",
                                   vec![(-52.708886, -26.194992),
                                        (-52.701377, -26.194675),
                                        (-52.701131, -26.198858),
                                        (-52.708562, -26.199244),
                                        (-52.708886, -26.194992)],
                                   42.3,
                                   "Milho",
                                   PlotStatus::Active,
                                   sensors(&["sensor-790", "sensor-457"]));
    // Los anillos de demo son válidos por construcción.
    Self { plots: vec![t1.expect("demo ring talhao-123"), t2.expect("demo ring talhao-124")] }
  }
}
