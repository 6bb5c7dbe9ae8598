// Archivo: overlay.rs
// Propósito: `OverlaySync` reconcilia el almacén de talhões contra las
// capas vivas de la sesión, con reintentos hasta que el estilo esté
// mutable y resolución de click a entidad completa.
use crate::errors::{MapError, Result};
use crate::session::BasemapSession;
use crate::surface::{LayerKind, LayerSpec, RenderSurface};
use agro_domain::{FeatureCollection, FieldPlot};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

/// Sondeos de mutabilidad del estilo antes de declarar timeout.
pub const STYLE_PROBE_ATTEMPTS: u32 = 5;
/// Retardo fijo entre sondeos.
pub const STYLE_PROBE_DELAY: Duration = Duration::from_millis(100);
const FIT_PADDING: f64 = 50.0;

/// Estados del sincronizador. `Synced -> Syncing` en cualquier cambio del
/// snapshot de entidades; cualquier estado pasa a `Error` al agotar
/// reintentos o ante un error de la superficie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
  Idle,
  WaitingForStyle,
  Syncing,
  Synced,
  Error(String),
}

/// Mapa fijo estado -> color de relleno, con color por defecto para
/// estados desconocidos.
fn fill_paint() -> serde_json::Value {
  json!({
    "fill-color": [
      "match", ["get", "status"],
      "active", "#22c55e",
      "inactive", "#a3a3a3",
      "maintenance", "#fb923c",
      "#16a34a"
    ],
    "fill-opacity": 0.3,
  })
}

fn outline_paint() -> serde_json::Value {
  json!({
    "line-color": [
      "match", ["get", "status"],
      "active", "#16a34a",
      "inactive", "#737373",
      "maintenance", "#ea580c",
      "#15803d"
    ],
    "line-width": 2,
    "line-opacity": 0.8,
  })
}

fn failure_paint() -> serde_json::Value {
  json!({
    "circle-color": "#ef4444",
    "circle-radius": 4,
    "circle-opacity": 0.8,
  })
}

/// Sincronizador de overlay: dueño exclusivo de la capa lógica
/// `source_id`/`fill`/`outline` y de su snapshot de entidades. Nunca
/// retiene nada a través de un teardown de la sesión (presta `&session`
/// sólo durante cada operación).
pub struct OverlaySync {
  layer_name: String,
  state: SyncState,
  snapshot: Vec<FieldPlot>,
}

impl OverlaySync {
  pub fn new(layer_name: &str) -> Self {
    Self { layer_name: layer_name.to_string(), state: SyncState::Idle, snapshot: Vec::new() }
  }

  pub fn state(&self) -> &SyncState {
    &self.state
  }

  /// Snapshot actualmente renderizado.
  pub fn snapshot(&self) -> &[FieldPlot] {
    &self.snapshot
  }

  fn source_id(&self) -> &str {
    &self.layer_name
  }

  fn fill_id(&self) -> String {
    format!("{}-fill", self.layer_name)
  }

  fn outline_id(&self) -> String {
    format!("{}-outline", self.layer_name)
  }

  fn failures_source_id(&self) -> String {
    format!("{}-failures", self.layer_name)
  }

  fn failures_layer_id(&self) -> String {
    format!("{}-failures-points", self.layer_name)
  }

  /// Reconcilia el snapshot contra la sesión.
  ///
  /// Puede invocarse antes de que la señal de ready dispare: no lanza, sino
  /// que sondea la mutabilidad del estilo hasta `STYLE_PROBE_ATTEMPTS`
  /// veces con retardo fijo. Agotar los sondeos es un corte duro:
  /// `StyleTimeout` con mensaje orientado al usuario, no una degradación
  /// silenciosa.
  ///
  /// El reemplazo es atómico por política remove-then-reinstall: quedan
  /// exactamente una fuente y dos capas derivadas correspondientes al
  /// último snapshot, nunca capas de dos snapshots a la vez. Dos syncs con
  /// el mismo snapshot no alteran el estado visual.
  pub async fn sync<S: RenderSurface>(&mut self,
                                      session: &BasemapSession<S>,
                                      plots: &[FieldPlot])
                                      -> Result<()> {
    let surface = match session.surface() {
      Ok(s) => s.clone(),
      Err(e) => {
        self.state = SyncState::Error(e.to_string());
        return Err(e);
      }
    };

    self.state = SyncState::WaitingForStyle;
    let mut attempts = 0;
    while !surface.is_style_loaded() {
      attempts += 1;
      if attempts >= STYLE_PROBE_ATTEMPTS {
        let message = "Timeout al cargar el estilo del mapa. Intente recargar la página.".to_string();
        log::error!("estilo no mutable tras {} sondeos", STYLE_PROBE_ATTEMPTS);
        self.state = SyncState::Error(message.clone());
        session.push_error(message.clone());
        return Err(MapError::StyleTimeout(message));
      }
      log::debug!("estilo aún no mutable, sondeo {}/{}", attempts, STYLE_PROBE_ATTEMPTS);
      sleep(STYLE_PROBE_DELAY).await;
    }

    self.state = SyncState::Syncing;
    if let Err(e) = self.install(surface.as_ref(), plots) {
      self.state = SyncState::Error(e.to_string());
      session.push_error(format!("Error al sincronizar talhões: {}", e));
      return Err(e);
    }
    self.snapshot = plots.to_vec();
    self.state = SyncState::Synced;
    log::info!("{} talhões sincronizados en la capa '{}'", plots.len(), self.layer_name);

    // View-fit: efecto colateral, no requisito de corrección. Se omite con
    // cero entidades y un fallo sólo se registra.
    if !plots.is_empty() {
      let mut bounds = plots[0].bounding_box();
      for plot in &plots[1..] {
        bounds.extend(&plot.bounding_box());
      }
      if let Err(e) = surface.fit_bounds(&bounds, FIT_PADDING) {
        log::warn!("view-fit falló: {}", e);
      }
    }
    Ok(())
  }

  /// Reemplazo atómico: retira capas derivadas y fuente si existen, luego
  /// instala fuente fresca y exactamente dos capas (relleno y contorno).
  fn install<S: RenderSurface>(&self, surface: &S, plots: &[FieldPlot]) -> Result<()> {
    for layer in [self.fill_id(), self.outline_id()] {
      if surface.has_layer(&layer) {
        surface.remove_layer(&layer)?;
      }
    }
    if surface.has_source(self.source_id()) {
      surface.remove_source(self.source_id())?;
    }

    surface.add_source(self.source_id(), &FeatureCollection::from_plots(plots))?;
    surface.add_layer(&LayerSpec { id: self.fill_id(),
                                   source: self.source_id().to_string(),
                                   kind: LayerKind::Fill,
                                   paint: fill_paint() })?;
    surface.add_layer(&LayerSpec { id: self.outline_id(),
                                   source: self.source_id().to_string(),
                                   kind: LayerKind::Line,
                                   paint: outline_paint() })?;
    Ok(())
  }

  /// Pinta los puntos de falla del motor de progreso como capa de círculos
  /// reemplazable (misma política remove-then-reinstall). Los puntos llegan
  /// en orden `(lat, lon)`.
  pub fn paint_failures<S: RenderSurface>(&self,
                                          session: &BasemapSession<S>,
                                          points: &[(f64, f64)])
                                          -> Result<()> {
    let surface = session.surface()?;
    if !surface.is_style_loaded() {
      // Un tick que llega antes del primer sync se descarta sin escalar.
      return Ok(());
    }
    let source = self.failures_source_id();
    let layer = self.failures_layer_id();
    if surface.has_layer(&layer) {
      surface.remove_layer(&layer)?;
    }
    if surface.has_source(&source) {
      surface.remove_source(&source)?;
    }
    surface.add_source(&source, &FeatureCollection::from_latlon_points(points))?;
    surface.add_layer(&LayerSpec { id: layer,
                                   source,
                                   kind: LayerKind::Circle,
                                   paint: failure_paint() })
  }

  /// Resuelve un click a la entidad completa (no a las propiedades finas de
  /// la feature): el consumidor accede así a datos que la superficie no
  /// transporta, como los ids de sensores. Un punto dentro del polígono P
  /// resuelve al talhão de P aun con aristas compartidas; un miss se
  /// ignora en silencio.
  pub fn resolve_click(&self, lon: f64, lat: f64) -> Option<&FieldPlot> {
    self.snapshot.iter().find(|p| p.contains(lon, lat))
  }

  /// Variante por id de feature, para superficies que ya resolvieron la
  /// feature bajo el cursor.
  pub fn resolve_feature(&self, feature_id: &str) -> Option<&FieldPlot> {
    self.snapshot.iter().find(|p| p.id() == feature_id)
  }

  /// Invoca `callback` con la entidad bajo `(lon, lat)`; devuelve si hubo
  /// resolución.
  pub fn handle_click<F>(&self, lon: f64, lat: f64, callback: F) -> bool
    where F: FnOnce(&FieldPlot)
  {
    match self.resolve_click(lon, lat) {
      Some(plot) => {
        callback(plot);
        true
      }
      None => false,
    }
  }
}
