// Archivo: stubs.rs
// Propósito: implementación en memoria de la superficie de render para
// pruebas y demos de la CLI. No dibuja nada: registra fuentes, capas y
// encuadres para poder inspeccionarlos.
use crate::errors::{MapError, Result};
use crate::surface::{LayerSpec, RenderSurface, SurfaceFactory, SurfaceOptions};
use agro_domain::{BoundingBox, FeatureCollection};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

struct StubInner {
  style_tx: watch::Sender<bool>,
  sources: Mutex<HashMap<String, FeatureCollection>>,
  /// Capas en orden de instalación.
  layers: Mutex<Vec<LayerSpec>>,
  fits: Mutex<Vec<(BoundingBox, f64)>>,
  /// Mensaje a inyectar como fallo en la próxima operación de capa/fuente.
  fail_next: Mutex<Option<String>>,
}

/// Superficie en memoria. Clonar comparte el mismo estado interno, de modo
/// que una prueba puede conservar un handle de inspección mientras la
/// sesión posee el suyo.
#[derive(Clone)]
pub struct StubSurface {
  inner: Arc<StubInner>,
}

impl StubSurface {
  pub fn new() -> Self {
    let (style_tx, _) = watch::channel(false);
    Self { inner: Arc::new(StubInner { style_tx,
                                       sources: Mutex::new(HashMap::new()),
                                       layers: Mutex::new(Vec::new()),
                                       fits: Mutex::new(Vec::new()),
                                       fail_next: Mutex::new(None) }) }
  }

  /// Simula el evento de carga del estilo. Idempotente: la señal pasa de
  /// falso a verdadero una sola vez.
  pub fn load_style(&self) {
    self.inner.style_tx.send_replace(true);
  }

  /// La próxima operación de fuente/capa fallará con este mensaje.
  pub fn fail_next_op(&self, message: &str) {
    *lock(&self.inner.fail_next) = Some(message.to_string());
  }

  pub fn source_ids(&self) -> Vec<String> {
    let mut ids: Vec<String> = lock(&self.inner.sources).keys().cloned().collect();
    ids.sort();
    ids
  }

  pub fn source(&self, id: &str) -> Option<FeatureCollection> {
    lock(&self.inner.sources).get(id).cloned()
  }

  pub fn layer_ids(&self) -> Vec<String> {
    lock(&self.inner.layers).iter().map(|l| l.id.clone()).collect()
  }

  pub fn layer(&self, id: &str) -> Option<LayerSpec> {
    lock(&self.inner.layers).iter().find(|l| l.id == id).cloned()
  }

  pub fn fit_calls(&self) -> Vec<(BoundingBox, f64)> {
    lock(&self.inner.fits).clone()
  }

  fn take_failure(&self) -> Result<()> {
    match lock(&self.inner.fail_next).take() {
      Some(message) => Err(MapError::Surface(message)),
      None => Ok(()),
    }
  }
}

impl Default for StubSurface {
  fn default() -> Self {
    Self::new()
  }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
  m.lock().unwrap_or_else(|e| e.into_inner())
}

impl RenderSurface for StubSurface {
  fn is_style_loaded(&self) -> bool {
    *self.inner.style_tx.borrow()
  }

  fn style_watch(&self) -> watch::Receiver<bool> {
    self.inner.style_tx.subscribe()
  }

  fn add_source(&self, id: &str, data: &FeatureCollection) -> Result<()> {
    self.take_failure()?;
    lock(&self.inner.sources).insert(id.to_string(), data.clone());
    Ok(())
  }

  fn remove_source(&self, id: &str) -> Result<()> {
    self.take_failure()?;
    lock(&self.inner.sources)
      .remove(id)
      .map(|_| ())
      .ok_or_else(|| MapError::Surface(format!("fuente desconocida: {}", id)))
  }

  fn has_source(&self, id: &str) -> bool {
    lock(&self.inner.sources).contains_key(id)
  }

  fn add_layer(&self, spec: &LayerSpec) -> Result<()> {
    self.take_failure()?;
    if !self.has_source(&spec.source) {
      return Err(MapError::Surface(format!("la capa {} refiere a una fuente inexistente", spec.id)));
    }
    lock(&self.inner.layers).push(spec.clone());
    Ok(())
  }

  fn remove_layer(&self, id: &str) -> Result<()> {
    self.take_failure()?;
    let mut layers = lock(&self.inner.layers);
    let before = layers.len();
    layers.retain(|l| l.id != id);
    if layers.len() == before {
      return Err(MapError::Surface(format!("capa desconocida: {}", id)));
    }
    Ok(())
  }

  fn has_layer(&self, id: &str) -> bool {
    lock(&self.inner.layers).iter().any(|l| l.id == id)
  }

  fn fit_bounds(&self, bounds: &BoundingBox, padding: f64) -> Result<()> {
    lock(&self.inner.fits).push((*bounds, padding));
    Ok(())
  }
}

/// Fábrica de superficies stub. `new` devuelve además un handle de
/// inspección que comparte estado con la superficie que recibirá la sesión.
pub struct StubSurfaceFactory {
  prototype: StubSurface,
  fail_with: Option<String>,
}

impl StubSurfaceFactory {
  pub fn new() -> (Self, StubSurface) {
    let prototype = StubSurface::new();
    let handle = prototype.clone();
    (Self { prototype, fail_with: None }, handle)
  }

  /// Fábrica que siempre falla: simula una superficie que no puede
  /// construirse (estado de init inválido).
  pub fn failing(message: &str) -> Self {
    Self { prototype: StubSurface::new(), fail_with: Some(message.to_string()) }
  }
}

impl SurfaceFactory for StubSurfaceFactory {
  type Surface = StubSurface;

  fn create(&self, _opts: &SurfaceOptions) -> Result<StubSurface> {
    match &self.fail_with {
      Some(message) => Err(MapError::Initialization(message.clone())),
      None => Ok(self.prototype.clone()),
    }
  }
}
