// Archivo: surface.rs
// Propósito: definir el trait `RenderSurface` (contrato de la superficie de
// render de terceros) y `SurfaceFactory` (construcción inyectable). Las
// operaciones son las llamadas de fuente/capa de un motor de teselas
// estándar; el overlay sólo habla a través de este contrato.
use crate::errors::Result;
use agro_domain::{BoundingBox, FeatureCollection};
use tokio::sync::watch;

/// Opciones de apertura de la superficie.
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
  pub access_token: String,
  pub style: String,
  /// Centro inicial `(lon, lat)`.
  pub center: (f64, f64),
  pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
  Fill,
  Line,
  Circle,
}

/// Especificación de una capa derivada. `paint` es el JSON de pintura del
/// motor de estilos (expresiones `match` incluidas).
#[derive(Debug, Clone)]
pub struct LayerSpec {
  pub id: String,
  pub source: String,
  pub kind: LayerKind,
  pub paint: serde_json::Value,
}

/// Contrato mínimo de la superficie de render.
///
/// El handle es opaco para los consumidores: la sesión lo posee, el
/// sincronizador lo muta y nadie más lo retiene. La señal de carga del
/// estilo es inherentemente asíncrona: la construcción retorna antes de que
/// el estilo sea utilizable, por eso existe `style_watch` además del sondeo
/// `is_style_loaded`.
pub trait RenderSurface: Send + Sync {
  /// Sondea si el estilo está realmente mutable (no sólo "ready" emitido).
  fn is_style_loaded(&self) -> bool;

  /// Canal de observación del estilo: pasa de `false` a `true` exactamente
  /// una vez por handle.
  fn style_watch(&self) -> watch::Receiver<bool>;

  fn add_source(&self, id: &str, data: &FeatureCollection) -> Result<()>;
  fn remove_source(&self, id: &str) -> Result<()>;
  fn has_source(&self, id: &str) -> bool;

  fn add_layer(&self, spec: &LayerSpec) -> Result<()>;
  fn remove_layer(&self, id: &str) -> Result<()>;
  fn has_layer(&self, id: &str) -> bool;

  /// Encuadra la caja con un padding fijo en píxeles.
  fn fit_bounds(&self, bounds: &BoundingBox, padding: f64) -> Result<()>;
}

/// Construcción inyectable de superficies. Un fallo del constructor es un
/// `MapError::Initialization` que la sesión captura en su canal de errores
/// en vez de propagarlo más allá del borde del caller.
pub trait SurfaceFactory {
  type Surface: RenderSurface;

  fn create(&self, opts: &SurfaceOptions) -> Result<Self::Surface>;
}
