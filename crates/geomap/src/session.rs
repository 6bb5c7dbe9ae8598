// Archivo: session.rs
// Propósito: `BasemapSession` posee el handle de la superficie de render:
// apertura idempotente, señal de ready, canal de errores y teardown.
use crate::errors::{MapError, Result};
use crate::surface::{RenderSurface, SurfaceFactory, SurfaceOptions};
use std::sync::{Arc, Mutex, MutexGuard};

/// Variable de entorno con el token de acceso al motor de teselas.
pub const TOKEN_ENV_VAR: &str = "TERRIS_MAPBOX_TOKEN";

const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/satellite-streets-v12";
/// Región de Francisco Beltrão/PR.
const DEFAULT_CENTER: (f64, f64) = (-52.707, -26.195);
const DEFAULT_ZOOM: f64 = 13.0;

/// Configuración de la sesión. El token es precondición dura: sin él no se
/// intenta construir la superficie.
#[derive(Debug, Clone)]
pub struct MapConfig {
  pub access_token: String,
  pub style: String,
  pub center: (f64, f64),
  pub zoom: f64,
}

impl MapConfig {
  /// Lee el token desde el entorno (`.env` incluido vía dotenvy). La
  /// ausencia del token es un `Configuration` que el caller presenta como
  /// estado de error de configuración, sin intentar inicializar.
  pub fn from_env() -> Result<Self> {
    dotenvy::dotenv().ok();
    let token = std::env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.trim().is_empty());
    match token {
      Some(access_token) => Ok(Self::with_token(&access_token)),
      None => Err(MapError::Configuration(format!(
        "Token de acceso no configurado. Defina {} en el entorno o en .env",
        TOKEN_ENV_VAR
      ))),
    }
  }

  pub fn with_token(access_token: &str) -> Self {
    Self { access_token: access_token.to_string(),
           style: DEFAULT_STYLE.to_string(),
           center: DEFAULT_CENTER,
           zoom: DEFAULT_ZOOM }
  }
}

/// Sesión de basemap: dueña de exactamente un handle de superficie.
///
/// Ciclo de vida: se crea una vez por vista montada; `ready` pasa de falso
/// a verdadero exactamente una vez por handle (evento de carga del estilo);
/// `close` libera el handle y es seguro repetirlo. Después de `close` no
/// queda ninguna copia del handle en la sesión: las operaciones contra una
/// referencia vieja son imposibles por construcción.
pub struct BasemapSession<S: RenderSurface> {
  config: MapConfig,
  surface: Option<Arc<S>>,
  errors: Mutex<Vec<String>>,
}

impl<S: RenderSurface> BasemapSession<S> {
  pub fn new(config: MapConfig) -> Self {
    Self { config, surface: None, errors: Mutex::new(Vec::new()) }
  }

  /// Construye la superficie exactamente una vez. Si ya existe un handle la
  /// llamada es un no-op. Un fallo del constructor queda en el canal de
  /// errores (el caller renderiza un estado degradado con opción de
  /// reintento), nunca atraviesa este borde como panic.
  pub fn open<F>(&mut self, factory: &F)
    where F: SurfaceFactory<Surface = S>
  {
    if self.surface.is_some() {
      log::debug!("open(): la sesión ya tiene superficie, ignorando");
      return;
    }
    let opts = SurfaceOptions { access_token: self.config.access_token.clone(),
                                style: self.config.style.clone(),
                                center: self.config.center,
                                zoom: self.config.zoom };
    match factory.create(&opts) {
      Ok(surface) => {
        log::info!("superficie de mapa creada (centro {:?}, zoom {})", opts.center, opts.zoom);
        self.surface = Some(Arc::new(surface));
      }
      Err(e) => {
        log::error!("fallo al inicializar el mapa: {}", e);
        self.push_error(format!("Error al inicializar el mapa: {}", e));
      }
    }
  }

  pub fn is_open(&self) -> bool {
    self.surface.is_some()
  }

  /// `true` sólo cuando el estilo de la superficie terminó de cargar.
  pub fn is_ready(&self) -> bool {
    self.surface.as_ref().map(|s| s.is_style_loaded()).unwrap_or(false)
  }

  /// Espera la señal de carga del estilo. Se resuelve inmediatamente si ya
  /// disparó; falla si la sesión no está abierta o si la superficie se
  /// descarta sin emitirla.
  pub async fn wait_ready(&self) -> Result<()> {
    let surface = self.surface()?;
    let mut rx = surface.style_watch();
    if *rx.borrow() {
      return Ok(());
    }
    while rx.changed().await.is_ok() {
      if *rx.borrow() {
        return Ok(());
      }
    }
    Err(MapError::Surface("la superficie se cerró sin cargar el estilo".to_string()))
  }

  /// Handle vivo, o error `Surface` si la sesión está cerrada.
  pub fn surface(&self) -> Result<&Arc<S>> {
    self.surface
        .as_ref()
        .ok_or_else(|| MapError::Surface("la sesión de mapa no está abierta".to_string()))
  }

  /// Registra un error descriptivo. No es fatal para el proceso, pero sí
  /// para operaciones de overlay posteriores sobre este handle hasta una
  /// recarga.
  pub fn push_error(&self, message: String) {
    self.lock_errors().push(message);
  }

  pub fn last_error(&self) -> Option<String> {
    self.lock_errors().last().cloned()
  }

  pub fn errors(&self) -> Vec<String> {
    self.lock_errors().clone()
  }

  pub fn center(&self) -> (f64, f64) {
    self.config.center
  }

  pub fn zoom(&self) -> f64 {
    self.config.zoom
  }

  /// Libera el handle. Seguro de llamar varias veces. Tomar `&mut self`
  /// garantiza que ningún sync en vuelo (que presta `&self`) pueda
  /// solaparse con el teardown: la cadena de reintentos y el view-fit
  /// pendientes quedan cancelados al descartar sus futuros.
  pub fn close(&mut self) {
    if self.surface.take().is_some() {
      log::info!("sesión de mapa cerrada");
    }
  }

  fn lock_errors(&self) -> MutexGuard<'_, Vec<String>> {
    self.errors.lock().unwrap_or_else(|e| e.into_inner())
  }
}
