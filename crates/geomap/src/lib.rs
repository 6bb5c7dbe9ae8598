//! Crate `geomap` — sesión de basemap y sincronizador de overlay.
//!
//! Este crate posee el ciclo de vida de una superficie de render de mapa
//! (`BasemapSession`) y mantiene los polígonos de talhões consistentes con
//! el almacén de entidades (`OverlaySync`), tolerando la carrera entre
//! "sesión abierta" y "estilo realmente listo para aceptar capas".
//!
//! Diseño resumido:
//! - La superficie real se alcanza a través del trait `RenderSurface`; el
//!   crate incluye una implementación en memoria (`StubSurface`) para
//!   pruebas y demos.
//! - La sesión es un valor con dueño explícito, pasado por referencia a sus
//!   dependientes; cerrar la sesión toma `&mut self`, por lo que ningún
//!   sync en vuelo puede solaparse con el teardown.
//! - El sincronizador reinstala fuente y capas completas en cada sync
//!   (remove-then-reinstall): dos syncs con el mismo snapshot no duplican
//!   capas.
//!
//! Ejemplo rápido:
//! ```rust
//! use geomap::{BasemapSession, MapConfig, StubSurfaceFactory};
//! let (factory, _surface) = StubSurfaceFactory::new();
//! let mut session = BasemapSession::new(MapConfig::with_token("demo"));
//! session.open(&factory);
//! assert!(session.is_open());
//! session.close();
//! session.close(); // idempotente
//! ```

pub mod errors;
pub mod overlay;
pub mod session;
pub mod stubs;
pub mod surface;

pub use errors::{MapError, Result};
pub use overlay::{OverlaySync, SyncState};
pub use session::{BasemapSession, MapConfig};
pub use stubs::{StubSurface, StubSurfaceFactory};
pub use surface::{LayerKind, LayerSpec, RenderSurface, SurfaceFactory, SurfaceOptions};
