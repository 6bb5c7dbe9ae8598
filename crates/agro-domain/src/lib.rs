//! Crate `agro-domain` — modelo de dominio agrícola compartido.
//!
//! Define las entidades geográficas (`FieldPlot`), los registros de
//! operaciones de campo (`OperationRecord`), la tabla estática de cultivos
//! (`CultureProfile`/`CropSchedule`) y el formato de intercambio GeoJSON.
//! Todas las entidades son inmutables una vez cargadas en la sesión; el
//! almacén (`InMemoryPlotStore`) es de sólo lectura para sus consumidores.

mod culture;
mod errors;
mod geojson;
mod plot;
mod record;
mod store;
mod util;

pub use culture::{culture_profile, CropSchedule, CultureProfile};
pub use errors::DomainError;
pub use geojson::{Feature, FeatureCollection, Geometry};
pub use plot::{BoundingBox, FieldPlot, LonLat, PlotStatus};
pub use record::{OperationDetails, OperationKind, OperationRecord};
pub use store::InMemoryPlotStore;
pub use util::{format_area, format_grouped};
