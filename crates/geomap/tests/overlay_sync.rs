use agro_domain::{Geometry, InMemoryPlotStore};
use geomap::{BasemapSession, MapConfig, MapError, OverlaySync, RenderSurface, StubSurface, StubSurfaceFactory,
             SyncState};
use std::time::Duration;
use tokio::time::sleep;

fn open_session() -> (BasemapSession<StubSurface>, StubSurface) {
  let (factory, surface) = StubSurfaceFactory::new();
  let mut session = BasemapSession::new(MapConfig::with_token("pk.test"));
  session.open(&factory);
  (session, surface)
}

#[tokio::test]
async fn sync_installs_one_source_and_two_layers() {
  let (session, surface) = open_session();
  surface.load_style();
  let store = InMemoryPlotStore::demo();

  let mut sync = OverlaySync::new("talhoes");
  sync.sync(&session, store.all()).await.unwrap();

  assert_eq!(*sync.state(), SyncState::Synced);
  assert_eq!(surface.source_ids(), vec!["talhoes".to_string()]);
  assert_eq!(surface.layer_ids(),
             vec!["talhoes-fill".to_string(), "talhoes-outline".to_string()]);
  assert_eq!(surface.source("talhoes").unwrap().features.len(), 2);
}

#[tokio::test]
async fn resync_replaces_never_duplicates() {
  let (session, surface) = open_session();
  surface.load_style();
  let store = InMemoryPlotStore::demo();
  let mut sync = OverlaySync::new("talhoes");

  // E1: los dos talhões
  sync.sync(&session, store.all()).await.unwrap();
  // E2: sólo el primero
  let e2 = vec![store.all()[0].clone()];
  sync.sync(&session, &e2).await.unwrap();

  // exactamente una fuente y dos capas, correspondientes a E2
  assert_eq!(surface.source_ids(), vec!["talhoes".to_string()]);
  assert_eq!(surface.layer_ids().len(), 2);
  assert_eq!(surface.source("talhoes").unwrap().features.len(), 1);

  // mismo snapshot dos veces: sin capas duplicadas ni cambio visual
  sync.sync(&session, &e2).await.unwrap();
  assert_eq!(surface.layer_ids().len(), 2);
  assert_eq!(surface.source("talhoes").unwrap().features.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn sync_before_ready_retries_until_style_loads() {
  let (session, surface) = open_session();
  let store = InMemoryPlotStore::demo();
  let mut sync = OverlaySync::new("talhoes");

  // el estilo carga 250 ms después de pedir el sync: dos sondeos fallan,
  // el tercero encuentra el estilo mutable
  let (result, _) = tokio::join!(sync.sync(&session, store.all()), async {
    sleep(Duration::from_millis(250)).await;
    surface.load_style();
  });
  result.unwrap();
  assert_eq!(*sync.state(), SyncState::Synced);
  assert_eq!(surface.layer_ids().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_probes_hard_stop_with_timeout() {
  let (session, _surface) = open_session();
  let store = InMemoryPlotStore::demo();
  let mut sync = OverlaySync::new("talhoes");

  // el estilo nunca carga
  let err = sync.sync(&session, store.all()).await.unwrap_err();
  assert!(matches!(err, MapError::StyleTimeout(_)));
  assert!(matches!(sync.state(), SyncState::Error(_)));
  // mensaje orientado al usuario en el canal de la sesión
  let last = session.last_error().unwrap();
  assert!(last.contains("recargar"));
}

#[tokio::test]
async fn sync_on_closed_session_fails() {
  let (mut session, surface) = open_session();
  surface.load_style();
  session.close();

  let store = InMemoryPlotStore::demo();
  let mut sync = OverlaySync::new("talhoes");
  let err = sync.sync(&session, store.all()).await.unwrap_err();
  assert!(matches!(err, MapError::Surface(_)));
  assert!(matches!(sync.state(), SyncState::Error(_)));
}

#[tokio::test]
async fn surface_error_during_install_is_surfaced() {
  let (session, surface) = open_session();
  surface.load_style();
  let store = InMemoryPlotStore::demo();
  let mut sync = OverlaySync::new("talhoes");

  surface.fail_next_op("fuente rechazada");
  let err = sync.sync(&session, store.all()).await.unwrap_err();
  assert!(matches!(err, MapError::Surface(_)));
  assert!(matches!(sync.state(), SyncState::Error(_)));
  assert!(session.last_error().unwrap().contains("fuente rechazada"));
}

#[tokio::test]
async fn view_fit_covers_all_rings_and_skips_empty() {
  let (session, surface) = open_session();
  surface.load_style();
  let store = InMemoryPlotStore::demo();
  let mut sync = OverlaySync::new("talhoes");

  sync.sync(&session, store.all()).await.unwrap();
  let fits = surface.fit_calls();
  assert_eq!(fits.len(), 1);
  let (bb, padding) = fits[0];
  assert_eq!(padding, 50.0);
  assert!(bb.min_lon <= -52.713994 && bb.max_lon >= -52.701131);
  assert!(bb.min_lat <= -26.199400 && bb.max_lat >= -26.190008);

  // snapshot vacío: sync válido, sin nuevo encuadre
  sync.sync(&session, &[]).await.unwrap();
  assert_eq!(surface.fit_calls().len(), 1);
  assert_eq!(surface.source("talhoes").unwrap().features.len(), 0);
}

#[tokio::test]
async fn click_resolves_full_entity() {
  let (session, surface) = open_session();
  surface.load_style();
  let store = InMemoryPlotStore::demo();
  let mut sync = OverlaySync::new("talhoes");
  sync.sync(&session, store.all()).await.unwrap();

  // punto interior del Talhão 2, por debajo de la arista compartida
  let plot = sync.resolve_click(-52.705, -26.197).unwrap();
  assert_eq!(plot.id(), "talhao-124");
  // la entidad completa viaja al callback, sensores incluidos
  assert_eq!(plot.sensor_ids().len(), 2);

  // punto interior del Talhão 1, por encima de la arista compartida
  let plot = sync.resolve_click(-52.705, -26.192).unwrap();
  assert_eq!(plot.id(), "talhao-123");

  // miss: se ignora en silencio
  assert!(sync.resolve_click(0.0, 0.0).is_none());
  assert!(!sync.handle_click(0.0, 0.0, |_| panic!("no debe resolver")));

  let mut seen = None;
  assert!(sync.handle_click(-52.705, -26.197, |p| seen = Some(p.id().to_string())));
  assert_eq!(seen.as_deref(), Some("talhao-124"));

  // resolución por id de feature
  assert_eq!(sync.resolve_feature("talhao-123").unwrap().name(), "Talhão 1");
  assert!(sync.resolve_feature("talhao-999").is_none());
}

#[tokio::test]
async fn failure_points_are_replaced_each_paint() {
  let (session, surface) = open_session();
  surface.load_style();
  let store = InMemoryPlotStore::demo();
  let mut sync = OverlaySync::new("talhoes");
  sync.sync(&session, store.all()).await.unwrap();

  sync.paint_failures(&session, &[(-26.195, -52.707), (-26.196, -52.706), (-26.194, -52.708)])
      .unwrap();
  let fc = surface.source("talhoes-failures").unwrap();
  assert_eq!(fc.features.len(), 3);
  // el orden (lat, lon) del motor se convierte a (lon, lat) GeoJSON
  match fc.features[0].geometry {
    Geometry::Point { coordinates } => assert_eq!(coordinates, [-52.707, -26.195]),
    _ => panic!("se esperaba un punto"),
  }
  assert!(surface.has_layer("talhoes-failures-points"));

  sync.paint_failures(&session, &[(-26.195, -52.707)]).unwrap();
  assert_eq!(surface.source("talhoes-failures").unwrap().features.len(), 1);
  let circles = surface.layer_ids()
                       .into_iter()
                       .filter(|id| id == "talhoes-failures-points")
                       .count();
  assert_eq!(circles, 1);
}
