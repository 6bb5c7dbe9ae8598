use agro_domain::{culture_profile, FeatureCollection, FieldPlot, InMemoryPlotStore, PlotStatus};
use std::collections::BTreeSet;

fn square(id: &str, x0: f64, x1: f64) -> FieldPlot {
  FieldPlot::from_parts(id,
                        id,
                        vec![(x0, 0.0), (x1, 0.0), (x1, 1.0), (x0, 1.0), (x0, 0.0)],
                        10.0,
                        "Soja",
                        PlotStatus::Active,
                        BTreeSet::new()).unwrap()
}

#[test]
fn open_ring_is_rejected() {
  let r = FieldPlot::from_parts("p1",
                                "p1",
                                vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)],
                                10.0,
                                "Soja",
                                PlotStatus::Active,
                                BTreeSet::new());
  assert!(r.is_err());
}

#[test]
fn non_positive_area_is_rejected() {
  let r = FieldPlot::from_parts("p1",
                                "p1",
                                vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)],
                                0.0,
                                "Soja",
                                PlotStatus::Active,
                                BTreeSet::new());
  assert!(r.is_err());
}

#[test]
fn contains_resolves_correct_plot_across_shared_edge() {
  // Dos cuadrados que comparten la arista x = 1.0
  let a = square("a", 0.0, 1.0);
  let b = square("b", 1.0, 2.0);
  assert!(a.contains(0.5, 0.5));
  assert!(!b.contains(0.5, 0.5));
  assert!(b.contains(1.5, 0.5));
  assert!(!a.contains(1.5, 0.5));
}

#[test]
fn contains_outside_is_false() {
  let a = square("a", 0.0, 1.0);
  assert!(!a.contains(5.0, 5.0));
  assert!(!a.contains(-0.5, 0.5));
}

#[test]
fn bounding_box_covers_ring() {
  let a = square("a", 0.0, 1.0);
  let bb = a.bounding_box();
  assert_eq!(bb.min_lon, 0.0);
  assert_eq!(bb.max_lon, 1.0);
  assert_eq!(bb.min_lat, 0.0);
  assert_eq!(bb.max_lat, 1.0);
  let (lon, lat) = a.reference_point();
  assert!((lon - 0.5).abs() < 1e-9);
  assert!((lat - 0.5).abs() < 1e-9);
}

#[test]
fn feature_collection_roundtrip_into_store() {
  let demo = InMemoryPlotStore::demo();
  let fc = FeatureCollection::from_plots(demo.all());
  assert_eq!(fc.features.len(), 2);

  // serializar y volver a cargar en un almacén
  let raw = serde_json::to_string(&fc).unwrap();
  let parsed: FeatureCollection = serde_json::from_str(&raw).unwrap();
  let store = InMemoryPlotStore::from_collection(&parsed).unwrap();

  assert_eq!(store.len(), 2);
  let t1 = store.get("talhao-123").unwrap();
  assert_eq!(t1.name(), "Talhão 1");
  assert_eq!(t1.culture(), "Soja");
  assert_eq!(t1.area_ha(), 85.4);
  assert_eq!(t1.sensor_ids().len(), 2);
  assert_eq!(t1.status(), PlotStatus::Active);
  // el anillo sobrevive cerrado
  assert_eq!(t1.ring().first(), t1.ring().last());
}

#[test]
fn demo_store_aggregates() {
  let store = InMemoryPlotStore::demo();
  assert!((store.total_area_ha() - 127.7).abs() < 1e-9);
  assert_eq!(store.count_by_status(PlotStatus::Active), 2);
  assert_eq!(store.count_by_status(PlotStatus::Maintenance), 0);
  assert!(store.get("talhao-999").is_none());
}

#[test]
fn culture_table_known_and_unknown() {
  let (profile, schedule) = culture_profile("Soja").unwrap();
  assert_eq!(profile.seeds_per_ha, 280_000.0);
  assert_eq!(profile.yield_per_ha, 3_500.0);
  assert_eq!(schedule.days_to_harvest, 120);
  assert_eq!(schedule.days_to_second_spraying, Some(45));

  assert!(culture_profile("Cevada").is_none());
}
