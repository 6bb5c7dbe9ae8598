use agro_domain::{OperationDetails, OperationKind, OperationRecord};
use agro_ops::project_schedule;
use chrono::{Duration, TimeZone, Utc};

fn planting(culture: &str) -> OperationRecord {
  OperationRecord { id: "op-plantio".to_string(),
                    field_id: "t-1".to_string(),
                    field_name: "Talhão 1".to_string(),
                    kind: OperationKind::Planting,
                    date: Utc.with_ymd_and_hms(2024, 10, 15, 8, 0, 0).unwrap(),
                    culture: culture.to_string(),
                    area_ha: 85.4,
                    details: OperationDetails::default() }
}

#[test]
fn soja_schedule_offsets_from_planting() {
  let record = planting("Soja");
  let schedule = project_schedule(&record).unwrap();
  assert_eq!(schedule.planting_date, record.date);
  assert_eq!(schedule.spraying_date, record.date + Duration::days(10));
  assert_eq!(schedule.irrigation_date, record.date + Duration::days(25));
  assert_eq!(schedule.second_spraying_date, Some(record.date + Duration::days(45)));
  assert_eq!(schedule.harvest_date, record.date + Duration::days(120));
  assert_eq!(schedule.spraying_notes, "Herbicida pós-emergência");
}

#[test]
fn milho_and_trigo_use_their_own_offsets() {
  let milho = project_schedule(&planting("Milho")).unwrap();
  assert_eq!(milho.harvest_date, milho.planting_date + Duration::days(140));
  assert_eq!(milho.second_spraying_date, Some(milho.planting_date + Duration::days(60)));

  let trigo = project_schedule(&planting("Trigo")).unwrap();
  assert_eq!(trigo.spraying_date, trigo.planting_date + Duration::days(20));
  assert_eq!(trigo.irrigation_date, trigo.planting_date + Duration::days(40));
}

#[test]
fn unknown_culture_has_no_schedule() {
  assert!(project_schedule(&planting("Café")).is_none());
}
