// Archivo: schedule.rs
// Propósito: proyección del cronograma de manejo a partir del último
// plantio registrado y de la tabla de cultivos.
use agro_domain::{culture_profile, OperationRecord};
use chrono::{DateTime, Duration, Utc};

/// Fechas proyectadas de manejo para un talhão.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagementSchedule {
  pub planting_date: DateTime<Utc>,
  pub spraying_date: DateTime<Utc>,
  pub irrigation_date: DateTime<Utc>,
  pub second_spraying_date: Option<DateTime<Utc>>,
  pub harvest_date: DateTime<Utc>,
  pub spraying_notes: &'static str,
  pub irrigation_notes: &'static str,
}

/// Proyecta el cronograma desde un registro de plantio. `None` si la
/// cultura del registro no está en la tabla.
pub fn project_schedule(last_planting: &OperationRecord) -> Option<ManagementSchedule> {
  let (_, schedule) = culture_profile(&last_planting.culture)?;
  let base = last_planting.date;
  Some(ManagementSchedule { planting_date: base,
                            spraying_date: base + Duration::days(schedule.days_to_first_spraying),
                            irrigation_date: base + Duration::days(schedule.days_to_irrigation),
                            second_spraying_date: schedule.days_to_second_spraying
                                                          .map(|d| base + Duration::days(d)),
                            harvest_date: base + Duration::days(schedule.days_to_harvest),
                            spraying_notes: schedule.spraying_notes,
                            irrigation_notes: schedule.irrigation_notes })
}
