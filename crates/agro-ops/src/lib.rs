//! Crate `agro-ops` — motor de progreso de operaciones y log de operaciones.
//!
//! El motor (`PlantingEngine`) simula la evolución temporal de una operación
//! de campo: progreso monótono en [0,100], métricas agronómicas derivadas y
//! puntos de falla, emitidos como stream de ticks. El log
//! (`OperationLog`/`InMemoryOperationLog`) es el registro append-only de
//! operaciones completadas, consultable por talhão, del que se proyectan
//! los cronogramas de manejo (`schedule`).

pub mod engine;
pub mod errors;
pub mod oplog;
pub mod schedule;

pub use engine::{completion_record, EngineConfig, EngineState, PlantingEngine, PlantingRun, ProgressTick,
                 RunParams};
pub use errors::{OpsError, Result};
pub use oplog::{demo_seed, InMemoryOperationLog, OperationLog};
pub use schedule::{project_schedule, ManagementSchedule};
