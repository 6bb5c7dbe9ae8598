// Archivo: engine.rs
// Propósito: motor de progreso de la operación simulada. `PlantingRun` es
// el paso puro por tick (determinista con la semilla inyectada);
// `PlantingEngine` lo envuelve en el lazo temporal con pausa/reanudación y
// emisión por canal.
use agro_domain::{culture_profile, FieldPlot, LonLat, OperationDetails, OperationKind, OperationRecord};
use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, MissedTickBehavior};
use uuid::Uuid;

/// Período de tick de referencia: con el paso por defecto, una corrida
/// completa toma alrededor de un minuto.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(100);
/// Incremento de progreso por tick, en puntos porcentuales.
pub const PROGRESS_STEP: f64 = 0.167;
/// Puntos de falla generados por hectárea fallada incremental.
const FAILURE_POINTS_PER_HA: f64 = 2.0;
/// Amplitud del jitter de los puntos de falla, en grados.
const FAILURE_JITTER_DEG: f64 = 0.01;

// Valores de Soja, usados también como fallback para culturas fuera de la
// tabla (comportamiento de referencia del simulador).
const FALLBACK_SEEDS_PER_HA: f64 = 280_000.0;
const FALLBACK_YIELD_PER_HA: f64 = 3_500.0;

/// Métricas de un tick. `progress` es no-decreciente dentro de una corrida;
/// todas las derivadas se calculan sólo del progreso actual y del área
/// estática del talhão (únicamente `failed_area_ha` acumula entre ticks).
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressTick {
  pub progress: f64,
  pub seeds_planted: u64,
  pub coverage_rate: f64,
  pub failed_area_ha: f64,
  pub estimated_yield_kg: u64,
  /// Puntos de falla `(lat, lon)` alrededor del punto de referencia.
  pub failure_points: Vec<(f64, f64)>,
}

/// Parámetros estáticos de una corrida.
#[derive(Debug, Clone, Copy)]
pub struct RunParams {
  pub area_ha: f64,
  pub seeds_per_ha: f64,
  pub yield_per_ha: f64,
  /// Ancla `(lon, lat)` para el jitter de los puntos de falla.
  pub reference_point: LonLat,
}

impl RunParams {
  /// Deriva los parámetros del talhão y de la tabla de cultivos; culturas
  /// desconocidas caen a las constantes de Soja.
  pub fn for_plot(plot: &FieldPlot) -> Self {
    let (seeds_per_ha, yield_per_ha) = match culture_profile(plot.culture()) {
      Some((profile, _)) => (profile.seeds_per_ha, profile.yield_per_ha),
      None => (FALLBACK_SEEDS_PER_HA, FALLBACK_YIELD_PER_HA),
    };
    Self { area_ha: plot.area_ha(),
           seeds_per_ha,
           yield_per_ha,
           reference_point: plot.reference_point() }
  }
}

/// Paso puro de la simulación, un tick por llamada.
///
/// Determinista para una semilla dada: la aleatoriedad (tasa de falla,
/// jitter) sale de un `ChaCha8Rng` inyectado, de modo que las pruebas
/// pueden afirmar valores exactos.
pub struct PlantingRun {
  params: RunParams,
  rng: ChaCha8Rng,
  progress: f64,
  failed_area_ha: f64,
  /// Presupuesto fraccionario de puntos de falla pendientes de emitir.
  point_budget: f64,
  done: bool,
}

impl PlantingRun {
  pub fn new(params: RunParams, seed: u64) -> Self {
    Self { params,
           rng: ChaCha8Rng::seed_from_u64(seed),
           progress: 0.0,
           failed_area_ha: 0.0,
           point_budget: 0.0,
           done: false }
  }

  pub fn progress(&self) -> f64 {
    self.progress
  }

  pub fn is_complete(&self) -> bool {
    self.done
  }

  /// Avanza un tick. Devuelve `None` cuando la corrida ya llegó a 100:
  /// jamás se emite un tick después de completar.
  pub fn step(&mut self) -> Option<ProgressTick> {
    if self.done {
      return None;
    }
    let area = self.params.area_ha;
    let prev = self.progress;
    self.progress = (prev + PROGRESS_STEP).min(100.0);
    let incremental_pct = self.progress - prev;

    // Tasa de falla muestreada uniforme en [5%, 10%) por tick.
    let failure_rate = 0.05 + self.rng.gen::<f64>() * 0.05;
    let coverage_rate = 100.0 - failure_rate * 100.0;
    let incremental_failed = incremental_pct / 100.0 * area * failure_rate;
    self.failed_area_ha += incremental_failed;

    let seeds_planted = (self.progress / 100.0 * area * self.params.seeds_per_ha).floor() as u64;
    let estimated_yield_kg =
      (self.progress / 100.0 * area * (coverage_rate / 100.0) * self.params.yield_per_ha).floor() as u64;

    // Puntos de falla proporcionales al área fallada incremental del tick.
    self.point_budget += incremental_failed * FAILURE_POINTS_PER_HA;
    let emit = self.point_budget.floor() as usize;
    self.point_budget -= emit as f64;
    let (ref_lon, ref_lat) = self.params.reference_point;
    let mut failure_points = Vec::with_capacity(emit);
    for _ in 0..emit {
      let lat = ref_lat + (self.rng.gen::<f64>() - 0.5) * FAILURE_JITTER_DEG;
      let lon = ref_lon + (self.rng.gen::<f64>() - 0.5) * FAILURE_JITTER_DEG;
      failure_points.push((lat, lon));
    }

    if self.progress >= 100.0 {
      self.done = true;
    }
    Some(ProgressTick { progress: self.progress,
                        seeds_planted,
                        coverage_rate,
                        failed_area_ha: self.failed_area_ha,
                        estimated_yield_kg,
                        failure_points })
  }
}

/// Construye el registro final que el caller anexa al log al completar.
pub fn completion_record(plot: &FieldPlot, final_tick: &ProgressTick) -> OperationRecord {
  OperationRecord { id: format!("op-{}", Uuid::new_v4()),
                    field_id: plot.id().to_string(),
                    field_name: plot.name().to_string(),
                    kind: OperationKind::Planting,
                    date: Utc::now(),
                    culture: plot.culture().to_string(),
                    area_ha: plot.area_ha(),
                    details: OperationDetails { seeds_planted: Some(final_tick.seeds_planted),
                                                yield_kg: Some(final_tick.estimated_yield_kg),
                                                notes: Some("Plantio autônomo realizado com sucesso".to_string()),
                                                ..Default::default() } }
}

/// Estados del motor. `Completed` es terminal: una corrida nueva exige un
/// motor nuevo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
  Stopped,
  Running,
  Paused,
  Completed,
}

#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
  pub tick_period: Duration,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self { tick_period: DEFAULT_TICK_PERIOD }
  }
}

/// Lazo temporal del motor: un tick en vuelo a la vez (el timer no se
/// rearma hasta que el manejador del tick anterior retorna) y pausa que
/// descarta por completo los ticks ya agendados.
pub struct PlantingEngine {
  state: Arc<Mutex<EngineState>>,
  run: Option<PlantingRun>,
  config: EngineConfig,
}

impl PlantingEngine {
  pub fn new(run: PlantingRun, config: EngineConfig) -> Self {
    Self { state: Arc::new(Mutex::new(EngineState::Stopped)), run: Some(run), config }
  }

  pub fn state(&self) -> EngineState {
    *self.state.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Arranca el lazo de ticks. Sólo válido desde `Stopped`; cualquier otro
  /// estado devuelve `None` (reentrar tras `Completed` exige una corrida
  /// fresca). El stream se cierra al completar o al descartar el receptor.
  pub fn start(&mut self) -> Option<mpsc::Receiver<ProgressTick>> {
    {
      let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
      if *state != EngineState::Stopped {
        return None;
      }
    }
    let mut run = self.run.take()?;
    set_state(&self.state, EngineState::Running);

    let (tx, rx) = mpsc::channel(16);
    let state = self.state.clone();
    let period = self.config.tick_period;
    tokio::spawn(async move {
      let mut ticker = interval(period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      // el primer disparo del interval es inmediato; se consume para que
      // el primer incremento llegue un período después del start
      ticker.tick().await;
      loop {
        ticker.tick().await;
        match current_state(&state) {
          // tick suprimido por completo: sin emisión, sin cambio de estado
          EngineState::Paused => continue,
          EngineState::Running => {}
          _ => break,
        }
        let Some(tick) = run.step() else {
          set_state(&state, EngineState::Completed);
          break;
        };
        let finished = tick.progress >= 100.0;
        if tx.send(tick).await.is_err() {
          // receptor descartado: nadie consume, el lazo muere
          set_state(&state, EngineState::Stopped);
          break;
        }
        if finished {
          log::info!("corrida completada: progreso 100%");
          set_state(&state, EngineState::Completed);
          break;
        }
      }
    });
    Some(rx)
  }

  /// `Running -> Paused`; en cualquier otro estado es no-op. Un tick que
  /// dispara justo en el borde de la pausa se descarta, no se aplica.
  pub fn pause(&self) {
    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    if *state == EngineState::Running {
      *state = EngineState::Paused;
    }
  }

  /// `Paused -> Running` sin reiniciar `progress` ni acumuladores.
  pub fn resume(&self) {
    let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
    if *state == EngineState::Paused {
      *state = EngineState::Running;
    }
  }
}

fn current_state(state: &Arc<Mutex<EngineState>>) -> EngineState {
  *state.lock().unwrap_or_else(|e| e.into_inner())
}

fn set_state(state: &Arc<Mutex<EngineState>>, next: EngineState) {
  *state.lock().unwrap_or_else(|e| e.into_inner()) = next;
}
