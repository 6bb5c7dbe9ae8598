use std::error::Error;
use std::io::{self, Write};

use agro_domain::{format_area, format_grouped, InMemoryPlotStore, OperationKind, PlotStatus};
use agro_ops::{completion_record, demo_seed, project_schedule, EngineConfig, InMemoryOperationLog,
               OperationLog, PlantingEngine, PlantingRun, RunParams};
use chrono::Utc;
use geomap::{BasemapSession, MapConfig, OverlaySync, StubSurfaceFactory};

/// Pequeño menú interactivo del panel de operaciones agrícolas, sobre el
/// almacén de talhões de demostración y el log de operaciones en memoria.
///
/// Opciones soportadas:
/// 1) Ver talhões (tabla con área, cultura y estado)
/// 2) Detalle de un talhão (sensores y cronograma de manejo)
/// 3) Iniciar plantío simulado sobre un talhão
/// 4) Historial de operaciones de un talhão
/// 5) Salir
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let store = InMemoryPlotStore::demo();
    let oplog = InMemoryOperationLog::new();
    oplog.seed_if_empty(demo_seed()).await?;

    loop {
        println!("\n== Terris — panel de operaciones ==");
        println!("1) Ver talhões");
        println!("2) Detalle de un talhão");
        println!("3) Iniciar plantío simulado");
        println!("4) Historial de operaciones");
        println!("5) Salir");
        print!("Elige una opción: ");
        io::stdout().flush().ok();

        let mut choice = String::new();
        io::stdin().read_line(&mut choice)?;
        match choice.trim() {
            "1" => {
                println!("\nID          | NOMBRE    | ÁREA      | CULTURA | ESTADO");
                println!("--------------------------------------------------------");
                for plot in store.all() {
                    println!("{:<11} | {:<9} | {:>9} | {:<7} | {}",
                             plot.id(),
                             plot.name(),
                             format_area(plot.area_ha()),
                             plot.culture(),
                             plot.status().as_str());
                }
                println!("\nTotal: {} talhões, {} ({} activos)",
                         store.len(),
                         format_area(store.total_area_ha()),
                         store.count_by_status(PlotStatus::Active));
            }
            "2" => {
                let id = prompt("Id del talhão (ej: talhao-123): ")?;
                let plot = match store.get(id.trim()) {
                    Some(p) => p,
                    None => { eprintln!("Talhão desconocido: {}", id.trim()); continue; }
                };
                println!("\n{} — {}", plot.name(), plot.culture());
                println!("Área: {}", format_area(plot.area_ha()));
                println!("Estado: {}", plot.status().as_str());
                let sensors: Vec<&str> = plot.sensor_ids().iter().map(|s| s.as_str()).collect();
                println!("Sensores: {}", if sensors.is_empty() { "-".to_string() } else { sensors.join(", ") });

                match oplog.last_of_kind(plot.id(), OperationKind::Planting).await? {
                    Some(planting) => {
                        println!("Último plantío: {}", planting.date.format("%d/%m/%Y"));
                        if let Some(schedule) = project_schedule(&planting) {
                            println!("\nCronograma de manejo proyectado:");
                            println!("  Pulverización: {} ({})",
                                     schedule.spraying_date.format("%d/%m/%Y"),
                                     schedule.spraying_notes);
                            println!("  Irrigación:    {} ({})",
                                     schedule.irrigation_date.format("%d/%m/%Y"),
                                     schedule.irrigation_notes);
                            if let Some(second) = schedule.second_spraying_date {
                                println!("  2ª pulverización: {}", second.format("%d/%m/%Y"));
                            }
                            println!("  Cosecha:       {}", schedule.harvest_date.format("%d/%m/%Y"));
                        } else {
                            println!("Cultura sin cronograma en la tabla: {}", planting.culture);
                        }
                    }
                    None => println!("Sin plantíos registrados todavía."),
                }
            }
            "3" => {
                let id = prompt("Id del talhão a plantar: ")?;
                let plot = match store.get(id.trim()) {
                    Some(p) => p.clone(),
                    None => { eprintln!("Talhão desconocido: {}", id.trim()); continue; }
                };

                // La sesión de mapa exige token configurado aunque la
                // superficie de esta demo sea la implementación en memoria.
                let config = match MapConfig::from_env() {
                    Ok(c) => c,
                    Err(e) => { eprintln!("{}", e); continue; }
                };
                let (factory, surface) = StubSurfaceFactory::new();
                let mut session = BasemapSession::new(config);
                session.open(&factory);
                surface.load_style();
                if let Err(e) = session.wait_ready().await {
                    eprintln!("{}", e);
                    continue;
                }

                let mut overlay = OverlaySync::new("talhoes");
                if let Err(e) = overlay.sync(&session, store.all()).await {
                    eprintln!("Error al sincronizar el overlay: {}", e);
                    continue;
                }
                println!("Overlay sincronizado: {} talhões en el mapa.", store.len());

                let params = RunParams::for_plot(&plot);
                let run = PlantingRun::new(params, Utc::now().timestamp() as u64);
                let mut engine = PlantingEngine::new(run, EngineConfig::default());
                let mut rx = engine.start().ok_or("el motor ya estaba en marcha")?;

                println!("Plantío iniciado en {} ({})...", plot.name(), format_area(plot.area_ha()));
                let mut failure_points = Vec::new();
                let mut next_report = 10.0;
                let mut last = None;
                while let Some(tick) = rx.recv().await {
                    failure_points.extend(tick.failure_points.iter().copied());
                    if tick.progress >= next_report {
                        println!("  {:>5.1}% — {} semillas, {:.1}% cobertura, {} falladas",
                                 tick.progress,
                                 format_grouped(tick.seeds_planted),
                                 tick.coverage_rate,
                                 format_area(tick.failed_area_ha));
                        if let Err(e) = overlay.paint_failures(&session, &failure_points) {
                            eprintln!("Error pintando puntos de falla: {}", e);
                        }
                        next_report += 10.0;
                    }
                    last = Some(tick);
                }

                let last = match last {
                    Some(t) => t,
                    None => { eprintln!("El motor terminó sin emitir ticks"); continue; }
                };
                let record = completion_record(&plot, &last);
                println!("\nPlantío completado: {} semillas, rinde estimado {} kg.",
                         format_grouped(last.seeds_planted),
                         format_grouped(last.estimated_yield_kg));
                match oplog.append(record).await {
                    Ok(()) => println!("Operación registrada en el historial."),
                    Err(e) => eprintln!("Error registrando la operación: {}", e),
                }
                session.close();
            }
            "4" => {
                let id = prompt("Id del talhão: ")?;
                let records = oplog.query_by_field(id.trim()).await?;
                if records.is_empty() {
                    println!("Sin operaciones registradas para {}.", id.trim());
                    continue;
                }
                println!("\nFECHA      | OPERACIÓN    | DETALLE");
                println!("--------------------------------------------------");
                for record in records {
                    let detail = record.details.notes.clone()
                                       .or_else(|| record.details.product.clone())
                                       .unwrap_or_else(|| "-".into());
                    println!("{} | {:<12} | {}",
                             record.date.format("%d/%m/%Y"),
                             record.kind.as_str(),
                             detail);
                }
            }
            "5" => {
                println!("Saliendo...");
                break;
            }
            other => {
                println!("Opción inválida: {}", other);
            }
        }
    }

    Ok(())
}

fn prompt(msg: &str) -> io::Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s)
}
