//! OpenTrackLog datalogger
//!
//! Wires the CAN ingestion loop, the GPS lap-timing task, and the
//! fixed-rate sampler around one shared telemetry snapshot.

use anyhow::{Context, Result};
use otl_core::{LapTimer, TelemetrySnapshot};
use otl_ecu::ProtocolTable;
use otl_logger::{can::CanBusSource, config, gps, ingest, records::PersonalBests, sampler, sink::CsvSink, tracks};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("starting OpenTrackLog datalogger");
    let settings = config::Settings::load(Path::new(config::DEFAULT_SETTINGS_PATH))?;
    info!(car = %settings.car, ecu = %settings.ecu, track = %settings.track, "session configured");

    let table = Arc::new(ProtocolTable::for_vehicle(settings.car, settings.ecu));
    let snapshot = Arc::new(TelemetrySnapshot::new());
    let sink = CsvSink::create(&settings.data_dir)?;
    let shutdown = CancellationToken::new();
    let session_start = Instant::now();

    if settings.lap_timing {
        let records = PersonalBests::load(&settings.data_dir);
        let finish = tracks::bounds_for(&settings.track).finish_line();
        let timer = LapTimer::new(finish, records.get(&settings.track));
        tokio::spawn(gps::run(gps::LapTimingTask {
            snapshot: Arc::clone(&snapshot),
            timer,
            records,
            track: settings.track.clone(),
            data_dir: settings.data_dir.clone(),
            gpsd_address: settings.gpsd_address.clone(),
            session_start,
            shutdown: shutdown.clone(),
        }));
    }

    let sampler = tokio::spawn(sampler::run(
        Arc::clone(&snapshot),
        Box::new(sink),
        settings.clone(),
        shutdown.clone(),
    ));

    let source = CanBusSource::open(&settings.can_channel)?;
    let ingest = tokio::task::spawn_blocking({
        let table = Arc::clone(&table);
        let snapshot = Arc::clone(&snapshot);
        let shutdown = shutdown.clone();
        let stop_frame_id = settings.stop_frame_id;
        move || ingest::run(source, &table, stop_frame_id, &snapshot, &shutdown)
    });

    // Ingestion ends on the stop frame or a bus fault; either way the token
    // is cancelled and the sampler finishes its row and flushes.
    let ingest_result = ingest.await.context("ingestion task panicked")?;
    let sampler_result = sampler.await.context("sampler task panicked")?;
    ingest_result?;
    sampler_result?;

    info!("datalogging complete");
    Ok(())
}
