//! Fixed-rate sampler
//!
//! Reads the shared snapshot on its own clock and emits one formatted row
//! per tick. Elapsed time is always computed from the sampler-start instant,
//! never by accumulating tick counts, so long sessions cannot drift.

use anyhow::Result;
use otl_core::TelemetrySnapshot;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Settings;
use crate::rows;
use crate::sink::RowSink;

/// Emit header rows, then one data row per tick until shutdown.
///
/// The in-flight row always completes before the loop observes shutdown, and
/// no further ticks are serviced afterwards. A sink write or flush failure
/// propagates and is fatal.
pub async fn run(
    snapshot: Arc<TelemetrySnapshot>,
    mut sink: Box<dyn RowSink>,
    settings: Settings,
    shutdown: CancellationToken,
) -> Result<()> {
    sink.write_row(&rows::metadata_row(&settings))?;
    sink.write_row(&rows::column_names(settings.lap_timing))?;
    sink.write_row(&rows::unit_tags(settings.lap_timing))?;

    let start = Instant::now();
    let mut interval = tokio::time::interval(settings.sample_period());
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {
                let elapsed_ms = start.elapsed().as_millis() as u64;
                let reading = snapshot.read_all();
                let row = rows::data_row(&reading, elapsed_ms, settings.ecu, settings.lap_timing);
                if let Err(err) = sink.write_row(&row) {
                    // Fatal; push whatever is still buffered before dying.
                    let _ = sink.flush();
                    return Err(err);
                }
            }
        }
    }

    sink.flush()?;
    info!("sampler stopped, datalog flushed");
    Ok(())
}
