//! gpsd client driving the lap-timing engine
//!
//! Connects to gpsd over TCP, enables its JSON watch stream, and feeds every
//! TPV position report to the [`LapTimer`]. Each fix and its resulting lap
//! state are published to the snapshot as one atomic group. Connection loss
//! is recoverable: the client retries with a fixed backoff and never takes
//! the process down.

use chrono::Utc;
use otl_core::{LapTimer, PositionFix, TelemetrySnapshot};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::records::PersonalBests;

const RECONNECT_DELAY: Duration = Duration::from_secs(10);
const WATCH_COMMAND: &[u8] = b"?WATCH={\"enable\":true,\"json\":true};\n";

/// Everything the lap-timing task needs.
pub struct LapTimingTask {
    pub snapshot: Arc<TelemetrySnapshot>,
    pub timer: LapTimer,
    pub records: PersonalBests,
    pub track: String,
    pub data_dir: PathBuf,
    pub gpsd_address: String,
    pub session_start: Instant,
    pub shutdown: CancellationToken,
}

/// One gpsd report line; everything but TPV position reports is ignored.
#[derive(Debug, Deserialize)]
struct GpsdReport {
    class: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Parse a gpsd stream line into a position, if it carries one.
fn parse_tpv(line: &str) -> Option<(f64, f64)> {
    let report: GpsdReport = serde_json::from_str(line).ok()?;
    if report.class != "TPV" {
        return None;
    }
    Some((report.lat?, report.lon?))
}

pub async fn run(mut task: LapTimingTask) {
    let shutdown = task.shutdown.clone();
    loop {
        let address = task.gpsd_address.clone();
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return,
            connected = TcpStream::connect(address) => match connected {
                Ok(stream) => {
                    if let Err(err) = watch(stream, &mut task).await {
                        warn!(%err, "GPS stream lost");
                    }
                    if shutdown.is_cancelled() {
                        return;
                    }
                }
                Err(err) => {
                    warn!(%err, address = %task.gpsd_address, "cannot reach gpsd, retrying");
                }
            }
        }

        tokio::select! {
            _ = shutdown.cancelled() => return,
            _ = tokio::time::sleep(RECONNECT_DELAY) => {}
        }
    }
}

async fn watch(stream: TcpStream, task: &mut LapTimingTask) -> std::io::Result<()> {
    let shutdown = task.shutdown.clone();
    let (read_half, mut write_half) = stream.into_split();
    write_half.write_all(WATCH_COMMAND).await?;
    info!(address = %task.gpsd_address, "connected to gpsd");

    let mut lines = BufReader::new(read_half).lines();
    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Ok(()),
            line = lines.next_line() => {
                match line? {
                    Some(line) => handle_line(&line, task),
                    // EOF: gpsd went away, reconnect.
                    None => return Ok(()),
                }
            }
        }
    }
}

fn handle_line(line: &str, task: &mut LapTimingTask) {
    let Some((latitude, longitude)) = parse_tpv(line) else {
        return;
    };
    let fix = PositionFix {
        latitude,
        longitude,
        time: Utc::now(),
    };

    let session_time_ms = task.session_start.elapsed().as_millis() as u32;
    let outcome = task.timer.on_fix(fix.latitude, fix.longitude, session_time_ms);
    task.snapshot.apply_fix(fix, outcome.lap);

    if let Some(lap) = outcome.completed {
        info!(
            lap = lap.index,
            duration_ms = lap.duration_ms,
            best = lap.is_best,
            "lap completed"
        );
        if lap.is_personal_best {
            task.records.set(&task.track, lap.duration_ms);
            if let Err(err) = task.records.store(&task.data_dir) {
                warn!(%err, "could not store the new personal best");
            } else {
                debug!(duration_ms = lap.duration_ms, "personal best stored");
            }
        }
    }
}
