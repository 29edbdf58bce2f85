//! CAN ingestion loop
//!
//! Sequentially consumes frames from a blocking [`FrameSource`], decodes
//! them through the protocol table, and applies each frame's updates to the
//! shared snapshot as one group. The configured stop frame id is checked
//! before channel dispatch and ends ingestion cleanly; a transport fault
//! ends it fatally. Either way shutdown is requested so the sampler can
//! finish its row and flush.

use anyhow::Result;
use otl_core::{RawFrame, TelemetrySnapshot};
use otl_ecu::{decode_frame, ProtocolTable};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Blocking source of raw bus frames.
///
/// `recv` may block indefinitely waiting for traffic; it is not cancellable
/// mid-receive. `Ok(None)` means the transport closed; an error is a
/// transport fault and fatal.
pub trait FrameSource {
    fn recv(&mut self) -> Result<Option<RawFrame>>;
}

/// Run ingestion to completion, then request shutdown.
pub fn run(
    source: impl FrameSource,
    table: &ProtocolTable,
    stop_frame_id: u32,
    snapshot: &TelemetrySnapshot,
    shutdown: &CancellationToken,
) -> Result<()> {
    let result = ingest_loop(source, table, stop_frame_id, snapshot);
    shutdown.cancel();
    result
}

fn ingest_loop(
    mut source: impl FrameSource,
    table: &ProtocolTable,
    stop_frame_id: u32,
    snapshot: &TelemetrySnapshot,
) -> Result<()> {
    while let Some(frame) = source.recv()? {
        if frame.id == stop_frame_id {
            info!(frame_id = frame.id, "stop frame received, ending ingestion");
            return Ok(());
        }
        snapshot.apply_updates(&decode_frame(table, frame.id, frame.data()));
    }
    info!("bus closed, ending ingestion");
    Ok(())
}
