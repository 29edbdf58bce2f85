//! SocketCAN frame source
//!
//! Thin blocking adapter from a Linux SocketCAN interface to the ingestion
//! loop's [`FrameSource`]. The bus is the primary data source: a receive
//! failure propagates and terminates the process.

use anyhow::{Context, Result};
use otl_core::RawFrame;
use socketcan::{CanDataFrame, CanFrame, CanSocket, EmbeddedFrame, Id, Socket};
use tracing::info;

use crate::ingest::FrameSource;

/// Blocking receiver on one CAN interface.
pub struct CanBusSource {
    socket: CanSocket,
}

impl CanBusSource {
    pub fn open(channel: &str) -> Result<Self> {
        let socket = CanSocket::open(channel)
            .with_context(|| format!("cannot open CAN channel {channel}"))?;
        info!(channel, "CAN bus connected");
        Ok(Self { socket })
    }
}

impl FrameSource for CanBusSource {
    fn recv(&mut self) -> Result<Option<RawFrame>> {
        loop {
            match self.socket.read_frame() {
                Ok(CanFrame::Data(frame)) => {
                    return Ok(Some(RawFrame::new(frame_id(&frame), frame.data())));
                }
                // Remote and error frames carry no channel payload.
                Ok(_) => continue,
                Err(err) => return Err(err).context("CAN bus receive failed"),
            }
        }
    }
}

fn frame_id(frame: &CanDataFrame) -> u32 {
    match frame.id() {
        Id::Standard(id) => u32::from(id.as_raw()),
        Id::Extended(id) => id.as_raw(),
    }
}
