//! OpenTrackLog Core Library
//!
//! This crate provides the data model shared by the decoder, the lap-timing
//! engine, and the sampler: named channels with tagged values, the
//! concurrently-updated telemetry snapshot, and the finish-line crossing
//! detector that derives lap statistics from position fixes.

pub mod lap;
pub mod model;
pub mod snapshot;

pub use lap::{CompletedLap, FinishLine, FixOutcome, LapTimer};
pub use model::{Channel, ChannelUpdate, ChannelValue, LapSnapshot, PositionFix, RawFrame};
pub use snapshot::{SnapshotReading, TelemetrySnapshot};
