//! Shared telemetry snapshot
//!
//! One mutable record of the latest decoded value per channel plus the last
//! position fix and the lap state. Two producers write it concurrently (the
//! frame decoder and the lap-timing engine); the sampler reads it once per
//! tick.
//!
//! Consistency contract: all channel updates decoded from a single frame are
//! applied under one lock acquisition, and the position fix plus its lap
//! state form one atomic group, so a reader never observes a partially
//! applied group.

use parking_lot::RwLock;

use crate::model::{Channel, ChannelUpdate, ChannelValue, LapSnapshot, PositionFix, CHANNEL_COUNT};

#[derive(Clone)]
struct Inner {
    values: [ChannelValue; CHANNEL_COUNT],
    position: Option<PositionFix>,
    lap: LapSnapshot,
}

/// The single point of coordination between producers and the sampler.
///
/// Owned once and shared by reference (`Arc`) with every task; interior
/// locking only, no globals. Critical sections are plain memory copies and
/// never block on I/O.
pub struct TelemetrySnapshot {
    inner: RwLock<Inner>,
}

impl TelemetrySnapshot {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                values: [ChannelValue::default(); CHANNEL_COUNT],
                position: None,
                lap: LapSnapshot::default(),
            }),
        }
    }

    /// Overwrite one channel value (last-write-wins, no history).
    pub fn update_channel(&self, channel: Channel, value: ChannelValue) {
        self.inner.write().values[channel.index()] = value;
    }

    /// Apply every channel update decoded from one frame as a single group.
    pub fn apply_updates(&self, updates: &[ChannelUpdate]) {
        if updates.is_empty() {
            return;
        }
        let mut inner = self.inner.write();
        for update in updates {
            inner.values[update.channel.index()] = update.value;
        }
    }

    /// Publish a position fix together with its lap state as one atomic group.
    pub fn apply_fix(&self, fix: PositionFix, lap: LapSnapshot) {
        let mut inner = self.inner.write();
        inner.position = Some(fix);
        inner.lap = lap;
    }

    /// Take an owned, internally consistent copy of every field.
    pub fn read_all(&self) -> SnapshotReading {
        let inner = self.inner.read().clone();
        SnapshotReading {
            values: inner.values,
            position: inner.position,
            lap: inner.lap,
        }
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// An immutable copy of the snapshot at a single instant.
#[derive(Debug, Clone)]
pub struct SnapshotReading {
    values: [ChannelValue; CHANNEL_COUNT],
    pub position: Option<PositionFix>,
    pub lap: LapSnapshot,
}

impl SnapshotReading {
    pub fn value(&self, channel: Channel) -> ChannelValue {
        self.values[channel.index()]
    }

    /// Latitude of the last fix, 0 before the first one.
    pub fn latitude(&self) -> f64 {
        self.position.map(|fix| fix.latitude).unwrap_or(0.0)
    }

    /// Longitude of the last fix, 0 before the first one.
    pub fn longitude(&self) -> f64 {
        self.position.map(|fix| fix.longitude).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn fix(latitude: f64, longitude: f64) -> PositionFix {
        PositionFix {
            latitude,
            longitude,
            time: Utc::now(),
        }
    }

    #[test]
    fn test_update_and_read_single_channel() {
        let snapshot = TelemetrySnapshot::new();
        snapshot.update_channel(Channel::Rpm, ChannelValue::Unsigned(3000));

        let reading = snapshot.read_all();
        assert_eq!(reading.value(Channel::Rpm), ChannelValue::Unsigned(3000));
        assert_eq!(reading.value(Channel::Speed), ChannelValue::Unsigned(0));
        assert!(reading.position.is_none());
    }

    #[test]
    fn test_apply_updates_overwrites_as_group() {
        let snapshot = TelemetrySnapshot::new();
        snapshot.apply_updates(&[
            ChannelUpdate {
                channel: Channel::Rpm,
                value: ChannelValue::Unsigned(3000),
            },
            ChannelUpdate {
                channel: Channel::Voltage,
                value: ChannelValue::Float(10.0),
            },
        ]);
        snapshot.apply_updates(&[ChannelUpdate {
            channel: Channel::Rpm,
            value: ChannelValue::Unsigned(4500),
        }]);

        let reading = snapshot.read_all();
        assert_eq!(reading.value(Channel::Rpm), ChannelValue::Unsigned(4500));
        assert_eq!(reading.value(Channel::Voltage), ChannelValue::Float(10.0));
    }

    #[test]
    fn test_apply_fix_publishes_lap_group() {
        let snapshot = TelemetrySnapshot::new();
        let lap = LapSnapshot {
            session_time_ms: 61_200,
            lap_index: 2,
            lap_start_ms: 60_000,
            best_lap_ms: 58_000,
            personal_best_ms: 57_400,
            previous_lap_ms: 58_000,
        };
        snapshot.apply_fix(fix(-33.0, 151.005), lap);

        let reading = snapshot.read_all();
        assert!((reading.latitude() - -33.0).abs() < f64::EPSILON);
        assert!((reading.longitude() - 151.005).abs() < f64::EPSILON);
        assert_eq!(reading.lap, lap);
    }

    /// A reader must never see a torn lap group: the writer always publishes
    /// linked fields (session time == lap start, latitude == longitude).
    #[test]
    fn test_concurrent_readers_never_observe_torn_lap_group() {
        let snapshot = Arc::new(TelemetrySnapshot::new());
        let writer = {
            let snapshot = Arc::clone(&snapshot);
            std::thread::spawn(move || {
                for i in 1..5_000u32 {
                    let lap = LapSnapshot {
                        session_time_ms: i,
                        lap_start_ms: i,
                        lap_index: (i % 100) as u16,
                        ..LapSnapshot::default()
                    };
                    snapshot.apply_fix(fix(f64::from(i), f64::from(i)), lap);
                }
            })
        };
        let reader = {
            let snapshot = Arc::clone(&snapshot);
            std::thread::spawn(move || {
                for _ in 0..5_000 {
                    let reading = snapshot.read_all();
                    assert_eq!(
                        reading.lap.session_time_ms, reading.lap.lap_start_ms,
                        "lap group observed partially applied"
                    );
                    assert!(
                        (reading.latitude() - reading.longitude()).abs() < f64::EPSILON,
                        "position observed partially applied"
                    );
                }
            })
        };
        writer.join().unwrap();
        reader.join().unwrap();
    }
}
