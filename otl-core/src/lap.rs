//! Lap timing: finish-line crossing detection and lap bookkeeping
//!
//! The finish line is a fixed geographic segment derived from a track's
//! bounding corners. Each incoming position fix is paired with the previous
//! one to form a movement segment, and a standard parametric two-segment
//! intersection test decides whether the finish line was crossed.
//!
//! The engine is a pure state machine: the caller supplies the session clock
//! reading with every fix, so updates happen only when a fix actually
//! arrives.

use crate::model::LapSnapshot;

/// Intersection denominators below this are treated as parallel/degenerate.
const PARALLEL_EPSILON: f64 = 1e-10;

/// A fixed segment across the track, in (latitude, longitude) degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinishLine {
    p1: (f64, f64),
    p2: (f64, f64),
}

impl FinishLine {
    pub fn new(p1: (f64, f64), p2: (f64, f64)) -> Self {
        Self { p1, p2 }
    }

    /// Finish line spanning a track's bounding corners.
    ///
    /// A zero-area bound (min == max) yields a zero-length line that never
    /// reports a crossing.
    pub fn from_bounds(lat_min: f64, lon_min: f64, lat_max: f64, lon_max: f64) -> Self {
        Self::new((lat_min, lon_min), (lat_max, lon_max))
    }

    /// Whether the movement segment `prev -> curr` intersects the line.
    ///
    /// Parametric two-segment test: with the finish line as (x1,y1)-(x2,y2)
    /// and the movement as (x3,y3)-(x4,y4), a crossing occurred iff both
    /// parameters t and u land in [0, 1].
    pub fn crossed_by(&self, prev: (f64, f64), curr: (f64, f64)) -> bool {
        let (x1, y1) = self.p1;
        let (x2, y2) = self.p2;
        let (x3, y3) = prev;
        let (x4, y4) = curr;

        let denominator = (x3 - x4) * (y1 - y2) - (y3 - y4) * (x1 - x2);
        if denominator.abs() < PARALLEL_EPSILON {
            return false;
        }

        let t = ((x3 - x1) * (y1 - y2) - (y3 - y1) * (x1 - x2)) / denominator;
        let u = ((x3 - x1) * (y3 - y4) - (y3 - y1) * (x3 - x4)) / denominator;

        (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
    }
}

/// A lap completed by a finish-line crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedLap {
    /// Index of the lap that just finished.
    pub index: u16,
    pub duration_ms: u32,
    /// Fastest lap of this session so far.
    pub is_best: bool,
    /// Fastest lap ever recorded on this track.
    pub is_personal_best: bool,
}

/// Result of feeding one position fix to the timer.
#[derive(Debug, Clone, Copy)]
pub struct FixOutcome {
    /// Lap state after the fix, to publish as one atomic group.
    pub lap: LapSnapshot,
    pub completed: Option<CompletedLap>,
}

/// Consumes position fixes and maintains the lap statistics.
///
/// Lap indices start at 0; the first crossing completes lap 0. Best and
/// personal-best times use 0 as the "unset" sentinel and are never set from
/// a zero-duration lap.
pub struct LapTimer {
    finish: FinishLine,
    lap: LapSnapshot,
    prev_fix: Option<(f64, f64)>,
}

impl LapTimer {
    /// `personal_best_ms` seeds the cross-session record (0 = none).
    pub fn new(finish: FinishLine, personal_best_ms: u32) -> Self {
        Self {
            finish,
            lap: LapSnapshot {
                personal_best_ms,
                ..LapSnapshot::default()
            },
            prev_fix: None,
        }
    }

    pub fn lap(&self) -> LapSnapshot {
        self.lap
    }

    /// Advance the session clock and run the crossing test for one fix.
    ///
    /// `session_time_ms` comes from the caller's monotonic session-start
    /// reference, not from fix cadence.
    pub fn on_fix(&mut self, latitude: f64, longitude: f64, session_time_ms: u32) -> FixOutcome {
        self.lap.session_time_ms = session_time_ms;

        let mut completed = None;
        if let Some(prev) = self.prev_fix {
            if self.finish.crossed_by(prev, (latitude, longitude)) {
                let duration_ms = session_time_ms.saturating_sub(self.lap.lap_start_ms);

                let is_best =
                    duration_ms > 0 && (self.lap.best_lap_ms == 0 || duration_ms < self.lap.best_lap_ms);
                if is_best {
                    self.lap.best_lap_ms = duration_ms;
                }
                let is_personal_best = duration_ms > 0
                    && (self.lap.personal_best_ms == 0 || duration_ms < self.lap.personal_best_ms);
                if is_personal_best {
                    self.lap.personal_best_ms = duration_ms;
                }

                self.lap.previous_lap_ms = duration_ms;
                let index = self.lap.lap_index;
                self.lap.lap_index = self.lap.lap_index.wrapping_add(1);
                self.lap.lap_start_ms = session_time_ms;

                completed = Some(CompletedLap {
                    index,
                    duration_ms,
                    is_best,
                    is_personal_best,
                });
            }
        }

        self.prev_fix = Some((latitude, longitude));
        FixOutcome {
            lap: self.lap,
            completed,
        }
    }
}
