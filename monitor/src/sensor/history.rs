use super::Reading;
use chrono::Duration;
use plant_monitor_protocol::{ConditionStatus, SensorKind};
use rand::Rng;
use serde::Serialize;
use std::collections::VecDeque;

pub(crate) const HISTORY_CAPACITY: usize = 20;

/// Spacing in seconds of the synthetic points produced by [`HistorySeries::seeded`].
const SEED_SPACING_SECS: i64 = 6;

/// Maximum jitter of a seeded point, scaled by its distance from the present.
const SEED_JITTER: f64 = 300.0;

/// A single point of a trend chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ChartPoint {
    pub time: String,
    pub value: u16,
    pub condition: ConditionStatus,
}

/// Fixed capacity FIFO of classified readings, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HistorySeries {
    kind: SensorKind,
    readings: VecDeque<Reading>,
}

impl HistorySeries {
    pub(crate) fn new(kind: SensorKind) -> Self {
        Self {
            kind,
            readings: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Bootstraps a full series ending in `current`.
    ///
    /// The 19 earlier points are spaced six seconds apart and jittered
    /// around `current`, with the jitter shrinking towards the present.
    pub(crate) fn seeded<R: Rng + ?Sized>(kind: SensorKind, current: &Reading, rng: &mut R) -> Self {
        let mut series = Self::new(kind);
        let (min, max) = seed_range(kind);

        for i in (1..HISTORY_CAPACITY).rev() {
            let variation = (rng.gen::<f64>() - 0.5) * SEED_JITTER;
            let value = (current.value() as f64 + variation * (i as f64 / 10.0))
                .clamp(min, max)
                .round() as u16;
            let at = current.timestamp() - Duration::seconds(SEED_SPACING_SECS * i as i64);

            series.push(Reading::classify(kind, value, at));
        }

        series.push(current.clone());
        series
    }

    pub(crate) fn kind(&self) -> SensorKind {
        self.kind
    }

    pub(crate) fn push(&mut self, reading: Reading) {
        if self.readings.len() == HISTORY_CAPACITY {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
    }

    pub(crate) fn len(&self) -> usize {
        self.readings.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub(crate) fn latest(&self) -> Option<&Reading> {
        self.readings.back()
    }

    pub(crate) fn chart_points(&self) -> Vec<ChartPoint> {
        self.readings
            .iter()
            .map(|r| ChartPoint {
                time: r.time_label(),
                value: r.value(),
                condition: r.condition(),
            })
            .collect()
    }
}

/// Range the simulated source produces for a kind; seeded points stay inside it.
fn seed_range(kind: SensorKind) -> (f64, f64) {
    match kind {
        SensorKind::Soil => (500.0, 3500.0),
        SensorKind::Light => (500.0, 4000.0),
    }
}
