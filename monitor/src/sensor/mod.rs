pub(crate) mod history;

use chrono::{DateTime, Local};
use plant_monitor_protocol::{ConditionStatus, SensorKind};
use serde::Serialize;

/// A classified ADC sample. Only constructible through [`Reading::classify`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Reading {
    value: u16,
    timestamp: DateTime<Local>,
    condition: ConditionStatus,
}

impl Reading {
    pub(crate) fn classify(kind: SensorKind, value: u16, timestamp: DateTime<Local>) -> Self {
        Self {
            value,
            timestamp,
            condition: plant_monitor_protocol::classify(kind, value),
        }
    }

    pub(crate) fn value(&self) -> u16 {
        self.value
    }

    pub(crate) fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub(crate) fn condition(&self) -> ConditionStatus {
        self.condition
    }

    /// Wall-clock time as shown on cards and chart axes.
    pub(crate) fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}
