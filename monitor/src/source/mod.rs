pub(crate) mod device;
pub(crate) mod simulated;

use self::{device::DeviceSource, simulated::SimulatedSource};
use crate::{app_config::SourceConfig, error::ReadingSourceUnavailable};
use chrono::{DateTime, Local};
use std::{future::Future, time::Duration};

/// An unclassified value as delivered by a reading source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawSample {
    pub value: u16,
    pub at: DateTime<Local>,
}

/// One complete poll: both kinds or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceReadings {
    pub soil: RawSample,
    pub light: RawSample,
}

pub(crate) type FetchResult = Result<SourceReadings, ReadingSourceUnavailable>;

pub(crate) trait ReadingSource {
    fn name(&self) -> &str;
    fn is_simulated(&self) -> bool;
    fn fetch(&self) -> impl Future<Output = FetchResult> + Send;
}

pub(crate) enum Source {
    Simulated(SimulatedSource),
    Device(DeviceSource),
}

impl From<SourceConfig> for Source {
    fn from(config: SourceConfig) -> Self {
        match config {
            SourceConfig::Simulated(config) => Self::Simulated(config.into()),
            SourceConfig::Device(config) => Self::Device(config.into()),
        }
    }
}

impl ReadingSource for Source {
    fn name(&self) -> &str {
        match self {
            Self::Simulated(s) => s.name(),
            Self::Device(s) => s.name(),
        }
    }

    fn is_simulated(&self) -> bool {
        match self {
            Self::Simulated(s) => s.is_simulated(),
            Self::Device(s) => s.is_simulated(),
        }
    }

    async fn fetch(&self) -> FetchResult {
        match self {
            Self::Simulated(s) => s.fetch().await,
            Self::Device(s) => s.fetch().await,
        }
    }
}

/// Fetches from `source`, turning an overrun of `timeout` into unavailability.
pub(crate) async fn fetch_with_timeout<S: ReadingSource>(source: &S, timeout: Duration) -> FetchResult {
    match tokio::time::timeout(timeout, source.fetch()).await {
        Ok(result) => result,
        Err(_) => Err(ReadingSourceUnavailable::new(format!(
            "{} did not respond within {} ms",
            source.name(),
            timeout.as_millis()
        ))),
    }
}
