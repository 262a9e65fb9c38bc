use super::{FetchResult, RawSample, ReadingSource, SourceReadings};
use crate::{app_config::SimulatedSourceConfig, error::ReadingSourceUnavailable};
use chrono::{DateTime, Local, Timelike};
use rand::Rng;
use std::{f64::consts::PI, time::Duration};

/// Stand-in for the physical sensor node, producing ADC-like values.
///
/// Soil moisture drifts on a slow sine wave between good and okay, light
/// follows the hour of day peaking at noon. Both carry uniform noise.
pub(crate) struct SimulatedSource {
    latency: Duration,
    failure_rate: f64,
}

impl From<SimulatedSourceConfig> for SimulatedSource {
    fn from(config: SimulatedSourceConfig) -> Self {
        Self {
            latency: Duration::from_millis(config.latency_ms),
            failure_rate: if config.failure_rate.is_nan() {
                0.0
            } else {
                config.failure_rate.clamp(0.0, 1.0)
            },
        }
    }
}

impl SimulatedSource {
    fn generate<R: Rng + ?Sized>(&self, now: DateTime<Local>, rng: &mut R) -> FetchResult {
        if rng.gen_bool(self.failure_rate) {
            return Err(ReadingSourceUnavailable::new("simulated sensor failure"));
        }

        Ok(SourceReadings {
            soil: RawSample {
                value: soil_value(now, rng),
                at: now,
            },
            light: RawSample {
                value: light_value(now, rng),
                at: now,
            },
        })
    }
}

fn soil_value<R: Rng + ?Sized>(now: DateTime<Local>, rng: &mut R) -> u16 {
    let base = 1200.0 + (now.timestamp_millis() as f64 / 10_000.0).sin() * 800.0;
    let noise = (rng.gen::<f64>() - 0.5) * 400.0;
    (base + noise).clamp(500.0, 3500.0).round() as u16
}

fn light_value<R: Rng + ?Sized>(now: DateTime<Local>, rng: &mut R) -> u16 {
    let day_factor = ((now.hour() as f64 - 6.0) * PI / 12.0).sin();
    let base = 2000.0 + day_factor * 1500.0;
    let noise = (rng.gen::<f64>() - 0.5) * 500.0;
    (base + noise).clamp(500.0, 4000.0).round() as u16
}

impl ReadingSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated source"
    }

    fn is_simulated(&self) -> bool {
        true
    }

    async fn fetch(&self) -> FetchResult {
        let result = self.generate(Local::now(), &mut rand::thread_rng());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        result
    }
}
