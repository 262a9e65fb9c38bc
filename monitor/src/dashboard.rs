use crate::{
    error::ReadingSourceUnavailable,
    sensor::{history::HistorySeries, Reading},
    source::{FetchResult, RawSample, SourceReadings},
};
use log::{debug, info, warn};
use plant_monitor_protocol::SensorKind;
use rand::Rng;

/// Latest reading and trend history of one sensor kind.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SensorPanel {
    latest: Reading,
    history: HistorySeries,
}

impl SensorPanel {
    fn seeded<R: Rng + ?Sized>(kind: SensorKind, sample: &RawSample, rng: &mut R) -> Self {
        let latest = Reading::classify(kind, sample.value, sample.at);
        let history = HistorySeries::seeded(kind, &latest, rng);
        Self { latest, history }
    }

    fn update(&mut self, sample: &RawSample) {
        let reading = Reading::classify(self.history.kind(), sample.value, sample.at);
        self.history.push(reading.clone());
        self.latest = reading;
    }

    pub(crate) fn kind(&self) -> SensorKind {
        self.history.kind()
    }

    pub(crate) fn latest(&self) -> &Reading {
        &self.latest
    }

    pub(crate) fn history(&self) -> &HistorySeries {
        &self.history
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LiveState {
    pub soil: SensorPanel,
    pub light: SensorPanel,

    /// Set when the most recent refresh failed; the panels keep their last good data
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DashboardState {
    Loading,
    /// No data has ever been retrieved, nothing may be shown
    Unavailable { reason: String },
    Live(LiveState),
}

/// Sole owner of the sensor histories. Renderers only get shared references.
pub(crate) struct Dashboard {
    state: DashboardState,
    simulated: bool,
}

impl Dashboard {
    pub(crate) fn new(simulated: bool) -> Self {
        Self {
            state: DashboardState::Loading,
            simulated,
        }
    }

    pub(crate) fn state(&self) -> &DashboardState {
        &self.state
    }

    pub(crate) fn simulated(&self) -> bool {
        self.simulated
    }

    /// Whether the displayed data comes from the physical device and its last fetch succeeded.
    pub(crate) fn connected(&self) -> bool {
        !self.simulated
            && matches!(&self.state, DashboardState::Live(live) if live.error.is_none())
    }

    pub(crate) fn apply<R: Rng + ?Sized>(&mut self, result: FetchResult, rng: &mut R) {
        match result {
            Ok(readings) => self.apply_readings(readings, rng),
            Err(e) => self.apply_failure(e),
        }
    }

    fn apply_readings<R: Rng + ?Sized>(&mut self, readings: SourceReadings, rng: &mut R) {
        debug!(
            "Readings: soil={} light={}",
            readings.soil.value, readings.light.value
        );

        match &mut self.state {
            DashboardState::Live(live) => {
                live.soil.update(&readings.soil);
                live.light.update(&readings.light);
                if live.error.take().is_some() {
                    info!("Reading source recovered");
                }
            }
            DashboardState::Loading | DashboardState::Unavailable { .. } => {
                info!("Initial readings received, seeding history");
                self.state = DashboardState::Live(LiveState {
                    soil: SensorPanel::seeded(SensorKind::Soil, &readings.soil, rng),
                    light: SensorPanel::seeded(SensorKind::Light, &readings.light, rng),
                    error: None,
                });
            }
        }
    }

    fn apply_failure(&mut self, e: ReadingSourceUnavailable) {
        warn!("Failed to fetch sensor data: {e}");

        match &mut self.state {
            DashboardState::Live(live) => {
                live.error = Some(format!("Failed to fetch sensor data: {}", e.reason));
            }
            DashboardState::Loading | DashboardState::Unavailable { .. } => {
                self.state = DashboardState::Unavailable { reason: e.reason };
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sensor::history::HISTORY_CAPACITY;
    use chrono::{DateTime, Duration, Local, TimeZone};
    use plant_monitor_protocol::ConditionStatus;
    use rand::{rngs::StdRng, SeedableRng};

    fn at(second: i64) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::seconds(second)
    }

    fn readings(soil: u16, light: u16, second: i64) -> FetchResult {
        Ok(SourceReadings {
            soil: RawSample {
                value: soil,
                at: at(second),
            },
            light: RawSample {
                value: light,
                at: at(second),
            },
        })
    }

    fn failure() -> FetchResult {
        Err(ReadingSourceUnavailable::new("timeout"))
    }

    fn live(dashboard: &Dashboard) -> &LiveState {
        match dashboard.state() {
            DashboardState::Live(live) => live,
            s => panic!("not live: {s:?}"),
        }
    }

    #[test]
    fn initial_load_seeds_history() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dashboard = Dashboard::new(true);
        assert_eq!(dashboard.state(), &DashboardState::Loading);

        dashboard.apply(readings(1200, 3100, 0), &mut rng);

        let live = live(&dashboard);
        assert_eq!(live.error, None);
        assert_eq!(live.soil.kind(), SensorKind::Soil);
        assert_eq!(live.light.kind(), SensorKind::Light);
        assert_eq!(live.soil.history().len(), HISTORY_CAPACITY);
        assert_eq!(live.light.history().len(), HISTORY_CAPACITY);
        assert_eq!(live.soil.latest().value(), 1200);
        assert_eq!(live.soil.latest().condition(), ConditionStatus::Good);
        assert_eq!(live.light.latest().condition(), ConditionStatus::Good);
        assert_eq!(live.soil.history().latest(), Some(live.soil.latest()));
        assert_eq!(live.light.history().latest(), Some(live.light.latest()));
    }

    #[test]
    fn initial_failure_is_blocking() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dashboard = Dashboard::new(true);

        dashboard.apply(failure(), &mut rng);
        assert_eq!(
            dashboard.state(),
            &DashboardState::Unavailable {
                reason: "timeout".into()
            }
        );

        dashboard.apply(
            Err(ReadingSourceUnavailable::new("still down")),
            &mut rng,
        );
        assert_eq!(
            dashboard.state(),
            &DashboardState::Unavailable {
                reason: "still down".into()
            }
        );
        assert!(!dashboard.connected());
    }

    #[test]
    fn recovers_from_unavailable() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dashboard = Dashboard::new(true);

        dashboard.apply(failure(), &mut rng);
        dashboard.apply(readings(2000, 2000, 10), &mut rng);

        let live = live(&dashboard);
        assert_eq!(live.error, None);
        assert_eq!(live.soil.history().len(), HISTORY_CAPACITY);
        assert_eq!(live.soil.latest().condition(), ConditionStatus::Okay);
        assert_eq!(live.light.latest().condition(), ConditionStatus::Okay);
    }

    #[test]
    fn refresh_appends() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dashboard = Dashboard::new(true);

        dashboard.apply(readings(1200, 3100, 0), &mut rng);
        dashboard.apply(readings(2600, 1400, 2), &mut rng);

        let live = live(&dashboard);
        assert_eq!(live.soil.history().len(), HISTORY_CAPACITY);
        assert_eq!(live.soil.latest().value(), 2600);
        assert_eq!(live.soil.latest().condition(), ConditionStatus::Bad);
        assert_eq!(live.light.latest().value(), 1400);
        assert_eq!(live.light.latest().condition(), ConditionStatus::Bad);

        let last_two: Vec<_> = live
            .soil
            .history()
            .iter()
            .skip(HISTORY_CAPACITY - 2)
            .map(|r| r.value())
            .collect();
        assert_eq!(last_two, vec![1200, 2600]);
    }

    #[test]
    fn refresh_failure_keeps_data() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dashboard = Dashboard::new(true);

        dashboard.apply(readings(1200, 3100, 0), &mut rng);
        let before = live(&dashboard).clone();

        dashboard.apply(failure(), &mut rng);

        let after = live(&dashboard);
        assert_eq!(after.soil, before.soil);
        assert_eq!(after.light, before.light);
        assert_eq!(
            after.error.as_deref(),
            Some("Failed to fetch sensor data: timeout")
        );

        dashboard.apply(readings(1300, 3000, 2), &mut rng);
        let live = live(&dashboard);
        assert_eq!(live.error, None);
        assert_eq!(live.soil.latest().value(), 1300);
    }

    #[test]
    fn many_refreshes_keep_last_readings() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dashboard = Dashboard::new(true);

        dashboard.apply(readings(0, 0, 0), &mut rng);
        for i in 1..=45 {
            dashboard.apply(readings(i, i, i as i64), &mut rng);
        }

        let live = live(&dashboard);
        let soil: Vec<_> = live.soil.history().iter().map(|r| r.value()).collect();
        let expected: Vec<u16> = (26..=45).collect();
        assert_eq!(soil, expected);
    }

    #[test]
    fn connected_only_with_device_data() {
        let mut rng = StdRng::seed_from_u64(0);

        let mut simulated = Dashboard::new(true);
        simulated.apply(readings(1200, 3100, 0), &mut rng);
        assert!(!simulated.connected());

        let mut device = Dashboard::new(false);
        assert!(!device.connected());
        device.apply(readings(1200, 3100, 0), &mut rng);
        assert!(device.connected());
    }

    #[test]
    fn device_failure_drops_connection() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut dashboard = Dashboard::new(false);

        dashboard.apply(readings(1200, 3100, 0), &mut rng);
        assert!(dashboard.connected());

        dashboard.apply(failure(), &mut rng);
        assert!(!dashboard.connected());
        assert!(!dashboard.simulated());
        assert_eq!(live(&dashboard).soil.latest().value(), 1200);

        dashboard.apply(readings(1250, 3050, 2), &mut rng);
        assert!(dashboard.connected());
    }

    #[test]
    fn overlapping_fetches_while_loading() {
        // Two fetches started before the first result arrived, applied in completion order.
        let mut rng = StdRng::seed_from_u64(0);
        let mut dashboard = Dashboard::new(true);

        dashboard.apply(readings(1200, 3100, 0), &mut rng);
        dashboard.apply(readings(1300, 3200, 1), &mut rng);

        let live = live(&dashboard);
        assert_eq!(live.soil.history().len(), HISTORY_CAPACITY);
        assert_eq!(live.light.history().len(), HISTORY_CAPACITY);
        assert_eq!(live.soil.latest().value(), 1300);
        assert_eq!(live.light.latest().value(), 3200);

        let soil: Vec<_> = live
            .soil
            .history()
            .iter()
            .skip(HISTORY_CAPACITY - 2)
            .map(|r| r.value())
            .collect();
        assert_eq!(soil, vec![1200, 1300]);

        let light: Vec<_> = live
            .light
            .history()
            .iter()
            .skip(HISTORY_CAPACITY - 2)
            .map(|r| r.value())
            .collect();
        assert_eq!(light, vec![3100, 3200]);
    }
}
