use crate::dashboard::{Dashboard, DashboardState, LiveState, SensorPanel};
use crate::sensor::history::HistorySeries;
use plant_monitor_protocol::{SensorKind, ADC_MAX};
use std::fmt::Write;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

fn title(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Soil => "Soil Moisture",
        SensorKind::Light => "Light Intensity (LDR)",
    }
}

/// Renders the dashboard as plain text for a terminal.
pub(crate) fn dashboard(dashboard: &Dashboard) -> String {
    match dashboard.state() {
        DashboardState::Loading => "Initializing sensors...\n".to_string(),
        DashboardState::Unavailable { reason } => format!(
            "Connection Error\n{reason}\nPress Enter to retry the connection\n"
        ),
        DashboardState::Live(live) => render_live(live, mode(dashboard)),
    }
}

fn mode(dashboard: &Dashboard) -> &'static str {
    if dashboard.simulated() {
        "Demo Mode (Simulated Data)"
    } else if dashboard.connected() {
        "Device Connected"
    } else {
        "Device Disconnected"
    }
}

fn render_live(live: &LiveState, mode: &str) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Plant Monitor [{mode}]");

    if let Some(error) = &live.error {
        let _ = writeln!(out, "! {error}");
    }

    for panel in [&live.soil, &live.light] {
        out.push('\n');
        render_panel(&mut out, panel);
    }

    out
}

fn render_panel(out: &mut String, panel: &SensorPanel) {
    let reading = panel.latest();
    let condition = reading.condition();

    let _ = writeln!(
        out,
        "{:<24} {} {}",
        title(panel.kind()),
        condition,
        condition.trend()
    );
    let _ = writeln!(
        out,
        "  {} ADC, last updated {}",
        reading.value(),
        reading.time_label()
    );
    let _ = writeln!(out, "  thresholds: {}", panel.kind().thresholds());
    let _ = writeln!(out, "  trend: {}", sparkline(panel.history()));

    if let (Some(first), Some(last)) = (panel.history().iter().next(), panel.history().latest()) {
        let _ = writeln!(
            out,
            "         {} .. {} ({} readings)",
            first.time_label(),
            last.time_label(),
            panel.history().len()
        );
    }
}

/// One glyph per history entry, scaled over the full ADC range.
pub(crate) fn sparkline(history: &HistorySeries) -> String {
    history
        .iter()
        .map(|r| {
            let level = r.value().min(ADC_MAX) as usize * SPARK_LEVELS.len() / (ADC_MAX as usize + 1);
            SPARK_LEVELS[level]
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        error::ReadingSourceUnavailable,
        sensor::{history::HISTORY_CAPACITY, Reading},
        source::{RawSample, SourceReadings},
    };
    use chrono::{Local, TimeZone};
    use rand::{rngs::StdRng, SeedableRng};

    fn live_dashboard(simulated: bool) -> Dashboard {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut dashboard = Dashboard::new(simulated);
        dashboard.apply(
            Ok(SourceReadings {
                soil: RawSample { value: 1800, at },
                light: RawSample { value: 3300, at },
            }),
            &mut StdRng::seed_from_u64(5),
        );
        dashboard
    }

    #[test]
    fn loading() {
        assert_eq!(dashboard(&Dashboard::new(true)), "Initializing sensors...\n");
    }

    #[test]
    fn unavailable() {
        let mut d = Dashboard::new(true);
        d.apply(
            Err(ReadingSourceUnavailable::new("no route to host")),
            &mut StdRng::seed_from_u64(5),
        );

        let out = dashboard(&d);
        assert!(out.starts_with("Connection Error\nno route to host\n"));
        assert!(!out.contains("ADC"));
    }

    #[test]
    fn live_cards() {
        let out = dashboard(&live_dashboard(true));

        assert!(out.starts_with("Plant Monitor [Demo Mode (Simulated Data)]\n"));
        assert!(!out.contains('!'));

        assert!(out.contains("Soil Moisture            Okay –\n"));
        assert!(out.contains("  1800 ADC, last updated 12:00:00\n"));
        assert!(out.contains("  thresholds: ≤1500: Good  1501-2500: Okay  >2500: Bad\n"));

        assert!(out.contains("Light Intensity (LDR)    Good ↑\n"));
        assert!(out.contains("  3300 ADC, last updated 12:00:00\n"));
        assert!(out.contains("  thresholds: <1500: Bad  1500-2999: Okay  ≥3000: Good\n"));

        assert!(out.contains("         11:58:06 .. 12:00:00 (20 readings)\n"));
    }

    #[test]
    fn live_error_banner() {
        let mut d = live_dashboard(false);
        assert!(dashboard(&d).starts_with("Plant Monitor [Device Connected]\n\n"));

        d.apply(
            Err(ReadingSourceUnavailable::new("timeout")),
            &mut StdRng::seed_from_u64(5),
        );

        let out = dashboard(&d);
        assert!(out.starts_with(
            "Plant Monitor [Device Disconnected]\n! Failed to fetch sensor data: timeout\n"
        ));
        assert!(!out.contains("Device Connected"));
        assert!(out.contains("  1800 ADC"));
    }

    #[test]
    fn simulated_error_banner() {
        let mut d = live_dashboard(true);
        d.apply(
            Err(ReadingSourceUnavailable::new("timeout")),
            &mut StdRng::seed_from_u64(5),
        );

        assert!(dashboard(&d).starts_with(
            "Plant Monitor [Demo Mode (Simulated Data)]\n! Failed to fetch sensor data: timeout\n"
        ));
    }

    #[test]
    fn sparkline_scaling() {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut series = HistorySeries::new(SensorKind::Light);
        for value in [0, 511, 512, 2048, 4095, 9000] {
            series.push(Reading::classify(SensorKind::Light, value, at));
        }

        assert_eq!(sparkline(&series), "▁▁▂▅██");
    }

    #[test]
    fn sparkline_full_history() {
        let d = live_dashboard(true);
        match d.state() {
            DashboardState::Live(live) => {
                assert_eq!(sparkline(live.soil.history()).chars().count(), HISTORY_CAPACITY);
            }
            s => panic!("not live: {s:?}"),
        }
    }
}
