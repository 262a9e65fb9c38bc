use crate::{
    app_config::MqttConfig,
    dashboard::{Dashboard, DashboardState, SensorPanel},
    sensor::{history::ChartPoint, Reading},
};
use log::{info, warn};
use rumqttc::{AsyncClient, ConnectionError, Event, Packet, Publish, QoS, SubscribeFilter};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum DashboardUpdate<'a> {
    Loading,
    Unavailable {
        reason: &'a str,
    },
    Live {
        connected: bool,
        error: Option<&'a str>,
        soil: PanelUpdate<'a>,
        light: PanelUpdate<'a>,
    },
}

#[derive(Debug, Serialize)]
pub(crate) struct PanelUpdate<'a> {
    reading: &'a Reading,
    history: Vec<ChartPoint>,
}

impl<'a> From<&'a SensorPanel> for PanelUpdate<'a> {
    fn from(panel: &'a SensorPanel) -> Self {
        Self {
            reading: panel.latest(),
            history: panel.history().chart_points(),
        }
    }
}

impl<'a> From<&'a Dashboard> for DashboardUpdate<'a> {
    fn from(dashboard: &'a Dashboard) -> Self {
        match dashboard.state() {
            DashboardState::Loading => Self::Loading,
            DashboardState::Unavailable { reason } => Self::Unavailable {
                reason: reason.as_str(),
            },
            DashboardState::Live(live) => Self::Live {
                connected: dashboard.connected(),
                error: live.error.as_deref(),
                soil: (&live.soil).into(),
                light: (&live.light).into(),
            },
        }
    }
}

/// Publishes the dashboard view model for remote displays and listens for refresh requests.
pub(crate) struct DashboardPublisher {
    mqtt_client: AsyncClient,
    config: MqttConfig,
}

impl DashboardPublisher {
    pub(crate) fn new(mqtt_client: AsyncClient, config: MqttConfig) -> Self {
        Self {
            mqtt_client,
            config,
        }
    }

    pub(crate) fn mqtt_subscriptions(&self) -> Vec<SubscribeFilter> {
        vec![SubscribeFilter::new(
            self.config.refresh_topic.clone(),
            QoS::AtLeastOnce,
        )]
    }

    pub(crate) fn is_refresh_request(&self, msg: &Publish) -> bool {
        self.config.refresh_topic == msg.topic
    }

    /// Returns true when the event asks for a refresh.
    ///
    /// Connection errors are only logged, the event loop reconnects on its next poll.
    pub(crate) fn handle_event(&self, event: &Result<Event, ConnectionError>) -> bool {
        match event {
            Ok(Event::Incoming(Packet::Publish(msg))) if self.is_refresh_request(msg) => {
                info!("Refresh requested via MQTT topic: {}", msg.topic);
                true
            }
            Ok(_) => false,
            Err(e) => {
                warn!("MQTT error: {:?}", e);
                false
            }
        }
    }

    /// Queues the current state without waiting, the event loop is only polled between updates.
    pub(crate) fn publish(&self, dashboard: &Dashboard) -> anyhow::Result<()> {
        let s = serde_json::to_string(&DashboardUpdate::from(dashboard))?;

        self.mqtt_client
            .try_publish(&self.config.state_topic, QoS::AtLeastOnce, true, s)?;

        Ok(())
    }
}
