use rand::{distributions::Alphanumeric, Rng};
use rumqttc::MqttOptions;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub refresh_interval_ms: u64,
    pub fetch_timeout_ms: u64,

    /// Print the dashboard to stdout on every change
    pub terminal: bool,

    pub source: SourceConfig,
    pub mqtt: Option<MqttConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 2_000,
            fetch_timeout_ms: 1_500,
            terminal: true,
            source: SourceConfig::default(),
            mqtt: None,
        }
    }
}

impl Config {
    /// Loads the optional configuration file, then `PLANT_MONITOR__*` environment overrides.
    pub(crate) fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("PLANT_MONITOR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config = config.try_deserialize::<Self>()?;

        if config.refresh_interval_ms == 0 {
            anyhow::bail!("refresh_interval_ms must be greater than zero");
        }

        Ok(config)
    }

    pub(crate) fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub(crate) fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum SourceConfig {
    Simulated(SimulatedSourceConfig),
    Device(DeviceSourceConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Simulated(SimulatedSourceConfig::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct SimulatedSourceConfig {
    pub latency_ms: u64,

    /// Probability in `[0, 1]` that a fetch fails
    pub failure_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct DeviceSourceConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct MqttConfig {
    host: String,
    port: u16,

    username: Option<String>,
    password: Option<String>,

    pub state_topic: String,
    pub refresh_topic: String,
}

fn generate_client_id() -> String {
    let r: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect();
    format!("plant-monitor-{r}")
}

impl From<&MqttConfig> for MqttOptions {
    fn from(value: &MqttConfig) -> Self {
        let mut options = Self::new(generate_client_id(), value.host.clone(), value.port);
        if let (Some(username), Some(password)) = (&value.username, &value.password) {
            options.set_credentials(username.clone(), password.clone());
        }
        options.set_keep_alive(Duration::from_secs(5));
        options
    }
}
