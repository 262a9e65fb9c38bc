use super::{FetchResult, ReadingSource};
use crate::{app_config::DeviceSourceConfig, error::ReadingSourceUnavailable};

/// Placeholder for the link to the physical sensor node.
///
/// No wire format has been settled for the device yet, so every fetch
/// reports the source as unavailable.
pub(crate) struct DeviceSource {
    endpoint: String,
}

impl From<DeviceSourceConfig> for DeviceSource {
    fn from(config: DeviceSourceConfig) -> Self {
        Self {
            endpoint: config.endpoint,
        }
    }
}

impl ReadingSource for DeviceSource {
    fn name(&self) -> &str {
        self.endpoint.as_str()
    }

    fn is_simulated(&self) -> bool {
        false
    }

    async fn fetch(&self) -> FetchResult {
        Err(ReadingSourceUnavailable::new(format!(
            "device link to {} is not implemented",
            self.endpoint
        )))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn always_unavailable() {
        let source: DeviceSource = DeviceSourceConfig {
            endpoint: "http://plant.local".into(),
        }
        .into();

        assert_eq!(source.name(), "http://plant.local");
        assert_eq!(
            source.fetch().await,
            Err(ReadingSourceUnavailable::new(
                "device link to http://plant.local is not implemented"
            ))
        );
    }
}
