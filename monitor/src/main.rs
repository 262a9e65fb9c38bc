mod app_config;
mod dashboard;
mod error;
mod publisher;
mod render;
mod sensor;
mod source;

use app_config::Config;
use clap::Parser;
use dashboard::Dashboard;
use log::{debug, info, trace, warn};
use publisher::DashboardPublisher;
use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop};
use source::{fetch_with_timeout, FetchResult, ReadingSource, Source};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::mpsc,
    task::JoinSet,
    time::MissedTickBehavior,
};

#[derive(Debug, Parser)]
#[command(version = env!("VERSION"), about)]
struct Cli {
    /// Configuration file
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Timer,
    Manual,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    env_logger::init();

    let config = Config::load(args.config.as_deref())?;
    debug!("Config: {:#?}", config);

    let source = Arc::new(Source::from(config.source.clone()));
    info!(
        "Reading from {} every {:?}",
        source.name(),
        config.refresh_interval()
    );

    let mut dashboard = Dashboard::new(source.is_simulated());

    let (publisher, mut mqtt_connection) = match config.mqtt.clone() {
        Some(mqtt) => {
            let (mqtt_client, mqtt_connection) = AsyncClient::new((&mqtt).into(), 16);
            let publisher = DashboardPublisher::new(mqtt_client.clone(), mqtt);

            let subscriptions = publisher.mqtt_subscriptions();
            info!("Subscribing to MQTT topics: {:#?}", subscriptions);
            mqtt_client.subscribe_many(subscriptions).await?;

            (Some(publisher), Some(mqtt_connection))
        }
        None => (None, None),
    };

    let mut refresh_interval = tokio::time::interval(config.refresh_interval());
    refresh_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut manual_refresh = spawn_stdin_refresh();

    let mut in_flight: JoinSet<FetchResult> = JoinSet::new();

    show(&config, &dashboard, publisher.as_ref());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Exiting");
                break;
            }
            _ = refresh_interval.tick() => {
                spawn_refresh(&mut in_flight, &source, config.fetch_timeout(), Trigger::Timer);
            }
            Some(()) = manual_refresh.recv() => {
                spawn_refresh(&mut in_flight, &source, config.fetch_timeout(), Trigger::Manual);
            }
            event = poll_mqtt(&mut mqtt_connection) => {
                trace!("MQTT event: {:?}", event);
                if publisher.as_ref().is_some_and(|p| p.handle_event(&event)) {
                    spawn_refresh(&mut in_flight, &source, config.fetch_timeout(), Trigger::Manual);
                }
            }
            Some(joined) = in_flight.join_next() => {
                match joined {
                    Ok(result) => {
                        dashboard.apply(result, &mut rand::thread_rng());
                        show(&config, &dashboard, publisher.as_ref());
                    }
                    Err(e) => warn!("Refresh task failed: {e}"),
                }
            }
        };
    }

    in_flight.abort_all();

    Ok(())
}

/// Starts a fetch. Overlapping fetches are fine: each result is applied once it completes.
fn spawn_refresh(
    in_flight: &mut JoinSet<FetchResult>,
    source: &Arc<Source>,
    timeout: Duration,
    trigger: Trigger,
) {
    debug!(
        "Refreshing ({:?}), {} fetches already in flight",
        trigger,
        in_flight.len()
    );

    let source = source.clone();
    in_flight.spawn(async move { fetch_with_timeout(source.as_ref(), timeout).await });
}

/// Every line entered on the terminal requests a refresh.
///
/// Runs on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_stdin_refresh() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if let Err(e) = line {
                warn!("Failed to read stdin: {e}");
                break;
            }
            if tx.send(()).is_err() {
                break;
            }
        }
        debug!("stdin closed, manual refresh via terminal disabled");
    });

    rx
}

async fn poll_mqtt(connection: &mut Option<EventLoop>) -> Result<Event, ConnectionError> {
    match connection {
        Some(connection) => connection.poll().await,
        None => std::future::pending().await,
    }
}

fn show(config: &Config, dashboard: &Dashboard, publisher: Option<&DashboardPublisher>) {
    if config.terminal {
        println!("{}", render::dashboard(dashboard));
    }

    if let Some(publisher) = publisher {
        if let Err(e) = publisher.publish(dashboard) {
            warn!("Failed to publish dashboard state: {:?}", e);
        }
    }
}
