use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};

use adsb_simulator::bus::{KafkaBus, NullBus};
use adsb_simulator::config::Config;
use adsb_simulator::emitter::Emitter;
use adsb_simulator::fleet::Fleet;
use adsb_simulator::publisher::Publisher;
use adsb_simulator::scheduler::Scheduler;

#[derive(Parser)]
#[command(name = "adsb-simulator")]
#[command(about = "Synthetic ADS-B traffic generator", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Minimum level of log messages to emit.
    #[arg(long, default_value = "INFO")]
    log_level: String,
}

fn parse_log_level(raw: &str) -> Level {
    match raw.to_uppercase().as_str() {
        "DEBUG" => Level::DEBUG,
        "WARNING" | "WARN" => Level::WARN,
        "ERROR" => Level::ERROR,
        _ => Level::INFO,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&cli.log_level))
        .with_target(false)
        .init();

    let config = Config::load(&cli.config).validated();
    info!(
        "starting with {} aircraft, jet_ratio={}, topic={}",
        config.simulation.num_aircraft, config.aircraft_types.jet_ratio, config.kafka.topic
    );

    let fleet = Fleet::new(
        config.simulation.num_aircraft as usize,
        config.aircraft_types.jet_ratio,
        rand::random(),
    );

    let emitter = Emitter::new(
        config.simulation.message_interval_min,
        config.simulation.message_interval_max,
    );

    let publisher = match KafkaBus::new(&config.kafka.bootstrap_servers) {
        Ok(bus) => {
            bus.ensure_topic(&config.kafka.bootstrap_servers, &config.kafka.topic)
                .await;
            Publisher::new(Box::new(bus), config.kafka.topic.clone())
        }
        Err(e) => {
            error!(
                "failed to construct Kafka producer ({}); continuing in null mode",
                e
            );
            Publisher::null(Box::new(NullBus), config.kafka.topic.clone())
        }
    };

    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = shutdown.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::Relaxed);
    })
    .context("failed to install Ctrl-C handler")?;

    let mut scheduler = Scheduler::new(
        fleet,
        emitter,
        publisher,
        config.simulation.emergency_frequency,
        shutdown,
    );

    scheduler.run().await;

    Ok(())
}
