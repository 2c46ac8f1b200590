//! The master tick loop: advance the fleet, emit due reports, scan for
//! separation conflicts, sample emergencies, and drain the bus — once per
//! tick, paced at a 10 Hz target rate, until a shutdown signal arrives.
//! `dt` fed to the fleet is the measured wall-clock gap since the previous
//! tick, not the nominal cadence, so a stretched tick (e.g. tokio's
//! default burst catch-up after a stall) still advances kinematics by the
//! time that actually elapsed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tokio::time::interval;
use tracing::info;

use crate::emitter::Emitter;
use crate::fleet::Fleet;
use crate::publisher::Publisher;

const TICK_HZ: f64 = 10.0;
const STATS_INTERVAL: Duration = Duration::from_secs(30);
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(10);

/// Drives the fleet and publisher through fixed-rate ticks until
/// `shutdown` is set, e.g. by a `ctrlc` handler in `main`.
pub struct Scheduler {
    fleet: Fleet,
    emitter: Emitter,
    publisher: Publisher,
    emergency_frequency: f64,
    shutdown: Arc<AtomicBool>,
}

impl Scheduler {
    pub fn new(
        fleet: Fleet,
        emitter: Emitter,
        publisher: Publisher,
        emergency_frequency: f64,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        Self {
            fleet,
            emitter,
            publisher,
            emergency_frequency,
            shutdown,
        }
    }

    pub async fn run(&mut self) {
        let mut ticker = interval(Duration::from_secs_f64(1.0 / TICK_HZ));

        let start = Instant::now();
        let mut last_tick_time = Instant::now();
        let mut last_stats = Instant::now();
        let mut messages_at_last_stats = 0u64;

        loop {
            ticker.tick().await;

            if self.shutdown.load(Ordering::Relaxed) {
                break;
            }

            let now_instant = Instant::now();
            let dt = (now_instant - last_tick_time).as_secs_f64();
            last_tick_time = now_instant;

            self.fleet.advance_all(dt);

            let now = Utc::now();
            let emitter = &self.emitter;
            let publisher = &mut self.publisher;
            self.fleet
                .for_each_due_report(emitter, now, |report| publisher.publish(&report));

            self.fleet.separation_scan();
            self.fleet.sample_emergencies(self.emergency_frequency);
            self.publisher.pump();

            if last_stats.elapsed() >= STATS_INTERVAL {
                let stats = self.fleet.stats();
                let sent = self.publisher.messages_sent();
                let rate = (sent - messages_at_last_stats) as f64 / last_stats.elapsed().as_secs_f64();
                info!(
                    "uptime={}s aircraft={} emergencies={} conflicts={} messages_sent={} rate={:.1}/s",
                    start.elapsed().as_secs(),
                    stats.n,
                    stats.n_emergency,
                    stats.n_conflict,
                    sent,
                    rate
                );
                messages_at_last_stats = sent;
                last_stats = Instant::now();
            }
        }

        info!("shutdown signal received, draining publisher");
        self.publisher.shutdown(SHUTDOWN_DRAIN);
        info!(
            "scheduler stopped after {}s, {} messages sent",
            start.elapsed().as_secs(),
            self.publisher.messages_sent()
        );
    }
}
