//! Wraps a [`MessageBus`]: keyed publish, per-tick acknowledgement
//! draining, and bounded shutdown drain.

use std::time::Duration;

use tracing::error;

use crate::aircraft::Report;
use crate::bus::MessageBus;

/// Keyed, counted handoff from the kernel to the message bus.
pub struct Publisher {
    bus: Box<dyn MessageBus>,
    topic: String,
    messages_sent: u64,
    null_mode: bool,
    shut_down: bool,
}

impl Publisher {
    pub fn new(bus: Box<dyn MessageBus>, topic: String) -> Self {
        Self {
            bus,
            topic,
            messages_sent: 0,
            null_mode: false,
            shut_down: false,
        }
    }

    /// Construct a Publisher in degraded null mode: publishes are no-ops
    /// and `messages_sent` never advances, per the spec's bus-construction
    /// failure semantics.
    pub fn null(bus: Box<dyn MessageBus>, topic: String) -> Self {
        Self {
            bus,
            topic,
            messages_sent: 0,
            null_mode: true,
            shut_down: false,
        }
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    /// Publish `report`, keyed by `icao_address` so all of one aircraft's
    /// reports land on the same partition and preserve per-aircraft order.
    /// No-op after `shutdown`. Per-message enqueue failures are logged and
    /// dropped, never propagated to the tick loop.
    pub fn publish(&mut self, report: &Report) {
        if self.shut_down {
            return;
        }

        let value = match serde_json::to_vec(report) {
            Ok(v) => v,
            Err(e) => {
                error!("failed to encode report for {}: {}", report.icao_address, e);
                return;
            }
        };

        match self
            .bus
            .produce(&self.topic, report.icao_address.as_bytes(), &value)
        {
            Ok(()) => {
                if !self.null_mode {
                    self.messages_sent += 1;
                }
            }
            Err(e) => {
                error!("failed to enqueue report for {}: {}", report.icao_address, e);
            }
        }
    }

    /// Drive delivery acknowledgement callbacks. Called once per tick.
    pub fn pump(&self) {
        self.bus.poll(Duration::ZERO);
    }

    /// Flush the bus and forbid further publishes.
    pub fn shutdown(&mut self, deadline: Duration) {
        self.bus.flush(deadline);
        self.shut_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::Category;
    use crate::bus::MockBus;

    fn sample_report(icao: &str) -> Report {
        Report {
            icao_address: icao.to_string(),
            callsign: "UAL123".to_string(),
            latitude: 1.0,
            longitude: 2.0,
            altitude: 35000,
            ground_speed: 450,
            heading: 90,
            timestamp: "2025-01-15T20:09:00.123456+00:00".to_string(),
            squawk: "1200".to_string(),
            aircraft_type: Category::Jet,
        }
    }

    #[test]
    fn publish_keys_by_icao_and_increments_counter() {
        let bus = MockBus::new();
        let recorder = bus.recorder();
        let mut publisher = Publisher::new(Box::new(bus), "adsb_messages".to_string());

        publisher.publish(&sample_report("ABC123"));
        publisher.publish(&sample_report("ABC123"));
        publisher.publish(&sample_report("DEF456"));

        assert_eq!(publisher.messages_sent(), 3);

        let records = recorder.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].0, b"ABC123");
        assert_eq!(records[2].0, b"DEF456");

        let decoded: serde_json::Value = serde_json::from_slice(&records[0].1).unwrap();
        assert_eq!(decoded["icao_address"], "ABC123");
    }

    #[test]
    fn null_mode_never_increments_counter() {
        let bus = Box::new(MockBus::new());
        let mut publisher = Publisher::null(bus, "adsb_messages".to_string());

        publisher.publish(&sample_report("ABC123"));
        publisher.publish(&sample_report("ABC123"));

        assert_eq!(publisher.messages_sent(), 0);
    }

    #[test]
    fn failed_enqueue_is_dropped_not_fatal() {
        let bus = Box::new(MockBus::failing());
        let mut publisher = Publisher::new(bus, "adsb_messages".to_string());

        publisher.publish(&sample_report("ABC123"));

        assert_eq!(publisher.messages_sent(), 0);
    }

    #[test]
    fn shutdown_blocks_further_publishes() {
        let bus = Box::new(MockBus::new());
        let mut publisher = Publisher::new(bus, "adsb_messages".to_string());

        publisher.publish(&sample_report("ABC123"));
        publisher.shutdown(Duration::from_secs(1));
        publisher.publish(&sample_report("ABC123"));

        assert_eq!(publisher.messages_sent(), 1);
    }
}
