use adsb_simulator::bus::MockBus;
use adsb_simulator::emitter::Emitter;
use adsb_simulator::fleet::Fleet;
use adsb_simulator::publisher::Publisher;

/// Every published report for a given aircraft keeps arriving keyed by that
/// aircraft's `icao_address`, so a Kafka partitioner preserves per-aircraft
/// ordering regardless of how many other aircraft are in the fleet.
#[test]
fn published_reports_are_keyed_by_icao_address() {
    let mut fleet = Fleet::new(2, 1.0, 99);
    let emitter = Emitter::new(0.01, 0.01001); // effectively always-fire

    let bus = MockBus::new();
    let recorder = bus.recorder();
    let mut publisher = Publisher::new(Box::new(bus), "adsb_messages".to_string());

    let icaos: Vec<String> = fleet
        .aircraft()
        .iter()
        .map(|a| a.icao_address.clone())
        .collect();

    for _ in 0..3 {
        fleet.advance_all(0.1);
        let now = chrono::Utc::now();
        fleet.for_each_due_report(&emitter, now, |report| publisher.publish(&report));
    }

    let records = recorder.records();
    assert!(!records.is_empty());
    for (key, _) in &records {
        let key = String::from_utf8(key.clone()).unwrap();
        assert!(icaos.contains(&key));
    }
    assert_eq!(publisher.messages_sent() as usize, records.len());
}

/// Startup in null mode (no broker reachable): the fleet still ticks,
/// separation scanning and emergency sampling still run, and publish calls
/// are harmless no-ops that never advance the sent counter.
#[test]
fn null_mode_fleet_ticks_without_a_real_bus() {
    use adsb_simulator::bus::NullBus;

    let mut fleet = Fleet::new(5, 0.5, 123);
    let emitter = Emitter::new(1.0, 5.0);
    let mut publisher = Publisher::null(Box::new(NullBus), "adsb_messages".to_string());

    for _ in 0..20 {
        fleet.advance_all(0.1);
        let now = chrono::Utc::now();
        fleet.for_each_due_report(&emitter, now, |report| publisher.publish(&report));
        fleet.separation_scan();
        fleet.sample_emergencies(0.5);
        publisher.pump();
    }

    assert_eq!(publisher.messages_sent(), 0);
    let stats = fleet.stats();
    assert_eq!(stats.n, 5);

    publisher.shutdown(std::time::Duration::from_secs(1));
}
