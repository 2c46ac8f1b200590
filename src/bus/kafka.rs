//! Concrete [`MessageBus`] backed by `rdkafka`, configured with the
//! tunables the spec pins: `acks=all`, `retries=3`, `batch.size=16384`,
//! `linger.ms=10`, `buffer.memory=33554432`, `client.id=adsb-simulator`.

use std::time::Duration;

use rdkafka::admin::{AdminClient, AdminOptions, NewTopic, TopicReplication};
use rdkafka::client::ClientContext;
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer, ProducerContext};
use tracing::{error, info, warn};

use super::{BusError, MessageBus};

const CLIENT_ID: &str = "adsb-simulator";

struct DeliveryLogger;

impl ClientContext for DeliveryLogger {}

impl ProducerContext for DeliveryLogger {
    type DeliveryOpaque = ();

    fn delivery(&self, result: &DeliveryResult<'_>, _opaque: Self::DeliveryOpaque) {
        if let Err((err, msg)) = result {
            error!(
                "message delivery failed for key {:?}: {}",
                msg.key(),
                err
            );
        }
    }
}

pub struct KafkaBus {
    producer: BaseProducer<DeliveryLogger>,
}

impl KafkaBus {
    /// Construct a producer against `bootstrap_servers`. Bus-construction
    /// failure (e.g. an unparsable config) is the only error surfaced here;
    /// a merely unreachable broker is tolerated by librdkafka's own retry
    /// and connection-management machinery.
    pub fn new(bootstrap_servers: &str) -> Result<Self, BusError> {
        let producer: BaseProducer<DeliveryLogger> = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("client.id", CLIENT_ID)
            .set("acks", "all")
            .set("retries", "3")
            .set("batch.size", "16384")
            .set("linger.ms", "10")
            .set("queue.buffering.max.kbytes", "32768")
            .create_with_context(DeliveryLogger)
            .map_err(|e| BusError::Other(e.to_string()))?;

        Ok(Self { producer })
    }

    /// Ensure `topic` exists with 3 partitions, replication factor 1.
    /// "Already exists" is treated as success; any other failure is logged
    /// and the bus continues regardless (the client refreshes metadata and
    /// will attempt to produce to the topic anyway).
    pub async fn ensure_topic(&self, bootstrap_servers: &str, topic: &str) {
        let admin: AdminClient<_> = match ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .create()
        {
            Ok(admin) => admin,
            Err(e) => {
                warn!("failed to build admin client for topic provisioning: {}", e);
                return;
            }
        };

        let new_topic = NewTopic::new(topic, 3, TopicReplication::Fixed(1));
        let opts = AdminOptions::new().request_timeout(Some(Duration::from_secs(10)));

        match admin.create_topics(&[new_topic], &opts).await {
            Ok(results) => {
                for result in results {
                    match result {
                        Ok(name) => info!("topic {} created", name),
                        Err((name, code)) => {
                            let msg = code.to_string();
                            if msg.to_lowercase().contains("already exists") {
                                info!("topic {} already exists", name);
                            } else {
                                warn!("failed to create topic {}: {}", name, msg);
                            }
                        }
                    }
                }
            }
            Err(e) => warn!("topic provisioning request failed: {}", e),
        }
    }
}

impl MessageBus for KafkaBus {
    fn produce(&self, topic: &str, key: &[u8], value: &[u8]) -> Result<(), BusError> {
        let record = BaseRecord::to(topic).key(key).payload(value);

        match self.producer.send(record) {
            Ok(()) => Ok(()),
            Err((KafkaError::MessageProduction(code), _)) if code.to_string().contains("Full") => {
                Err(BusError::QueueFull)
            }
            Err((e, _)) => Err(BusError::Other(e.to_string())),
        }
    }

    fn poll(&self, timeout: Duration) {
        self.producer.poll(timeout);
    }

    fn flush(&self, timeout: Duration) {
        if let Err(e) = self.producer.flush(timeout) {
            warn!("flush did not complete within deadline: {}", e);
        }
    }
}
