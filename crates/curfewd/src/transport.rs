//! MQTT transport
//!
//! Owns the broker connection on its own task. Inbound deliveries and
//! connection changes are forwarded to the service loop as [`Inbound`]
//! events; outbound metrics are queued without blocking.

use curfew_api::{OnlineEvent, StatusReport, TopicLayout, discovery_messages};
use curfew_config::AgentConfig;
use curfew_host_api::{MetricsPublisher, PublishError};
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

const KEEP_ALIVE: Duration = Duration::from_secs(60);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);
const REQUEST_QUEUE_CAPACITY: usize = 64;

/// Events produced by the transport task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Connected,
    Disconnected,
    Permission { payload: String, retained: bool },
    Budget { payload: String },
}

/// Handle to the running MQTT client
pub struct MqttTransport {
    client: AsyncClient,
    topics: TopicLayout,
}

impl MqttTransport {
    /// Create the client and spawn its event loop task.
    pub fn start(
        config: &AgentConfig,
        inbound: mpsc::UnboundedSender<Inbound>,
    ) -> (Self, JoinHandle<()>) {
        let client_id = format!("curfew-agent-{}", config.device_id);
        let mut options = MqttOptions::new(client_id, &config.mqtt.host, config.mqtt.port);
        options.set_keep_alive(KEEP_ALIVE);
        options.set_clean_session(true);
        if let Some(username) = &config.mqtt.username {
            options.set_credentials(username, config.mqtt.password.clone().unwrap_or_default());
        }
        if config.mqtt.tls {
            options.set_transport(Transport::tls_with_default_config());
        }

        info!(
            host = %config.mqtt.host,
            port = config.mqtt.port,
            tls = config.mqtt.tls,
            "Connecting to MQTT broker"
        );

        let (client, eventloop) = AsyncClient::new(options, REQUEST_QUEUE_CAPACITY);
        let topics = config.topics();

        let task = tokio::spawn(run_event_loop(
            eventloop,
            client.clone(),
            topics.clone(),
            inbound,
        ));

        (Self { client, topics }, task)
    }

    /// Request a clean disconnect; the event loop task ends afterwards.
    pub async fn disconnect(&self) {
        if let Err(e) = self.client.disconnect().await {
            warn!(error = %e, "Failed to request MQTT disconnect");
        }
    }

    fn try_publish(
        &self,
        topic: String,
        qos: QoS,
        retain: bool,
        payload: String,
    ) -> Result<(), PublishError> {
        self.client
            .try_publish(topic, qos, retain, payload)
            .map_err(|e| PublishError::Rejected(e.to_string()))
    }
}

impl MetricsPublisher for MqttTransport {
    fn publish_minutes(&self, minutes: u64) -> Result<(), PublishError> {
        self.try_publish(
            self.topics.minutes_today(),
            QoS::AtLeastOnce,
            true,
            minutes.to_string(),
        )
    }

    fn publish_active(&self, active: bool) -> Result<(), PublishError> {
        let payload = if active { "1" } else { "0" };
        self.try_publish(
            self.topics.active(),
            QoS::AtMostOnce,
            false,
            payload.to_string(),
        )
    }

    fn publish_status(&self, report: &StatusReport) -> Result<(), PublishError> {
        self.try_publish(self.topics.status(), QoS::AtMostOnce, false, report.to_json())
    }
}

async fn run_event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    topics: TopicLayout,
    inbound: mpsc::UnboundedSender<Inbound>,
) {
    let allowed_topic = topics.allowed();
    let budget_topic = topics.budget();
    let mut discovery_published = false;

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!(session_present = ack.session_present, "Connected to MQTT broker");
                on_connect(&client, &topics, &mut discovery_published);
                if inbound.send(Inbound::Connected).is_err() {
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                debug!(
                    topic = %publish.topic,
                    payload = %payload,
                    retained = publish.retain,
                    "Message received"
                );

                let event = if publish.topic == allowed_topic {
                    Inbound::Permission {
                        payload,
                        retained: publish.retain,
                    }
                } else if publish.topic == budget_topic {
                    Inbound::Budget { payload }
                } else {
                    debug!(topic = %publish.topic, "Ignoring message on unexpected topic");
                    continue;
                };

                if inbound.send(event).is_err() {
                    break;
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                info!("Disconnected from MQTT broker");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, retry_in_secs = RECONNECT_DELAY.as_secs(), "MQTT connection error");
                if inbound.send(Inbound::Disconnected).is_err() {
                    break;
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }

    debug!("MQTT event loop stopped");
}

fn on_connect(client: &AsyncClient, topics: &TopicLayout, discovery_published: &mut bool) {
    for topic in [topics.allowed(), topics.budget()] {
        if let Err(e) = client.try_subscribe(topic.clone(), QoS::AtLeastOnce) {
            error!(topic = %topic, error = %e, "Failed to subscribe");
        }
    }

    if let Err(e) = client.try_publish(
        topics.status(),
        QoS::AtLeastOnce,
        false,
        OnlineEvent::new().to_json(),
    ) {
        warn!(error = %e, "Failed to publish online event");
    }

    if *discovery_published {
        return;
    }

    let messages = discovery_messages(topics);
    let count = messages.len();
    let mut failed = false;
    for message in messages {
        if let Err(e) = client.try_publish(
            message.topic.clone(),
            QoS::AtLeastOnce,
            true,
            message.payload.to_string(),
        ) {
            warn!(topic = %message.topic, error = %e, "Failed to publish discovery config");
            failed = true;
        }
    }

    if !failed {
        info!(count, "Published MQTT discovery configs");
        *discovery_published = true;
    }
}
