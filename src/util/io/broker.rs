// src/util/io/broker.rs

//! Broker Connection - the one connection to the device's messaging channel.
//!
//! Built once in `main` and handed out as an [`Arc<dyn Publisher>`]. Inbound
//! publishes are forwarded onto the [`MessageBus`] under their MQTT topic;
//! losing the connection publishes a [`CONNECTION_LOST_EVENT`] app event and
//! ends the listener. There is no reconnect.
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::{BrokerConfig, BrokerMode};
use crate::error::Result;
use crate::util::io::bus::{BusMessage, MessageBus};
use crate::{log_error, log_info};

pub const CONNECTION_LOST_EVENT: &str = "connection_lost";

const REQUEST_CHANNEL_CAPACITY: usize = 16;

/// Fire-and-forget outbound seam used by the dispatcher.
pub trait Publisher: Send + Sync + fmt::Debug {
    fn publish(&self, topic: &str, payload: String) -> Result<()>;
}

/// Loopback publisher: commands go straight onto the in-process bus.
#[derive(Debug, Clone)]
pub struct LocalPublisher {
    bus: MessageBus,
}

impl LocalPublisher {
    pub fn new(bus: MessageBus) -> Self {
        Self { bus }
    }
}

impl Publisher for LocalPublisher {
    fn publish(&self, topic: &str, payload: String) -> Result<()> {
        self.bus.publish(BusMessage::new(
            topic.to_string(),
            payload,
            "smartbath_panel".to_string(),
        ))
    }
}

#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl fmt::Debug for MqttPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttPublisher").finish_non_exhaustive()
    }
}

impl Publisher for MqttPublisher {
    fn publish(&self, topic: &str, payload: String) -> Result<()> {
        tracing::debug!(topic, %payload, "mqtt publish");
        self.client
            .try_publish(topic, QoS::AtMostOnce, false, payload)?;
        Ok(())
    }
}

pub struct ConnectionManager {
    bus: MessageBus,
    publisher: Arc<dyn Publisher>,
    client: Option<AsyncClient>,
    listener: Option<JoinHandle<()>>,
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("publisher", &self.publisher)
            .field("connected", &self.listener.is_some())
            .finish()
    }
}

impl ConnectionManager {
    /// Connects according to `config.mode` and subscribes to `topic`.
    /// Resolves once the broker has acknowledged the connection.
    pub async fn connect(config: &BrokerConfig, topic: &str, bus: MessageBus) -> Result<Self> {
        match config.mode {
            BrokerMode::Local => Ok(Self::local(bus)),
            BrokerMode::Mqtt => Self::mqtt(config, topic, bus).await,
        }
    }

    pub fn local(bus: MessageBus) -> Self {
        log_info!("Using in-process loopback broker");
        Self {
            publisher: Arc::new(LocalPublisher::new(bus.clone())),
            bus,
            client: None,
            listener: None,
        }
    }

    async fn mqtt(config: &BrokerConfig, topic: &str, bus: MessageBus) -> Result<Self> {
        log_info!(
            "🔌 Connecting to MQTT broker {}:{} as '{}'",
            config.host, config.port, config.client_id
        );

        let mut options = MqttOptions::new(config.client_id.clone(), config.host.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs));
        options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                    tracing::debug!(?ack, "mqtt connack");
                    break;
                }
                Ok(event) => tracing::trace!(?event, "mqtt event before connack"),
                Err(e) => {
                    log_error!("MQTT connect failed: {}", e);
                    return Err(e.into());
                }
            }
        }

        client.subscribe(topic, QoS::AtMostOnce).await?;
        log_info!("✓ Connected, subscribed to '{}'", topic);

        let listener = tokio::spawn(run_event_loop(eventloop, bus.clone()));

        Ok(Self {
            publisher: Arc::new(MqttPublisher { client: client.clone() }),
            bus,
            client: Some(client),
            listener: Some(listener),
        })
    }

    pub fn publisher(&self) -> Arc<dyn Publisher> {
        self.publisher.clone()
    }

    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub async fn shutdown(mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.disconnect().await {
                log_error!("MQTT disconnect failed: {}", e);
            }
        }
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

async fn run_event_loop(mut eventloop: EventLoop, bus: MessageBus) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let payload = String::from_utf8_lossy(&publish.payload).into_owned();
                tracing::debug!(topic = %publish.topic, %payload, "mqtt message");
                if let Err(e) = bus.publish(BusMessage::new(publish.topic, payload, "mqtt".to_string())) {
                    log_error!("Failed to forward MQTT message: {}", e);
                }
            }
            Ok(event) => tracing::trace!(?event, "mqtt event"),
            Err(e) => {
                log_error!("❌ MQTT connection lost: {}", e);
                if let Err(e) = bus.publish_app_event(CONNECTION_LOST_EVENT, &e.to_string()) {
                    log_error!("Failed to report MQTT connection loss: {}", e);
                }
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::io::bus::app_event_topic;

    #[tokio::test]
    async fn test_local_publisher_loops_back() {
        let bus = MessageBus::new();
        let mut rx = bus.subscribe("screen");
        let manager = ConnectionManager::local(bus);

        manager.publisher().publish("screen", "setPipe/bath/off".to_string()).unwrap();

        let msg = rx.recv().await.unwrap();
        assert_eq!(msg.payload, "setPipe/bath/off");
        assert_eq!(msg.source, "smartbath_panel");
    }

    #[tokio::test]
    async fn test_connect_in_local_mode_needs_no_network() {
        let config = BrokerConfig {
            mode: BrokerMode::Local,
            host: String::new(),
            ..BrokerConfig::default()
        };

        let manager = ConnectionManager::connect(&config, "screen", MessageBus::new()).await;

        assert!(manager.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_broker_fails_connect() {
        let config = BrokerConfig {
            mode: BrokerMode::Mqtt,
            host: "127.0.0.1".to_string(),
            port: 1,
            ..BrokerConfig::default()
        };

        let result = ConnectionManager::connect(&config, "screen", MessageBus::new()).await;

        assert!(result.is_err());
    }

    /// Accepts one client, answers its CONNECT with a CONNACK, then hangs up.
    async fn broker_that_hangs_up() -> u16 {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = socket.read(&mut buf).await.unwrap();
            socket.write_all(&[0x20, 0x02, 0x00, 0x00]).await.unwrap();
            socket.flush().await.unwrap();
        });
        port
    }

    #[tokio::test]
    async fn test_broker_hangup_reports_connection_lost() {
        let port = broker_that_hangs_up().await;
        let bus = MessageBus::new();
        let mut lost = bus.subscribe(app_event_topic(CONNECTION_LOST_EVENT));
        let config = BrokerConfig {
            mode: BrokerMode::Mqtt,
            host: "127.0.0.1".to_string(),
            port,
            ..BrokerConfig::default()
        };

        let mut manager = ConnectionManager::connect(&config, "screen", bus).await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), lost.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(!event.payload.is_empty());

        manager.listener.take().unwrap().await.unwrap();
        let result = manager.publisher().publish("screen", "setPipe/bath/off".to_string());
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_connection_lost_event_topic() {
        let bus = MessageBus::new();
        let mut rx = bus.subscribe(app_event_topic(CONNECTION_LOST_EVENT));

        bus.publish_app_event(CONNECTION_LOST_EVENT, "broken pipe").unwrap();

        assert_eq!(rx.recv().await.unwrap().payload, "broken pipe");
    }
}
