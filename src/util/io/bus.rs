// src/util/io/bus.rs

//! Message Bus - in-process topic fan-out between the broker connection and the app
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

use crate::error::{PanelError, Result};
use crate::log_debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub topic: String,
    pub payload: String,
    pub source: String,
    pub timestamp: u64,
}

impl BusMessage {
    pub fn new(topic: String, payload: String, source: String) -> Self {
        Self {
            topic,
            payload,
            source,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        }
    }
}

pub type BusReceiver = mpsc::UnboundedReceiver<BusMessage>;
pub type BusSender = mpsc::UnboundedSender<BusMessage>;

#[derive(Debug, Clone, Default)]
pub struct MessageBus {
    // Shared so every clone fans out to the same subscribers
    subscribers: Arc<RwLock<HashMap<String, Vec<BusSender>>>>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver to every live subscriber of `message.topic`. Subscribers whose
    /// receiver was dropped are pruned. A topic nobody listens on is not an error.
    pub fn publish(&self, message: BusMessage) -> Result<()> {
        let mut subscribers = self
            .subscribers
            .write()
            .map_err(|_| PanelError::Publish("message bus lock poisoned".to_string()))?;

        if let Some(subs) = subscribers.get_mut(&message.topic) {
            subs.retain(|subscriber| subscriber.send(message.clone()).is_ok());
        }

        Ok(())
    }

    pub fn subscribe(&self, topic: impl Into<String>) -> BusReceiver {
        let (sender, receiver) = mpsc::unbounded_channel();

        if let Ok(mut subscribers) = self.subscribers.write() {
            subscribers
                .entry(topic.into())
                .or_insert_with(Vec::new)
                .push(sender);
        }

        receiver
    }

    /// Publish an app event to the bus with a standardized topic format
    pub fn publish_app_event(&self, event_name: &str, payload: &str) -> Result<()> {
        let topic = app_event_topic(event_name);
        log_debug!("topic: {}", &topic);
        log_debug!("payload: {}", &payload);
        let message = BusMessage::new(topic, payload.to_string(), "smartbath_panel".to_string());
        self.publish(message)
    }
}

pub fn app_event_topic(event_name: &str) -> String {
    format!("app.event.{}", event_name)
}
