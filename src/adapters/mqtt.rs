//! MQTT bus adapter.
//!
//! Implements [`BusPort`] on top of the ESP-IDF MQTT client.  Inbound
//! traffic never touches the controller directly: a dedicated `mqtt-poll`
//! thread copies connection events and messages into
//! [`bus::channels`](crate::bus::channels) and the control loop drains
//! them between ticks.
//!
//! The session registers a retained last will of `1` on `<ns>/offline`
//! so peers notice an unclean drop.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//! - **all other targets**: an in-memory recorder used by host tests.

use log::{debug, info, warn};

use crate::app::ports::BusPort;
use crate::bus::topics::Topic;
use crate::error::CommsError;

/// Payload of the last-will message.
pub const WILL_PAYLOAD: &[u8] = b"1";

/// Connection parameters for one broker session.
#[derive(Debug, Clone, Copy)]
pub struct BusOptions<'a> {
    pub broker_url: &'a str,
    pub client_id: &'a str,
    pub will_topic: &'a str,
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod platform {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use esp_idf_svc::mqtt::client::{
        EspMqttClient, EspMqttConnection, EventPayload, LwtConfiguration, MqttClientConfiguration,
        QoS,
    };
    use log::{debug, info, warn};

    use super::{BusOptions, WILL_PAYLOAD};
    use crate::bus::channels::{self, BusEvent};
    use crate::error::CommsError;

    const POLL_STACK_SIZE: usize = 8192;

    pub struct Session {
        client: EspMqttClient<'static>,
        connected: Arc<AtomicBool>,
    }

    impl Session {
        pub fn open(opts: &BusOptions<'_>) -> Result<Self, CommsError> {
            let conf = MqttClientConfiguration {
                client_id: Some(opts.client_id),
                lwt: Some(LwtConfiguration {
                    topic: opts.will_topic,
                    payload: WILL_PAYLOAD,
                    qos: QoS::AtLeastOnce,
                    retain: true,
                }),
                ..Default::default()
            };

            let (client, conn) = EspMqttClient::new(opts.broker_url, &conf).map_err(|e| {
                warn!("MQTT: client init failed: {e:?}");
                CommsError::MqttConnectFailed
            })?;

            let connected = Arc::new(AtomicBool::new(false));
            let flag = connected.clone();
            thread::Builder::new()
                .name("mqtt-poll".into())
                .stack_size(POLL_STACK_SIZE)
                .spawn(move || poll_loop(conn, &flag))
                .map_err(|_| CommsError::MqttConnectFailed)?;

            info!("MQTT: session opened to {} as {}", opts.broker_url, opts.client_id);
            Ok(Self { client, connected })
        }

        pub fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Acquire)
        }

        pub fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), CommsError> {
            let qos = if retain { QoS::AtLeastOnce } else { QoS::AtMostOnce };
            self.client
                .enqueue(topic, qos, retain, payload)
                .map(|_| ())
                .map_err(|e| {
                    debug!("MQTT: enqueue {topic} failed: {e:?}");
                    CommsError::MqttPublishFailed
                })
        }

        pub fn subscribe(&mut self, filter: &str) -> Result<(), CommsError> {
            self.client
                .subscribe(filter, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|e| {
                    debug!("MQTT: subscribe {filter} failed: {e:?}");
                    CommsError::MqttSubscribeFailed
                })
        }
    }

    fn poll_loop(mut conn: EspMqttConnection, connected: &AtomicBool) {
        loop {
            match conn.next() {
                Ok(event) => {
                    let forwarded = match event.payload() {
                        EventPayload::Connected(_) => {
                            connected.store(true, Ordering::Release);
                            Some(BusEvent::Connected)
                        }
                        EventPayload::Disconnected => {
                            connected.store(false, Ordering::Release);
                            Some(BusEvent::Disconnected)
                        }
                        EventPayload::Received { topic: Some(topic), data, .. } => {
                            let msg = BusEvent::message(topic, data);
                            if msg.is_none() {
                                debug!("MQTT: dropped oversize message on {topic}");
                            }
                            msg
                        }
                        _ => None,
                    };
                    if let Some(ev) = forwarded {
                        if !channels::post(ev) {
                            warn!("MQTT: event channel full, message dropped");
                        }
                    }
                }
                Err(e) => {
                    warn!("MQTT: connection closed: {e:?}");
                    connected.store(false, Ordering::Release);
                    let _ = channels::post(BusEvent::Disconnected);
                    thread::sleep(Duration::from_secs(2));
                }
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host recorder
// ───────────────────────────────────────────────────────────────

/// One outbound publish captured by the host recorder.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub topic: String,
    pub payload: Vec<u8>,
    pub retain: bool,
}

#[cfg(not(target_os = "espidf"))]
mod platform {
    use log::info;

    use super::{BusOptions, Published};
    use crate::error::CommsError;

    pub struct Session {
        pub(super) connected: bool,
        pub(super) will_topic: String,
        pub(super) published: Vec<Published>,
        pub(super) subscriptions: Vec<String>,
    }

    impl Session {
        pub fn open(opts: &BusOptions<'_>) -> Result<Self, CommsError> {
            if opts.broker_url.is_empty() {
                return Err(CommsError::MqttConnectFailed);
            }
            info!("MQTT(sim): session to {} as {}", opts.broker_url, opts.client_id);
            Ok(Self {
                connected: true,
                will_topic: opts.will_topic.into(),
                published: Vec::new(),
                subscriptions: Vec::new(),
            })
        }

        pub fn is_connected(&self) -> bool {
            self.connected
        }

        pub fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), CommsError> {
            self.published.push(Published {
                topic: topic.into(),
                payload: payload.to_vec(),
                retain,
            });
            Ok(())
        }

        pub fn subscribe(&mut self, filter: &str) -> Result<(), CommsError> {
            self.subscriptions.push(filter.into());
            Ok(())
        }
    }
}

// ───────────────────────────────────────────────────────────────
// MqttBus
// ───────────────────────────────────────────────────────────────

pub struct MqttBus {
    session: platform::Session,
    will_topic: Topic,
}

impl MqttBus {
    /// Start the client.  The broker session comes up asynchronously; a
    /// [`BusEvent::Connected`](crate::bus::channels::BusEvent) follows.
    pub fn connect(opts: &BusOptions<'_>) -> Result<Self, CommsError> {
        let mut will_topic = Topic::new();
        will_topic
            .push_str(opts.will_topic)
            .map_err(|_| CommsError::MqttConnectFailed)?;
        let session = platform::Session::open(opts)?;
        Ok(Self { session, will_topic })
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn will_topic(&self) -> &str {
        &self.will_topic
    }
}

#[cfg(not(target_os = "espidf"))]
impl MqttBus {
    /// Simulate the broker dropping or restoring the session.
    pub fn sim_set_connected(&mut self, connected: bool) {
        self.session.connected = connected;
    }

    pub fn sim_published(&self) -> &[Published] {
        &self.session.published
    }

    pub fn sim_subscriptions(&self) -> &[String] {
        &self.session.subscriptions
    }

    pub fn sim_will_topic(&self) -> &str {
        &self.session.will_topic
    }
}

impl BusPort for MqttBus {
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), CommsError> {
        if !self.session.is_connected() {
            return Err(CommsError::NotConnected);
        }
        debug!("MQTT: -> {} ({} bytes{})", topic, payload.len(), if retain { ", retained" } else { "" });
        self.session.publish(topic, payload, retain)
    }

    fn subscribe(&mut self, filter: &str) -> Result<(), CommsError> {
        if !self.session.is_connected() {
            return Err(CommsError::NotConnected);
        }
        info!("MQTT: subscribe {}", filter);
        self.session.subscribe(filter).inspect_err(|e| warn!("MQTT: {e}"))
    }
}
