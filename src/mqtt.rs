//! MQTT command source
//!
//! Subscribes to a topic; every payload is one JSON command array or an array
//! of them. Parsed commands are forwarded to the frame loop. There is no reply
//! channel, so query results are discarded.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use rumqttc::{Client, Event, MqttOptions, Packet, QoS};

use crate::command::Command;
use crate::script::parse_batch;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 1883;
pub const DEFAULT_TOPIC: &str = "softraster/cmd";

/// MQTT client that receives commands in a background thread
pub struct MqttClient {
    receiver: Receiver<Command>,
    _thread: thread::JoinHandle<()>,
}

impl MqttClient {
    /// Connect and subscribe. Fails immediately if the broker is unreachable.
    pub fn new(host: &str, port: u16, topic: &str) -> Result<Self, String> {
        let host = if host.is_empty() { DEFAULT_HOST } else { host };
        let topic = if topic.is_empty() { DEFAULT_TOPIC } else { topic };

        let mut options = MqttOptions::new("softraster", host, port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut connection) = Client::new(options, 10);
        client
            .subscribe(topic, QoS::AtMostOnce)
            .map_err(|e| format!("Failed to subscribe to topic '{}': {}", topic, e))?;

        match connection.iter().next() {
            Some(Ok(_)) => {},
            Some(Err(e)) => {
                return Err(format!("Failed to connect to MQTT broker at {}:{} - {}", host, port, e));
            },
            None => {
                return Err(format!(
                    "Failed to connect to MQTT broker at {}:{} - connection closed",
                    host, port
                ));
            },
        }

        let (sender, receiver) = mpsc::channel();
        let topic_owned = topic.to_string();
        let handle = thread::spawn(move || {
            // keep the client alive for the lifetime of the connection
            let _client = client;
            Self::message_loop(connection, &sender, &topic_owned);
        });

        log::info!("MQTT: connected to {}:{}, subscribed to '{}'", host, port, topic);
        Ok(Self {
            receiver,
            _thread: handle,
        })
    }

    fn message_loop(mut connection: rumqttc::Connection, sender: &Sender<Command>, topic: &str) {
        for event in connection.iter() {
            match event {
                Ok(Event::Incoming(Packet::Publish(publish))) if publish.topic == topic => {
                    for cmd in decode_payload(&publish.payload) {
                        if sender.send(cmd).is_err() {
                            return;
                        }
                    }
                },
                Ok(_) => {},
                Err(e) => {
                    // rumqttc reconnects on the next iteration
                    log::warn!("MQTT error: {}", e);
                    thread::sleep(Duration::from_secs(1));
                },
            }
        }
    }

    /// All commands received since the last poll (non-blocking)
    pub fn poll(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }
}

/// Commands in one payload; malformed payloads are logged and dropped whole
pub fn decode_payload(payload: &[u8]) -> Vec<Command> {
    let parsed = serde_json::from_slice(payload)
        .map_err(crate::error::ScriptError::from)
        .and_then(|v| parse_batch(&v));
    match parsed {
        Ok(cmds) => cmds,
        Err(e) => {
            log::warn!("dropped MQTT payload: {}", e);
            Vec::new()
        },
    }
}
