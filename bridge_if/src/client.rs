//! # Bridge protocol client
//!
//! A minimal client for the robot's publish/subscribe bridge. The client owns
//! a persistent websocket channel and moves through a simple lifecycle:
//!
//! `Disconnected -> Connected -> Disconnected`
//!
//! Connection attempts use a bounded timeout. Publishes are fire-and-forget:
//! no acknowledgement is awaited and no retry is attempted. A mid-session
//! send failure drops the channel and the session returns to `Disconnected`,
//! leaving reconnection to the caller. Frames are sent on the channel in the
//! order the methods are invoked.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tungstenite::{Message, WebSocket};

// Internal
use crate::msg::OutboundMessage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Client end of the bridge protocol session.
pub struct BridgeClient {
    /// Port the bridge listens on.
    port: u16,

    options: ClientOptions,

    /// The websocket channel, present only while connected.
    channel: Option<WebSocket<TcpStream>>,

    /// Topics advertised on the current connection. Cleared on disconnect,
    /// since an advertisement does not outlive its channel.
    advertised: HashSet<String>,
}

/// Network parameters for the bridge connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetParams {
    /// Port the bridge listens on.
    pub bridge_port: u16,

    /// Maximum time to wait for the connection and handshake.
    ///
    /// Units: milliseconds
    pub connect_timeout_ms: u64,

    /// Maximum time a single frame write may block.
    ///
    /// Units: milliseconds
    pub send_timeout_ms: u64,
}

/// Options controlling the bridge channel.
pub struct ClientOptions {
    /// Maximum time to wait for the TCP connection and websocket handshake.
    pub connect_timeout: Duration,

    /// Maximum time a single frame write may block once connected.
    pub send_timeout: Duration,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised by the [`BridgeClient`].
///
/// All of these are expected conditions reported as values, none of them
/// panic. `NotConnected` and `NotAdvertised` leave the session untouched,
/// `SendFailed` transitions the session to disconnected.
#[derive(Debug, thiserror::Error)]
pub enum BridgeClientError {
    #[error("Could not connect to the bridge at {0}: {1}")]
    ConnectionFailed(String, std::io::Error),

    #[error("Could not resolve the bridge endpoint {0}")]
    EndpointResolutionFailed(String),

    #[error("Websocket handshake with {0} failed: {1}")]
    HandshakeFailed(String, String),

    #[error("The bridge is not connected")]
    NotConnected,

    #[error("Topic {0:?} has not been advertised on this connection")]
    NotAdvertised(String),

    #[error("Failed to send a frame to the bridge: {0}")]
    SendFailed(tungstenite::Error),

    #[error("Could not serialise an outbound frame: {0}")]
    SerialiseError(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl BridgeClient {
    /// Create a new client in the disconnected state.
    pub fn new(port: u16, options: ClientOptions) -> Self {
        Self {
            port,
            options,
            channel: None,
            advertised: HashSet::new(),
        }
    }

    /// Return whether the session is currently connected.
    pub fn is_connected(&self) -> bool {
        self.channel.is_some()
    }

    /// Attempt a timed connection and handshake with the bridge at `host`.
    ///
    /// On failure the session remains disconnected and the error is returned
    /// for the caller to report. An existing connection is closed first, so
    /// `connect` may also be used to re-target the session.
    pub fn connect(&mut self, host: &str) -> Result<(), BridgeClientError> {
        if self.is_connected() {
            self.disconnect();
        }

        let endpoint = format!("{}:{}", host, self.port);

        // Resolve and connect with a bounded timeout
        let addr = endpoint
            .to_socket_addrs()
            .map_err(|e| BridgeClientError::ConnectionFailed(endpoint.clone(), e))?
            .next()
            .ok_or_else(|| BridgeClientError::EndpointResolutionFailed(endpoint.clone()))?;

        let stream = TcpStream::connect_timeout(&addr, self.options.connect_timeout)
            .map_err(|e| BridgeClientError::ConnectionFailed(endpoint.clone(), e))?;

        // The handshake response read is bounded by the connect timeout, the
        // session itself by the send timeout.
        stream
            .set_read_timeout(Some(self.options.connect_timeout))
            .map_err(|e| BridgeClientError::ConnectionFailed(endpoint.clone(), e))?;
        stream
            .set_write_timeout(Some(self.options.send_timeout))
            .map_err(|e| BridgeClientError::ConnectionFailed(endpoint.clone(), e))?;

        let url = format!("ws://{}/", endpoint);

        let (channel, _response) = tungstenite::client::client(url.as_str(), stream)
            .map_err(|e| BridgeClientError::HandshakeFailed(endpoint.clone(), e.to_string()))?;

        self.channel = Some(channel);

        info!("Connected to the bridge at {}", url);

        Ok(())
    }

    /// Close the channel and return to the disconnected state.
    ///
    /// Always safe to call, repeated calls have no additional effect.
    pub fn disconnect(&mut self) {
        if let Some(mut channel) = self.channel.take() {
            channel.close(None).ok();
            channel.flush().ok();
            info!("Disconnected from the bridge");
        }

        self.advertised.clear();
    }

    /// Declare a topic and its payload type to the bridge.
    ///
    /// Valid only while connected, a disconnected advertise is a reported
    /// no-op that changes no state.
    pub fn advertise(&mut self, topic: &str, type_name: &str) -> Result<(), BridgeClientError> {
        if !self.is_connected() {
            warn!("Cannot advertise {:?}: not connected", topic);
            return Err(BridgeClientError::NotConnected);
        }

        self.send(&OutboundMessage::Advertise {
            topic: topic.into(),
            type_name: type_name.into(),
        })?;

        self.advertised.insert(topic.into());

        Ok(())
    }

    /// Publish a payload on a previously advertised topic.
    ///
    /// Publishing while disconnected or on an unadvertised topic is rejected
    /// with an error and changes no state.
    pub fn publish<M: Serialize>(&mut self, topic: &str, msg: &M) -> Result<(), BridgeClientError> {
        if !self.is_connected() {
            warn!("Cannot publish on {:?}: not connected", topic);
            return Err(BridgeClientError::NotConnected);
        }

        if !self.advertised.contains(topic) {
            warn!("Cannot publish on {:?}: topic not advertised", topic);
            return Err(BridgeClientError::NotAdvertised(topic.into()));
        }

        let payload = serde_json::to_value(msg).map_err(BridgeClientError::SerialiseError)?;

        self.send(&OutboundMessage::Publish {
            topic: topic.into(),
            msg: payload,
        })
    }

    /// Serialise and send one frame on the channel.
    ///
    /// A failed send drops the channel, transitioning the session to
    /// disconnected.
    fn send(&mut self, msg: &OutboundMessage) -> Result<(), BridgeClientError> {
        let frame = serde_json::to_string(msg).map_err(BridgeClientError::SerialiseError)?;

        let channel = match self.channel.as_mut() {
            Some(c) => c,
            None => return Err(BridgeClientError::NotConnected),
        };

        match channel.send(Message::Text(frame)) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("Send to the bridge failed, dropping the connection: {}", e);
                self.channel = None;
                self.advertised.clear();
                Err(BridgeClientError::SendFailed(e))
            }
        }
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(3),
            send_timeout: Duration::from_secs(1),
        }
    }
}

impl Default for NetParams {
    fn default() -> Self {
        Self {
            bridge_port: 9090,
            connect_timeout_ms: 3000,
            send_timeout_ms: 1000,
        }
    }
}

impl From<&NetParams> for ClientOptions {
    fn from(params: &NetParams) -> Self {
        Self {
            connect_timeout: Duration::from_millis(params.connect_timeout_ms),
            send_timeout: Duration::from_millis(params.send_timeout_ms),
        }
    }
}
