use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tungstenite::client::IntoClientRequest;
use tungstenite::error::UrlError;
use tungstenite::{HandshakeError, Message, WebSocket};

use crate::config::LinkSettings;

pub const ONLINE_PAYLOAD: &str = "online";

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("link is not connected")]
    NotConnected,
    #[error("websocket: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

/// Message channel carrying commands in and presence out.
pub trait CommandLink {
    fn is_connected(&self) -> bool;

    /// Re-establish the connection if it was lost. Never blocks for long.
    fn maintain(&mut self) {}

    /// Next inbound payload, if one is waiting.
    fn receive(&mut self) -> Option<Vec<u8>>;

    fn publish(&mut self, payload: &str) -> Result<(), LinkError>;
}

type Socket = WebSocket<TcpStream>;

/// WebSocket client: every text or binary frame from the server is a command.
pub struct WsLink {
    url: String,
    reconnect_every: Duration,
    connect_timeout: Duration,
    read_timeout: Duration,
    socket: Option<Socket>,
    last_attempt: Option<Instant>,
}

impl WsLink {
    pub fn new(settings: &LinkSettings) -> Self {
        WsLink {
            url: settings.url.clone(),
            reconnect_every: Duration::from_secs(settings.reconnect_secs),
            connect_timeout: Duration::from_millis(settings.connect_timeout_ms.max(1)),
            read_timeout: Duration::from_millis(settings.read_timeout_ms.max(1)),
            socket: None,
            last_attempt: None,
        }
    }

    /// Connects and handshakes, each step bounded by `connect_timeout`, then
    /// switches the socket to the short read timeout used for polling.
    fn open(&self) -> Result<Socket, LinkError> {
        let request = self.url.as_str().into_client_request()?;
        let uri = request.uri();
        if uri.scheme_str() != Some("ws") {
            return Err(tungstenite::Error::Url(UrlError::UnsupportedUrlScheme).into());
        }
        let host = uri.host().ok_or(tungstenite::Error::Url(UrlError::NoHostName))?;
        let port = uri.port_u16().unwrap_or(80);

        let stream = self.connect_any((host, port))?;
        stream.set_read_timeout(Some(self.connect_timeout)).map_err(tungstenite::Error::Io)?;
        stream.set_write_timeout(Some(self.connect_timeout)).map_err(tungstenite::Error::Io)?;

        let (socket, _response) = match tungstenite::client(request, stream) {
            Ok(done) => done,
            Err(HandshakeError::Failure(e)) => return Err(e.into()),
            Err(HandshakeError::Interrupted(_)) => {
                let timeout = io::Error::new(io::ErrorKind::TimedOut, "handshake timed out");
                return Err(tungstenite::Error::Io(timeout).into());
            }
        };
        socket.get_ref().set_read_timeout(Some(self.read_timeout)).map_err(tungstenite::Error::Io)?;
        Ok(socket)
    }

    fn connect_any(&self, address: impl ToSocketAddrs) -> Result<TcpStream, LinkError> {
        let mut last_error = io::Error::new(io::ErrorKind::NotFound, "no address resolved");
        for addr in address.to_socket_addrs().map_err(tungstenite::Error::Io)? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_error = e,
            }
        }
        Err(tungstenite::Error::Io(last_error).into())
    }

    fn drop_socket(&mut self, reason: &dyn std::fmt::Display) {
        if self.socket.take().is_some() {
            log::warn!("Link to {} lost: {}", self.url, reason);
        }
    }
}

impl CommandLink for WsLink {
    fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    fn maintain(&mut self) {
        if self.socket.is_some() {
            return;
        }
        if let Some(last) = self.last_attempt {
            if last.elapsed() < self.reconnect_every {
                return;
            }
        }
        self.last_attempt = Some(Instant::now());

        log::info!("Connecting to {}", self.url);
        match self.open() {
            Ok(socket) => {
                log::info!("Link connected to {}", self.url);
                self.socket = Some(socket);
            }
            Err(e) => log::warn!("Connection to {} failed: {}", self.url, e),
        }
    }

    fn receive(&mut self) -> Option<Vec<u8>> {
        let socket = self.socket.as_mut()?;
        loop {
            match socket.read() {
                Ok(Message::Text(text)) => return Some(text.into_bytes()),
                Ok(Message::Binary(data)) => return Some(data),
                Ok(Message::Close(_)) => {
                    self.drop_socket(&"closed by server");
                    return None;
                }
                // pings are answered by tungstenite itself
                Ok(_) => continue,
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    return None;
                }
                Err(e) => {
                    self.drop_socket(&e);
                    return None;
                }
            }
        }
    }

    fn publish(&mut self, payload: &str) -> Result<(), LinkError> {
        let socket = self.socket.as_mut().ok_or(LinkError::NotConnected)?;
        match socket.send(Message::Text(payload.to_string())) {
            Ok(()) => Ok(()),
            Err(e) => {
                let message = e.to_string();
                self.drop_socket(&message);
                Err(LinkError::WebSocket(e))
            }
        }
    }
}

/// Paces the presence message.
#[derive(Debug)]
pub struct Heartbeat {
    interval: Duration,
    last_sent: Duration,
}

impl Heartbeat {
    pub fn new(interval: Duration) -> Self {
        Heartbeat { interval, last_sent: Duration::ZERO }
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now.saturating_sub(self.last_sent) > self.interval
    }

    pub fn sent(&mut self, now: Duration) {
        self.last_sent = now;
    }
}
