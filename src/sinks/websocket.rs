// src/sinks/websocket.rs

//! Sink relaying log events to a remote WebSocket endpoint.
//!
//! The sink owns one connection thread: a blocking [`tungstenite`]
//! client that reconnects automatically with backoff, sends keepalive
//! pings, relays MessagePack-encoded records queued by `append`, and
//! accepts inbound control frames. A `connected` flag gates `append`, so
//! producer threads pay nothing while the endpoint is unreachable.
//!
//! ## Wire format
//!
//! Outbound: one binary frame per event, a MessagePack map whose fields
//! follow the sink's directive list; `file_name`/`function_name`/`line`
//! are present only when the `loc` template references the corresponding
//! placeholder.
//!
//! Inbound control: a JSON text frame
//! `{"command": "SET_LEVEL", "level": "<name>"}` updates the sink's
//! threshold level; the sink replies with a system notice frame.
//!
//! [`tungstenite`]: https://docs.rs/tungstenite/

use crate::common::{Bytes, FPath, LogError, LogResult};
use crate::data::datetime::datetime_to_string;
use crate::data::event::{LogEvent, LogEventP, Tid};
use crate::data::level::{AtomicLogLevel, LogLevel};
use crate::format::directive::{
    Directive,
    LOC_PLACEHOLDER_FILE_NAME,
    LOC_PLACEHOLDER_FUNCTION_NAME,
    LOC_PLACEHOLDER_LINE,
};
use crate::format::factory::ComponentFactory;
use crate::format::formatter::Formatter;
use crate::settings::{Settings, WsEndpoint, SETTINGS_FILE_PATH};
use crate::sinks::{FormatterCell, Sink};
use crate::{de_err, de_wrn, e_err};

use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

extern crate crossbeam_channel;
use crossbeam_channel::{Receiver, Sender};

extern crate serde;
use serde::Serialize;

#[allow(unused_imports)]
use ::si_trace_print::{defn, defo, defx};

extern crate tungstenite;
use tungstenite::handshake::HandshakeError;
use tungstenite::{Message, WebSocket};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// WebSocketSink
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// How long the connection thread blocks in one socket read before
/// re-checking the outbound queue, keepalive timer, and shutdown flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// First reconnect delay after a connection failure.
const RECONNECT_DELAY_INITIAL: Duration = Duration::from_millis(500);

/// Reconnect delay ceiling.
const RECONNECT_DELAY_MAX: Duration = Duration::from_secs(5);

/// State shared between the sink handle and its connection thread.
struct WsShared {
    endpoint: WsEndpoint,
    /// gates `append`; only the connection thread stores `true`
    connected: AtomicBool,
    /// set once by `Drop`
    shutdown: AtomicBool,
    /// sink-local threshold, updated by inbound `SET_LEVEL` frames
    threshold: AtomicLogLevel,
}

/// Sink relaying MessagePack-encoded log events to a WebSocket server.
pub struct WebSocketSink {
    formatter: FormatterCell,
    shared: Arc<WsShared>,
    outbound: Sender<Bytes>,
    worker: Mutex<Option<thread::JoinHandle<()>>>,
}

impl WebSocketSink {
    /// A sink connecting to `url` (`ws://host:port/path`).
    ///
    /// `ping_interval` and `handshake_timeout` are in seconds;
    /// `ping_interval == 0` disables keepalive pings.
    pub fn new(
        url: &str,
        message_deflate_en: bool,
        ping_interval: u64,
        handshake_timeout: u64,
    ) -> LogResult<WebSocketSink> {
        WebSocketSink::from_endpoint(WsEndpoint {
            url: url.to_string(),
            message_deflate_en,
            ping_interval,
            handshake_timeout,
        })
    }

    /// A sink over `websocket[0]` of the settings document at
    /// [`SETTINGS_FILE_PATH`].
    pub fn from_settings() -> LogResult<WebSocketSink> {
        WebSocketSink::from_settings_path(&FPath::from(SETTINGS_FILE_PATH))
    }

    /// Like [`from_settings`] but reading the document at `path`.
    ///
    /// Unlike the formatter defaults, a websocket endpoint cannot be
    /// invented: a missing file or a missing/empty `websocket` array is
    /// [`InvalidParameter`].
    ///
    /// [`from_settings`]: WebSocketSink::from_settings
    /// [`InvalidParameter`]: crate::common::LogError#variant.InvalidParameter
    pub fn from_settings_path(path: &FPath) -> LogResult<WebSocketSink> {
        let settings: Settings = match Settings::from_path(path)? {
            Some(val) => val,
            None => {
                return Err(LogError::InvalidParameter(format!(
                    "cannot open settings file: {}",
                    path,
                )));
            }
        };
        let endpoint: WsEndpoint = match settings
            .websocket
            .and_then(|endpoints| endpoints.into_iter().next())
        {
            Some(val) => val,
            None => {
                return Err(LogError::InvalidParameter(format!(
                    "websocket config not found in {}",
                    path,
                )));
            }
        };

        WebSocketSink::from_endpoint(endpoint)
    }

    pub fn from_endpoint(endpoint: WsEndpoint) -> LogResult<WebSocketSink> {
        defn!("({:?})", endpoint.url);
        // validate the URL now; the connection thread only retries
        host_port_of(&endpoint.url)?;
        if endpoint.message_deflate_en {
            de_wrn!(
                "permessage-deflate requested for {:?} but not supported by the transport; \
                 continuing without compression",
                endpoint.url,
            );
        }

        let shared: Arc<WsShared> = Arc::new(WsShared {
            endpoint,
            connected: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            threshold: AtomicLogLevel::new(LogLevel::Debug),
        });
        let (outbound_s, outbound_r) = crossbeam_channel::unbounded::<Bytes>();

        let shared_thread: Arc<WsShared> = shared.clone();
        let handle: thread::JoinHandle<()> = match thread::Builder::new()
            .name("sallib-websocket".to_string())
            .spawn(move || run_connection(shared_thread, outbound_r))
        {
            Ok(val) => val,
            Err(err) => {
                return Err(LogError::Transport(format!(
                    "cannot spawn websocket connection thread: {}",
                    err,
                )));
            }
        };
        defx!();

        Ok(WebSocketSink {
            formatter: FormatterCell::default(),
            shared,
            outbound: outbound_s,
            worker: Mutex::new(Some(handle)),
        })
    }

    /// Same sink with `formatter` pre-installed.
    pub fn with_formatter(
        self,
        formatter: Formatter,
    ) -> WebSocketSink {
        self.formatter
            .replace(formatter);

        self
    }

    /// The sink-local threshold; events strictly below it are not
    /// relayed. Remote `SET_LEVEL` frames update this.
    pub fn threshold_level(&self) -> LogLevel {
        self.shared
            .threshold
            .load()
    }

    pub fn set_threshold_level(
        &self,
        level: LogLevel,
    ) {
        self.shared
            .threshold
            .store(level);
    }

    /// `true` while the connection thread holds an open connection.
    pub fn is_connected(&self) -> bool {
        self.shared
            .connected
            .load(Ordering::Acquire)
    }

    /// The configured endpoint URL.
    pub fn url(&self) -> &str {
        self.shared
            .endpoint
            .url
            .as_str()
    }
}

impl Sink for WebSocketSink {
    fn append(
        &self,
        event: &LogEventP,
    ) -> LogResult<()> {
        if !self.is_connected() {
            return Ok(());
        }
        if event.level()
            < self
                .shared
                .threshold
                .load()
        {
            return Ok(());
        }

        let payload: Bytes = self
            .formatter
            .with(|formatter| build_record(formatter.factory(), event))?;
        self.outbound
            .send(payload)
            .map_err(|_| LogError::Transport("websocket connection thread is gone".to_string()))
    }

    /// Nothing to flush; frames are handed to the connection thread as
    /// they arrive.
    fn flush(&self) -> LogResult<()> {
        Ok(())
    }

    fn set_formatter(
        &self,
        formatter: Formatter,
    ) {
        self.formatter
            .replace(formatter);
    }
}

impl Drop for WebSocketSink {
    fn drop(&mut self) {
        self.shared
            .shutdown
            .store(true, Ordering::Release);
        let handle_opt = self
            .worker
            .lock()
            .unwrap()
            .take();
        if let Some(handle) = handle_opt {
            if handle.join().is_err() {
                e_err!("websocket connection thread panicked");
            }
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// outbound record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// The outbound MessagePack map. Absent options are not serialized.
#[derive(Debug, Default, Serialize)]
struct WsLogRecord<'ev> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    level: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tid: Option<Tid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    function_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<&'ev str>,
}

/// Encode `event` following the directive list: a field is present when
/// its directive is, and loc subfields only when the template references
/// the corresponding placeholder.
pub(crate) fn build_record(
    factory: &ComponentFactory,
    event: &LogEvent,
) -> LogResult<Bytes> {
    let mut record: WsLogRecord = WsLogRecord::default();
    for directive in factory.directives().iter() {
        match directive {
            Directive::Timestamp => {
                record.timestamp = Some(format!("[{}]", datetime_to_string(event.timestamp())));
            }
            Directive::Level => {
                record.level = Some(event.level().as_str());
            }
            Directive::ThreadId => {
                record.tid = Some(event.thread_id());
            }
            Directive::SourceLocation(template) => {
                if template.contains(LOC_PLACEHOLDER_FILE_NAME) {
                    record.file_name = Some(
                        event
                            .source_location()
                            .file_name(),
                    );
                }
                if template.contains(LOC_PLACEHOLDER_FUNCTION_NAME) {
                    record.function_name = Some(
                        event
                            .source_location()
                            .function_name(),
                    );
                }
                if template.contains(LOC_PLACEHOLDER_LINE) {
                    record.line = Some(
                        event
                            .source_location()
                            .line(),
                    );
                }
            }
            Directive::Message => {
                record.msg = Some(event.msg());
            }
            Directive::Color(_) | Directive::Text(_) => {}
        }
    }

    match rmp_serde::to_vec_named(&record) {
        Ok(val) => Ok(val),
        Err(err) => Err(LogError::Transport(format!("msgpack encode failed: {}", err))),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// connection thread
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// `(host, port)` of a `ws://host[:port][/path]` URL.
pub(crate) fn host_port_of(url: &str) -> LogResult<(String, u16)> {
    let rest: &str = match url.strip_prefix("ws://") {
        Some(val) => val,
        None => {
            return Err(LogError::InvalidParameter(format!(
                "only ws:// URLs are supported, got {:?}",
                url,
            )));
        }
    };
    let authority: &str = match rest.find('/') {
        Some(at) => &rest[..at],
        None => rest,
    };
    let (host, port): (&str, u16) = match authority.rsplit_once(':') {
        Some((host, port_s)) => {
            let port: u16 = match port_s.parse::<u16>() {
                Ok(val) => val,
                Err(_) => {
                    return Err(LogError::InvalidParameter(format!(
                        "bad port in websocket URL {:?}",
                        url,
                    )));
                }
            };
            (host, port)
        }
        None => (authority, 80),
    };
    if host.is_empty() {
        return Err(LogError::InvalidParameter(format!("no host in websocket URL {:?}", url)));
    }

    Ok((host.to_string(), port))
}

/// Connect with the endpoint's handshake timeout, then drop the stream
/// read timeout to [`POLL_INTERVAL`] so the serve loop stays responsive.
fn connect_endpoint(endpoint: &WsEndpoint) -> LogResult<WebSocket<TcpStream>> {
    let (host, port) = host_port_of(&endpoint.url)?;
    let timeout: Duration = Duration::from_secs(endpoint.handshake_timeout.max(1));
    let addr: SocketAddr = match (host.as_str(), port).to_socket_addrs() {
        Ok(mut addrs) => match addrs.next() {
            Some(val) => val,
            None => {
                return Err(LogError::Transport(format!("no address for {}:{}", host, port)));
            }
        },
        Err(err) => {
            return Err(LogError::Transport(format!("resolve {}:{} failed: {}", host, port, err)));
        }
    };

    let stream: TcpStream = match TcpStream::connect_timeout(&addr, timeout) {
        Ok(val) => val,
        Err(err) => {
            return Err(LogError::Transport(format!("connect {} failed: {}", addr, err)));
        }
    };
    // bound the handshake itself
    let _ = stream.set_read_timeout(Some(timeout));
    let _ = stream.set_write_timeout(Some(timeout));

    let mut attempt = tungstenite::client(endpoint.url.as_str(), stream);
    let (socket, _response) = loop {
        match attempt {
            Ok(val) => break val,
            Err(HandshakeError::Interrupted(mid)) => {
                attempt = mid.handshake();
            }
            Err(HandshakeError::Failure(err)) => {
                return Err(LogError::Transport(format!(
                    "handshake with {:?} failed: {}",
                    endpoint.url, err,
                )));
            }
        }
    };
    let _ = socket
        .get_ref()
        .set_read_timeout(Some(POLL_INTERVAL));

    Ok(socket)
}

/// Thread body: connect, serve, reconnect with backoff, until shutdown.
fn run_connection(
    shared: Arc<WsShared>,
    outbound: Receiver<Bytes>,
) {
    defn!("({:?})", shared.endpoint.url);
    let mut reconnect_delay: Duration = RECONNECT_DELAY_INITIAL;
    while !shared
        .shutdown
        .load(Ordering::Acquire)
    {
        match connect_endpoint(&shared.endpoint) {
            Ok(mut socket) => {
                defo!("connected to {:?}", shared.endpoint.url);
                reconnect_delay = RECONNECT_DELAY_INITIAL;
                shared
                    .connected
                    .store(true, Ordering::Release);
                serve_connection(&shared, &outbound, &mut socket);
                shared
                    .connected
                    .store(false, Ordering::Release);
                let _ = socket.close(None);
            }
            Err(err) => {
                de_wrn!("websocket connect {:?}: {}", shared.endpoint.url, err);
            }
        }
        sleep_watching_shutdown(&shared, reconnect_delay);
        reconnect_delay = std::cmp::min(reconnect_delay * 2, RECONNECT_DELAY_MAX);
    }
    defx!("({:?})", shared.endpoint.url);
}

/// Sleep `total` in short slices so a shutdown is honored promptly.
fn sleep_watching_shutdown(
    shared: &WsShared,
    total: Duration,
) {
    let deadline: Instant = Instant::now() + total;
    while Instant::now() < deadline {
        if shared
            .shutdown
            .load(Ordering::Acquire)
        {
            return;
        }
        thread::sleep(POLL_INTERVAL.min(deadline - Instant::now()));
    }
}

/// Serve one connection: relay outbound frames, keepalive, and inbound
/// control. Returns when the connection errors, the server closes, or
/// shutdown is requested.
fn serve_connection(
    shared: &WsShared,
    outbound: &Receiver<Bytes>,
    socket: &mut WebSocket<TcpStream>,
) {
    let ping_interval: Duration = Duration::from_secs(shared.endpoint.ping_interval);
    let mut last_ping: Instant = Instant::now();
    loop {
        if shared
            .shutdown
            .load(Ordering::Acquire)
        {
            // best effort: hand over what producers already queued
            while let Ok(payload) = outbound.try_recv() {
                if socket
                    .send(Message::Binary(payload))
                    .is_err()
                {
                    break;
                }
            }
            return;
        }

        while let Ok(payload) = outbound.try_recv() {
            if let Err(err) = socket.send(Message::Binary(payload)) {
                de_err!("websocket send to {:?} failed: {}", shared.endpoint.url, err);
                return;
            }
        }

        if !ping_interval.is_zero() && last_ping.elapsed() >= ping_interval {
            if let Err(err) = socket.send(Message::Ping(Vec::new())) {
                de_err!("websocket ping to {:?} failed: {}", shared.endpoint.url, err);
                return;
            }
            last_ping = Instant::now();
        }

        match socket.read() {
            Ok(Message::Text(text)) => {
                handle_control(shared, socket, text.as_str());
            }
            Ok(Message::Ping(payload)) => {
                let _ = socket.send(Message::Pong(payload));
            }
            Ok(Message::Close(close_frame)) => {
                defo!("server closed {:?}: {:?}", shared.endpoint.url, close_frame);
                return;
            }
            Ok(_other) => {}
            Err(tungstenite::Error::Io(err))
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(err) => {
                de_err!("websocket read from {:?} failed: {}", shared.endpoint.url, err);
                return;
            }
        }
    }
}

/// Handle one inbound text frame.
///
/// Only `{"command": "SET_LEVEL", "level": "<name>"}` is recognized;
/// anything else is ignored. A recognized command updates the sink
/// threshold and replies with a system notice frame.
fn handle_control(
    shared: &WsShared,
    socket: &mut WebSocket<TcpStream>,
    text: &str,
) {
    let value: serde_json::Value = match serde_json::from_str(text) {
        Ok(val) => val,
        Err(_) => return,
    };
    if value
        .get("command")
        .and_then(|v| v.as_str())
        != Some("SET_LEVEL")
    {
        return;
    }
    let level_name: &str = match value
        .get("level")
        .and_then(|v| v.as_str())
    {
        Some(val) => val,
        None => return,
    };
    let level: LogLevel = match LogLevel::from_str(level_name) {
        Ok(val) => val,
        Err(err) => {
            de_wrn!("SET_LEVEL from {:?}: {}", shared.endpoint.url, err);
            return;
        }
    };
    shared
        .threshold
        .store(level);
    defo!("threshold of {:?} set to {}", shared.endpoint.url, level);

    let timestamp_ns: u64 = match SystemTime::now().duration_since(SystemTime::UNIX_EPOCH) {
        Ok(duration) => duration.as_nanos() as u64,
        Err(_) => 0,
    };
    let feedback: serde_json::Value = serde_json::json!({
        "level": LogLevel::Notice.as_str(),
        "msg": format!("threshold level has changed to: {}", level_name),
        "tid": "SYSTEM",
        "timestamp": timestamp_ns,
    });
    if let Err(err) = socket.send(Message::Text(feedback.to_string())) {
        de_err!("websocket SET_LEVEL reply to {:?} failed: {}", shared.endpoint.url, err);
    }
}
