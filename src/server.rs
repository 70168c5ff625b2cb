//! ## Server role (§4.8)
//!
//! `Idle → Accepting → Handshake → Streaming → Closed`. Accepts exactly one
//! client (the reference protocol's single-client assumption — see
//! Non-goals), sends the handshake and a full snapshot, then streams deltas
//! driven by the model's own `update` notifications while concurrently
//! reading client-sent frames.

use crate::codec::tcp_format;
use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::transport::{
    self, Frame, CHANNEL_COMMAND, CHANNEL_HANDSHAKE, CHANNEL_KEEPALIVE, CHANNEL_MODEL,
};
use crate::value::Id;
use parking_lot::Mutex;
use serde::Serialize;
use socket2::{Domain, Socket, Type};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Backlog of 1: the reference protocol serves a single client at a time.
const LISTEN_BACKLOG: i32 = 1;

#[derive(Serialize)]
struct Handshake<'a> {
    lang: &'a str,
    version: &'a str,
}

/// The live client socket, once one is accepted. `None` before `accept()`
/// returns, so the `update` listener registered in `new()` has something to
/// no-op against rather than a socket to write to (mirrors the original's
/// `if self.socket:` guard in its own update-forwarding callback).
type SharedWriter = Arc<Mutex<Option<TcpStream>>>;

pub struct Server {
    config: ServerConfig,
    model: Model,
    writer: SharedWriter,
    shutdown_handle: Mutex<Option<TcpStream>>,
    stopped: AtomicBool,
}

impl Server {
    /// Registers the model's delta-forwarding listener immediately, before
    /// `run()` binds or accepts anything (§5: "register must be callable
    /// before the network thread starts"; the original's `TCPServer.__init__`
    /// does the same). Until a client is accepted `writer` is `None`, so an
    /// update arriving in that window is a no-op here — its value is still
    /// current when the eventual snapshot is dumped, so nothing is lost.
    pub fn new(config: ServerConfig, model: Model) -> Self {
        let writer: SharedWriter = Arc::new(Mutex::new(None));

        let listener_model = model.clone();
        let listener_writer = writer.clone();
        model.on_update(move |changed| {
            forward_deltas(&listener_model, &listener_writer, changed);
        });

        Server {
            config,
            model,
            writer,
            shutdown_handle: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    /// Bind, accept one client, handshake, snapshot, and stream until the
    /// client disconnects, a hard error occurs, or `stop()` is called.
    pub fn run(&self) -> Result<()> {
        let bind_addr = SocketAddr::from((self.config.bind_addr, self.config.tcp_port));
        let listener = bind_with_backlog(bind_addr)?;
        log::info!("listening on {bind_addr}");

        let (stream, peer) = listener.accept()?;
        log::info!("accepted client {peer}");
        *self.shutdown_handle.lock() = Some(stream.try_clone()?);
        *self.writer.lock() = Some(stream.try_clone()?);

        self.send_handshake()?;
        self.send_snapshot()?;

        let mut reader = stream;
        while !self.stopped.load(Ordering::SeqCst) {
            let frame = match transport::read_frame(&mut reader) {
                Ok(frame) => frame,
                Err(e) => {
                    log::debug!("client disconnected: {e}");
                    break;
                }
            };
            self.handle_frame(&frame);
            if let Err(e) = self.write_frame(Frame::keepalive()) {
                log::debug!("failed to send ack: {e}");
                break;
            }
        }
        Ok(())
    }

    fn send_handshake(&self) -> Result<()> {
        let body = serde_json::to_vec(&Handshake {
            lang: &self.config.lang,
            version: &self.config.version,
        })?;
        self.write_frame(Frame::new(CHANNEL_HANDSHAKE, body))
    }

    fn send_snapshot(&self) -> Result<()> {
        let records = self.model.dump(Id::ROOT, true)?;
        let body = tcp_format::encode(&records);
        self.write_frame(Frame::new(CHANNEL_MODEL, body))
    }

    /// Write one frame to the current client socket, if any is connected.
    fn write_frame(&self, frame: Frame) -> Result<()> {
        match self.writer.lock().as_mut() {
            Some(stream) => transport::write_frame(stream, &frame),
            None => Ok(()),
        }
    }

    fn handle_frame(&self, frame: &Frame) {
        match frame.channel {
            CHANNEL_KEEPALIVE => {}
            CHANNEL_HANDSHAKE => {
                // Open question in §9: a client-sent channel-1 payload is
                // opaque and its purpose ambiguous; log it, don't act on it.
                log::debug!("received opaque channel-1 payload from client");
            }
            CHANNEL_COMMAND => match serde_json::from_slice(&frame.payload) {
                Ok(command) => self.model.dispatch_command(&command),
                Err(e) => log::warn!("malformed command JSON on channel {}: {e}", frame.channel),
            },
            CHANNEL_MODEL => {
                let (records, err) = tcp_format::decode(&frame.payload);
                if let Some(e) = err {
                    log::warn!("TCPFormat decode error: {e}");
                }
                self.model.update(records);
            }
            other => log::warn!("{}", Error::UnknownChannel(other)),
        }
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(stream) = self.shutdown_handle.lock().as_ref() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}

/// Non-recursive dump of each changed id, concatenated into one channel-3
/// frame (§4.8's delta step, §9's "keep the flat table authoritative").
/// A no-op if no client is connected yet.
fn forward_deltas(model: &Model, writer: &SharedWriter, changed: &[Id]) {
    let mut guard = writer.lock();
    let Some(stream) = guard.as_mut() else {
        return;
    };

    let mut records = Vec::with_capacity(changed.len());
    for &id in changed {
        match model.dump(id, false) {
            Ok(mut dumped) => records.append(&mut dumped),
            Err(e) => log::warn!("dropping delta for {id}: {e}"),
        }
    }
    if records.is_empty() {
        return;
    }
    let body = tcp_format::encode(&records);
    if let Err(e) = transport::write_frame(stream, &Frame::new(CHANNEL_MODEL, body)) {
        log::debug!("failed to send delta: {e}");
    }
}

fn bind_with_backlog(addr: SocketAddr) -> Result<TcpListener> {
    let domain = if addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
    let socket = Socket::new(domain, Type::STREAM, None)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    Ok(socket.into())
}
