//! ## Client role (§4.7)
//!
//! `Disconnected → Connecting → Handshake → Streaming → Closed`. The
//! handshake channel carries no required reply, so "Handshake" isn't a
//! distinct blocking step here — the first frame off the wire simply
//! happens to land on channel 1 before channel-3 snapshots start arriving;
//! `Streaming` is the steady-state loop that dispatches every frame by
//! channel and acks it.

use crate::codec::tcp_format;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::transport::{self, Frame, CHANNEL_COMMAND, CHANNEL_HANDSHAKE, CHANNEL_KEEPALIVE, CHANNEL_MODEL};
use parking_lot::Mutex;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};

pub struct Client {
    config: ClientConfig,
    model: Model,
    handshake: Mutex<Option<serde_json::Value>>,
    shutdown_handle: Mutex<Option<TcpStream>>,
    stopped: AtomicBool,
}

impl Client {
    pub fn new(config: ClientConfig, model: Model) -> Self {
        Client {
            config,
            model,
            handshake: Mutex::new(None),
            shutdown_handle: Mutex::new(None),
            stopped: AtomicBool::new(false),
        }
    }

    /// The last handshake payload received on channel 1, if any.
    pub fn handshake(&self) -> Option<serde_json::Value> {
        self.handshake.lock().clone()
    }

    /// Connect and run the streaming loop until the peer closes the
    /// connection, a hard error occurs, or `stop()` is called.
    pub fn run(&self) -> Result<()> {
        log::debug!(
            "connecting to {}:{}",
            self.config.server_addr,
            self.config.tcp_port
        );
        let stream = TcpStream::connect((self.config.server_addr, self.config.tcp_port))?;
        *self.shutdown_handle.lock() = Some(stream.try_clone()?);

        let mut reader = stream.try_clone()?;
        let writer = Mutex::new(stream);

        while !self.stopped.load(Ordering::SeqCst) {
            let frame = match transport::read_frame(&mut reader) {
                Ok(frame) => frame,
                Err(e) => {
                    log::debug!("client stream closed: {e}");
                    break;
                }
            };
            self.handle_frame(&frame);

            // P9: every received frame, including channel 0 itself, is
            // followed by a channel-0 ack before the next frame is read.
            if let Err(e) = transport::write_frame(&mut *writer.lock(), &Frame::keepalive()) {
                log::debug!("failed to send ack: {e}");
                break;
            }
        }
        Ok(())
    }

    fn handle_frame(&self, frame: &Frame) {
        match frame.channel {
            CHANNEL_KEEPALIVE => {}
            CHANNEL_HANDSHAKE => match serde_json::from_slice(&frame.payload) {
                Ok(value) => *self.handshake.lock() = Some(value),
                Err(e) => log::warn!("malformed handshake JSON: {e}"),
            },
            CHANNEL_MODEL => {
                let (records, err) = tcp_format::decode(&frame.payload);
                if let Some(e) = err {
                    log::warn!("TCPFormat decode error: {e}");
                }
                self.model.update(records);
            }
            CHANNEL_COMMAND => {
                log::debug!("ignoring unexpected command-channel frame from server");
            }
            other => log::warn!("{}", Error::UnknownChannel(other)),
        }
    }

    /// Cooperative shutdown: the streaming loop exits at its next iteration
    /// boundary, unblocked immediately by closing the socket.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(stream) = self.shutdown_handle.lock().as_ref() {
            let _ = stream.shutdown(Shutdown::Both);
        }
    }
}
