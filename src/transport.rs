//! ## Framed transport (§4.6)
//!
//! Every message on the wire, regardless of channel, is
//! `size:u32 channel:u8 payload:[u8; size]`, where `size` counts only the
//! payload (the channel byte is not included). `size == 0` is valid (e.g.
//! the keepalive on channel 0) and yields an empty payload.

use crate::error::Result;
use crate::wire::LE;
use byteorder::{ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Channel 0: empty keepalive/ack, sent after every frame this role reads.
pub const CHANNEL_KEEPALIVE: u8 = 0;
/// Channel 1: JSON handshake payload.
pub const CHANNEL_HANDSHAKE: u8 = 1;
/// Channel 3: TCPFormat-encoded model batch.
pub const CHANNEL_MODEL: u8 = 3;
/// Channel 5: JSON command payload.
pub const CHANNEL_COMMAND: u8 = 5;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub channel: u8,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(channel: u8, payload: Vec<u8>) -> Self {
        Frame { channel, payload }
    }

    pub fn keepalive() -> Self {
        Frame::new(CHANNEL_KEEPALIVE, Vec::new())
    }
}

/// Read one length-prefixed frame. Blocks until the header and full payload
/// have arrived or the stream errors/closes.
pub fn read_frame<R: Read>(mut reader: R) -> Result<Frame> {
    let size = reader.read_u32::<LE>()?;
    let channel = reader.read_u8()?;
    let mut payload = vec![0u8; size as usize];
    reader.read_exact(&mut payload)?;
    Ok(Frame { channel, payload })
}

/// Write one length-prefixed frame and flush, so partial frames never sit
/// in a buffer under concurrent writers (§5: the socket's send path is
/// serialized by the caller holding a single writer lock around this call).
pub fn write_frame<W: Write>(mut writer: W, frame: &Frame) -> Result<()> {
    writer.write_u32::<LE>(frame.payload.len() as u32)?;
    writer.write_u8(frame.channel)?;
    writer.write_all(&frame.payload)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_a_nonempty_frame() {
        let frame = Frame::new(CHANNEL_MODEL, vec![1, 2, 3, 4]);
        let mut buf = Vec::new();
        write_frame(&mut buf, &frame).unwrap();
        assert_eq!(&buf[..4], &4u32.to_le_bytes());
        assert_eq!(buf[4], CHANNEL_MODEL);

        let decoded = read_frame(Cursor::new(buf)).unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn keepalive_is_a_zero_length_payload_on_channel_zero() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Frame::keepalive()).unwrap();
        assert_eq!(buf, vec![0, 0, 0, 0, CHANNEL_KEEPALIVE]);

        let decoded = read_frame(Cursor::new(buf)).unwrap();
        assert_eq!(decoded, Frame::keepalive());
    }

    #[test]
    fn consecutive_frames_on_one_stream_read_back_in_order() {
        let mut buf = Vec::new();
        write_frame(&mut buf, &Frame::new(CHANNEL_HANDSHAKE, b"{}".to_vec())).unwrap();
        write_frame(&mut buf, &Frame::new(CHANNEL_COMMAND, b"[1]".to_vec())).unwrap();

        let mut cursor = Cursor::new(buf);
        let first = read_frame(&mut cursor).unwrap();
        let second = read_frame(&mut cursor).unwrap();
        assert_eq!(first.channel, CHANNEL_HANDSHAKE);
        assert_eq!(second.channel, CHANNEL_COMMAND);
    }
}
