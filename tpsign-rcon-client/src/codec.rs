//! Wire format of the remote console protocol.
//!
//! A packet is a little-endian `i32` length followed by that many bytes: request id, packet type,
//! the body and two NUL bytes.

use bytes::{
    Buf,
    BufMut,
    BytesMut,
};
use tokio_util::codec::{
    Decoder,
    Encoder,
};

/// Largest command body a vanilla server accepts.
pub const MAX_REQUEST_BODY: usize = 1446;

/// Largest body of a single response packet. Longer replies are split into several packets.
pub const MAX_RESPONSE_BODY: usize = 4096;

const LENGTH_PREFIX: usize = 4;
const HEADER: usize = 8;
const PADDING: usize = 2;
const MIN_LENGTH: usize = HEADER + PADDING;
const MAX_LENGTH: usize = HEADER + MAX_RESPONSE_BODY + PADDING;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacketType {
    Response,
    /// Command requests and authentication responses share this id.
    Command,
    Login,
    Other(i32),
}

impl From<i32> for PacketType {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Response,
            2 => Self::Command,
            3 => Self::Login,
            other => Self::Other(other),
        }
    }
}

impl From<PacketType> for i32 {
    fn from(value: PacketType) -> Self {
        match value {
            PacketType::Response => 0,
            PacketType::Command => 2,
            PacketType::Login => 3,
            PacketType::Other(other) => other,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: PacketType,
    pub body: String,
}

impl Packet {
    pub fn new(id: i32, kind: PacketType, body: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("io error")]
    Io(#[from] std::io::Error),

    #[error("Invalid packet length: {0}")]
    InvalidLength(i32),

    #[error("Packet body too long: {0} bytes")]
    BodyTooLong(usize),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RconCodec;

impl Decoder for RconCodec {
    type Item = Packet;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < LENGTH_PREFIX {
            return Ok(None);
        }

        let length = (&src[..LENGTH_PREFIX]).get_i32_le();
        let packet_length = usize::try_from(length)
            .ok()
            .filter(|length| (MIN_LENGTH..=MAX_LENGTH).contains(length))
            .ok_or(CodecError::InvalidLength(length))?;

        if src.len() < LENGTH_PREFIX + packet_length {
            src.reserve(LENGTH_PREFIX + packet_length - src.len());
            return Ok(None);
        }

        src.advance(LENGTH_PREFIX);
        let mut packet = src.split_to(packet_length);

        let id = packet.get_i32_le();
        let kind = PacketType::from(packet.get_i32_le());

        // the body is NUL-terminated and followed by one more NUL
        let body = packet[..].split(|byte| *byte == 0).next().unwrap_or_default();
        let body = String::from_utf8_lossy(body).into_owned();

        Ok(Some(Packet { id, kind, body }))
    }
}

impl Encoder<Packet> for RconCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = item.body.as_bytes();
        if body.len() > MAX_RESPONSE_BODY {
            return Err(CodecError::BodyTooLong(body.len()));
        }

        let length = HEADER + body.len() + PADDING;
        dst.reserve(LENGTH_PREFIX + length);

        // bounded by MAX_LENGTH above
        dst.put_i32_le(length as i32);
        dst.put_i32_le(item.id);
        dst.put_i32_le(item.kind.into());
        dst.put_slice(body);
        dst.put_bytes(0, PADDING);

        Ok(())
    }
}
