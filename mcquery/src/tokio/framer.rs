//! Packet framing for the Java Edition protocol.
//!
//! Packets are framed as `[VarInt length][VarInt packet_id][payload...]`,
//! where the length covers the id and payload but not itself.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::{
    Error, Malformed,
    varint::{MAX_VARINT_LEN, read_varint, varint_len, write_varint},
};

/// Maximum packet size (2 MiB, same as vanilla).
pub const MAX_PACKET_SIZE: u32 = 2 * 1024 * 1024;

/// One field of an outbound packet. Each variant has exactly one encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    /// UTF-8 text behind a `VarInt` byte length.
    Text(&'a str),
    /// A big-endian unsigned short.
    UShort(u16),
    /// Milliseconds as a big-endian 64-bit integer.
    Timestamp(u64),
    /// Bytes passed through untouched, such as a packet id.
    Raw(&'a [u8]),
}

impl Field<'_> {
    fn encode_into(self, buf: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            Self::Text(text) => {
                write_varint(buf, u32::try_from(text.len())?);
                buf.extend_from_slice(text.as_bytes());
            }
            Self::UShort(value) => buf.extend_from_slice(&value.to_be_bytes()),
            Self::Timestamp(millis) => buf.extend_from_slice(&millis.to_be_bytes()),
            Self::Raw(bytes) => buf.extend_from_slice(bytes),
        }
        Ok(())
    }
}

/// Concatenate `fields` and prefix them with their total length.
///
/// # Errors
/// If a field or the whole packet is too long for a `VarInt` length.
pub fn encode_packet(fields: &[Field<'_>]) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    for field in fields {
        field.encode_into(&mut body)?;
    }

    let mut packet = Vec::with_capacity(body.len() + MAX_VARINT_LEN);
    write_varint(&mut packet, u32::try_from(body.len())?);
    packet.extend_from_slice(&body);
    Ok(packet)
}

/// Write one framed packet in a single write.
///
/// # Errors
/// If encoding fails or the connection does.
pub async fn write_packet<W: AsyncWrite + Unpin>(
    conn: &mut W,
    fields: &[Field<'_>],
) -> Result<(), Error> {
    let packet = encode_packet(fields)?;
    conn.write_all(&packet).await?;
    conn.flush().await?;
    Ok(())
}

/// Read one packet and return its payload.
///
/// With `extra_varint` the payload is itself length-prefixed (a JSON string,
/// say) and only the bytes behind that inner length are returned. Some servers
/// put yet another length in front of it; that shows up as an id larger than
/// the packet length and is skipped.
///
/// Without `extra_varint` everything after the packet id is returned.
///
/// # Errors
/// [`Error::ConnectionClosed`] if the peer closes before the payload is
/// complete, or a [`Malformed`] error for lengths that make no sense.
pub async fn read_packet<R: AsyncRead + Unpin>(
    conn: &mut R,
    extra_varint: bool,
) -> Result<Vec<u8>, Error> {
    let packet_len = read_varint(conn).await?;
    let packet_id = read_varint(conn).await?;

    let payload_len = if extra_varint {
        if packet_id > packet_len {
            let skipped = read_varint(conn).await?;
            trace!(packet_len, packet_id, skipped, "skipped extra length prefix");
        }
        read_varint(conn).await?
    } else {
        #[allow(clippy::cast_possible_truncation)]
        let id_len = varint_len(packet_id) as u32;
        packet_len
            .checked_sub(id_len)
            .ok_or(Malformed::PacketTooShort { len: packet_len })?
    };

    if payload_len > MAX_PACKET_SIZE {
        return Err(Malformed::PacketTooLong {
            len: payload_len,
            max: MAX_PACKET_SIZE,
        }
        .into());
    }

    let mut payload = vec![0; usize::try_from(payload_len)?];
    conn.read_exact(&mut payload).await?;
    trace!(packet_id, len = payload.len(), "read packet");
    Ok(payload)
}
