//! `VarInt` encoding/decoding for the Java Edition protocol.
//!
//! Each byte carries 7 bits of the value, least significant group first, and
//! the high bit is set on every byte except the last.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::{Error, Malformed};

/// Segment bits mask (lower 7 bits).
const SEGMENT_BITS: u8 = 0x7F;

/// Continue bit (high bit).
const CONTINUE_BIT: u8 = 0x80;

/// A 32-bit value never takes more than five bytes.
pub const MAX_VARINT_LEN: usize = 5;

/// Encode `value` into a fresh buffer.
#[must_use]
pub fn encode(value: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(varint_len(value));
    write_varint(&mut buf, value);
    buf
}

/// Append the encoding of `value` to `buf`.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (value & u32::from(SEGMENT_BITS)) as u8;
        value >>= 7;

        if value != 0 {
            byte |= CONTINUE_BIT;
        }

        buf.push(byte);

        if value == 0 {
            break;
        }
    }
}

/// Calculate the number of bytes needed to encode a `VarInt`.
#[must_use]
pub const fn varint_len(value: u32) -> usize {
    if value == 0 {
        return 1;
    }

    let bits_needed = 32 - value.leading_zeros();
    (bits_needed as usize).div_ceil(7)
}

/// Read a `VarInt` from an async reader, one byte at a time.
///
/// # Errors
///
/// - [`Error::ConnectionClosed`] if the reader is exhausted before the first byte
/// - [`Error::TruncatedInput`] if it is exhausted part-way through
/// - [`Malformed::VarIntTooLong`] if the fifth byte still has its continue bit set
pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<u32, Error> {
    let mut value: u32 = 0;

    for position in 0..MAX_VARINT_LEN {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(if position == 0 {
                    Error::ConnectionClosed
                } else {
                    Error::TruncatedInput
                });
            }
            Err(e) => return Err(e.into()),
        };
        value |= u32::from(byte & SEGMENT_BITS) << (7 * position);

        if byte & CONTINUE_BIT == 0 {
            return Ok(value);
        }
    }

    Err(Malformed::VarIntTooLong.into())
}
