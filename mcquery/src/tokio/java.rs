use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
};
use tracing::debug;

use super::{
    AsyncPingable, deadline,
    framer::{Field, read_packet, write_packet},
    resolve,
};
use crate::{Error, Java, JavaResponse, JavaStatus, Malformed, varint};

const HANDSHAKE_ID: u8 = 0x00;
const STATUS_REQUEST_ID: u8 = 0x00;
const PING_ID: u8 = 0x01;

/// Servers answer a status request whatever version the client claims.
const HANDSHAKE_PROTOCOL_VERSION: u32 = 0;
/// Handshake next-state for a status query.
const NEXT_STATE_STATUS: u8 = 0x01;

impl AsyncPingable for Java {
    type Response = JavaStatus;

    async fn ping(self) -> Result<JavaStatus, Error> {
        let addr = deadline(self.timeout, resolve(&self.host, self.port)).await?;
        let mut stream = deadline(self.timeout, TcpStream::connect(addr)).await?;
        stream.set_nodelay(true)?;
        debug!(%addr, "connected");

        let exchanged = exchange(&mut stream, &self.host, self.port, self.timeout).await;
        drop(stream);
        let (status, delay_ms) = exchanged?;

        let response = JavaResponse::from_slice(&status)?;
        debug!(%addr, delay_ms, "received status");
        Ok(JavaStatus::new(response, delay_ms))
    }
}

/// Runs handshake, status request and ping over `stream`. Returns the raw
/// status JSON and the ping latency.
async fn exchange<S>(
    stream: &mut S,
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(Vec<u8>, u64), Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let protocol = varint::encode(HANDSHAKE_PROTOCOL_VERSION);
    let handshake = [
        Field::Raw(&[HANDSHAKE_ID]),
        Field::Raw(&protocol),
        Field::Text(host),
        Field::UShort(port),
        Field::Raw(&[NEXT_STATE_STATUS]),
    ];
    deadline(timeout, write_packet(stream, &handshake)).await?;
    deadline(timeout, write_packet(stream, &[Field::Raw(&[STATUS_REQUEST_ID])])).await?;
    let status = deadline(timeout, read_packet(stream, true)).await?;

    let sent = unix_millis();
    let ping = [Field::Raw(&[PING_ID]), Field::Timestamp(sent)];
    deadline(timeout, write_packet(stream, &ping)).await?;
    let pong = deadline(timeout, read_packet(stream, false)).await?;

    let echoed: [u8; 8] = pong
        .as_slice()
        .try_into()
        .map_err(|_| Malformed::BadPong(pong.len()))?;
    let delay_ms = unix_millis().saturating_sub(u64::from_be_bytes(echoed));
    Ok((status, delay_ms))
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |since| u64::try_from(since.as_millis()).unwrap_or(u64::MAX))
}
