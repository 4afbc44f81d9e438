use std::{
    net::{Ipv4Addr, Ipv6Addr, SocketAddr},
    time::Instant,
};

use tokio::net::UdpSocket;
use tracing::debug;

use super::{AsyncPingable, deadline, elapsed_ms, resolve};
use crate::{
    Bedrock, BedrockStatus, Error,
    bedrock::{pong_payload, unconnected_ping},
};

/// Large enough for any pong a server will fit in one datagram.
const RECV_BUFFER: usize = 2048;

impl AsyncPingable for Bedrock {
    type Response = BedrockStatus;

    async fn ping(self) -> Result<BedrockStatus, Error> {
        let addr = deadline(self.timeout, resolve(&self.host, self.port)).await?;
        let bind = if addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        // Connected, so an ICMP port unreachable comes back as a refusal.
        let socket = UdpSocket::bind(bind).await?;
        socket.connect(addr).await?;

        socket.send(&unconnected_ping()).await?;
        let start = Instant::now();
        debug!(%addr, "sent unconnected ping");

        let mut buf = vec![0; RECV_BUFFER];
        let len = deadline(self.timeout, socket.recv(&mut buf)).await?;
        let delay_ms = elapsed_ms(start);
        drop(socket);

        let payload = pong_payload(&buf[..len])?;
        debug!(%addr, delay_ms, %payload, "received unconnected pong");
        Ok(BedrockStatus::parse(&payload, delay_ms)?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        BedrockEdition, Malformed,
        bedrock::{PING_LEN, unconnected_pong},
        tokio::get_status,
    };

    const PAYLOAD: &str = "MCPE;MyServer;422;1.18;3;20;12345;World;Survival;1;19132;19133;";

    /// Answers a single ping with `reply`.
    async fn mock_server(reply: Vec<u8>) -> u16 {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = socket.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut buf = [0; 64];
            let (len, peer) = socket.recv_from(&mut buf).await.unwrap();
            assert_eq!(len, PING_LEN);
            assert_eq!(buf[..len], unconnected_ping());
            socket.send_to(&reply, peer).await.unwrap();
        });
        port
    }

    fn config(port: u16, timeout: Duration) -> Bedrock {
        Bedrock {
            host: "127.0.0.1".to_string(),
            port,
            timeout,
        }
    }

    #[tokio::test]
    async fn queries_mock_server() {
        let port = mock_server(unconnected_pong(PAYLOAD)).await;
        let status = get_status(config(port, Duration::from_secs(2)))
            .await
            .unwrap();
        assert_eq!(status.edition, BedrockEdition::PocketEdition);
        assert_eq!(status.motd, "MyServer");
        assert_eq!(status.protocol_version, 422);
        assert_eq!(status.max_players, 20);
        assert_eq!(status.port_ipv6, 19133);
        assert!(status.delay_ms < 2000);
    }

    #[tokio::test]
    async fn short_reply_is_malformed() {
        let port = mock_server(unconnected_pong("MCPE;MyServer;422")).await;
        let err = get_status(config(port, Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedResponse(Malformed::TooFewFields { found: 3, .. })
        ));
    }

    #[tokio::test]
    async fn foreign_packet_is_malformed() {
        let port = mock_server(vec![0x05, 0x00, 0x01]).await;
        let err = get_status(config(port, Duration::from_secs(2)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedResponse(Malformed::UnexpectedPacket(0x05))
        ));
    }

    #[tokio::test]
    async fn silence_times_out_repeatedly() {
        // Bound but never answers.
        let silent = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = silent.local_addr().unwrap().port();
        for _ in 0..32 {
            let err = get_status(config(port, Duration::from_millis(20)))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Timeout), "{err:?}");
        }
    }
}
