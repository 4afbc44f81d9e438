//! Implementation of the `RakNet` ping/pong protocol.
//! [Raknet: Unconnected Ping](https://wiki.vg/Raknet_Protocol#Unconnected_Ping)

use std::time::Duration;

use crate::{DEFAULT_TIMEOUT, Malformed};

/// Raknets default `OFFLINE_MESSAGE_DATA_ID`.
/// See more: [Raknet: Data Types](https://wiki.vg/Raknet_Protocol#Data_types)
pub const OFFLINE_MESSAGE_DATA_ID: &[u8; 16] = &[
    0x00, 0xff, 0xff, 0x00, 0xfe, 0xfe, 0xfe, 0xfe, 0xfd, 0xfd, 0xfd, 0xfd, 0x12, 0x34, 0x56, 0x78,
];

/// The default port of a Raknet Bedrock Server.
pub const DEFAULT_PORT: u16 = 19132;

const UNCONNECTED_PING: u8 = 0x01;
const UNCONNECTED_PONG: u8 = 0x1c;

/// Sent as the ping's timestamp; servers echo it without interpreting it.
const PING_TIME: u64 = 0x240d_12d3;
const CLIENT_GUID: u64 = 0x6d63_7175_6572_7921;

/// id, time, magic, client guid
pub(crate) const PING_LEN: usize = 1 + 8 + 16 + 8;

/// id, time, server guid, magic, payload length
const PONG_HEADER_LEN: usize = 1 + 8 + 8 + 16 + 2;

/// The number of `;`-separated fields a status payload must carry.
const STATUS_FIELDS: usize = 12;

/// Configuration for querying a Bedrock server.
///
/// # Examples
///
/// ```
/// use mcquery::Bedrock;
/// use std::time::Duration;
///
/// let bedrock_config = Bedrock {
///     host: "play.nethergames.org".to_string(),
///     timeout: Duration::from_secs(10),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Bedrock {
    /// The server's hostname or IP address.
    pub host: String,
    /// The server's UDP port.
    pub port: u16,
    /// How long to wait for DNS and for the pong.
    pub timeout: Duration,
}

impl Bedrock {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }
}

impl Default for Bedrock {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Represents the edition of a bedrock server.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum BedrockEdition {
    PocketEdition,
    EducationEdition,
    /// An unknown edition string.
    Other(String),
}

impl std::fmt::Display for BedrockEdition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PocketEdition => f.write_str("MCPE"),
            Self::EducationEdition => f.write_str("MCEE"),
            Self::Other(s) => f.write_str(s),
        }
    }
}

impl From<&str> for BedrockEdition {
    fn from(edition: &str) -> Self {
        match edition.to_lowercase().as_ref() {
            "mcpe" => Self::PocketEdition,
            "mcee" => Self::EducationEdition,
            _ => Self::Other(edition.to_string()),
        }
    }
}

/// The status a Bedrock server advertises in its unconnected pong.
///
/// See More: [Raknet: Unconnected Pong](https://wiki.vg/Raknet_Protocol#Unconnected_Pong)
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BedrockStatus {
    /// The server's edition.
    pub edition: BedrockEdition,
    /// The first line of the server's Message Of The Day (MOTD).
    pub motd: String,
    /// The server's protocol version (ex: 390).
    pub protocol_version: i64,
    /// The name of the server's version (ex: 1.16.200).
    pub server_version: String,
    /// The number of players online.
    pub current_players: i64,
    /// The maximum number of players that could be online at once.
    pub max_players: i64,
    /// The server's advertised unique id.
    pub unique_id: String,
    /// The level name, sent where the protocol has a second MOTD line.
    pub world_name: String,
    /// The game mode the server defaults new users to (e.g. "Survival").
    pub game_mode: String,
    /// The numerical representation of `game_mode`. Servers are sloppy about
    /// this one, so it is not required to parse.
    pub game_mode_id: Option<i64>,
    /// The port to connect to the server on with an IPv4 address.
    pub port_ipv4: u16,
    /// The port to connect to the server on with an IPv6 address.
    pub port_ipv6: u16,
    /// Time between sending the ping and receiving the pong.
    pub delay_ms: u64,
}

impl BedrockStatus {
    /// Extracts information from the semicolon-separated payload.
    ///
    /// Edition (MCPE or MCEE for Education Edition)
    /// MOTD line 1
    /// Protocol Version
    /// Version Name
    /// Player Count
    /// Max Player Count
    /// Server Unique ID
    /// MOTD line 2 (the world name)
    /// Game mode
    /// Game mode (numeric)
    /// Port (IPv4)
    /// Port (IPv6)
    ///
    /// # Errors
    /// If fewer than 12 fields are present or a numeric field does not parse.
    pub fn parse(payload: &str, delay_ms: u64) -> Result<Self, Malformed> {
        let parts: Vec<&str> = payload.split(';').collect();
        if parts.len() < STATUS_FIELDS {
            return Err(Malformed::TooFewFields {
                expected: STATUS_FIELDS,
                found: parts.len(),
            });
        }

        Ok(Self {
            edition: BedrockEdition::from(parts[0]),
            motd: parts[1].to_string(),
            protocol_version: number("protocol_version", parts[2])?,
            server_version: parts[3].to_string(),
            current_players: number("current_players", parts[4])?,
            max_players: number("max_players", parts[5])?,
            unique_id: parts[6].to_string(),
            world_name: parts[7].to_string(),
            game_mode: parts[8].to_string(),
            game_mode_id: parts[9].parse().ok(),
            port_ipv4: number("port_ipv4", parts[10])?,
            port_ipv6: number("port_ipv6", parts[11])?,
            delay_ms,
        })
    }
}

fn number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, Malformed> {
    value.parse().map_err(|_| Malformed::NotAnInteger {
        field,
        value: value.to_string(),
    })
}

/// The unconnected ping datagram.
pub(crate) fn unconnected_ping() -> [u8; PING_LEN] {
    let mut buf = [0; PING_LEN];
    buf[0] = UNCONNECTED_PING;
    buf[1..9].copy_from_slice(&PING_TIME.to_be_bytes());
    buf[9..25].copy_from_slice(OFFLINE_MESSAGE_DATA_ID);
    buf[25..].copy_from_slice(&CLIENT_GUID.to_be_bytes());
    buf
}

/// Pulls the status string out of an unconnected pong datagram.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub(crate) fn pong_payload(datagram: &[u8]) -> Result<String, Malformed> {
    let Some((&id, rest)) = datagram.split_first() else {
        return Err(Malformed::TooFewFields {
            expected: STATUS_FIELDS,
            found: 0,
        });
    };
    if id != UNCONNECTED_PONG || datagram.len() < PONG_HEADER_LEN || rest[16..32] != OFFLINE_MESSAGE_DATA_ID[..] {
        return Err(Malformed::UnexpectedPacket(id));
    }
    let len = usize::from(u16::from_be_bytes([rest[32], rest[33]]));
    let body = &datagram[PONG_HEADER_LEN..];
    Ok(String::from_utf8_lossy(&body[..len.min(body.len())]).into_owned())
}

#[cfg(test)]
pub(crate) fn unconnected_pong(payload: &str) -> Vec<u8> {
    let mut buf = vec![UNCONNECTED_PONG];
    buf.extend_from_slice(&PING_TIME.to_be_bytes());
    buf.extend_from_slice(&0x1122_3344_5566_7788_u64.to_be_bytes());
    buf.extend_from_slice(OFFLINE_MESSAGE_DATA_ID);
    buf.extend_from_slice(&u16::try_from(payload.len()).unwrap().to_be_bytes());
    buf.extend_from_slice(payload.as_bytes());
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = "MCPE;MyServer;422;1.18;3;20;12345;World;Survival;1;19132;19133;";

    #[test]
    fn parse_status() {
        let status = BedrockStatus::parse(PAYLOAD, 12).unwrap();
        assert_eq!(status.edition, BedrockEdition::PocketEdition);
        assert_eq!(status.motd, "MyServer");
        assert_eq!(status.protocol_version, 422);
        assert_eq!(status.server_version, "1.18");
        assert_eq!(status.current_players, 3);
        assert_eq!(status.max_players, 20);
        assert_eq!(status.unique_id, "12345");
        assert_eq!(status.world_name, "World");
        assert_eq!(status.game_mode, "Survival");
        assert_eq!(status.game_mode_id, Some(1));
        assert_eq!(status.port_ipv4, 19132);
        assert_eq!(status.port_ipv6, 19133);
        assert_eq!(status.delay_ms, 12);
    }

    #[test]
    fn too_few_fields() {
        let err = BedrockStatus::parse("MCPE;MyServer;422;1.18;3;20", 0).unwrap_err();
        assert!(matches!(
            err,
            Malformed::TooFewFields {
                expected: 12,
                found: 6
            }
        ));
        assert!(BedrockStatus::parse("", 0).is_err());
    }

    #[test]
    fn non_numeric_field() {
        let payload = "MCPE;MyServer;422;1.18;lots;20;12345;World;Survival;1;19132;19133;";
        let err = BedrockStatus::parse(payload, 0).unwrap_err();
        assert!(matches!(
            err,
            Malformed::NotAnInteger {
                field: "current_players",
                ..
            }
        ));

        let payload = "MCPE;MyServer;422;1.18;3;20;12345;World;Survival;1;99999;19133;";
        assert!(BedrockStatus::parse(payload, 0).is_err());
    }

    #[test]
    fn lenient_game_mode_id() {
        let payload = "MCEE;Class;422;1.18;3;20;12345;World;Creative;;19132;19133";
        let status = BedrockStatus::parse(payload, 0).unwrap();
        assert_eq!(status.edition, BedrockEdition::EducationEdition);
        assert_eq!(status.game_mode_id, None);
    }

    #[test]
    fn edition_strings() {
        assert_eq!(BedrockEdition::from("mcpe"), BedrockEdition::PocketEdition);
        assert_eq!(
            BedrockEdition::from("Custom"),
            BedrockEdition::Other("Custom".to_string())
        );
        assert_eq!(BedrockEdition::Other("X".into()).to_string(), "X");
        assert_eq!(BedrockEdition::EducationEdition.to_string(), "MCEE");
    }

    #[test]
    fn ping_layout() {
        let ping = unconnected_ping();
        assert_eq!(ping[0], 0x01);
        assert_eq!(&ping[1..9], &[0, 0, 0, 0, 0x24, 0x0d, 0x12, 0xd3]);
        assert_eq!(&ping[9..25], OFFLINE_MESSAGE_DATA_ID);
    }

    #[test]
    fn pong_extraction() {
        let pong = unconnected_pong(PAYLOAD);
        assert_eq!(pong_payload(&pong).unwrap(), PAYLOAD);

        let mut invalid = unconnected_pong("MCPE;\u{e9}");
        let last = invalid.len() - 1;
        invalid[last] = 0xff;
        assert_eq!(pong_payload(&invalid).unwrap(), "MCPE;\u{fffd}\u{fffd}");
    }

    #[test]
    fn pong_rejects_other_packets() {
        let mut pong = unconnected_pong(PAYLOAD);
        pong[0] = 0x05;
        assert!(matches!(
            pong_payload(&pong),
            Err(Malformed::UnexpectedPacket(0x05))
        ));
        assert!(pong_payload(&[UNCONNECTED_PONG, 0, 0]).is_err());
        assert!(pong_payload(&[]).is_err());
    }
}
