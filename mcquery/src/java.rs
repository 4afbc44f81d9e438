//! Implementation of the Java Minecraft ping protocol.
//! [Server List Ping](https://wiki.vg/Server_List_Ping)

use std::time::Duration;

use serde::Deserialize;

use crate::{DEFAULT_TIMEOUT, Error};

/// The default port of a Java Edition server.
pub const DEFAULT_PORT: u16 = 25565;

/// Configuration for querying a Java server.
///
/// # Examples
///
/// ```
/// use mcquery::Java;
/// use std::time::Duration;
///
/// let java_config = Java {
///     host: "mc.hypixel.net".to_string(),
///     port: 25565,
///     timeout: Duration::from_secs(10),
/// };
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Java {
    /// The server's hostname or IP address. This is also what the handshake
    /// tells the server we connected to.
    pub host: String,
    /// The server's TCP port.
    pub port: u16,
    /// The timeout for DNS, connecting, and every read and write.
    pub timeout: Duration,
}

impl Java {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }
}

impl Default for Java {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// The server status reponse
///
/// More information can be found [here](https://wiki.vg/Server_List_Ping).
#[derive(Deserialize)]
pub struct JavaResponse {
    /// The version of the server.
    pub version: Version,
    /// Information about online players
    pub players: Players,
    /// The description of the server (MOTD).
    pub description: Chat,
    /// The server icon (a Base64-encoded PNG image)
    pub favicon: Option<String>,
}

impl JavaResponse {
    /// Parses the status JSON. Invalid UTF-8 is replaced before parsing.
    ///
    /// # Errors
    /// If the payload is not JSON or lacks a required key.
    pub fn from_slice(payload: &[u8]) -> Result<Self, Error> {
        Ok(serde_json::from_str(&String::from_utf8_lossy(payload))?)
    }
}

/// Information about the server's version
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Version {
    /// The name of the version the server is running
    ///
    /// In practice this comes in a large variety of different formats.
    pub name: String,
    /// See [Protocol Version Numbers](https://wiki.vg/Protocol_version_numbers)
    pub protocol: i64,
}

/// An online player of the server.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Player {
    /// The name of the player.
    pub name: String,
    /// The player's UUID
    pub id: String,
}

/// The stats for players on the server.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Players {
    /// The max amount of players.
    pub max: i64,
    /// The amount of players online.
    pub online: i64,
    /// A preview of which players are online
    ///
    /// In practice servers often don't send this or use it for more advertising
    pub sample: Option<Vec<Player>>,
}

/// This is a partial implemenation of a Minecraft chat component limited to just text
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Chat {
    Text { text: String },
    String(String),
}

impl Chat {
    #[must_use]
    pub const fn text(&self) -> &str {
        match self {
            Self::Text { text } => text.as_str(),
            Self::String(s) => s.as_str(),
        }
    }
}

/// The normalized result of a Java Edition query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JavaStatus {
    /// The server's MOTD.
    pub description: String,
    pub protocol_version: i64,
    pub server_version: String,
    pub current_players: i64,
    pub max_players: i64,
    /// Empty when the server sends no sample.
    pub player_sample: Vec<Player>,
    /// Base64-encoded PNG, as a data URL.
    pub favicon: Option<String>,
    /// Round trip of the ping/pong exchange.
    pub delay_ms: u64,
}

impl JavaStatus {
    #[must_use]
    pub fn new(response: JavaResponse, delay_ms: u64) -> Self {
        Self {
            description: response.description.text().to_string(),
            protocol_version: response.version.protocol,
            server_version: response.version.name,
            current_players: response.players.online,
            max_players: response.players.max,
            player_sample: response.players.sample.unwrap_or_default(),
            favicon: response.favicon,
            delay_ms,
        }
    }
}
