use mcquery::{BedrockStatus, JavaStatus};
use serde::{Deserialize, Serialize};

/// An event posted by the chat bot (OneBot "HTTP POST" style). Only the
/// fields the command needs are read.
#[derive(Deserialize, Debug, Clone)]
pub struct Event {
    pub post_type: String,
    #[serde(default)]
    pub raw_message: String,
}

/// A quick operation: the bot sends `reply` back to wherever the event came from.
#[derive(Serialize, Debug, Clone)]
pub struct QuickReply {
    pub reply: String,
    pub auto_escape: bool,
}

impl QuickReply {
    pub const fn new(reply: String) -> Self {
        Self {
            reply,
            auto_escape: true,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    Java,
    Bedrock,
}

#[derive(Serialize, Debug, Clone)]
pub struct StatusResponse {
    pub edition: Edition,
    pub latency: u64,
    pub players: Players,
    pub motd: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrock: Option<BedrockDetails>,
}

#[derive(Serialize, Debug, Clone)]
pub struct Version {
    pub protocol: i64,
    pub broadcast: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct Players {
    pub online: i64,
    pub maximum: i64,
    pub sample: Vec<PlayerSample>,
}

#[derive(Serialize, Debug, Clone)]
pub struct PlayerSample {
    pub uuid: String,
    pub name: String,
}

/// The fields only a Bedrock pong carries.
#[derive(Serialize, Debug, Clone)]
pub struct BedrockDetails {
    pub edition: String,
    pub unique_id: String,
    pub world_name: String,
    pub game_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_mode_id: Option<i64>,
    pub port_ipv4: u16,
    pub port_ipv6: u16,
}

impl From<JavaStatus> for StatusResponse {
    fn from(status: JavaStatus) -> Self {
        Self {
            edition: Edition::Java,
            latency: status.delay_ms,
            players: Players {
                online: status.current_players,
                maximum: status.max_players,
                sample: status
                    .player_sample
                    .into_iter()
                    .map(|player| PlayerSample {
                        uuid: player.id,
                        name: player.name,
                    })
                    .collect(),
            },
            motd: status.description,
            icon: status.favicon,
            version: Version {
                protocol: status.protocol_version,
                broadcast: status.server_version,
            },
            bedrock: None,
        }
    }
}

impl From<BedrockStatus> for StatusResponse {
    fn from(status: BedrockStatus) -> Self {
        Self {
            edition: Edition::Bedrock,
            latency: status.delay_ms,
            players: Players {
                online: status.current_players,
                maximum: status.max_players,
                sample: Vec::new(),
            },
            motd: status.motd,
            icon: None,
            version: Version {
                protocol: status.protocol_version,
                broadcast: status.server_version,
            },
            bedrock: Some(BedrockDetails {
                edition: status.edition.to_string(),
                unique_id: status.unique_id,
                world_name: status.world_name,
                game_mode: status.game_mode,
                game_mode_id: status.game_mode_id,
                port_ipv4: status.port_ipv4,
                port_ipv6: status.port_ipv6,
            }),
        }
    }
}
