//! The chat replies for `/mcinfo`.

use mcquery::tokio::ServerStatus;

use crate::command::Target;

pub fn status(status: &ServerStatus) -> String {
    match status {
        ServerStatus::Bedrock(status) => [
            format!("MOTD: {}", status.motd),
            format!("Protocol version: {}", status.protocol_version),
            format!("Server version: {}", status.server_version),
            format!("Players: {}/{}", status.current_players, status.max_players),
            format!("Unique ID: {}", status.unique_id),
            format!("World: {}", status.world_name),
            format!("Game mode: {}", status.game_mode),
            format!("Ports: {}/{}", status.port_ipv4, status.port_ipv6),
            format!("Latency: {}ms", status.delay_ms),
        ]
        .join("\n"),
        ServerStatus::Java(status) => [
            format!("Server: {}", status.description),
            format!("Protocol version: {}", status.protocol_version),
            format!("Server version: {}", status.server_version),
            format!("Players: {}/{}", status.current_players, status.max_players),
            format!("Latency: {}ms", status.delay_ms),
        ]
        .join("\n"),
    }
}

pub fn failure(target: &Target) -> String {
    format!("Could not get Minecraft server information from {target}")
}

pub fn usage(prefix: &str) -> String {
    format!("Invalid arguments, did you mean:\n{prefix} <host> <port>")
}
