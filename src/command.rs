use std::fmt::{Display, Formatter};

/// A server to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("no host given")]
    MissingHost,
    #[error("no port given")]
    MissingPort,
    #[error("`{0}` is not a port number")]
    BadPort(String),
    #[error("`{0}` is not a valid address")]
    BadAddress(String),
    #[error("too many arguments")]
    TooManyArguments,
}

/// Parses `<prefix> <host> <port>` or `<prefix> <host>:<port>`.
///
/// Returns `None` when `message` is not this command at all.
pub fn parse_command(prefix: &str, message: &str) -> Option<Result<Target, UsageError>> {
    let rest = message.trim_start().strip_prefix(prefix)?;
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    let args: Vec<&str> = rest.split_whitespace().collect();
    Some(match args.as_slice() {
        [] => Err(UsageError::MissingHost),
        [address] => parse_address(address, None),
        [host, port] => parse_port(port).map(|port| Target {
            host: host.trim_start_matches('[').trim_end_matches(']').to_string(),
            port,
        }),
        _ => Err(UsageError::TooManyArguments),
    })
}

/// Parses `host`, `host:port`, `[v6]`, `[v6]:port` or a bare IPv6 literal.
/// `default_port` fills in a missing port; without one the port is required.
pub fn parse_address(address: &str, default_port: Option<u16>) -> Result<Target, UsageError> {
    let bad = || UsageError::BadAddress(address.to_string());
    let (host, port) = match address.strip_prefix('[') {
        Some(rest) => {
            let (host, after) = rest.split_once(']').ok_or_else(bad)?;
            if after.is_empty() {
                (host, None)
            } else {
                (host, Some(after.strip_prefix(':').ok_or_else(bad)?))
            }
        }
        None => match address.split_once(':') {
            Some((host, port)) if !port.contains(':') => (host, Some(port)),
            _ => (address, None),
        },
    };
    if host.is_empty() {
        return Err(UsageError::MissingHost);
    }
    let port = match port {
        Some(port) => parse_port(port)?,
        None => default_port.ok_or(UsageError::MissingPort)?,
    };
    Ok(Target {
        host: host.to_string(),
        port,
    })
}

fn parse_port(port: &str) -> Result<u16, UsageError> {
    port.parse()
        .map_err(|_| UsageError::BadPort(port.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(host: &str, port: u16) -> Target {
        Target {
            host: host.to_string(),
            port,
        }
    }

    #[test]
    fn test_not_a_command() {
        assert_eq!(parse_command("/mcinfo", "hello there"), None);
        assert_eq!(parse_command("/mcinfo", "/mcinfoo a 1"), None);
    }

    #[test]
    fn test_space_separated() {
        assert_eq!(
            parse_command("/mcinfo", "/mcinfo play.example.org 19132"),
            Some(Ok(target("play.example.org", 19132)))
        );
        assert_eq!(
            parse_command("/mcinfo", "  /mcinfo   1.2.3.4\t25565  "),
            Some(Ok(target("1.2.3.4", 25565)))
        );
    }

    #[test]
    fn test_colon_separated() {
        assert_eq!(
            parse_command("/mcinfo", "/mcinfo play.example.org:19132"),
            Some(Ok(target("play.example.org", 19132)))
        );
        assert_eq!(
            parse_command("/mcinfo", "/mcinfo [::1]:25565"),
            Some(Ok(target("::1", 25565)))
        );
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(
            parse_command("/mcinfo", "/mcinfo"),
            Some(Err(UsageError::MissingHost))
        );
        assert_eq!(
            parse_command("/mcinfo", "/mcinfo example.org"),
            Some(Err(UsageError::MissingPort))
        );
        assert_eq!(
            parse_command("/mcinfo", "/mcinfo example.org port"),
            Some(Err(UsageError::BadPort("port".to_string())))
        );
        assert_eq!(
            parse_command("/mcinfo", "/mcinfo a b c"),
            Some(Err(UsageError::TooManyArguments))
        );
    }

    #[test]
    fn test_address_defaults() {
        assert_eq!(
            parse_address("example.org", Some(25565)),
            Ok(target("example.org", 25565))
        );
        assert_eq!(parse_address("::1", Some(19132)), Ok(target("::1", 19132)));
        assert_eq!(parse_address("[::1]", Some(19132)), Ok(target("::1", 19132)));
        assert_eq!(
            parse_address("[::1", None),
            Err(UsageError::BadAddress("[::1".to_string()))
        );
        assert_eq!(parse_address(":25565", None), Err(UsageError::MissingHost));
    }

    #[test]
    fn test_display() {
        assert_eq!(target("example.org", 1).to_string(), "example.org:1");
        assert_eq!(target("::1", 2).to_string(), "[::1]:2");
    }
}
