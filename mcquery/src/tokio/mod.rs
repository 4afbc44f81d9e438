mod bedrock;
pub mod framer;
mod java;
pub mod probe;

use std::{
    future::Future,
    net::{IpAddr, SocketAddr},
    sync::OnceLock,
    time::{Duration, Instant},
};

use hickory_resolver::{
    TokioAsyncResolver,
    config::{ResolverConfig, ResolverOpts},
};
use tracing::debug;

use crate::{Bedrock, BedrockStatus, Error, Java, JavaStatus};

pub use probe::{ProbeError, ServerStatus, probe};

/// Represents a pingable entity.
pub trait AsyncPingable {
    /// The type of response that is expected in reply to the ping.
    type Response;

    /// Ping the entity, gathering the response and its latency.
    fn ping(self) -> impl Future<Output = Result<Self::Response, Error>> + Send;
}

/// Retrieve the status of a given Minecraft server using a `AsyncPingable` configuration.
///
/// # Examples
///
/// Query a Java server, waiting at most ten seconds per step:
///
/// ```no_run
/// # async {
/// use std::time::Duration;
///
/// let status = mcquery::tokio::get_status(mcquery::Java {
///     host: "mc.hypixel.net".into(),
///     port: 25565,
///     timeout: Duration::from_secs(10),
/// }).await?;
/// println!("{} ({}ms)", status.description, status.delay_ms);
/// # Ok::<(), mcquery::Error>(())
/// # };
/// ```
///
/// Query a Bedrock server on its default port:
///
/// ```no_run
/// # async {
/// let status = mcquery::tokio::get_status(mcquery::Bedrock {
///     host: "play.nethergames.org".into(),
///     ..Default::default()
/// }).await?;
/// # Ok::<(), mcquery::Error>(())
/// # };
/// ```
///
/// # Errors
/// If the server status cannot be recieved
pub async fn get_status<P: AsyncPingable + Send>(pingable: P) -> Result<P::Response, Error> {
    pingable.ping().await
}

/// Query a Bedrock server with a single unconnected ping.
///
/// # Errors
/// See [`Error`]; a lost datagram surfaces as [`Error::Timeout`].
pub async fn query_bedrock(host: &str, port: u16, timeout: Duration) -> Result<BedrockStatus, Error> {
    get_status(Bedrock {
        host: host.to_string(),
        port,
        timeout,
    })
    .await
}

/// Query a Java server with the Server List Ping.
///
/// # Errors
/// See [`Error`].
pub async fn query_java(host: &str, port: u16, timeout: Duration) -> Result<JavaStatus, Error> {
    get_status(Java {
        host: host.to_string(),
        port,
        timeout,
    })
    .await
}

/// Bounds one step of a query by `timeout`.
pub(crate) async fn deadline<T, E, F>(timeout: Duration, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, E>>,
    Error: From<E>,
{
    ::tokio::time::timeout(timeout, fut)
        .await
        .map_or(Err(Error::Timeout), |res| res.map_err(Error::from))
}

pub(crate) fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Turns `host` into a socket address. IP literals skip DNS entirely.
pub(crate) async fn resolve(host: &str, port: u16) -> Result<SocketAddr, Error> {
    if host.is_empty() {
        return Err(Error::InvalidAddress);
    }
    let literal = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = literal.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    let lookup = resolver().lookup_ip(host).await.map_err(|err| {
        debug!(host, error = %err, "DNS lookup failed");
        Error::DnsLookupFailed
    })?;
    let ip = lookup.iter().next().ok_or(Error::DnsLookupFailed)?;
    debug!(host, %ip, "resolved host");
    Ok(SocketAddr::new(ip, port))
}

fn new_resolver() -> TokioAsyncResolver {
    let config = ResolverConfig::cloudflare();
    let mut opts = ResolverOpts::default();
    opts.cache_size = 64;
    opts.attempts = 3;
    TokioAsyncResolver::tokio(config, opts)
}

pub fn resolver() -> &'static TokioAsyncResolver {
    static RESOLVER: OnceLock<TokioAsyncResolver> = OnceLock::new();
    RESOLVER.get_or_init(new_resolver)
}
