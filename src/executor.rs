use std::time::Duration;

use mcquery::tokio::ServerStatus;

use crate::{command::Target, structures::StatusResponse, Failure};

pub async fn ping_java(target: &Target, timeout: Duration) -> Result<StatusResponse, Failure> {
    let status = mcquery::tokio::query_java(&target.host, target.port, timeout).await?;
    Ok(status.into())
}

pub async fn ping_bedrock(target: &Target, timeout: Duration) -> Result<StatusResponse, Failure> {
    let status = mcquery::tokio::query_bedrock(&target.host, target.port, timeout).await?;
    Ok(status.into())
}

pub async fn probe(target: &Target, timeout: Duration) -> Result<StatusResponse, Failure> {
    Ok(
        match mcquery::tokio::probe(&target.host, target.port, timeout).await? {
            ServerStatus::Bedrock(status) => status.into(),
            ServerStatus::Java(status) => status.into(),
        },
    )
}
