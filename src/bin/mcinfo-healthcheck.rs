const DEFAULT_PORT: &str = "8080";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().len() > 2 {
        return Err("`mcinfo-healthcheck` takes at most one argument.".into());
    }
    let url = std::env::args().nth(1).unwrap_or_else(|| {
        let port = std::env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_owned());
        format!("http://127.0.0.1:{port}/healthz")
    });
    reqwest::get(url).await?.error_for_status()?;
    println!("Health check succeeded");
    Ok(())
}
