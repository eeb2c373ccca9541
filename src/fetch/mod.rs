mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::FeedError;
use tracing::warn;

/// Extra attempts allowed after a transport failure.
const TRANSPORT_RETRIES: u32 = 1;

/// GETs `url` and returns the body as text.
///
/// A transport failure is retried once. HTTP error statuses are not retried.
pub async fn fetch_text<C: HttpClient + ?Sized>(
    client: &C,
    url: &reqwest::Url,
) -> Result<String, FeedError> {
    let mut attempt = 0;
    loop {
        let req = reqwest::Request::new(reqwest::Method::GET, url.clone());
        match send(client, req).await {
            Err(FeedError::Transport(e)) if attempt < TRANSPORT_RETRIES => {
                attempt += 1;
                warn!(error = %e, attempt, "Transit feed request failed, retrying");
            }
            result => return result,
        }
    }
}

async fn send<C: HttpClient + ?Sized>(
    client: &C,
    req: reqwest::Request,
) -> Result<String, FeedError> {
    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FeedError::Status(status));
    }
    Ok(resp.text().await?)
}
