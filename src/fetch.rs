use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{redirect, Client, StatusCode};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;

const BASE_BACKOFF_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Fetch failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Unexpected HTTP status: {status} ({url})")]
    Status { status: StatusCode, url: String },
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl FetchError {
    /// Rate limits, server errors and dropped connections are worth another attempt.
    fn is_transient(&self) -> bool {
        match self {
            Self::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Body(_) => false,
        }
    }
}

pub fn build_client(settings: &Settings) -> Result<Client, FetchError> {
    Client::builder()
        .user_agent(settings.user_agent.as_str())
        .timeout(settings.timeout())
        .redirect(redirect::Policy::limited(settings.max_redirects))
        .build()
        .map_err(FetchError::Transport)
}

/// Download the docs page HTML named by `settings.docs_url`.
pub async fn fetch_docs(settings: &Settings) -> Result<String, FetchError> {
    let client = build_client(settings)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Fetching {}", settings.docs_url));
    pb.enable_steady_tick(Duration::from_millis(120));

    let result = fetch_with_retry(
        &client,
        &settings.docs_url,
        settings.max_retries,
        Duration::from_millis(BASE_BACKOFF_MS),
    )
    .await;

    pb.finish_and_clear();
    result
}

pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    max_retries: u32,
    base_backoff: Duration,
) -> Result<String, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_once(client, url).await {
            Err(e) if e.is_transient() && attempt < max_retries => {
                let backoff = base_backoff * 2u32.pow(attempt);
                warn!(
                    "Fetching {} failed (attempt {}/{}): {}, backing off {:.1}s",
                    url,
                    attempt + 1,
                    max_retries,
                    e,
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

async fn fetch_once(client: &Client, url: &str) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(FetchError::Transport)?;

    let status = response.status();
    info!(%status, url, "fetched docs page");
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }

    response.text().await.map_err(FetchError::Body)
}
