//! HTTP client for fetching control and catalog documents.

use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, Response};

use crate::config::{HTTP_CONNECT_TIMEOUT_SECS, HTTP_TIMEOUT_SECS, MAX_RETRIES, RETRY_BASE_DELAY_MS};
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
const USER_AGENT: &str = concat!("mediathek-harvester/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client.
///
/// The overall timeout is generous because catalog bodies are large and
/// are streamed into the parser while they download.
pub fn create_client() -> Result<Client> {
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Open a streaming response for a URL with retry logic.
///
/// Uses exponential backoff for transient failures (connection errors,
/// timeouts, 5xx responses). Only establishing the response is retried;
/// the body is handed back unread so callers can stream it.
///
/// # Arguments
/// * `client` - HTTP client to use
/// * `url` - URL to fetch
///
/// # Returns
/// The successful response, implementing `Read` over its body
pub fn open_stream(client: &Client, url: &str) -> Result<Response> {
    let mut last_error: Option<String> = None;

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            // Exponential backoff: 500ms, 1000ms, 2000ms
            let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
            tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
            thread::sleep(Duration::from_millis(delay));
        }

        match client.get(url).send() {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() {
                    tracing::warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }

                // Client errors (4xx) won't succeed on retry
                return Ok(response.error_for_status()?);
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    tracing::warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(HarvesterError::Http(e));
            }
        }
    }

    Err(HarvesterError::RetriesExhausted {
        attempts: MAX_RETRIES,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client() {
        let client = create_client();
        assert!(client.is_ok());
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("mediathek-harvester/"));
    }
}
