use std::thread;

use reqwest::blocking::Client;

use crate::config::RetryPolicy;
use crate::error::FetchError;

/// GET `url` with bounded retry on transient failures, sleeping the
/// calling thread between attempts. Non-retryable HTTP statuses (4xx
/// other than 429) fail immediately.
pub fn fetch_text(client: &Client, url: &str, retry: &RetryPolicy) -> Result<String, FetchError> {
    let mut last: Option<FetchError> = None;

    for attempt in 0..retry.attempts {
        if attempt > 0 {
            thread::sleep(retry.delay_for(attempt - 1));
        }
        match try_get(client, url) {
            Ok(body) => return Ok(body),
            Err(err) => {
                if !err.is_retryable() {
                    return Err(err);
                }
                last = Some(err);
            }
        }
    }

    Err(FetchError::RetriesExhausted {
        attempts: retry.attempts,
        last: last.map(|e| e.to_string()).unwrap_or_default(),
    })
}

fn try_get(client: &Client, url: &str) -> Result<String, FetchError> {
    let resp = client.get(url).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp.text()?)
}
