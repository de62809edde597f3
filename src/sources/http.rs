use std::thread;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::error::KiraError;

const MAX_RETRIES: usize = 3;
const BASE_DELAY_MS: u64 = 200;

/// Blocking HTTP plumbing shared by every upstream adapter.
#[derive(Clone)]
pub struct HttpSource {
    client: Client,
    provider: &'static str,
}

impl HttpSource {
    pub fn new(provider: &'static str, timeout: Duration) -> Result<Self, KiraError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("kira-tp/{}", env!("CARGO_PKG_VERSION"))).map_err(
                |err| KiraError::UpstreamHttp {
                    provider,
                    message: err.to_string(),
                },
            )?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| KiraError::UpstreamHttp {
                provider,
                message: err.to_string(),
            })?;
        Ok(Self { client, provider })
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Sends with retries, checks the status and decodes a JSON body.
    pub fn get_json<F>(&self, make_req: F) -> Result<Value, KiraError>
    where
        F: FnMut() -> RequestBuilder,
    {
        let response = self.send_with_retries(make_req)?;
        let response = self.handle_status(response)?;
        response.json().map_err(|err| KiraError::UpstreamPayload {
            provider: self.provider,
            message: err.to_string(),
        })
    }

    pub fn send_with_retries<F>(&self, mut make_req: F) -> Result<Response, KiraError>
    where
        F: FnMut() -> RequestBuilder,
    {
        let mut attempt = 0usize;
        loop {
            let response = make_req().send();
            match response {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if attempt < MAX_RETRIES && is_retryable_status(status) {
                        tracing::debug!(provider = self.provider, status, attempt, "retrying");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(err) => {
                    if attempt < MAX_RETRIES && is_retryable_error(&err) {
                        tracing::debug!(provider = self.provider, error = %err, attempt, "retrying");
                        thread::sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1)));
                        attempt += 1;
                        continue;
                    }
                    return Err(KiraError::UpstreamHttp {
                        provider: self.provider,
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    pub fn handle_status(&self, response: Response) -> Result<Response, KiraError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .map(|body| truncate(&body, 300))
            .unwrap_or_else(|_| format!("{} request failed", self.provider));
        Err(KiraError::UpstreamStatus {
            provider: self.provider,
            status,
            message,
        })
    }

    pub fn payload_error(&self, message: impl Into<String>) -> KiraError {
        KiraError::UpstreamPayload {
            provider: self.provider,
            message: message.into(),
        }
    }
}

fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

fn is_retryable_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

fn truncate(body: &str, max_chars: usize) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Reads a count that upstreams variously encode as a number or a string.
pub fn count_field(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn retry_policy_covers_throttling_and_gateway_errors() {
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(503));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(400));
    }

    #[test]
    fn count_field_accepts_numbers_and_strings() {
        assert_eq!(count_field(Some(&json!(12))), Some(12));
        assert_eq!(count_field(Some(&json!("3405"))), Some(3405));
        assert_eq!(count_field(Some(&json!("n/a"))), None);
        assert_eq!(count_field(None), None);
    }

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate("  not found ", 300), "not found");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }
}
