//! Transport dispatcher: one logical send with retry on transient failure
//!
//! Server errors (5xx) and unreachable hosts are retried up to the
//! configured attempt limit with a randomized exponential delay; every
//! other outcome settles immediately. Attempts are strictly sequential
//! and the backoff sleep never blocks other in-flight requests.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::ClientConfig;
use crate::transport::{Transport, TransportError};

/// A settled successful exchange: parsed body plus HTTP status.
#[derive(Debug, Clone)]
pub struct DispatchSuccess {
    pub response: Value,
    pub status: u16,
}

/// Raw failure channel of the dispatcher, before normalization.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Retry budget exhausted without ever reaching the server.
    #[error("unable to connect to the platform API")]
    ConnectionFailed,
    /// The server answered with something other than a structured 200.
    #[error("request rejected with status {status}")]
    Rejected { status: u16, body: String },
    /// The transport call itself failed.
    #[error("{message}")]
    Transport { message: String },
}

/// Sends one logical request over the abstract transport capability.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, config: Arc<ClientConfig>) -> Self {
        Self { transport, config }
    }

    /// Send one logical request, retrying transient failures.
    ///
    /// Resolves with the parsed response on a structured 200; rejects with
    /// the last failure once the attempt limit is exhausted, or immediately
    /// for non-retryable outcomes.
    pub async fn send(
        &self,
        method: &str,
        url: &str,
        body: &str,
        headers: HashMap<String, String>,
    ) -> Result<DispatchSuccess, DispatchError> {
        let headers = self.normalize_headers(headers);
        let limit = self.config.request_attempt_limit.max(1);

        for attempt in 1..=limit {
            let failure = match self
                .transport
                .perform(method, url, body.to_string(), &headers)
                .await
            {
                Ok(res) => {
                    if res.status == 200 {
                        if let Ok(parsed) = serde_json::from_str::<Value>(&res.body) {
                            // Success is exactly a 200 with a structured body.
                            if parsed.is_object() || parsed.is_array() {
                                return Ok(DispatchSuccess {
                                    response: parsed,
                                    status: res.status,
                                });
                            }
                        }
                    }
                    let rejected = DispatchError::Rejected {
                        status: res.status,
                        body: res.body,
                    };
                    if res.status >= 500 {
                        rejected
                    } else {
                        return Err(rejected);
                    }
                }
                Err(TransportError::Unreachable { message }) => {
                    log::debug!("host unreachable: {}", message);
                    DispatchError::ConnectionFailed
                }
                Err(failed @ TransportError::Failed { .. }) => {
                    return Err(DispatchError::Transport {
                        message: serialize_or_raw(&failed),
                    });
                }
            };

            if attempt < limit {
                let delay = backoff_delay(attempt);
                log::warn!(
                    "request to {} failed (attempt {}), retrying after {:?}: {}",
                    url,
                    attempt,
                    delay,
                    failure
                );
                tokio::time::sleep(delay).await;
            } else {
                log::error!(
                    "request to {} failed after {} attempts: {}",
                    url,
                    attempt,
                    failure
                );
                return Err(failure);
            }
        }

        unreachable!("attempt limit is at least 1")
    }

    /// Default to a non-preflight-triggering content type and inject the
    /// static server authorization pair when configured.
    fn normalize_headers(&self, mut headers: HashMap<String, String>) -> HashMap<String, String> {
        headers
            .entry("Content-Type".to_string())
            .or_insert_with(|| "text/plain".to_string());
        if let Some(auth) = &self.config.server_auth {
            headers.insert(
                "Authorization".to_string(),
                format!("{} {}", auth.auth_type, auth.token),
            );
        }
        headers
    }
}

/// Randomized exponential backoff: uniform in `[0, 125 * 2^attempt)` ms,
/// with attempts counted from 1.
pub(crate) fn backoff_delay(attempt: u32) -> Duration {
    let ceiling = 125.0 * f64::powi(2.0, attempt as i32);
    Duration::from_millis((rand::random::<f64>() * ceiling) as u64)
}

/// Render a failure as JSON, falling back to its display form. Never fails.
fn serialize_or_raw<T: Serialize + fmt::Display>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}
