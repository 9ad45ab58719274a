//! Abstract transport capability and the reqwest-backed implementation
//!
//! The dispatcher performs exactly one `Transport::perform` call per
//! attempt; everything above the trait is transport-agnostic.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Default request timeout for the production transport, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One raw exchange result: HTTP status plus unparsed body text.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Failure of the transport call itself, before any status was produced.
#[derive(Debug, Error, Serialize)]
pub enum TransportError {
    /// The remote host could not be reached at all. Retryable.
    #[error("unable to connect: {message}")]
    Unreachable { message: String },
    /// The transport failed for any other reason. Not retryable.
    #[error("transport failure: {message}")]
    Failed { message: String },
}

/// Abstract transport capability.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(
        &self,
        method: &str,
        url: &str,
        body: String,
        headers: &HashMap<String, String>,
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport over reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> crate::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| crate::Error::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(anyhow::anyhow!(e)),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(
        &self,
        method: &str,
        url: &str,
        body: String,
        headers: &HashMap<String, String>,
    ) -> Result<TransportResponse, TransportError> {
        let verb = reqwest::Method::from_bytes(method.as_bytes()).map_err(|e| {
            TransportError::Failed {
                message: format!("invalid HTTP method {}: {}", method, e),
            }
        })?;

        let mut request = self.client.request(verb, url).body(body);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                TransportError::Unreachable {
                    message: e.to_string(),
                }
            } else {
                TransportError::Failed {
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Failed {
                message: e.to_string(),
            })?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted transport double used by the dispatcher and client tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// One request as seen by the mock.
    #[derive(Debug, Clone)]
    pub(crate) struct RecordedRequest {
        pub(crate) method: String,
        pub(crate) url: String,
        pub(crate) body: String,
        pub(crate) headers: HashMap<String, String>,
    }

    /// Transport double that replays a scripted sequence of outcomes and
    /// records every request it sees.
    pub(crate) struct MockTransport {
        script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        calls: AtomicUsize,
        seen: Mutex<Vec<RecordedRequest>>,
    }

    impl MockTransport {
        pub(crate) fn new() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn reply(self, status: u16, body: &str) -> Self {
            self.script.lock().unwrap().push_back(Ok(TransportResponse {
                status,
                body: body.to_string(),
            }));
            self
        }

        pub(crate) fn fail(self, error: TransportError) -> Self {
            self.script.lock().unwrap().push_back(Err(error));
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
            self.seen.lock().unwrap().clone()
        }

        pub(crate) fn last_request(&self) -> RecordedRequest {
            self.seen
                .lock()
                .unwrap()
                .last()
                .expect("no request recorded")
                .clone()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn perform(
            &self,
            method: &str,
            url: &str,
            body: String,
            headers: &HashMap<String, String>,
        ) -> Result<TransportResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(RecordedRequest {
                method: method.to_string(),
                url: url.to_string(),
                body,
                headers: headers.clone(),
            });
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("mock transport script exhausted")
        }
    }
}
