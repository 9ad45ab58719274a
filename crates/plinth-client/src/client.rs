//! Request orchestrator
//!
//! Assembles the authenticated payload for one logical request, resolves
//! identity context, drives the transport dispatcher, and funnels every
//! failure through the error normalizer. Callers only ever observe the
//! decoded response body or an `ApiError`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::dispatch::Dispatcher;
use crate::error::{ApiError, Error, Result};
use crate::identity::{CurrentUserProvider, InstallationIdProvider};
use crate::transport::{HttpTransport, Transport, DEFAULT_TIMEOUT_SECS};

/// Options recognized per request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Use the master key for this call; defaults to the config flag.
    pub use_master_key: Option<bool>,
    /// Explicit session token; skips the current-user lookup.
    pub session_token: Option<String>,
    /// Explicit installation id; skips the provider lookup.
    pub installation_id: Option<String>,
    /// Opaque to the pipeline; consumed by batch helpers layered above.
    pub batch_size: Option<usize>,
}

/// Client for the platform REST API.
pub struct Client {
    config: Arc<ClientConfig>,
    dispatcher: Dispatcher,
    installation_ids: Arc<dyn InstallationIdProvider>,
    users: Option<Arc<dyn CurrentUserProvider>>,
}

impl Client {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        installation_ids: Arc<dyn InstallationIdProvider>,
    ) -> Self {
        let config = Arc::new(config);
        let dispatcher = Dispatcher::new(transport, config.clone());
        Self {
            config,
            dispatcher,
            installation_ids,
            users: None,
        }
    }

    /// Create a client backed by the production HTTP transport.
    pub fn over_http(
        config: ClientConfig,
        installation_ids: Arc<dyn InstallationIdProvider>,
    ) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(DEFAULT_TIMEOUT_SECS)?);
        Ok(Self::new(config, transport, installation_ids))
    }

    /// Attach the optional current-user collaborator.
    pub fn with_user_provider(mut self, users: Arc<dyn CurrentUserProvider>) -> Self {
        self.users = Some(users);
        self
    }

    /// Issue one logical request against the platform API.
    ///
    /// The payload is sent as a JSON-encoded POST regardless of `method`;
    /// non-POST verbs travel in the `_method` field for compatibility with
    /// intermediaries that only permit POST. Resolves with the decoded
    /// response body; any transport or server failure surfaces as
    /// `Error::Api`, while a misconfigured master key fails before any
    /// transport call with `Error::Configuration`.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        data: Value,
        options: &RequestOptions,
    ) -> Result<Value> {
        let url = self.absolute_url(path);
        let payload = self.build_payload(method, data, options)?;

        log::debug!("{} {} (sent as POST)", method, url);
        self.execute(&url, payload, options)
            .await
            .map_err(Error::Api)
    }

    /// Steps that may fail after payload assembly; every error here is
    /// normalized into an `ApiError`.
    async fn execute(
        &self,
        url: &str,
        mut payload: Map<String, Value>,
        options: &RequestOptions,
    ) -> std::result::Result<Value, ApiError> {
        let (installation_id, session_token) = tokio::try_join!(
            self.resolve_installation_id(options),
            self.resolve_session_token(options),
        )
        .map_err(ApiError::request_failed)?;

        payload.insert("_InstallationId".to_string(), Value::String(installation_id));
        if let Some(token) = session_token {
            payload.insert("_SessionToken".to_string(), Value::String(token));
        }

        let body = Value::Object(payload).to_string();
        let success = self
            .dispatcher
            .send("POST", url, &body, HashMap::new())
            .await
            .map_err(ApiError::from_dispatch)?;

        Ok(success.response)
    }

    /// Server URL plus path with exactly one separating slash.
    fn absolute_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.server_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build the wire payload: the caller's fields plus the `_`-prefixed
    /// protocol metadata. Fails only on credential misconfiguration, before
    /// any network I/O.
    fn build_payload(
        &self,
        method: &str,
        data: Value,
        options: &RequestOptions,
    ) -> Result<Map<String, Value>> {
        let mut payload = Map::new();
        if let Value::Object(fields) = data {
            for (key, value) in fields {
                payload.insert(key, value);
            }
        }

        if method != "POST" {
            payload.insert("_method".to_string(), Value::String(method.to_string()));
        }

        payload.insert(
            "_ApplicationId".to_string(),
            Value::String(self.config.application_id.clone()),
        );
        if let Some(js_key) = &self.config.javascript_key {
            payload.insert("_JavaScriptKey".to_string(), Value::String(js_key.clone()));
        }
        payload.insert(
            "_ClientVersion".to_string(),
            Value::String(self.config.client_version.clone()),
        );

        let use_master_key = options.use_master_key.unwrap_or(self.config.use_master_key);
        if use_master_key {
            match &self.config.master_key {
                Some(key) if !key.is_empty() => {
                    // The master key overrides the JS key.
                    payload.remove("_JavaScriptKey");
                    payload.insert("_MasterKey".to_string(), Value::String(key.clone()));
                }
                _ => {
                    return Err(Error::Configuration {
                        message: "Cannot use the master key, it has not been provided.".to_string(),
                        source: None,
                    });
                }
            }
        }

        if self.config.force_revocable_session {
            payload.insert("_RevocableSession".to_string(), Value::String("1".to_string()));
        }

        Ok(payload)
    }

    async fn resolve_installation_id(&self, options: &RequestOptions) -> anyhow::Result<String> {
        match &options.installation_id {
            Some(id) if !id.is_empty() => Ok(id.clone()),
            _ => self.installation_ids.current_installation_id().await,
        }
    }

    async fn resolve_session_token(
        &self,
        options: &RequestOptions,
    ) -> anyhow::Result<Option<String>> {
        if let Some(token) = &options.session_token {
            return Ok(Some(token.clone()));
        }
        match &self.users {
            Some(users) => Ok(users
                .current_user()
                .await?
                .map(|user| user.session_token().to_string())),
            None => Ok(None),
        }
    }
}
