//! Client configuration
//!
//! An explicit configuration object handed to the client at construction
//! time. Read-only once the client is built; shared across in-flight
//! requests behind an `Arc`.

/// Static server-level authorization applied to every request as an
/// `Authorization: "{auth_type} {token}"` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAuth {
    pub auth_type: String,
    pub token: String,
}

/// Configuration for the platform client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the platform API, with or without a trailing slash.
    pub server_url: String,
    /// Application id sent with every request.
    pub application_id: String,
    /// JavaScript key, sent unless the master key is in use.
    pub javascript_key: Option<String>,
    /// Master key; grants elevated privileges and replaces the JS key.
    pub master_key: Option<String>,
    /// Client version string reported to the platform.
    pub client_version: String,
    /// Optional static authorization header pair.
    pub server_auth: Option<ServerAuth>,
    /// Default for `RequestOptions::use_master_key` when unset.
    pub use_master_key: bool,
    /// Ask the platform for revocable sessions on every request.
    pub force_revocable_session: bool,
    /// Total attempts per logical request, counting the first one.
    pub request_attempt_limit: u32,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, application_id: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            application_id: application_id.into(),
            javascript_key: None,
            master_key: None,
            client_version: format!("rs{}", crate::VERSION),
            server_auth: None,
            use_master_key: false,
            force_revocable_session: false,
            request_attempt_limit: 5,
        }
    }

    /// Set the JavaScript key
    pub fn with_javascript_key(mut self, key: impl Into<String>) -> Self {
        self.javascript_key = Some(key.into());
        self
    }

    /// Set the master key
    pub fn with_master_key(mut self, key: impl Into<String>) -> Self {
        self.master_key = Some(key.into());
        self
    }

    /// Override the reported client version
    pub fn with_client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = version.into();
        self
    }

    /// Set the static server authorization pair
    pub fn with_server_auth(
        mut self,
        auth_type: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        self.server_auth = Some(ServerAuth {
            auth_type: auth_type.into(),
            token: token.into(),
        });
        self
    }

    /// Use the master key by default for every request
    pub fn with_use_master_key(mut self, use_master_key: bool) -> Self {
        self.use_master_key = use_master_key;
        self
    }

    /// Request revocable sessions on every call
    pub fn with_force_revocable_session(mut self, force: bool) -> Self {
        self.force_revocable_session = force;
        self
    }

    /// Set the per-request attempt limit
    pub fn with_request_attempt_limit(mut self, limit: u32) -> Self {
        self.request_attempt_limit = limit;
        self
    }
}
