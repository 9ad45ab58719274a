//! Identity collaborator seams
//!
//! Async providers for the current installation id and the signed-in user.
//! Persistence of installation identity and user sessions lives behind
//! these traits; the pipeline only consumes them.

use async_trait::async_trait;

/// A signed-in platform user, as exposed by the user collaborator.
#[derive(Debug, Clone)]
pub struct SessionUser {
    session_token: String,
}

impl SessionUser {
    pub fn new(session_token: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
        }
    }

    pub fn session_token(&self) -> &str {
        &self.session_token
    }
}

/// Supplies the stable identifier of this client installation.
#[async_trait]
pub trait InstallationIdProvider: Send + Sync {
    async fn current_installation_id(&self) -> anyhow::Result<String>;
}

/// Supplies the currently signed-in user, if any.
#[async_trait]
pub trait CurrentUserProvider: Send + Sync {
    async fn current_user(&self) -> anyhow::Result<Option<SessionUser>>;
}

/// Provider returning a fixed, caller-supplied installation id, for hosts
/// that manage installation identity themselves.
#[derive(Debug, Clone)]
pub struct FixedInstallationId(String);

impl FixedInstallationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

#[async_trait]
impl InstallationIdProvider for FixedInstallationId {
    async fn current_installation_id(&self) -> anyhow::Result<String> {
        Ok(self.0.clone())
    }
}
