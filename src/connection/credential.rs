//! Access Token Handling
//!
//! The identity provider runs outside this crate; it hands over an access
//! token, and the client attaches it to every request as a bearer token.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::RwLock;

use crate::constants::ENV_ACCESS_TOKEN;
use crate::error::{Error, Result};

/// Claim carrying the user's groups
const GROUPS_CLAIM: &str = "cognito:groups";
/// Group names the directory uses for the two kinds of users
const DOCTOR_GROUP: &str = "Patients";
const PATIENT_GROUP: &str = "patients";

/// Something that can supply the current access token
pub trait TokenSource: Send + Sync + 'static {
    /// Current token, `None` if the session has none
    fn access_token(&self) -> Option<String>;

    /// `Authorization` header value
    fn bearer(&self) -> String {
        match self.access_token() {
            Some(token) => format!("Bearer {token}"),
            None => {
                tracing::warn!("No access token stored, sending empty bearer");
                "Bearer ".to_string()
            }
        }
    }
}

/// Session-scoped token store, filled in after sign-in
#[derive(Clone, Debug, Default)]
pub struct SessionToken {
    inner: Arc<RwLock<Option<String>>>,
}

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.set(token);
        session
    }

    /// Store the token handed over by the identity provider
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let token = token.trim();
        *self.inner.write() = (!token.is_empty()).then(|| token.to_string());
    }

    /// Forget the token (sign-out)
    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

impl TokenSource for SessionToken {
    fn access_token(&self) -> Option<String> {
        self.inner.read().clone()
    }
}

/// Token read from the environment on every request
#[derive(Clone, Debug, Default)]
pub struct EnvToken;

impl TokenSource for EnvToken {
    fn access_token(&self) -> Option<String> {
        std::env::var(ENV_ACCESS_TOKEN)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Groups listed in the token payload
///
/// The signature is not checked; the token is only read for display and
/// routing decisions; the API does its own verification.
pub fn token_groups(token: &str) -> Result<Vec<String>> {
    let payload = token.split('.').nth(1).ok_or_else(|| Error::Invalid {
        message: "Access token is not a JWT".to_string(),
    })?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::Invalid {
            message: format!("Token payload decode failed: {e}"),
        })?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes)?;

    Ok(claims
        .get(GROUPS_CLAIM)
        .and_then(|v| v.as_array())
        .map(|groups| {
            groups
                .iter()
                .filter_map(|g| g.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default())
}

/// Kind of signed-in user, derived from token groups
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionRole {
    Doctor,
    Patient,
    Unknown,
}

impl SessionRole {
    pub fn from_groups(groups: &[String]) -> Self {
        if groups.iter().any(|g| g == DOCTOR_GROUP) {
            SessionRole::Doctor
        } else if groups.iter().any(|g| g == PATIENT_GROUP) {
            SessionRole::Patient
        } else {
            SessionRole::Unknown
        }
    }

    pub fn from_token(token: &str) -> Result<Self> {
        token_groups(token).map(|groups| Self::from_groups(&groups))
    }
}
