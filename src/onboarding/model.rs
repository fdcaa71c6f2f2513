//! Profile snapshot and the predicates the coordinator branches on.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

/// Profile version assigned to a profile that has never completed onboarding.
pub const FIRST_ONBOARDING_VERSION: u32 = 0;

/// Immutable view of the user profile fields relevant to the email step.
///
/// Decodes from the backend user-profile JSON; fields not listed here are
/// ignored. The coordinator never mutates a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    /// Opaque identity, only used for logging.
    #[serde(rename = "fiscal_code")]
    pub identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_email_validated: bool,
    #[serde(default)]
    pub version: u32,
}

impl ProfileSnapshot {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            email: None,
            is_email_validated: false,
            version: FIRST_ONBOARDING_VERSION,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_email_validated(mut self, validated: bool) -> Self {
        self.is_email_validated = validated;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Decode a snapshot from backend profile JSON.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode a snapshot from a JSON file.
    pub async fn load(path: &Path) -> Result<Self, ProfileError> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ProfileError::Read {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json(&raw)
    }
}

/// True iff an email address is present and non-empty.
pub fn has_profile_email(profile: &ProfileSnapshot) -> bool {
    profile.email.as_deref().is_some_and(|e| !e.trim().is_empty())
}

/// True iff the email is marked validated.
pub fn is_profile_email_validated(profile: &ProfileSnapshot) -> bool {
    profile.is_email_validated
}

/// True iff the profile has never been through onboarding.
pub fn is_profile_first_onboarding(profile: &ProfileSnapshot) -> bool {
    profile.version == FIRST_ONBOARDING_VERSION
}
