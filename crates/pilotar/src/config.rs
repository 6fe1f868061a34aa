//! Run configuration.
//!
//! Credentials for the portal under validation are loaded from a JSON
//! document rather than hard-coded into workflows, so the same step lists
//! run against any environment. Field names follow the camelCase convention
//! of the portal's own fixture files.

use crate::result::{PilotarError, PilotarResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Portal endpoint and login credentials
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Login page URL
    pub endpoint: String,
    /// Account identity, typically an email address
    pub identity: String,
    /// Account secret
    pub secret: String,
    /// Answer to the security challenge presented after login
    pub challenge_answer: String,
}

impl Credentials {
    /// Assemble credentials directly, bypassing file loading
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        identity: impl Into<String>,
        secret: impl Into<String>,
        challenge_answer: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            identity: identity.into(),
            secret: secret.into(),
            challenge_answer: challenge_answer.into(),
        }
    }

    /// Parse credentials from a JSON document
    pub fn from_json_str(json: &str) -> PilotarResult<Self> {
        let credentials: Self = serde_json::from_str(json)?;
        credentials.validate()?;
        Ok(credentials)
    }

    /// Load credentials from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> PilotarResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> PilotarResult<()> {
        let fields = [
            ("endpoint", &self.endpoint),
            ("identity", &self.identity),
            ("secret", &self.secret),
            ("challengeAnswer", &self.challenge_answer),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(PilotarError::Config {
                    message: format!("field '{name}' must not be empty"),
                });
            }
        }
        Ok(())
    }
}

// Manual impl so the secret and challenge answer stay out of logs and
// failure reports.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .field("challenge_answer", &"<redacted>")
            .finish()
    }
}
