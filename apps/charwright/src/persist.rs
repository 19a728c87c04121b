//! # Save Client
//!
//! Hands finished characters to the character store over HTTP.
//!
//! Saving is lenient: a failed save is logged and reported as
//! [`SaveOutcome::Offline`], never as an error, and the completion callback
//! runs either way. There is no retry.

use charwright_core::CharacterRecord;
use serde::{Deserialize, Serialize};

/// Errors from the HTTP save layer.
#[derive(Debug)]
pub enum SaveError {
    /// Cannot reach the character store.
    ConnectionFailed(String),
    /// 401 Unauthorized - invalid or missing save token.
    Unauthorized,
    /// Any other non-success status.
    Rejected(u16, String),
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(msg) => write!(f, "Cannot connect to character store at {msg}"),
            Self::Unauthorized => write!(f, "Unauthorized: invalid or missing save token"),
            Self::Rejected(status, body) => write!(f, "Save rejected ({status}): {body}"),
        }
    }
}

impl std::error::Error for SaveError {}

/// How a save attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    /// The record was not stored; the character is still usable locally.
    Offline { reason: String },
}

impl SaveOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// HTTP client for `POST {base_url}/characters`.
#[derive(Debug, Clone)]
pub struct SaveClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl SaveClient {
    /// Create a client for the store at `base_url`.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store one record.
    pub async fn save(&self, record: &CharacterRecord) -> Result<(), SaveError> {
        let url = format!("{}/characters", self.base_url);
        let mut req = self.http.post(&url).json(record);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| SaveError::ConnectionFailed(format!("{}: {e}", self.base_url)))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(SaveError::Unauthorized);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SaveError::Rejected(status.as_u16(), body))
    }

    /// Store one record, turning any failure into [`SaveOutcome::Offline`].
    pub async fn save_lenient(&self, record: &CharacterRecord) -> SaveOutcome {
        match self.save(record).await {
            Ok(()) => {
                tracing::info!(name = %record.name, store = %self.base_url, "Character saved");
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(name = %record.name, error = %e, "Character save failed; continuing offline");
                SaveOutcome::Offline {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Save a record if a client is configured, then run `on_complete`.
///
/// `on_complete` sees the record and the outcome whether or not the save
/// succeeded.
pub async fn persist_record<F>(
    client: Option<&SaveClient>,
    record: &CharacterRecord,
    on_complete: F,
) -> SaveOutcome
where
    F: FnOnce(&CharacterRecord, &SaveOutcome),
{
    let outcome = match client {
        Some(client) => client.save_lenient(record).await,
        None => SaveOutcome::Offline {
            reason: "no save URL configured".to_string(),
        },
    };
    on_complete(record, &outcome);
    outcome
}

// =============================================================================
// TESTS
// =============================================================================
