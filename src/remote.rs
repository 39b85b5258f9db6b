//! Remote collaborators: the notification webhook and the remote database
//! insert. Both are optional, attempted independently, and report their
//! outcome instead of failing the submission.

use log::{error, info};
use reqwest::Client;
use serde_json::json;

use crate::models::{LabelDraft, StoredLabel};
use crate::settings::RemoteSettings;

/// Outcome of one remote collaborator attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// No endpoint configured; skipping is a no-op, not an error.
    NotConfigured,
    Delivered,
    Failed(String),
}

impl RemoteOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RemoteOutcome::Failed(_))
    }
}

#[derive(Clone)]
pub struct RemoteClients {
    http: Client,
    settings: RemoteSettings,
}

impl RemoteClients {
    pub fn new(settings: RemoteSettings) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    /// Fire-and-report POST of the draft's fields to the notification
    /// webhook.
    pub async fn notify_webhook(&self, draft: &LabelDraft) -> RemoteOutcome {
        let Some(url) = self.settings.webhook_url.as_deref() else {
            return RemoteOutcome::NotConfigured;
        };

        match self.http.post(url).json(draft).send().await {
            Ok(response) if response.status().is_success() => {
                info!("label posted to notification webhook");
                RemoteOutcome::Delivered
            }
            Ok(response) => {
                let status = response.status();
                error!("notification webhook rejected label: {status}");
                RemoteOutcome::Failed(format!("status {status}"))
            }
            Err(err) => {
                error!("notification webhook unreachable: {err}");
                RemoteOutcome::Failed(err.to_string())
            }
        }
    }

    /// Insert the stored label into the configured remote database table.
    pub async fn insert_label(&self, label: &StoredLabel) -> RemoteOutcome {
        let Some(database) = self.settings.database.as_ref() else {
            return RemoteOutcome::NotConfigured;
        };

        let url = format!(
            "{}/rest/v1/{}",
            database.base_url.trim_end_matches('/'),
            database.table
        );
        let request = self
            .http
            .post(&url)
            .header("apikey", &database.api_key)
            .header("Authorization", format!("Bearer {}", database.api_key))
            .header("Prefer", "return=minimal")
            .json(&json!([label]));

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                info!("label {} inserted into remote table {}", label.id, database.table);
                RemoteOutcome::Delivered
            }
            Ok(response) => {
                let status = response.status();
                error!("remote database rejected label {}: {status}", label.id);
                RemoteOutcome::Failed(format!("status {status}"))
            }
            Err(err) => {
                error!("remote database unreachable: {err}");
                RemoteOutcome::Failed(err.to_string())
            }
        }
    }
}
