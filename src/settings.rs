use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

/// Remote database endpoint: a REST base URL plus API key, inserting into a
/// named table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDatabaseSettings {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_labels_table")]
    pub table: String,
}

fn default_labels_table() -> String {
    "generated_labels".to_string()
}

/// Optional remote collaborator configuration. Absent entries mean the
/// corresponding collaborator is skipped, not that submission fails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSettings {
    pub webhook_url: Option<String>,
    pub database: Option<RemoteDatabaseSettings>,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<RemoteSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            RemoteSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn remote(&self) -> RemoteSettings {
        self.data.read().unwrap().clone()
    }

    pub fn update_remote(&self, settings: RemoteSettings) -> Result<()> {
        {
            let mut guard = self.data.write().unwrap();
            *guard = settings;
            self.persist(&guard)?;
        }
        Ok(())
    }

    fn persist(&self, data: &RemoteSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
