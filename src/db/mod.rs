//! Persistence collaborator: one flat JSON collection per key, stored in
//! SQLite behind a dedicated worker thread. Callers hand closures to the
//! worker and await the result, so every operation completes before the next
//! user action is accepted.

use std::{
    path::PathBuf,
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::oneshot;

mod migrations;

use migrations::run_migrations;

/// Storage keys, one per persisted collection. They match the keys the
/// production deployment already stores its data under.
pub mod keys {
    pub const RESPONSIBLES: &str = "responsiblesList";
    pub const PRODUCT_TYPES: &str = "productTypesList";
    pub const ITEMS: &str = "itemsList";
    pub const CONSERVATION_TYPES: &str = "conservationTypesList";
    pub const STORED_LABELS: &str = "storedLabelsList";
}

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("etiqueta-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Database initialized at {}", db_path.display());

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }

    /// Raw JSON document stored under `key`, if any.
    async fn fetch_raw(&self, key: &'static str) -> Result<Option<String>> {
        self.execute(move |conn| {
            conn.query_row(
                "SELECT data FROM collections WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .with_context(|| format!("failed to read collection '{key}'"))
        })
        .await
    }

    /// Load a collection. `Ok(None)` means nothing was ever stored under the
    /// key; a stored document that fails shape validation is an error here
    /// (use [`load_or_default`](Self::load_or_default) to recover from it).
    pub async fn load_collection<T: DeserializeOwned>(
        &self,
        key: &'static str,
    ) -> Result<Option<Vec<T>>> {
        match self.fetch_raw(key).await? {
            Some(raw) => {
                let records: Vec<T> = serde_json::from_str(&raw)
                    .with_context(|| format!("stored collection '{key}' failed validation"))?;
                Ok(Some(records))
            }
            None => Ok(None),
        }
    }

    /// Replace the collection stored under `key` wholesale.
    pub async fn save_collection<T: Serialize>(
        &self,
        key: &'static str,
        records: &[T],
    ) -> Result<()> {
        let data = serde_json::to_string(records)
            .with_context(|| format!("failed to serialize collection '{key}'"))?;

        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO collections (key, data, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                params![key, data, Utc::now().to_rfc3339()],
            )
            .with_context(|| format!("failed to save collection '{key}'"))?;
            Ok(())
        })
        .await
    }

    /// Load a collection, substituting (and immediately persisting) the
    /// supplied default when nothing is stored yet or the stored document
    /// fails validation. Malformed state is logged and recovered, never
    /// surfaced to the user.
    pub async fn load_or_default<T>(&self, key: &'static str, default: Vec<T>) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        match self.fetch_raw(key).await? {
            Some(raw) => match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(records) => Ok(records),
                Err(err) => {
                    warn!("stored collection '{key}' is not in the expected format ({err}); reinitializing with defaults");
                    self.save_collection(key, &default).await?;
                    Ok(default)
                }
            },
            None => {
                self.save_collection(key, &default).await?;
                Ok(default)
            }
        }
    }
}
