use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::DailyLog;

const LOG_DIR: &str = "logs";

/// Per-user daily logs stored as `{data_dir}/logs/{user}.json`.
///
/// Every mutation rewrites the whole file. Mutations for the same user are
/// serialized through a per-user lock held across the read-modify-write, so
/// clones of one store never lose each other's updates. Other processes
/// writing the same file are not guarded against.
#[derive(Clone)]
pub struct LogStore {
    log_dir: PathBuf,
    /// One entry per user seen by this store, never pruned.
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl LogStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            log_dir: data_dir.as_ref().join(LOG_DIR),
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Path of the log file for `user`.
    pub fn log_path(&self, user: &str) -> Result<PathBuf> {
        validate_user(user)?;
        Ok(self.log_dir.join(format!("{}.json", user)))
    }

    /// Load the whole log for `user`. A missing file is an empty log.
    pub async fn load_log(&self, user: &str) -> Result<DailyLog> {
        let path = self.log_path(user)?;
        let log: DailyLog = read_json(&path).await?;
        debug!(user, path = %path.display(), days = log.dates().count(), "loaded log");
        Ok(log)
    }

    /// Create an empty log file for a newly registered user.
    ///
    /// Returns `false` and leaves the file alone if it already exists.
    pub async fn create_log(&self, user: &str) -> Result<bool> {
        let path = self.log_path(user)?;
        let lock = self.user_lock(user).await;
        let _guard = lock.lock().await;

        if tokio::fs::try_exists(&path)
            .await
            .map_err(|e| Error::io(&path, e))?
        {
            return Ok(false);
        }
        write_json(&path, &DailyLog::new()).await?;
        debug!(user, path = %path.display(), "created empty log");
        Ok(true)
    }

    /// Load, mutate and rewrite the log for `user` under its lock.
    ///
    /// If `mutate` fails nothing is written and the error is returned.
    pub async fn update<T, F>(&self, user: &str, mutate: F) -> Result<T>
    where
        F: FnOnce(&mut DailyLog) -> Result<T>,
    {
        let path = self.log_path(user)?;
        let lock = self.user_lock(user).await;
        let _guard = lock.lock().await;

        let mut log: DailyLog = read_json(&path).await?;
        let out = mutate(&mut log)?;
        write_json(&path, &log).await?;
        debug!(user, path = %path.display(), "saved log");
        Ok(out)
    }

    async fn user_lock(&self, user: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(user.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

fn validate_user(user: &str) -> Result<()> {
    let bad = user.trim().is_empty()
        || user.contains(['/', '\\', '\0'])
        || user.contains("..");
    if bad {
        return Err(Error::InvalidUser(user.to_string()));
    }
    Ok(())
}

/// Read a JSON file, treating a missing file as `T::default()`.
pub async fn read_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| Error::json(path, e)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Write `value` as two-space indented JSON with non-ASCII text kept as is.
///
/// The file is written next to its destination and renamed into place.
pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::io(parent, e))?;
    }

    let body = serde_json::to_string_pretty(value).map_err(|e| Error::json(path, e))?;

    let tmp_path = path.with_extension(format!("json.tmp.{}", std::process::id()));
    if let Err(e) = tokio::fs::write(&tmp_path, body.as_bytes()).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(Error::io(&tmp_path, e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(Error::io(path, e));
    }
    Ok(())
}
