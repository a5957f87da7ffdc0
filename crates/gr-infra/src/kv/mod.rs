//! File-backed key-value store
//!
//! One JSON file holding a flat string map. Writes go through a
//! temp-file-and-rename so the file is always either the previous or the
//! fully written new contents.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use gr_core::error::{AppError, AppResult};
use gr_core::ports::KeyValueStorePort;

pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn dir(&self) -> Option<&Path> {
        self.path.parent()
    }

    async fn ensure_parent_dir(&self) -> AppResult<()> {
        if let Some(dir) = self.dir() {
            fs::create_dir_all(dir).await.map_err(|err| {
                AppError::Unknown(format!("create storage dir failed: {err}"))
            })?;
        }
        Ok(())
    }

    async fn read_map(&self) -> AppResult<HashMap<String, String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|err| {
                AppError::Unknown(format!("corrupt key-value file: {err}"))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(AppError::Unknown(format!("read key-value file failed: {err}"))),
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> AppResult<()> {
        self.ensure_parent_dir().await?;

        let content = serde_json::to_string_pretty(map)
            .map_err(|err| AppError::Unknown(format!("serialize key-value map failed: {err}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await.map_err(|err| {
            AppError::Unknown(format!("write temp key-value file failed: {err}"))
        })?;
        fs::rename(&tmp_path, &self.path).await.map_err(|err| {
            AppError::Unknown(format!("rename temp key-value file failed: {err}"))
        })
    }
}

#[async_trait]
impl KeyValueStorePort for FileKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.read_map().await?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await.unwrap_or_else(|err| {
            warn!(error = %err, "resetting corrupt key-value file");
            HashMap::new()
        });
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map).await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}
