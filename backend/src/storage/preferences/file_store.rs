//! # File-backed Preferences
//!
//! Key-value store kept in memory and mirrored to a single YAML file:
//!
//! ```yaml
//! codigo: LPJ-01012000
//! fecha_nac: 01/01/2000
//! materno: PEREZ
//! ```
//!
//! Every mutation updates memory before returning, then schedules the file
//! write on the tokio runtime without waiting for it. Outside a runtime the
//! write happens inline. Writes go to a temp file that is renamed over the
//! target, and each write snapshots the latest values while holding the write
//! lock, so the file always ends up with the newest state.

use anyhow::{anyhow, Context, Result};
use log::{debug, error, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::storage::traits::KeyValueStorage;

#[derive(Clone)]
pub struct FilePreferences {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
    write_lock: tokio::sync::Mutex<()>,
}

impl FilePreferences {
    /// Open the store at `path`, loading any existing values.
    ///
    /// A file that cannot be parsed is logged and treated as empty; it is
    /// replaced on the next write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            parse_values(&path, &content)
        } else {
            BTreeMap::new()
        };
        debug!("Opened preferences at {:?} with {} keys", path, values.len());

        Ok(Self {
            inner: Arc::new(Inner {
                path,
                values: Mutex::new(values),
                write_lock: tokio::sync::Mutex::new(()),
            }),
        })
    }

    /// Write the current values to disk and wait for the write to finish
    pub async fn sync(&self) -> Result<()> {
        self.inner.write_async().await
    }

    fn schedule_write(&self) {
        let inner = Arc::clone(&self.inner);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = inner.write_async().await {
                        error!("Background preferences write to {:?} failed: {:#}", inner.path, e);
                    }
                });
            }
            Err(_) => {
                if let Err(e) = inner.write_blocking() {
                    error!("Preferences write to {:?} failed: {:#}", inner.path, e);
                }
            }
        }
    }
}

fn parse_values(path: &Path, content: &str) -> BTreeMap<String, String> {
    if content.trim().is_empty() {
        return BTreeMap::new();
    }
    match serde_yaml::from_str::<BTreeMap<String, String>>(content) {
        Ok(values) => values,
        Err(e) => {
            warn!("Discarding unreadable preferences file {:?}: {}", path, e);
            BTreeMap::new()
        }
    }
}

impl Inner {
    fn values(&self) -> Result<MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| anyhow!("Preferences lock poisoned"))
    }

    fn snapshot_yaml(&self) -> Result<String> {
        let values = self.values()?;
        Ok(serde_yaml::to_string(&*values)?)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn write_async(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let yaml = self.snapshot_yaml()?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, yaml)
            .await
            .with_context(|| format!("Failed to write {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn write_blocking(&self) -> Result<()> {
        let _guard = self.write_lock.blocking_lock();
        let yaml = self.snapshot_yaml()?;
        let temp = self.temp_path();
        fs::write(&temp, yaml).with_context(|| format!("Failed to write {}", temp.display()))?;
        fs::rename(&temp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStorage for FilePreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.values()?.get(key).cloned())
    }

    fn put_strings(&self, entries: &[(&str, &str)]) -> Result<()> {
        {
            let mut values = self.inner.values()?;
            for (key, value) in entries {
                values.insert((*key).to_string(), (*value).to_string());
            }
        }
        self.schedule_write();
        Ok(())
    }

    fn remove_keys(&self, keys: &[&str]) -> Result<()> {
        let removed = {
            let mut values = self.inner.values()?;
            keys.iter().filter(|key| values.remove(**key).is_some()).count()
        };
        if removed > 0 {
            self.schedule_write();
        }
        Ok(())
    }
}
