use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::storage::traits::KeyValueStorage;

/// Process-local key-value store; nothing survives a restart
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.lock().map(|v| v.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStorage for MemoryPreferences {
    fn get_string(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|_| anyhow!("Preferences lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    fn put_strings(&self, entries: &[(&str, &str)]) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("Preferences lock poisoned"))?;
        for (key, value) in entries {
            values.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_keys(&self, keys: &[&str]) -> Result<()> {
        let mut values = self.values.lock().map_err(|_| anyhow!("Preferences lock poisoned"))?;
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}
