use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// String key-value persistence for settings.
pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
}

/// Process-lifetime store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }
}

/// Store backed by a flat JSON object on disk.
///
/// The whole file is rewritten on every `set`. A missing or unreadable file
/// opens as an empty store. Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(v) => v,
            Err(e) => {
                if path.exists() {
                    log::warn!("ignoring settings file {}: {e:#}", path.display());
                }
                BTreeMap::new()
            }
        };

        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(&self.values).context("failed to encode settings")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
        if let Err(e) = self.flush() {
            log::warn!("settings not persisted: {e:#}");
        }
    }
}

/// A stored value as found on disk: `"1.5"` or a bare `1.5`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StoredValue {
    Text(String),
    Number(serde_json::Number),
    Other(serde_json::Value),
}

impl StoredValue {
    fn into_string(self) -> String {
        match self {
            StoredValue::Text(s) => s,
            StoredValue::Number(n) => n.to_string(),
            StoredValue::Other(v) => v.to_string(),
        }
    }
}

fn read_values(path: &Path) -> Result<BTreeMap<String, String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let raw: BTreeMap<String, StoredValue> =
        serde_json::from_str(&text).context("settings file is not a JSON object")?;

    Ok(raw
        .into_iter()
        .map(|(k, v)| (k, v.into_string()))
        .collect())
}
