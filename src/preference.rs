//! Storage for the reader's language preference. The controller never touches
//! ambient storage directly; it is handed a [`PreferenceStore`].

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A string key-value store with browser `localStorage` semantics: values
/// never expire and writes are best effort.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// An in-memory [`PreferenceStore`].
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(BTreeMap<String, String>);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with a single entry.
    pub fn with(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.set(key, value);
        store
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_owned(), value.to_owned());
    }
}

/// A [`PreferenceStore`] persisted as a flat YAML mapping on disk. The file is
/// read once on [`FileStore::open`] and rewritten on every [`set`].
///
/// [`set`]: PreferenceStore::set
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: MemoryStore,
}

impl FileStore {
    /// Opens the store at `path`. A missing or unreadable file yields an empty
    /// store.
    pub fn open(path: &Path) -> FileStore {
        let entries = match File::open(path) {
            Ok(file) => match serde_yaml::from_reader::<_, Option<BTreeMap<String, String>>>(file) {
                Ok(entries) => MemoryStore(entries.unwrap_or_default()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable preference file");
                    MemoryStore::new()
                }
            },
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no preference file yet");
                MemoryStore::new()
            }
        };
        FileStore {
            path: path.to_owned(),
            entries,
        }
    }

    fn save(&self) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        serde_yaml::to_writer(File::create(&self.path)?, &self.entries.0)?;
        Ok(())
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key)
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.set(key, value);
        if let Err(e) = self.save() {
            warn!(path = %self.path.display(), error = %e, "failed to persist preference");
        }
    }
}
