use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use curator_logging::curator_debug;

use crate::{AtomicFileWriter, PersistError};

/// Small string store for view preferences and similar client-side state.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// All entries live in one RON map file, rewritten atomically on change.
#[derive(Debug)]
pub struct FileStore {
    writer: AtomicFileWriter,
    filename: String,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub const DEFAULT_FILENAME: &'static str = "curator_state.ron";

    pub fn open(dir: &Path) -> Result<Self, PersistError> {
        Self::open_named(dir, Self::DEFAULT_FILENAME)
    }

    /// Loads `{dir}/{filename}`. A missing file is an empty store.
    pub fn open_named(dir: &Path, filename: &str) -> Result<Self, PersistError> {
        let path = dir.join(filename);
        let entries = match fs::read_to_string(&path) {
            Ok(text) => ron::from_str(&text).map_err(|e| PersistError::Parse(e.to_string()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(PersistError::Io(err)),
        };
        curator_debug!("Opened key-value store {:?}", path);
        Ok(Self {
            writer: AtomicFileWriter::new(dir.to_path_buf()),
            filename: filename.to_string(),
            entries,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.writer.dir().join(&self.filename)
    }

    fn flush(&self) -> Result<(), PersistError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&self.entries, pretty)
            .map_err(|e| PersistError::Encode(e.to_string()))?;
        self.writer.write(&self.filename, &content)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistError> {
        if self.entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush()
    }
}
