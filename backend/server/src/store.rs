//! # Store
//!
//! Durable home of the whole event.
//!
//! ## Requirements
//!
//! - Single process, single file
//! - Whole-document load/save, the event is small (one title, tens of battles)
//! - A reader never sees a half-written file
//! - First load with nothing on disk writes a default event
//!
//! ## Implementation
//!
//! - [`FileStore`]: pretty JSON, written to `<file>.tmp`, synced, then renamed over the target
//!   (parent directory synced after the rename on unix)
//! - [`MemoryStore`]: same contract without the disk, used by tests and throwaway runs
//! - Neither does its own locking across load/save, [`crate::arena::Arena`] holds the lock
use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use thiserror::Error;
use tracing::info;

use crate::battle::Event;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Stored state is corrupt: {0}")]
    Corrupt(serde_json::Error),

    #[error("Failed to encode state: {0}")]
    Encode(serde_json::Error),
}

pub trait Store: Send + Sync {
    fn load(&self) -> Result<Event, StoreError>;

    fn save(&self, event: &Event) -> Result<(), StoreError>;
}

pub struct FileStore {
    path: PathBuf,
    default_title: String,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P, default_title: &str) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            path,
            default_title: default_title.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Event, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No state at {}, creating it", self.path.display());

                let event = Event::new(&self.default_title);
                self.save(&event)?;
                return Ok(event);
            }
            Err(e) => return Err(e.into()),
        };

        let mut event: Event = serde_json::from_slice(&data).map_err(StoreError::Corrupt)?;
        if event.title.is_empty() {
            event.title = self.default_title.clone();
        }

        Ok(event)
    }

    fn save(&self, event: &Event) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(event).map_err(StoreError::Encode)?;
        let tmp_path = self.tmp_path();

        let mut file = File::create(&tmp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        sync_parent(&self.path)?;

        Ok(())
    }
}

// The rename itself only survives a crash once the directory entry is on disk.
#[cfg(unix)]
fn sync_parent(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    File::open(parent)?.sync_all()
}

#[cfg(not(unix))]
fn sync_parent(_: &Path) -> io::Result<()> {
    Ok(())
}

pub struct MemoryStore {
    event: Mutex<Option<Event>>,
    default_title: String,
}

impl MemoryStore {
    pub fn new(default_title: &str) -> Self {
        Self {
            event: Mutex::new(None),
            default_title: default_title.to_string(),
        }
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Event, StoreError> {
        let mut guard = self.event.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(guard
            .get_or_insert_with(|| Event::new(&self.default_title))
            .clone())
    }

    fn save(&self, event: &Event) -> Result<(), StoreError> {
        let mut guard = self.event.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(event.clone());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::battle::{Battle, Contender};

    fn battle() -> Battle {
        Battle::new(
            1,
            Contender::new("Cat", "cat.png"),
            Contender::new("Dog", "dog.png"),
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_first_load_writes_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("db.json");
        let store = FileStore::new(&path, "Head-to-Head").unwrap();

        let event = store.load().unwrap();

        assert_eq!(event, Event::new("Head-to-Head"));
        assert!(path.exists());
        assert_eq!(store.load().unwrap(), event);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("db.json"), "Arena").unwrap();

        let mut event = store.load().unwrap();
        event.title = "Finals".to_string();
        event.battles.push(battle());
        store.save(&event).unwrap();

        let reopened = FileStore::new(store.path(), "Arena").unwrap();
        assert_eq!(reopened.load().unwrap(), event);
        assert!(!dir.path().join("db.json.tmp").exists());
    }

    #[test]
    fn test_save_replaces_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        let store = FileStore::new(&path, "Arena").unwrap();

        let mut event = Event::new("A much longer title than the one that follows");
        event.battles.push(battle());
        store.save(&event).unwrap();

        let shorter = Event::new("Short");
        store.save(&shorter).unwrap();

        let on_disk: Event = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(on_disk, shorter);
        assert!(!dir.path().join("db.json.tmp").exists());
    }

    #[test]
    fn test_bare_file_name_syncs_current_dir() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("db.json"), "Arena").unwrap();

        assert!(sync_parent(Path::new("db.json")).is_ok());
        store.save(&Event::new("Arena")).unwrap();
        assert_eq!(store.load().unwrap(), Event::new("Arena"));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, b"{ \"battles\": [").unwrap();

        let store = FileStore::new(&path, "Arena").unwrap();

        assert!(matches!(store.load(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_untitled_file_gets_default_title() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, br#"{ "battles": [] }"#).unwrap();

        let store = FileStore::new(&path, "Arena").unwrap();

        assert_eq!(store.load().unwrap().title, "Arena");
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new("Arena");
        assert_eq!(store.load().unwrap(), Event::new("Arena"));

        let mut event = store.load().unwrap();
        event.battles.push(battle());
        store.save(&event).unwrap();

        assert_eq!(store.load().unwrap().battles.len(), 1);
    }
}
