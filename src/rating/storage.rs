//! Rating storage interface and implementations
//!
//! This module defines the interface for persisting and retrieving player
//! records, with a JSON file-backed implementation and an in-memory one.
//! Both keep players in the order they were first stored.

use crate::error::LadderError;
use crate::types::{PlayerId, PlayerRecord};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Trait for rating storage operations
pub trait RatingStorage: Send + Sync {
    /// Record handed out for players that are not stored yet
    fn default_record(&self) -> PlayerRecord;

    /// Get a player's record if it is stored
    fn get(&self, player_id: &str) -> crate::error::Result<Option<PlayerRecord>>;

    /// Store or overwrite several records, persisting once
    ///
    /// Either every entry is stored or none is.
    fn upsert_many(&self, entries: Vec<(PlayerId, PlayerRecord)>) -> crate::error::Result<()>;

    /// Remove a player's record, returning whether it existed
    fn remove(&self, player_id: &str) -> crate::error::Result<bool>;

    /// All stored records in insertion order
    fn list(&self) -> crate::error::Result<Vec<(PlayerId, PlayerRecord)>>;

    /// Get total number of stored players
    fn player_count(&self) -> crate::error::Result<usize>;

    /// Get a player's record, or a fresh default one without storing it
    fn get_or_default(&self, player_id: &str) -> crate::error::Result<PlayerRecord> {
        Ok(self
            .get(player_id)?
            .unwrap_or_else(|| self.default_record()))
    }

    /// Store or overwrite a single record
    fn upsert(&self, player_id: &str, record: PlayerRecord) -> crate::error::Result<()> {
        self.upsert_many(vec![(player_id.to_string(), record)])
    }
}

/// Insertion-ordered mapping from player to record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingBook {
    entries: Vec<(PlayerId, PlayerRecord)>,
    index: HashMap<PlayerId, usize>,
}

impl RatingBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player_id: &str) -> Option<&PlayerRecord> {
        self.index.get(player_id).map(|&pos| &self.entries[pos].1)
    }

    /// Insert or overwrite; existing players keep their position
    pub fn insert(&mut self, player_id: PlayerId, record: PlayerRecord) {
        match self.index.get(&player_id) {
            Some(&pos) => self.entries[pos].1 = record,
            None => {
                self.index.insert(player_id.clone(), self.entries.len());
                self.entries.push((player_id, record));
            }
        }
    }

    pub fn remove(&mut self, player_id: &str) -> Option<PlayerRecord> {
        let pos = self.index.remove(player_id)?;
        let (_, record) = self.entries.remove(pos);
        for (id, _) in &self.entries[pos..] {
            if let Some(slot) = self.index.get_mut(id) {
                *slot -= 1;
            }
        }
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PlayerId, &PlayerRecord)> {
        self.entries.iter().map(|(id, record)| (id, record))
    }

    pub fn to_vec(&self) -> Vec<(PlayerId, PlayerRecord)> {
        self.entries.clone()
    }
}

impl FromIterator<(PlayerId, PlayerRecord)> for RatingBook {
    fn from_iter<I: IntoIterator<Item = (PlayerId, PlayerRecord)>>(iter: I) -> Self {
        let mut book = RatingBook::new();
        for (player_id, record) in iter {
            book.insert(player_id, record);
        }
        book
    }
}

impl Serialize for RatingBook {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (player_id, record) in &self.entries {
            map.serialize_entry(player_id, record)?;
        }
        map.end()
    }
}

/// Record shapes accepted in the persisted document
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Full(PlayerRecord),
    /// Older files stored only the rating
    Legacy(f64),
}

impl From<StoredRecord> for PlayerRecord {
    fn from(stored: StoredRecord) -> Self {
        match stored {
            StoredRecord::Full(record) => record,
            StoredRecord::Legacy(rating) => PlayerRecord::new(rating),
        }
    }
}

struct RatingBookVisitor;

impl<'de> Visitor<'de> for RatingBookVisitor {
    type Value = RatingBook;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of player names to rating records")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut book = RatingBook::new();
        while let Some((player_id, stored)) = access.next_entry::<PlayerId, StoredRecord>()? {
            book.insert(player_id, stored.into());
        }
        Ok(book)
    }
}

impl<'de> Deserialize<'de> for RatingBook {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RatingBookVisitor)
    }
}

/// Rating storage backed by a single JSON document
///
/// The whole document is rewritten after every mutation. Changes are made to
/// a copy of the book and only become visible once the write succeeded.
#[derive(Debug)]
pub struct JsonFileRatingStorage {
    path: PathBuf,
    book: RwLock<RatingBook>,
    default_record: PlayerRecord,
}

impl JsonFileRatingStorage {
    /// Open the store at `path`, loading whatever is already there
    ///
    /// A missing or unreadable file gives an empty store.
    pub fn open<P: AsRef<Path>>(path: P, initial_rating: f64) -> Self {
        let path = path.as_ref().to_path_buf();
        let book = Self::load(&path);

        Self {
            path,
            book: RwLock::new(book),
            default_record: PlayerRecord::new(initial_rating),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> RatingBook {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    info!("No rating file at {}, starting empty", path.display());
                } else {
                    warn!(
                        "Failed to read rating file {}, starting empty: {}",
                        path.display(),
                        e
                    );
                }
                return RatingBook::new();
            }
        };

        match serde_json::from_str::<RatingBook>(&contents) {
            Ok(book) => {
                info!("Loaded {} players from {}", book.len(), path.display());
                book
            }
            Err(e) => {
                warn!(
                    "Rating file {} is malformed, starting empty: {}",
                    path.display(),
                    e
                );
                RatingBook::new()
            }
        }
    }

    fn persist(&self, book: &RatingBook) -> crate::error::Result<()> {
        self.write_document(book).map_err(|e| {
            error!("Failed to persist ratings to {}: {}", self.path.display(), e);
            anyhow::Error::from(LadderError::PersistenceFailure {
                path: self.path.clone(),
                message: e.to_string(),
            })
        })
    }

    fn write_document(&self, book: &RatingBook) -> std::io::Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        book.serialize(&mut serializer)?;

        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent)?;
        }

        // Write next to the target and rename so a failed write keeps the old file.
        let tmp_path = self.temp_path();
        if let Err(e) = Self::write_synced(&tmp_path, &buf) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }
        Self::sync_dir(parent.unwrap_or_else(|| Path::new(".")))?;

        debug!(
            "Persisted {} players to {}",
            book.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Write `contents` to `path` and flush it to stable storage
    fn write_synced(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    /// Flush the directory entry so the rename itself survives a crash
    #[cfg(unix)]
    fn sync_dir(dir: &Path) -> std::io::Result<()> {
        File::open(dir)?.sync_all()
    }

    // std cannot open a directory handle on this platform.
    #[cfg(not(unix))]
    fn sync_dir(_dir: &Path) -> std::io::Result<()> {
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Apply `change` to a copy of the book, persist it, then commit
    fn mutate<F>(&self, change: F) -> crate::error::Result<()>
    where
        F: FnOnce(&mut RatingBook),
    {
        let mut book = self
            .book
            .write()
            .map_err(|_| LadderError::lock_poisoned("write"))?;

        let mut updated = book.clone();
        change(&mut updated);
        self.persist(&updated)?;
        *book = updated;

        Ok(())
    }
}

impl RatingStorage for JsonFileRatingStorage {
    fn default_record(&self) -> PlayerRecord {
        self.default_record.clone()
    }

    fn get(&self, player_id: &str) -> crate::error::Result<Option<PlayerRecord>> {
        let book = self
            .book
            .read()
            .map_err(|_| LadderError::lock_poisoned("read"))?;

        Ok(book.get(player_id).cloned())
    }

    fn upsert_many(&self, entries: Vec<(PlayerId, PlayerRecord)>) -> crate::error::Result<()> {
        self.mutate(|book| {
            for (player_id, record) in entries {
                book.insert(player_id, record);
            }
        })
    }

    fn remove(&self, player_id: &str) -> crate::error::Result<bool> {
        {
            let book = self
                .book
                .read()
                .map_err(|_| LadderError::lock_poisoned("read"))?;
            if book.get(player_id).is_none() {
                return Ok(false);
            }
        }

        let mut removed = false;
        self.mutate(|book| removed = book.remove(player_id).is_some())?;
        Ok(removed)
    }

    fn list(&self) -> crate::error::Result<Vec<(PlayerId, PlayerRecord)>> {
        let book = self
            .book
            .read()
            .map_err(|_| LadderError::lock_poisoned("read"))?;

        Ok(book.to_vec())
    }

    fn player_count(&self) -> crate::error::Result<usize> {
        let book = self
            .book
            .read()
            .map_err(|_| LadderError::lock_poisoned("read"))?;

        Ok(book.len())
    }
}

/// In-memory rating storage implementation
#[derive(Debug)]
pub struct InMemoryRatingStorage {
    book: RwLock<RatingBook>,
    default_record: PlayerRecord,
}

impl InMemoryRatingStorage {
    /// Create a new in-memory rating storage
    pub fn new(initial_rating: f64) -> Self {
        Self::with_records(initial_rating, Vec::new())
    }

    /// Create a storage preloaded with records
    pub fn with_records(initial_rating: f64, records: Vec<(PlayerId, PlayerRecord)>) -> Self {
        Self {
            book: RwLock::new(records.into_iter().collect()),
            default_record: PlayerRecord::new(initial_rating),
        }
    }
}

impl Default for InMemoryRatingStorage {
    fn default() -> Self {
        Self::new(crate::types::INITIAL_RATING)
    }
}

impl RatingStorage for InMemoryRatingStorage {
    fn default_record(&self) -> PlayerRecord {
        self.default_record.clone()
    }

    fn get(&self, player_id: &str) -> crate::error::Result<Option<PlayerRecord>> {
        let book = self
            .book
            .read()
            .map_err(|_| LadderError::lock_poisoned("read"))?;

        Ok(book.get(player_id).cloned())
    }

    fn upsert_many(&self, entries: Vec<(PlayerId, PlayerRecord)>) -> crate::error::Result<()> {
        let mut book = self
            .book
            .write()
            .map_err(|_| LadderError::lock_poisoned("write"))?;

        for (player_id, record) in entries {
            book.insert(player_id, record);
        }

        Ok(())
    }

    fn remove(&self, player_id: &str) -> crate::error::Result<bool> {
        let mut book = self
            .book
            .write()
            .map_err(|_| LadderError::lock_poisoned("write"))?;

        Ok(book.remove(player_id).is_some())
    }

    fn list(&self) -> crate::error::Result<Vec<(PlayerId, PlayerRecord)>> {
        let book = self
            .book
            .read()
            .map_err(|_| LadderError::lock_poisoned("read"))?;

        Ok(book.to_vec())
    }

    fn player_count(&self) -> crate::error::Result<usize> {
        let book = self
            .book
            .read()
            .map_err(|_| LadderError::lock_poisoned("read"))?;

        Ok(book.len())
    }
}
