//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use elo_ladder::error::{LadderError, Result};
use elo_ladder::rating::{InMemoryRatingStorage, JsonFileRatingStorage, RatingStorage};
use elo_ladder::types::{PlayerId, PlayerRecord};
use elo_ladder::LadderManager;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// A ladder backed by a JSON file in its own temporary directory
pub struct FileLadder {
    pub dir: TempDir,
    pub manager: LadderManager,
}

impl FileLadder {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let manager = Self::open_manager(&dir);
        Self { dir, manager }
    }

    /// Start from an existing document written verbatim to disk
    pub fn with_contents(contents: &str) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        std::fs::write(dir.path().join("elo.json"), contents).expect("write seed file");
        let manager = Self::open_manager(&dir);
        Self { dir, manager }
    }

    pub fn data_file(&self) -> PathBuf {
        self.dir.path().join("elo.json")
    }

    /// Open a second manager on the same file, as a restarted process would
    pub fn reopen(&self) -> LadderManager {
        Self::open_manager(&self.dir)
    }

    pub fn read_document(&self) -> serde_json::Value {
        let contents = std::fs::read_to_string(self.data_file()).expect("read data file");
        serde_json::from_str(&contents).expect("data file is valid JSON")
    }

    fn open_manager(dir: &TempDir) -> LadderManager {
        let storage = JsonFileRatingStorage::open(dir.path().join("elo.json"), 5000.0);
        LadderManager::new(Arc::new(storage))
    }
}

/// Storage whose writes can be made to fail on demand
#[derive(Debug, Default)]
pub struct FlakyRatingStorage {
    inner: InMemoryRatingStorage,
    fail_writes: AtomicBool,
    write_attempts: AtomicUsize,
}

impl FlakyRatingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_attempts(&self) -> usize {
        self.write_attempts.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<()> {
        self.write_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LadderError::PersistenceFailure {
                path: PathBuf::from("flaky.json"),
                message: "disk full".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl RatingStorage for FlakyRatingStorage {
    fn default_record(&self) -> PlayerRecord {
        self.inner.default_record()
    }

    fn get(&self, player_id: &str) -> Result<Option<PlayerRecord>> {
        self.inner.get(player_id)
    }

    fn upsert_many(&self, entries: Vec<(PlayerId, PlayerRecord)>) -> Result<()> {
        self.check_write()?;
        self.inner.upsert_many(entries)
    }

    fn remove(&self, player_id: &str) -> Result<bool> {
        self.check_write()?;
        self.inner.remove(player_id)
    }

    fn list(&self) -> Result<Vec<(PlayerId, PlayerRecord)>> {
        self.inner.list()
    }

    fn player_count(&self) -> Result<usize> {
        self.inner.player_count()
    }
}
