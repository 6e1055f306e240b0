//! Durable single-document storage for the game.
//!
//! The whole [`Game`] lives in one JSON file. Saves never write the target in place:
//! content goes to a hidden sibling temp file which is fsynced and then renamed over
//! the target, so a crash at any point leaves either the old or the new document.
//!
//! Plain [`GameStore::save`] is last-write-wins at document granularity. Two helpers
//! narrow that window for callers that need it:
//!
//! * [`GameStore::save_checked`] compares the document `revision` against the copy
//!   being saved and refuses with [`GameError::Conflict`] when another writer got there
//!   first.
//! * [`GameStore::update`] holds an exclusive lock across load, mutate and save, which
//!   serializes every writer going through it.
//!
//! Locks are `fs2` advisory locks on `<file>.lock`, never on the document itself.

use fs2::FileExt;
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::codec::{self, null_as_default};
use super::errors::{GameError, GameResult};
use super::state::Game;

static TEMP_COUNTER: AtomicU32 = AtomicU32::new(0);

#[derive(Debug, Clone)]
pub struct GameStore {
    path: PathBuf,
}

impl GameStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and decode the document.
    pub async fn load(&self) -> GameResult<Game> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(GameError::NotFound(self.path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let game = codec::decode(&content)?;
        debug!(
            "Loaded game from {} ({} players, {} rounds, revision {})",
            self.path.display(),
            game.players.len(),
            game.rounds.len(),
            game.revision
        );
        Ok(game)
    }

    /// Like [`GameStore::load`], but a missing file yields an empty inactive game.
    pub async fn load_or_default(&self) -> GameResult<Game> {
        match self.load().await {
            Err(GameError::NotFound(_)) => {
                info!("No game document at {}, starting empty", self.path.display());
                Ok(Game::default())
            }
            other => other,
        }
    }

    /// Write the game atomically. Last write wins.
    pub async fn save(&self, game: &Game) -> GameResult<()> {
        let _lock = self.lock()?;
        self.stage(game)?.commit()?;
        debug!("Saved game to {}", self.path.display());
        Ok(())
    }

    /// First half of a save: encode and write the temp file, leaving the target alone.
    pub fn stage(&self, game: &Game) -> GameResult<StagedSave> {
        let content = codec::encode(game)?;
        stage_content(&self.path, &content)
    }

    /// Save only if nobody else saved since `game` was loaded.
    ///
    /// On success the revision of `game` is bumped to match the new document. On any
    /// failure `game` is left exactly as it was passed in.
    pub async fn save_checked(&self, game: &mut Game) -> GameResult<()> {
        let _lock = self.lock()?;
        let found = self.disk_revision()?;
        if found != game.revision {
            warn!(
                "Refusing save to {}: loaded revision {}, disk has {}",
                self.path.display(),
                game.revision,
                found
            );
            return Err(GameError::Conflict {
                expected: game.revision,
                found,
            });
        }
        game.revision += 1;
        let result = self.stage(game).and_then(StagedSave::commit);
        if result.is_err() {
            game.revision -= 1;
        }
        result
    }

    /// Load, apply `mutate`, and save, all under the store lock.
    ///
    /// If `mutate` returns an error nothing is written and the error is passed back
    /// unchanged.
    pub async fn update<T, E, F>(&self, mutate: F) -> Result<T, E>
    where
        F: FnOnce(&mut Game) -> Result<T, E>,
        E: From<GameError>,
    {
        let _lock = self.lock()?;
        let mut game = self.read_sync()?;
        let value = mutate(&mut game)?;
        game.revision += 1;
        self.stage(&game)?.commit()?;
        debug!(
            "Updated game at {} to revision {}",
            self.path.display(),
            game.revision
        );
        Ok(value)
    }

    /// Take the exclusive store lock. Released when the returned file is dropped.
    pub fn lock(&self) -> GameResult<File> {
        let lock_path = lock_path(&self.path);
        if let Some(parent) = lock_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)?;
        lock_file.lock_exclusive()?;
        Ok(lock_file)
    }

    fn read_sync(&self) -> GameResult<Game> {
        match fs::read_to_string(&self.path) {
            Ok(content) => codec::decode(&content),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(GameError::NotFound(self.path.display().to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Revision of the document currently on disk; a missing document counts as 0.
    fn disk_revision(&self) -> GameResult<u64> {
        #[derive(Deserialize)]
        struct RevisionOnly {
            #[serde(default, deserialize_with = "null_as_default")]
            revision: u64,
        }

        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let probe: RevisionOnly = serde_json::from_str(content.trim_start_matches('\0'))?;
                Ok(probe.revision)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

/// Load the game document at `path`.
pub async fn load_game<P: AsRef<Path>>(path: P) -> GameResult<Game> {
    GameStore::new(path).load().await
}

/// Atomically write `game` to `path`. Last write wins.
pub async fn save_game<P: AsRef<Path>>(game: &Game, path: P) -> GameResult<()> {
    GameStore::new(path).save(game).await
}

fn lock_path(path: &Path) -> PathBuf {
    let base = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("game.json");
    path.with_file_name(format!("{}.lock", base))
}

/// A fully written, fsynced temp file waiting to replace its target.
///
/// Dropping it without calling [`StagedSave::commit`] deletes the temp file and leaves
/// the target untouched.
#[must_use = "a staged save does nothing until committed"]
#[derive(Debug)]
pub struct StagedSave {
    tmp_path: PathBuf,
    target: PathBuf,
    done: bool,
}

impl StagedSave {
    pub fn temp_path(&self) -> &Path {
        &self.tmp_path
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rename the temp file over the target and fsync the directory (best effort).
    pub fn commit(mut self) -> GameResult<()> {
        fs::rename(&self.tmp_path, &self.target)?;
        self.done = true;
        let dir = parent_dir(&self.target);
        if let Ok(dir_file) = File::open(dir) {
            let _ = dir_file.sync_all();
        }
        Ok(())
    }
}

impl Drop for StagedSave {
    fn drop(&mut self) {
        if !self.done {
            if let Err(e) = fs::remove_file(&self.tmp_path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!(
                        "Failed to remove abandoned temp file {}: {}",
                        self.tmp_path.display(),
                        e
                    );
                }
            }
        }
    }
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Write `content` to a fresh temp file beside `target` and fsync it.
pub(crate) fn stage_content(target: &Path, content: &str) -> GameResult<StagedSave> {
    let dir = parent_dir(target);
    fs::create_dir_all(dir)?;
    let base = target
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("game.json");
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    loop {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let candidate = dir.join(format!(
            ".{}.tmp-{}-{}-{}",
            base,
            std::process::id(),
            nanos,
            counter
        ));
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
        {
            Ok(mut tmp) => {
                // Own the path before writing so a failed write still cleans up
                let staged = StagedSave {
                    tmp_path: candidate,
                    target: target.to_path_buf(),
                    done: false,
                };
                tmp.write_all(content.as_bytes())?;
                tmp.flush()?;
                tmp.sync_all()?;
                return Ok(staged);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Atomically replace `target` with `content`.
pub(crate) fn write_atomic(target: &Path, content: &str) -> GameResult<()> {
    stage_content(target, content)?.commit()
}
