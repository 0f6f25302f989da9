use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use drill_core::model::{Mode, QuizBank, SaveData, UnknownMode};

const BANK_FILE: &str = "data.quiz";
const REVIEW_FILE: &str = "review_data.quiz";
const SAVE_PREFIX: &str = "save_data_";
const SAVE_SUFFIX: &str = ".quiz";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    /// A precondition failure surfaced to the caller, never retried.
    #[error("required input file {path:?} does not exist")]
    MissingInputFile { path: PathBuf },

    #[error("save file name {name:?} does not match save_data_<seq>_<mode>.quiz")]
    InvalidSaveFileName { name: String },

    #[error(transparent)]
    Mode(#[from] UnknownMode),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

//
// ─── SAVE FILE LISTING ─────────────────────────────────────────────────────────
//

/// One entry of the save-data directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFileEntry {
    pub path: PathBuf,
    pub sequence: u32,
    pub mode: Mode,
}

fn parse_save_file_name(name: &str) -> Result<(u32, Mode), StorageError> {
    let invalid = || StorageError::InvalidSaveFileName {
        name: name.to_string(),
    };

    let stem = name
        .strip_prefix(SAVE_PREFIX)
        .and_then(|rest| rest.strip_suffix(SAVE_SUFFIX))
        .ok_or_else(invalid)?;
    let (sequence, mode) = stem.split_once('_').ok_or_else(invalid)?;
    let sequence: u32 = sequence.parse().map_err(|_| invalid())?;
    let mode: Mode = mode.parse()?;
    Ok((sequence, mode))
}

//
// ─── QUIZ STORE ────────────────────────────────────────────────────────────────
//

/// The sole persistence boundary: master bank, save-data and
/// review-list documents as UTF-8 JSON files under one data directory.
///
/// Every write replaces the whole document; nothing is edited in place,
/// so an aborted transition never leaves a half-written file behind the
/// previously persisted one.
#[derive(Debug, Clone)]
pub struct QuizStore {
    data_dir: PathBuf,
}

impl QuizStore {
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn bank_path(&self) -> PathBuf {
        self.data_dir.join(BANK_FILE)
    }

    #[must_use]
    pub fn review_path(&self) -> PathBuf {
        self.data_dir.join(REVIEW_FILE)
    }

    #[must_use]
    pub fn has_bank(&self) -> bool {
        self.bank_path().exists()
    }

    #[must_use]
    pub fn has_review(&self) -> bool {
        self.review_path().exists()
    }

    #[must_use]
    pub fn has_save_files(&self) -> bool {
        self.list_save_files()
            .map(|entries| !entries.is_empty())
            .unwrap_or(false)
    }

    /// Load the master bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingInputFile` if the bank has not
    /// been imported yet, or an I/O / JSON error.
    pub fn load_bank(&self) -> Result<QuizBank, StorageError> {
        read_json(&self.bank_path())
    }

    /// Replace the master bank document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    pub fn save_bank(&self, bank: &QuizBank) -> Result<(), StorageError> {
        write_json(&self.bank_path(), bank)
    }

    /// Load the review list; a missing file reads as an empty bank.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for I/O or JSON failures.
    pub fn load_review(&self) -> Result<QuizBank, StorageError> {
        let path = self.review_path();
        if !path.exists() {
            return Ok(QuizBank::empty());
        }
        read_json(&path)
    }

    /// Replace the review list document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    pub fn save_review(&self, review: &QuizBank) -> Result<(), StorageError> {
        write_json(&self.review_path(), review)
    }

    /// Load a save-data document from the given path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::MissingInputFile` if the file is absent,
    /// or an I/O / JSON error.
    pub fn load_save_data(&self, path: &Path) -> Result<SaveData, StorageError> {
        read_json(path)
    }

    /// Replace a save-data document at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    pub fn write_save_data(&self, path: &Path, save: &SaveData) -> Result<(), StorageError> {
        write_json(path, save)
    }

    /// All save-data documents in the data directory, ordered by file
    /// name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidSaveFileName` (or the underlying
    /// mode error) for a file that matches the save pattern but does
    /// not parse; other files are ignored.
    pub fn list_save_files(&self) -> Result<Vec<SaveFileEntry>, StorageError> {
        let mut entries = Vec::new();
        let dir = match fs::read_dir(&self.data_dir) {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(err) => return Err(err.into()),
        };

        for item in dir {
            let item = item?;
            let name = item.file_name().to_string_lossy().into_owned();
            if !(name.starts_with(SAVE_PREFIX) && name.ends_with(SAVE_SUFFIX)) {
                continue;
            }
            let (sequence, mode) = parse_save_file_name(&name)?;
            entries.push(SaveFileEntry {
                path: item.path(),
                sequence,
                mode,
            });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    /// Path for the next fresh save-data document: sequence = current
    /// save count + 1, tagged with the originating mode.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the directory listing fails.
    pub fn next_save_path(&self, mode: Mode) -> Result<PathBuf, StorageError> {
        let count = self.list_save_files()?.len();
        let name = format!("{}{:03}_{}{}", SAVE_PREFIX, count + 1, mode, SAVE_SUFFIX);
        Ok(self.data_dir.join(name))
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    if !path.exists() {
        return Err(StorageError::MissingInputFile {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text)?;
    debug!(path = %path.display(), "document replaced");
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
