//! JSON persistence for rounds, vote files and rate tables.
//!
//! ## Write Protocol
//!
//! A round is serialized to `<path>.tmp`, flushed, then renamed over the
//! target. Nothing touches the target until the new document is complete,
//! so a failure before the rename leaves the previous document in place.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{QfError, Result};
use crate::rates::RateTable;
use crate::types::{parse_votes, Round, Vote};

/// File-backed round document.
#[derive(Debug, Clone)]
pub struct RoundStore {
    path: PathBuf,
}

impl RoundStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Read and validate the persisted round.
    pub fn load(&self) -> Result<Round> {
        let json = read_to_string(&self.path)?;
        let name = self.path.display().to_string();
        let round: Round =
            serde_json::from_str(&json).map_err(|err| QfError::malformed(&name, err.to_string()))?;
        round.validate(&name)?;
        Ok(round)
    }

    /// Atomically replace the persisted round.
    pub fn save(&self, round: &Round) -> Result<()> {
        let json = serde_json::to_string_pretty(round)
            .map_err(|err| QfError::malformed("round", err.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| io_error(parent, err))?;
            }
        }

        let tmp_path = self.tmp_path();
        if tmp_path.exists() {
            fs::remove_file(&tmp_path).map_err(|err| io_error(&tmp_path, err))?;
        }

        let mut file = File::create(&tmp_path).map_err(|err| io_error(&tmp_path, err))?;
        file.write_all(json.as_bytes())
            .and_then(|_| file.sync_all())
            .map_err(|err| io_error(&tmp_path, err))?;
        drop(file);

        fs::rename(&tmp_path, &self.path).map_err(|err| io_error(&self.path, err))?;

        info!(
            "event=round_saved path={} projects={} bytes={}",
            self.path.display(),
            round.projects.len(),
            json.len()
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Read and validate a JSON array of votes.
pub fn read_votes(path: &Path) -> Result<Vec<Vote>> {
    let json = read_to_string(path)?;
    parse_votes(&json, &path.display().to_string())
}

/// Read and validate a JSON rate table.
pub fn read_rates(path: &Path) -> Result<RateTable> {
    let json = read_to_string(path)?;
    RateTable::from_json(&json, &path.display().to_string())
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| io_error(path, err))
}

fn io_error(path: &Path, source: std::io::Error) -> QfError {
    QfError::Io {
        path: path.to_path_buf(),
        source,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
