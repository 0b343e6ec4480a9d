//! Locally persisted best score per game.
//!
//! One JSON object of `storage key -> best score`, kept next to the
//! executable unless a path is given on the command line.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

const FILE_NAME: &str = "arcade-vault.scores.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct ScoreFile {
    #[serde(default)]
    best: BTreeMap<String, u32>,
}

#[derive(Debug, Clone)]
pub struct BestScores {
    values: BTreeMap<String, u32>,
    /// `None` keeps everything in memory
    path: Option<PathBuf>,
}

impl BestScores {
    /// Read the score file. Missing or unreadable files start empty.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_file(&path) {
            Ok(Some(file)) => {
                log::info!("Loaded {} best scores from {}", file.best.len(), path.display());
                file.best
            }
            Ok(None) => {
                log::debug!("No score file at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                log::warn!("Ignoring score file: {e:#}");
                BTreeMap::new()
            }
        };
        Self { values, path: Some(path) }
    }

    pub fn in_memory() -> Self {
        Self { values: BTreeMap::new(), path: None }
    }

    pub fn default_path() -> PathBuf {
        // Store next to the executable
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                return dir.join(FILE_NAME);
            }
        }
        PathBuf::from(FILE_NAME)
    }

    /// Best score stored under `key`, 0 when absent
    pub fn get(&self, key: &str) -> u32 {
        self.values.get(key).copied().unwrap_or(0)
    }

    /// Keep `score` if it beats the stored best. Returns true when it did.
    /// A failed write is logged; the new best still holds for this session.
    pub fn record(&mut self, key: &str, score: u32) -> bool {
        if score <= self.get(key) {
            return false;
        }
        self.values.insert(key.to_string(), score);
        if let Err(e) = self.save() {
            log::warn!("Could not save best scores: {e:#}");
        }
        true
    }

    fn save(&self) -> anyhow::Result<()> {
        let Some(path) = &self.path else { return Ok(()) };
        let file = ScoreFile { best: self.values.clone() };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        log::debug!("Best scores saved to {}", path.display());
        Ok(())
    }
}

fn read_file(path: &Path) -> anyhow::Result<Option<ScoreFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let file = serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(file))
}
