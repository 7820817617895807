//! JSON artifacts persisted between pilot stages

use crate::error::{PilotError, Result};
use serde::Serialize;
use std::{fs::{self, File},
          io::BufWriter,
          path::{Path, PathBuf}};

pub const RANKING_ARTIFACT: &str = "cheapest_top_rated.json";
pub const RESERVATION_ARTIFACT: &str = "final_reservation.json";

/// Directory that receives artifacts; files are overwritten on every run
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new("artifacts")
    }
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let failed = |reason: String| PilotError::ArtifactWriteFailed { name: name.to_string(), reason };

        fs::create_dir_all(&self.dir).map_err(|e| failed(e.to_string()))?;

        let path = self.path_of(name);
        let file = File::create(&path).map_err(|e| failed(e.to_string()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(|e| failed(e.to_string()))?;

        log::info!("Saved artifact {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_creates_dir_and_overwrites() {
        let temp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(temp.path().join("nested"));

        store.write_json("a.json", &json!({"n": 1})).unwrap();
        let path = store.write_json("a.json", &json!({"n": 2})).unwrap();

        let content: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(content["n"], 2);
    }
}
