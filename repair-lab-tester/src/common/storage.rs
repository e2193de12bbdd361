use repair_lab_game::StateStorage;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Snapshot slot backed by a single JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStorage for FileStorage {
    type Error = io::Error;

    fn load_snapshot(&self) -> Result<Option<String>, Self::Error> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save_snapshot(&self, snapshot: &str) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, snapshot)?;
        log::debug!("saved {} byte snapshot to {}", snapshot.len(), self.path.display());
        Ok(())
    }

    fn clear_snapshot(&self) -> Result<(), Self::Error> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(label: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!(
                "repair-lab-storage-{label}-{}",
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_nanos()
            ))
            .join("state.json")
    }

    #[test]
    fn missing_file_reads_as_empty_slot() {
        let storage = FileStorage::new(temp_file("missing"));
        assert!(storage.load_snapshot().unwrap().is_none());
        storage.clear_snapshot().unwrap();
    }

    #[test]
    fn save_creates_parent_dirs_and_round_trips() {
        let storage = FileStorage::new(temp_file("save"));
        storage.save_snapshot("{\"score\":12}").unwrap();
        assert_eq!(
            storage.load_snapshot().unwrap().as_deref(),
            Some("{\"score\":12}")
        );
        storage.clear_snapshot().unwrap();
        assert!(!storage.path().exists());
    }
}
