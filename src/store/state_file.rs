//! File-backed persistence for the seen-link history

use crate::store::SeenSet;
use crate::RelayError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// The plain-text file holding the comma-terminated fingerprint history
///
/// Read wholly at the start of a run and rewritten wholly at the end. There is
/// no locking: only one run may use a given file at a time.
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the raw file content
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The file does not exist yet
    /// * `Ok(Some(String))` - The file content
    /// * `Err(RelayError)` - Any other I/O failure
    pub async fn read_raw(&self) -> Result<Option<String>, RelayError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Loads the history, treating a missing file as empty
    pub async fn read(&self) -> Result<SeenSet, RelayError> {
        match self.read_raw().await? {
            Some(raw) => Ok(SeenSet::load(&raw)),
            None => {
                tracing::info!(
                    "No seen-link history at {}; starting from empty",
                    self.path.display()
                );
                Ok(SeenSet::new())
            }
        }
    }

    /// Persists the history atomically
    ///
    /// The new content goes to a sibling `.tmp` file which is then renamed over
    /// the target, so a crash mid-write leaves the previous history intact.
    pub async fn write(&self, set: &SeenSet) -> Result<(), RelayError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, set.serialize()).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!(
            "Persisted {} fingerprints to {}",
            set.len(),
            self.path.display()
        );
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
}
