use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use review_engine::{AtomicFileWriter, KeyValueStore, StoreError};
use review_logging::{review_debug, review_info};

pub const DEFAULT_CONFIG_PATH: &str = "./review_config.ron";

/// Key-value settings kept in a ron file, rewritten atomically on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Reads `path`; a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let values = match fs::read_to_string(path) {
            Ok(text) if text.trim().is_empty() => BTreeMap::new(),
            Ok(text) => ron::from_str(&text).map_err(|err| {
                StoreError::Corrupt(format!("{}: {}", path.display(), err))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                review_debug!("no settings file at {}", path.display());
                BTreeMap::new()
            }
            Err(err) => {
                return Err(StoreError::Unavailable(format!(
                    "{}: {}",
                    path.display(),
                    err
                )))
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), StoreError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&self.values, pretty)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        let (writer, filename) = AtomicFileWriter::for_path(&self.path)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        writer
            .write(&filename, &content)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        review_info!("saved settings to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_engine::{CredentialStore, Provider};
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::open(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn credentials_survive_a_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("review_config.ron");

        let mut credentials = CredentialStore::load(FileStore::open(&path).unwrap()).unwrap();
        credentials.set_key(Provider::Mistral, "m-key").unwrap();
        credentials
            .select_provider(Some(Provider::Mistral))
            .unwrap();
        assert!(path.is_file());

        let reopened = CredentialStore::load(FileStore::open(&path).unwrap()).unwrap();
        let active = reopened.active_credential().unwrap();
        assert_eq!(active.provider, Provider::Mistral);
        assert_eq!(active.api_key, "m-key");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("review_config.ron");
        fs::write(&path, "{ not ron").unwrap();
        assert!(matches!(
            FileStore::open(&path),
            Err(StoreError::Corrupt(_))
        ));
    }
}
