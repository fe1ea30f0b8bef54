use crate::{ResultStore, StorageError, check_key};
use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Stores each key as a JSON array in `<directory>/<key>.json`.
///
/// The directory is created on first write. Writes go to a temporary file
/// that is then renamed over the target, so a reader never sees a half
/// written array.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    directory: PathBuf,
}

impl JsonFileStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[async_trait]
impl ResultStore for JsonFileStore {
    async fn write(&self, key: &str, records: &[Value]) -> Result<(), StorageError> {
        check_key(key)?;
        let bytes = serde_json::to_vec_pretty(records).map_err(|source| {
            StorageError::Serialization {
                key: key.to_string(),
                source,
            }
        })?;

        fs::create_dir_all(&self.directory)
            .await
            .map_err(io_error(&self.directory))?;

        let target = self.path_for(key);
        let staging = self.directory.join(format!(".{key}.json.tmp"));
        fs::write(&staging, bytes).await.map_err(io_error(&staging))?;
        fs::rename(&staging, &target).await.map_err(io_error(&target))?;

        tracing::debug!(key, count = records.len(), path = %target.display(), "Stored results.");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<Value>>, StorageError> {
        check_key(key)?;
        let path = self.path_for(key);

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path)(e)),
        };

        let records = serde_json::from_slice::<Vec<Value>>(&bytes).map_err(|source| {
            StorageError::Corrupt {
                key: key.to_string(),
                source,
            }
        })?;
        Ok(Some(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[tokio::test]
    async fn round_trips_records_under_a_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        let records = vec![json!({ "name": "A", "result": {} }), json!({ "name": "B" })];

        store.write("portfolioTestResults", &records).await.unwrap();

        assert_eq!(store.read("portfolioTestResults").await.unwrap(), Some(records));
        assert!(dir.path().join("nested/portfolioTestResults.json").exists());
    }

    #[tokio::test]
    async fn write_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        store.write("probabilityResults", &[json!(1), json!(2)]).await.unwrap();
        store.write("probabilityResults", &[json!(3)]).await.unwrap();

        assert_eq!(store.read("probabilityResults").await.unwrap(), Some(vec![json!(3)]));
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("never-created"));

        assert_eq!(store.read("monteCarloResults").await.unwrap(), None);
    }

    #[tokio::test]
    async fn unparsable_file_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("monteCarloResults.json"), "{ not json").unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(matches!(
            store.read("monteCarloResults").await,
            Err(StorageError::Corrupt { key, .. }) if key == "monteCarloResults"
        ));
    }

    #[tokio::test]
    async fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        assert!(matches!(
            store.write("../escape", &[]).await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
