//! Single-user profile persistence.
//!
//! There is one profile slot, stored under [`STORAGE_KEY`]. The file-backed
//! store keeps a JSON object of key/value entries so other keys written by
//! other tools survive a save.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::profile::UserDetails;

pub const STORAGE_KEY: &str = "myfitnessai-user";

#[derive(Debug, Error)]
pub enum ProfileStoreError {
    #[error("profile store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("profile serialization: {0}")]
    Serde(#[from] serde_json::Error),
    /// The patch does not produce a valid profile. Caller error.
    #[error("invalid profile update: {0}")]
    InvalidPatch(#[source] serde_json::Error),
}

/// Account-less user record. Form fields sit next to name and email.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub details: UserDetails,
}

#[async_trait]
pub trait ProfileRepository: Send + Sync + 'static {
    async fn load(&self) -> Result<Option<StoredProfile>, ProfileStoreError>;
    async fn save(&self, profile: &StoredProfile) -> Result<(), ProfileStoreError>;
    async fn clear(&self) -> Result<(), ProfileStoreError>;

    /// Shallow-merge `patch` into the stored profile. Returns `None` and
    /// writes nothing when no profile is stored.
    async fn update(
        &self,
        patch: Map<String, Value>,
    ) -> Result<Option<StoredProfile>, ProfileStoreError> {
        let Some(current) = self.load().await? else {
            return Ok(None);
        };
        let updated = merge_patch(&current, patch)?;
        self.save(&updated).await?;
        Ok(Some(updated))
    }
}

fn merge_patch(
    current: &StoredProfile,
    patch: Map<String, Value>,
) -> Result<StoredProfile, ProfileStoreError> {
    let mut merged = match serde_json::to_value(current)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    merged.extend(patch);
    serde_json::from_value(Value::Object(merged)).map_err(ProfileStoreError::InvalidPatch)
}

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    slot: RwLock<Option<StoredProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for MemoryProfileStore {
    async fn load(&self) -> Result<Option<StoredProfile>, ProfileStoreError> {
        Ok(self.slot.read().await.clone())
    }

    async fn save(&self, profile: &StoredProfile) -> Result<(), ProfileStoreError> {
        *self.slot.write().await = Some(profile.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ProfileStoreError> {
        *self.slot.write().await = None;
        Ok(())
    }
}

/// Profile kept in a JSON key/value file.
#[derive(Debug)]
pub struct JsonFileProfileStore {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current entries. A missing or corrupt file reads as empty.
    async fn read_entries(&self) -> Result<Map<String, Value>, ProfileStoreError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "profile file is not a JSON object; ignoring");
                Ok(Map::new())
            }
        }
    }

    fn parse_entry(&self, entries: &mut Map<String, Value>) -> Option<StoredProfile> {
        let value = entries.remove(STORAGE_KEY)?;
        match serde_json::from_value(value) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::error!(path = %self.path.display(), error = %e, "failed to parse stored profile");
                None
            }
        }
    }

    async fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), ProfileStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for JsonFileProfileStore {
    async fn load(&self) -> Result<Option<StoredProfile>, ProfileStoreError> {
        let mut entries = self.read_entries().await?;
        Ok(self.parse_entry(&mut entries))
    }

    async fn save(&self, profile: &StoredProfile) -> Result<(), ProfileStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        entries.insert(STORAGE_KEY.to_string(), serde_json::to_value(profile)?);
        self.write_entries(&entries).await
    }

    async fn clear(&self) -> Result<(), ProfileStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        if entries.remove(STORAGE_KEY).is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(())
    }

    /// Holds the write lock across the whole read-merge-write cycle.
    async fn update(
        &self,
        patch: Map<String, Value>,
    ) -> Result<Option<StoredProfile>, ProfileStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await?;
        let Some(current) = self.parse_entry(&mut entries) else {
            return Ok(None);
        };
        let updated = merge_patch(&current, patch)?;
        entries.insert(STORAGE_KEY.to_string(), serde_json::to_value(&updated)?);
        self.write_entries(&entries).await?;
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Goal;
    use serde_json::json;

    fn alice() -> StoredProfile {
        serde_json::from_value(json!({
            "name": "Alice", "email": "alice@example.com",
            "weight": 60, "heightCm": 165, "heightUnit": "cm", "age": 29,
            "sex": "female", "activityLevel": "Lightly Active", "goal": "cut"
        }))
        .unwrap()
    }

    #[test]
    fn password_is_never_kept() {
        let p: StoredProfile =
            serde_json::from_value(json!({"name": "Bob", "password": "hunter2"})).unwrap();
        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("password").is_none());
        assert_eq!(v["name"], "Bob");
    }

    #[tokio::test]
    async fn memory_store_round_trip_and_clear() {
        let store = MemoryProfileStore::new();
        assert_eq!(store.load().await.unwrap(), None);
        store.save(&alice()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(alice()));
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_without_profile_is_a_no_op() {
        let store = MemoryProfileStore::new();
        let patch = json!({"goal": "bulk"}).as_object().cloned().unwrap();
        assert_eq!(store.update(patch).await.unwrap(), None);
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryProfileStore::new();
        store.save(&alice()).await.unwrap();
        let patch = json!({"goal": "bulk", "weight": 62}).as_object().cloned().unwrap();
        let updated = store.update(patch).await.unwrap().unwrap();
        assert_eq!(updated.details.goal, Some(Goal::Bulk));
        assert_eq!(updated.details.weight, Some(62.0));
        assert_eq!(updated.name, "Alice");
        assert_eq!(store.load().await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn invalid_patch_is_reported_and_not_saved() {
        let store = MemoryProfileStore::new();
        store.save(&alice()).await.unwrap();
        let patch = json!({"sex": "other"}).as_object().cloned().unwrap();
        let err = store.update(patch).await.unwrap_err();
        assert!(matches!(err, ProfileStoreError::InvalidPatch(_)));
        assert_eq!(store.load().await.unwrap(), Some(alice()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_file_updates_keep_both_changes() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonFileProfileStore::new(dir.path().join("p.json")));

        for i in 0..20 {
            store.save(&alice()).await.unwrap();
            let name = format!("Alice {i}");
            let a = {
                let store = store.clone();
                let patch = json!({"name": name}).as_object().cloned().unwrap();
                tokio::spawn(async move { store.update(patch).await })
            };
            let b = {
                let store = store.clone();
                let patch = json!({"goal": "bulk"}).as_object().cloned().unwrap();
                tokio::spawn(async move { store.update(patch).await })
            };
            a.await.unwrap().unwrap();
            b.await.unwrap().unwrap();

            let stored = store.load().await.unwrap().unwrap();
            assert_eq!(stored.name, format!("Alice {i}"));
            assert_eq!(stored.details.goal, Some(Goal::Bulk));
        }
    }
}
