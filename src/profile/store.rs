//! Encrypted profile store.
//!
//! One record per profile under the store directory: the serialized profile is
//! encrypted as a whole with a store-held key ([`StoreKey`]) that lives in its
//! own file beside the records. Writes go through a single store lock; lookups
//! that find nothing return `Option`/`bool`, never an error.

use crate::fingerprint::FingerprintGenerator;
use crate::profile::encryption::{CryptoError, StoreKey};
use crate::profile::types::FingerprintProfile;
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

const RECORD_EXTENSION: &str = "profile";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Profile with name '{0}' already exists")]
  DuplicateName(String),

  #[error("Storage error: {0}")]
  Storage(String),

  #[error(transparent)]
  Crypto(#[from] CryptoError),
}

impl From<std::io::Error> for StoreError {
  fn from(e: std::io::Error) -> Self {
    StoreError::Storage(e.to_string())
  }
}

impl From<serde_json::Error> for StoreError {
  fn from(e: serde_json::Error) -> Self {
    StoreError::Storage(e.to_string())
  }
}

pub struct ProfileStore {
  dir: PathBuf,
  key: StoreKey,
  generator: Mutex<FingerprintGenerator>,
  // Serializes all record writes; contention is interactive-scale
  write_lock: Mutex<()>,
}

impl ProfileStore {
  /// Open (or initialize) a store at `dir`.
  pub fn open(dir: PathBuf) -> Result<Self, StoreError> {
    fs::create_dir_all(&dir)?;
    let key = StoreKey::load_or_create(&dir)?;
    Ok(Self {
      dir,
      key,
      generator: Mutex::new(FingerprintGenerator::new()),
      write_lock: Mutex::new(()),
    })
  }

  /// Open the store at the default profiles directory.
  pub fn open_default() -> Result<Self, StoreError> {
    Self::open(crate::app_dirs::profiles_dir())
  }

  /// Replace the fingerprint generator, e.g. with a seeded one in tests.
  pub fn with_generator(mut self, generator: FingerprintGenerator) -> Self {
    self.generator = Mutex::new(generator);
    self
  }

  fn record_path(&self, id: &Uuid) -> PathBuf {
    self.dir.join(format!("{id}.{RECORD_EXTENSION}"))
  }

  fn profile_dir(&self, id: &Uuid) -> PathBuf {
    self.dir.join(id.to_string())
  }

  fn write_record(&self, profile: &FingerprintProfile) -> Result<(), StoreError> {
    let payload = serde_json::to_vec(profile)?;
    let encrypted = self.key.encrypt(&payload)?;
    fs::write(self.record_path(&profile.id), encrypted)?;
    Ok(())
  }

  fn read_record(&self, path: &PathBuf) -> Result<FingerprintProfile, StoreError> {
    let encrypted = fs::read(path)?;
    let payload = self.key.decrypt(&encrypted)?;
    Ok(serde_json::from_slice(&payload)?)
  }

  /// Create a profile. Fields absent from `overrides` are filled by the
  /// fingerprint generator; unknown override keys are ignored.
  pub fn create(
    &self,
    name: &str,
    overrides: Option<Value>,
  ) -> Result<FingerprintProfile, StoreError> {
    if name.trim().is_empty() {
      return Err(StoreError::Validation(
        "Profile name cannot be empty".to_string(),
      ));
    }

    let _guard = self.write_lock.lock().unwrap();

    let id = Uuid::new_v4();
    let now = Utc::now();
    let base = {
      let mut generator = self.generator.lock().unwrap();
      generator.build_profile(id, name, now)
    };

    let profile = match overrides {
      Some(patch) => apply_patch(&base, &patch)?,
      None => base,
    };
    profile.validate().map_err(StoreError::Validation)?;

    // Uniqueness is checked on the final name; overrides may have replaced it
    if self
      .list_unlocked()?
      .iter()
      .any(|p| p.name.to_lowercase() == profile.name.to_lowercase())
    {
      return Err(StoreError::DuplicateName(profile.name.clone()));
    }

    self.write_record(&profile)?;
    fs::create_dir_all(self.profile_dir(&id).join("profile"))?;

    log::info!("Created profile '{name}' ({id})");
    Ok(profile)
  }

  pub fn get(&self, id: &Uuid) -> Result<Option<FingerprintProfile>, StoreError> {
    let path = self.record_path(id);
    if !path.exists() {
      return Ok(None);
    }
    self.read_record(&path).map(Some)
  }

  pub fn get_by_name(&self, name: &str) -> Result<Option<FingerprintProfile>, StoreError> {
    Ok(
      self
        .list()?
        .into_iter()
        .find(|p| p.name.to_lowercase() == name.to_lowercase()),
    )
  }

  /// All profiles, most recently used first.
  pub fn list(&self) -> Result<Vec<FingerprintProfile>, StoreError> {
    self.list_unlocked()
  }

  fn list_unlocked(&self) -> Result<Vec<FingerprintProfile>, StoreError> {
    let mut profiles = Vec::new();
    if !self.dir.exists() {
      return Ok(profiles);
    }
    for entry in fs::read_dir(&self.dir)? {
      let path = entry?.path();
      if path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
        profiles.push(self.read_record(&path)?);
      }
    }
    profiles.sort_by(|a, b| b.last_used.cmp(&a.last_used));
    Ok(profiles)
  }

  /// Apply a partial update. Unknown keys in `patch` are ignored; `id` and
  /// `created_at` cannot be patched. Refreshes `last_used`. Returns false for
  /// an unknown id.
  pub fn update(&self, id: &Uuid, patch: &Value) -> Result<bool, StoreError> {
    let _guard = self.write_lock.lock().unwrap();

    let Some(current) = self.get(id)? else {
      return Ok(false);
    };

    let mut updated = apply_patch(&current, patch)?;
    updated.last_used = Utc::now();
    updated.validate().map_err(StoreError::Validation)?;

    if updated.name.to_lowercase() != current.name.to_lowercase()
      && self
        .list_unlocked()?
        .iter()
        .any(|p| p.id != *id && p.name.to_lowercase() == updated.name.to_lowercase())
    {
      return Err(StoreError::DuplicateName(updated.name));
    }

    self.write_record(&updated)?;
    Ok(true)
  }

  /// Delete a profile record and its owned directory (cookies/session state
  /// stored under the same id). Idempotent: unknown id returns false.
  pub fn delete(&self, id: &Uuid) -> Result<bool, StoreError> {
    let _guard = self.write_lock.lock().unwrap();

    let path = self.record_path(id);
    if !path.exists() {
      return Ok(false);
    }
    fs::remove_file(&path)?;

    let profile_dir = self.profile_dir(id);
    if profile_dir.exists() {
      fs::remove_dir_all(&profile_dir)?;
    }

    log::info!("Deleted profile {id}");
    Ok(true)
  }

  /// Record a launch: bump `usage_count`, refresh `last_used` and `last_ip`.
  pub fn record_launch(&self, id: &Uuid, last_ip: &str) -> Result<bool, StoreError> {
    let _guard = self.write_lock.lock().unwrap();

    let Some(mut profile) = self.get(id)? else {
      return Ok(false);
    };
    profile.usage_count += 1;
    profile.last_used = Utc::now();
    if !last_ip.is_empty() {
      profile.last_ip = last_ip.to_string();
    }
    self.write_record(&profile)?;
    Ok(true)
  }

  /// Accumulate session time in seconds.
  pub fn record_usage_time(&self, id: &Uuid, seconds: u64) -> Result<bool, StoreError> {
    let _guard = self.write_lock.lock().unwrap();

    let Some(mut profile) = self.get(id)? else {
      return Ok(false);
    };
    profile.total_time += seconds;
    self.write_record(&profile)?;
    Ok(true)
  }
}

/// Merge known fields from `patch` over `base`. Unknown keys are skipped, not
/// errors; `id` and `created_at` are immutable.
fn apply_patch(base: &FingerprintProfile, patch: &Value) -> Result<FingerprintProfile, StoreError> {
  let Value::Object(patch_map) = patch else {
    return Err(StoreError::Validation(
      "Profile patch must be a JSON object".to_string(),
    ));
  };

  let mut profile_value = serde_json::to_value(base)?;
  let Value::Object(ref mut profile_map) = profile_value else {
    unreachable!("profiles serialize to objects");
  };

  for (key, value) in patch_map {
    if key == "id" || key == "created_at" {
      continue;
    }
    if profile_map.contains_key(key) {
      profile_map.insert(key.clone(), value.clone());
    }
  }

  serde_json::from_value(profile_value)
    .map_err(|e| StoreError::Validation(format!("Invalid field value: {e}")))
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn test_store() -> (tempfile::TempDir, ProfileStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = ProfileStore::open(dir.path().to_path_buf())
      .unwrap()
      .with_generator(FingerprintGenerator::with_seed(99));
    (dir, store)
  }

  #[test]
  fn test_create_get_roundtrip() {
    let (_dir, store) = test_store();
    let created = store.create("work", None).unwrap();
    let loaded = store.get(&created.id).unwrap().unwrap();
    assert_eq!(created, loaded);
  }

  #[test]
  fn test_create_rejects_empty_and_duplicate_names() {
    let (_dir, store) = test_store();
    assert!(matches!(
      store.create("  ", None),
      Err(StoreError::Validation(_))
    ));

    store.create("work", None).unwrap();
    assert!(matches!(
      store.create("Work", None),
      Err(StoreError::DuplicateName(_))
    ));
  }

  #[test]
  fn test_create_cannot_duplicate_name_via_overrides() {
    let (_dir, store) = test_store();
    store.create("alpha", None).unwrap();
    assert!(matches!(
      store.create("beta", Some(json!({"name": "Alpha"}))),
      Err(StoreError::DuplicateName(_))
    ));
    assert!(store.get_by_name("beta").unwrap().is_none());
  }

  #[test]
  fn test_create_with_overrides() {
    let (_dir, store) = test_store();
    let profile = store
      .create(
        "custom",
        Some(json!({
          "user_agent": "TestAgent/1.0",
          "favorite": true,
          "unknown_field": "ignored"
        })),
      )
      .unwrap();
    assert_eq!(profile.user_agent, "TestAgent/1.0");
    assert!(profile.favorite);
  }

  #[test]
  fn test_update_changes_only_named_field() {
    let (_dir, store) = test_store();
    let created = store.create("work", None).unwrap();

    let updated = store
      .update(&created.id, &json!({"description": "for invoices"}))
      .unwrap();
    assert!(updated);

    let loaded = store.get(&created.id).unwrap().unwrap();
    assert_eq!(loaded.description, "for invoices");
    assert_eq!(loaded.user_agent, created.user_agent);
    assert_eq!(loaded.created_at, created.created_at);
    assert!(loaded.last_used >= created.last_used);
  }

  #[test]
  fn test_update_unknown_id_returns_false() {
    let (_dir, store) = test_store();
    let result = store.update(&Uuid::new_v4(), &json!({"favorite": true}));
    assert!(matches!(result, Ok(false)));
  }

  #[test]
  fn test_update_cannot_violate_proxy_invariant() {
    let (_dir, store) = test_store();
    let created = store.create("work", None).unwrap();
    let result = store.update(&created.id, &json!({"proxy_username": "alice"}));
    assert!(matches!(result, Err(StoreError::Validation(_))));
  }

  #[test]
  fn test_delete_is_idempotent() {
    let (_dir, store) = test_store();
    let created = store.create("gone", None).unwrap();
    assert!(store.delete(&created.id).unwrap());
    assert!(!store.delete(&created.id).unwrap());
    assert!(store.get(&created.id).unwrap().is_none());
  }

  #[test]
  fn test_delete_removes_profile_directory() {
    let (dir, store) = test_store();
    let created = store.create("dircheck", None).unwrap();
    let profile_dir = dir.path().join(created.id.to_string());
    assert!(profile_dir.exists());
    store.delete(&created.id).unwrap();
    assert!(!profile_dir.exists());
  }

  #[test]
  fn test_list_orders_by_last_used_desc() {
    let (_dir, store) = test_store();
    let first = store.create("first", None).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(10));
    let _second = store.create("second", None).unwrap();

    // Touch the first so it becomes most recent
    std::thread::sleep(std::time::Duration::from_millis(10));
    store.record_launch(&first.id, "203.0.113.7").unwrap();

    let listed = store.list().unwrap();
    assert_eq!(listed[0].name, "first");
    assert_eq!(listed[0].usage_count, 1);
    assert_eq!(listed[0].last_ip, "203.0.113.7");
  }

  #[test]
  fn test_get_by_name_is_case_insensitive() {
    let (_dir, store) = test_store();
    store.create("Shopping", None).unwrap();
    assert!(store.get_by_name("shopping").unwrap().is_some());
    assert!(store.get_by_name("missing").unwrap().is_none());
  }

  #[test]
  fn test_record_usage_time_accumulates() {
    let (_dir, store) = test_store();
    let created = store.create("timed", None).unwrap();
    store.record_usage_time(&created.id, 120).unwrap();
    store.record_usage_time(&created.id, 30).unwrap();
    let loaded = store.get(&created.id).unwrap().unwrap();
    assert_eq!(loaded.total_time, 150);
  }

  #[test]
  fn test_records_are_encrypted_on_disk() {
    let (dir, store) = test_store();
    let created = store.create("secret", None).unwrap();
    let raw = fs::read(dir.path().join(format!("{}.profile", created.id))).unwrap();
    let raw_str = String::from_utf8_lossy(&raw);
    assert!(!raw_str.contains("secret"));
    assert!(!raw_str.contains(&created.user_agent));
  }

  #[test]
  fn test_reopened_store_reads_existing_records() {
    let (dir, store) = test_store();
    let created = store.create("persistent", None).unwrap();
    drop(store);

    let reopened = ProfileStore::open(dir.path().to_path_buf()).unwrap();
    let loaded = reopened.get(&created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
  }
}
