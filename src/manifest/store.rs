//! In-memory and on-disk manifest storage.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use crate::error::RevError;
use crate::manifest::ManifestClass;
use crate::project::ProjectLayout;

/// One original→revisioned pair scoped to a manifest class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
  /// Path the artifact had before hashing, relative to the dist root.
  pub original: String,
  /// Path embedding the content fingerprint.
  pub revisioned: String,
}

/// Insertion-ordered mapping of original to revisioned paths for one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
  entries: Vec<ManifestEntry>,
}

impl Manifest {
  /// Add an entry, rejecting a duplicate original path.
  ///
  /// Returns `false` when the original is already present; the store maps
  /// that to [`RevError::DuplicateOriginalPath`] with its class attached.
  pub fn insert(&mut self, original: &str, revisioned: &str) -> bool {
    if self.get(original).is_some() {
      return false;
    }
    self.entries.push(ManifestEntry {
      original: original.to_string(),
      revisioned: revisioned.to_string(),
    });
    true
  }

  /// Look up the revisioned path for an original path.
  pub fn get(&self, original: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|entry| entry.original == original)
      .map(|entry| entry.revisioned.as_str())
  }

  /// Whether any entry's revisioned path equals the given path.
  pub fn contains_revisioned(&self, path: &str) -> bool {
    self.entries.iter().any(|entry| entry.revisioned == path)
  }

  /// Entries in insertion order.
  pub fn iter(&self) -> impl Iterator<Item = &ManifestEntry> {
    self.entries.iter()
  }

  /// Number of entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// Whether the manifest has no entries.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Fold another manifest in; entries from `other` win on key collision.
  pub fn merge(&mut self, other: Manifest) {
    for entry in other.entries {
      if let Some(existing) = self
        .entries
        .iter_mut()
        .find(|candidate| candidate.original == entry.original)
      {
        existing.revisioned = entry.revisioned;
      } else {
        self.entries.push(entry);
      }
    }
  }

  /// Serialize as a flat JSON object, preserving insertion order.
  pub fn to_json(&self) -> Result<String> {
    let mut map = Map::new();
    for entry in &self.entries {
      map.insert(
        entry.original.clone(),
        Value::String(entry.revisioned.clone()),
      );
    }
    serde_json::to_string_pretty(&Value::Object(map)).context("failed to serialize manifest")
  }

  /// Parse a flat JSON object back into a manifest.
  pub fn from_json(text: &str) -> Result<Self> {
    let map: Map<String, Value> =
      serde_json::from_str(text).context("failed to parse manifest JSON")?;
    let mut manifest = Manifest::default();
    for (original, value) in map {
      let revisioned = value
        .as_str()
        .with_context(|| format!("manifest value for `{original}` is not a string"))?;
      manifest.insert(&original, revisioned);
    }
    Ok(manifest)
  }
}

/// Thread-safe store of per-class manifests.
///
/// Hashing within a stage may run in parallel, so the write path is
/// serialized behind a mutex; rewrite stages only ever read persisted
/// manifests from disk.
pub struct ManifestStore {
  root: PathBuf,
  file_names: HashMap<ManifestClass, String>,
  current: Mutex<HashMap<ManifestClass, Manifest>>,
}

impl ManifestStore {
  /// Create a store rooted at the dist directory, resolving per-class file names.
  pub fn new(root: &Path, layout: &ProjectLayout) -> Self {
    let file_names = ManifestClass::ALL
      .iter()
      .map(|class| (*class, class.file_name(layout).to_string()))
      .collect();
    Self {
      root: root.to_path_buf(),
      file_names,
      current: Mutex::new(HashMap::new()),
    }
  }

  /// Absolute path of a class's manifest file.
  pub fn manifest_path(&self, class: ManifestClass) -> PathBuf {
    self.root.join(&self.file_names[&class])
  }

  /// Record one rename for the current stage's manifest.
  pub fn record(
    &self,
    class: ManifestClass,
    original: &str,
    revisioned: &str,
  ) -> Result<(), RevError> {
    let mut current = self.current.lock();
    let manifest = current.entry(class).or_default();
    if !manifest.insert(original, revisioned) {
      return Err(RevError::DuplicateOriginalPath {
        class,
        path: original.to_string(),
      });
    }
    Ok(())
  }

  /// Fold a manifest into the in-memory state for a class.
  ///
  /// Entries from `other` take precedence, supporting the second hashing
  /// phase where the composed and rewritten bundle replaces its raw entry.
  pub fn merge(&self, class: ManifestClass, other: Manifest) {
    let mut current = self.current.lock();
    current.entry(class).or_default().merge(other);
  }

  /// Snapshot the in-memory manifest for a class.
  pub fn in_memory(&self, class: ManifestClass) -> Manifest {
    self.current.lock().get(&class).cloned().unwrap_or_default()
  }

  /// Write the in-memory manifest for a class to its file, replacing any
  /// manifest persisted by a previous run.
  pub fn persist(&self, class: ManifestClass) -> Result<()> {
    let manifest = self.in_memory(class);
    let path = self.manifest_path(class);
    fs::write(&path, manifest.to_json()?)
      .with_context(|| format!("failed to write {}", path.display()))
  }

  /// Load the persisted manifest for a class.
  ///
  /// Fails with [`RevError::ManifestNotFound`] when the class was never
  /// persisted, which signals that a rewrite stage ran before its hashing
  /// stage.
  pub fn load(&self, class: ManifestClass) -> Result<Manifest> {
    let path = self.manifest_path(class);
    if !path.exists() {
      return Err(RevError::ManifestNotFound { class }.into());
    }
    let text = fs::read_to_string(&path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    Manifest::from_json(&text)
  }
}
