//! Content fingerprinting and revisioned naming.

use crate::error::RevError;
use crate::manifest::{ManifestClass, ManifestStore};
use crate::models::Artifact;

/// Fingerprint length in hex characters, matching the short form embedded in
/// revisioned file names.
const FINGERPRINT_LEN: usize = 10;

/// Outcome of fingerprinting one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision {
  /// Short hex fingerprint of the artifact's byte content.
  pub fingerprint: String,
  /// New name embedding the fingerprint, directory structure preserved.
  pub revisioned_path: String,
  /// The artifact had zero bytes; callers surface this as a soft warning.
  pub empty: bool,
}

/// Short deterministic fingerprint of a byte payload.
///
/// Computed from content only, never from the path, so byte-identical files
/// fingerprint identically across runs and machines.
pub fn fingerprint(bytes: &[u8]) -> String {
  let digest = blake3::hash(bytes);
  let mut hash = hex::encode(digest.as_bytes());
  hash.truncate(FINGERPRINT_LEN);
  hash
}

/// Embed a fingerprint adjacent to the base name: `images/logo.png` becomes
/// `images/logo-<fp>.png`. Extensionless names get the fingerprint suffixed.
pub fn revision_name(path: &str, fingerprint: &str) -> String {
  let (dir, file) = match path.rsplit_once('/') {
    Some((dir, file)) => (Some(dir), file),
    None => (None, path),
  };

  let renamed = match file.rsplit_once('.') {
    Some((stem, ext)) if !stem.is_empty() => format!("{stem}-{fingerprint}.{ext}"),
    _ => format!("{file}-{fingerprint}"),
  };

  match dir {
    Some(dir) => format!("{dir}/{renamed}"),
    None => renamed,
  }
}

/// Fingerprint an artifact and derive its revisioned path.
pub fn revise(artifact: &Artifact) -> Revision {
  let fingerprint = fingerprint(&artifact.content);
  let revisioned_path = revision_name(&artifact.path, &fingerprint);
  Revision {
    fingerprint,
    revisioned_path,
    empty: artifact.content.is_empty(),
  }
}

/// Fingerprint an artifact and record the rename in the store.
pub fn revise_recorded(
  store: &ManifestStore,
  class: ManifestClass,
  artifact: &Artifact,
) -> Result<Revision, RevError> {
  let revision = revise(artifact);
  store.record(class, &artifact.path, &revision.revisioned_path)?;
  Ok(revision)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ArtifactClass;
  use crate::project::ProjectLayout;
  use tempfile::tempdir;

  #[test]
  fn identical_content_yields_identical_names() {
    let a = Artifact::new("images/logo.png", b"bytes".to_vec(), ArtifactClass::Image);
    let b = Artifact::new("images/logo.png", b"bytes".to_vec(), ArtifactClass::Image);
    assert_eq!(revise(&a).revisioned_path, revise(&b).revisioned_path);
  }

  #[test]
  fn fingerprint_depends_on_content_not_path() {
    assert_eq!(fingerprint(b"same"), fingerprint(b"same"));
    assert_ne!(fingerprint(b"same"), fingerprint(b"other"));
    assert_eq!(fingerprint(b"same").len(), FINGERPRINT_LEN);
  }

  #[test]
  fn revision_name_preserves_directories() {
    assert_eq!(
      revision_name("assets/style/all.css", "0123456789"),
      "assets/style/all-0123456789.css"
    );
    assert_eq!(revision_name("app.js", "abcdef0123"), "app-abcdef0123.js");
  }

  #[test]
  fn revision_name_handles_extensionless_and_dotfiles() {
    assert_eq!(revision_name("bin/launcher", "aa11bb22cc"), "bin/launcher-aa11bb22cc");
    assert_eq!(revision_name(".htaccess", "aa11bb22cc"), ".htaccess-aa11bb22cc");
  }

  #[test]
  fn empty_content_is_flagged_but_still_hashed() {
    let artifact = Artifact::new("images/blank.gif", Vec::new(), ArtifactClass::Image);
    let revision = revise(&artifact);
    assert!(revision.empty);
    assert_eq!(revision.fingerprint.len(), FINGERPRINT_LEN);
  }

  #[test]
  fn revise_recorded_writes_a_manifest_entry() {
    let dir = tempdir().unwrap();
    let store = ManifestStore::new(dir.path(), &ProjectLayout::default());
    let artifact = Artifact::new("images/logo.png", b"x".to_vec(), ArtifactClass::Image);

    let revision = revise_recorded(&store, ManifestClass::Images, &artifact).unwrap();
    let manifest = store.in_memory(ManifestClass::Images);
    assert_eq!(
      manifest.get("images/logo.png"),
      Some(revision.revisioned_path.as_str())
    );
  }
}
