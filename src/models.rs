//! Data structures shared by the pipeline stages.

/// Class of a file flowing through the build tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactClass {
  /// Raster or vector image asset.
  Image,
  /// JavaScript module or bundle.
  Script,
  /// Stylesheet.
  Style,
  /// HTML template consumed by the module loader.
  Template,
  /// Declarative bundle plan file.
  BundleConfig,
}

/// A single file in the build tree: relative path, payload and class.
///
/// The path is the artifact's current name; it changes exactly once per
/// pipeline stage that renames the artifact.
#[derive(Debug, Clone)]
pub struct Artifact {
  /// Path relative to the dist root, forward slashes on every platform.
  pub path: String,
  /// Byte payload.
  pub content: Vec<u8>,
  /// Declared artifact class.
  pub class: ArtifactClass,
}

impl Artifact {
  /// Create an artifact from its relative path, payload and class.
  pub fn new(path: impl Into<String>, content: Vec<u8>, class: ArtifactClass) -> Self {
    Self {
      path: path.into(),
      content,
      class,
    }
  }

  /// Replace the artifact's current name after a renaming stage.
  pub fn rename(&mut self, path: impl Into<String>) {
    self.path = path.into();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rename_replaces_current_name() {
    let mut artifact = Artifact::new("images/logo.png", vec![1, 2, 3], ArtifactClass::Image);
    artifact.rename("images/logo-abc123.png");
    assert_eq!(artifact.path, "images/logo-abc123.png");
    assert_eq!(artifact.content, vec![1, 2, 3]);
  }
}
