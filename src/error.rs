//! Error taxonomy for the revisioning pipeline.
//!
//! Hard errors abort the current stage and propagate to the driver as a
//! whole-run failure; soft conditions are collected per stage into a
//! [`crate::pipeline::StageReport`] while the remaining artifacts continue
//! processing.

use std::fmt;

use thiserror::Error;

use crate::manifest::ManifestClass;

/// Hard pipeline failures indicating a broken ordering or data-integrity invariant.
#[derive(Debug, Error)]
pub enum RevError {
  /// `record` was called twice with the same original path for one class.
  #[error("duplicate entry for `{path}` in the {class} manifest")]
  DuplicateOriginalPath {
    /// Manifest class holding the colliding entry.
    class: ManifestClass,
    /// Original path that was recorded twice.
    path: String,
  },

  /// A stage tried to read a manifest before its hashing stage persisted it.
  #[error("no {class} manifest has been persisted yet")]
  ManifestNotFound {
    /// Manifest class that was requested.
    class: ManifestClass,
  },

  /// The composer was handed zero constituents.
  #[error("bundle `{name}` has no constituents")]
  EmptyBundle {
    /// Output name the empty bundle was composed under.
    name: String,
  },

  /// A script had no recognizable module-wrapper declaration.
  #[error("script has no recognizable module declaration")]
  MalformedModuleDeclaration,
}

/// Per-artifact soft conditions reported after a stage completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageWarning {
  /// An artifact had no bytes. It is still hashed; empty files are meaningful
  /// placeholders, so the condition is reported rather than enforced.
  EmptyContent {
    /// Path of the empty artifact relative to the dist root.
    path: String,
  },

  /// A reference-shaped token matched no manifest entry on either side of the
  /// mapping. The text is left unchanged; some references point at assets
  /// deliberately excluded from hashing.
  UnresolvedReference {
    /// File the reference was found in.
    file: String,
    /// The unresolved path token.
    reference: String,
  },

  /// A template-config lookup key was absent from the combined manifest view.
  MissingTemplateKey {
    /// The manifest key that could not be resolved.
    key: String,
  },
}

impl fmt::Display for StageWarning {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      StageWarning::EmptyContent { path } => {
        write!(f, "`{path}` has no content; hashed anyway")
      }
      StageWarning::UnresolvedReference { file, reference } => {
        write!(f, "`{file}` references `{reference}` which has no manifest entry")
      }
      StageWarning::MissingTemplateKey { key } => {
        write!(f, "template config key `{key}` missing from manifests")
      }
    }
  }
}
