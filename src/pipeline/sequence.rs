//! The fixed stage sequence and its ordering contract.
//!
//! Each stage declares which manifest classes it reads and writes. The
//! declarations make the read-after-write dependencies between stages
//! checkable up front instead of being implied by call-site order.

use std::fmt;

use crate::error::RevError;
use crate::manifest::ManifestClass;

/// Identifier for each fixed pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageId {
  /// Namespace module ids across the tree, then merge plan bundles and the
  /// app bundle.
  ComposeBundles,
  /// Hash and rename every image asset.
  HashImages,
  /// Propagate image renames into CSS, HTML and JS.
  RewriteImageRefs,
  /// Hash and rename scripts and stylesheets, excluding the app bundle.
  HashAssets,
  /// Prepend the loader map and hash the finished app bundle.
  FinalizeAppBundle,
  /// Resolve hashed entry names into the template config record.
  EmitTemplateConfig,
}

impl fmt::Display for StageId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      StageId::ComposeBundles => "compose-bundles",
      StageId::HashImages => "hash-images",
      StageId::RewriteImageRefs => "rewrite-image-refs",
      StageId::HashAssets => "hash-assets",
      StageId::FinalizeAppBundle => "finalize-app-bundle",
      StageId::EmitTemplateConfig => "emit-template-config",
    };
    f.write_str(name)
  }
}

/// A stage's declared manifest reads and writes.
#[derive(Debug, Clone, Copy)]
pub struct StageSpec {
  /// Stage the declaration belongs to.
  pub id: StageId,
  /// Manifest classes the stage loads.
  pub reads: &'static [ManifestClass],
  /// Manifest classes the stage persists.
  pub writes: &'static [ManifestClass],
}

/// The full sequence in execution order.
pub const SEQUENCE: [StageSpec; 6] = [
  StageSpec {
    id: StageId::ComposeBundles,
    reads: &[],
    writes: &[],
  },
  StageSpec {
    id: StageId::HashImages,
    reads: &[],
    writes: &[ManifestClass::Images],
  },
  StageSpec {
    id: StageId::RewriteImageRefs,
    reads: &[ManifestClass::Images],
    writes: &[],
  },
  StageSpec {
    id: StageId::HashAssets,
    reads: &[],
    writes: &[ManifestClass::Assets],
  },
  StageSpec {
    id: StageId::FinalizeAppBundle,
    reads: &[ManifestClass::Assets],
    writes: &[ManifestClass::AppBundle],
  },
  StageSpec {
    id: StageId::EmitTemplateConfig,
    reads: &[ManifestClass::Assets, ManifestClass::AppBundle],
    writes: &[],
  },
];

/// Check that every manifest read is preceded by a write earlier in the
/// sequence.
///
/// A violation surfaces as [`RevError::ManifestNotFound`] for the first class
/// read out of order, the same failure the store would raise at run time.
pub fn verify_sequence(sequence: &[StageSpec]) -> Result<(), RevError> {
  let mut written: Vec<ManifestClass> = Vec::new();
  for spec in sequence {
    for read in spec.reads {
      if !written.contains(read) {
        return Err(RevError::ManifestNotFound { class: *read });
      }
    }
    written.extend_from_slice(spec.writes);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_sequence_satisfies_its_declarations() {
    verify_sequence(&SEQUENCE).unwrap();
  }

  #[test]
  fn rewrite_before_hash_is_rejected() {
    let mut reordered = SEQUENCE;
    reordered.swap(1, 2);
    let err = verify_sequence(&reordered).unwrap_err();
    assert!(matches!(
      err,
      RevError::ManifestNotFound { class: ManifestClass::Images }
    ));
  }

  #[test]
  fn dropping_a_hash_stage_is_rejected() {
    let truncated: Vec<StageSpec> = SEQUENCE
      .iter()
      .copied()
      .filter(|spec| spec.id != StageId::HashAssets)
      .collect();
    let err = verify_sequence(&truncated).unwrap_err();
    assert!(matches!(
      err,
      RevError::ManifestNotFound { class: ManifestClass::Assets }
    ));
  }
}
