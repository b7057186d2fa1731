//! Ordered concatenation of artifacts into named bundles.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::error::RevError;
use crate::models::Artifact;

/// An ordered concatenation of artifacts under one output name.
///
/// Constituents are consumed into the bundle; later stages reference their
/// content only through the bundle's own path.
#[derive(Debug, Clone)]
pub struct Bundle {
  /// Output name the bundle was composed under.
  pub name: String,
  /// Concatenated content.
  pub content: Vec<u8>,
}

/// Concatenate artifact contents in the caller-supplied order.
///
/// The order is an explicit list, never filesystem enumeration order, so the
/// same input list always yields byte-identical bundle content. Parts are
/// newline-separated when a constituent does not end with one, keeping
/// adjacent scripts from fusing.
pub fn compose(parts: Vec<Artifact>, output_name: &str) -> Result<Bundle, RevError> {
  if parts.is_empty() {
    return Err(RevError::EmptyBundle {
      name: output_name.to_string(),
    });
  }

  let mut content = Vec::new();
  for part in parts {
    let ends_with_newline = part.content.last() == Some(&b'\n');
    content.extend(part.content);
    if !ends_with_newline {
      content.push(b'\n');
    }
  }

  Ok(Bundle {
    name: output_name.to_string(),
    content,
  })
}

/// One bundle plan entry: a source path mapped to its output name.
///
/// A directory source merges every script beneath it; a file source is
/// relocated unmerged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
  /// Source directory or file relative to the dist root.
  pub source: String,
  /// Output name for the merged bundle or relocation target.
  pub output: String,
}

/// Declarative bundle plan, entries in authored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundlePlan {
  entries: Vec<PlanEntry>,
}

impl BundlePlan {
  /// Parse a plan from its flat JSON object form.
  pub fn from_json(text: &str) -> Result<Self> {
    let map: Map<String, Value> =
      serde_json::from_str(text).context("failed to parse bundle plan JSON")?;
    let mut entries = Vec::with_capacity(map.len());
    for (source, value) in map {
      let output = value
        .as_str()
        .with_context(|| format!("bundle plan value for `{source}` is not a string"))?;
      entries.push(PlanEntry {
        source,
        output: output.to_string(),
      });
    }
    Ok(Self { entries })
  }

  /// Load a plan file, returning `None` when the project has no plan.
  pub fn load(path: &Path) -> Result<Option<Self>> {
    if !path.exists() {
      return Ok(None);
    }
    let text = fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(Some(Self::from_json(&text)?))
  }

  /// Entries in authored order.
  pub fn iter(&self) -> impl Iterator<Item = &PlanEntry> {
    self.entries.iter()
  }

  /// Whether the plan lists no bundles.
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::ArtifactClass;

  fn script(path: &str, body: &str) -> Artifact {
    Artifact::new(path, body.as_bytes().to_vec(), ArtifactClass::Script)
  }

  #[test]
  fn concatenates_in_caller_order() {
    let bundle = compose(
      vec![script("b.js", "second\n"), script("a.js", "first")],
      "feature.js",
    )
    .unwrap();
    assert_eq!(bundle.content, b"second\nfirst\n");
  }

  #[test]
  fn same_input_yields_byte_identical_content() {
    let parts = || vec![script("a.js", "one"), script("b.js", "two\n")];
    let first = compose(parts(), "out.js").unwrap();
    let second = compose(parts(), "out.js").unwrap();
    assert_eq!(first.content, second.content);
  }

  #[test]
  fn zero_parts_is_an_empty_bundle_error() {
    let err = compose(Vec::new(), "feature.js").unwrap_err();
    assert!(matches!(err, RevError::EmptyBundle { name } if name == "feature.js"));
  }

  #[test]
  fn plan_preserves_authored_entry_order() {
    let plan = BundlePlan::from_json(
      r#"{"page": "page", "detail": "detail", "setting/setting.js": "modules/"}"#,
    )
    .unwrap();
    let sources: Vec<&str> = plan.iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["page", "detail", "setting/setting.js"]);
  }
}
