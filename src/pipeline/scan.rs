//! Dist tree scanning utilities.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Recursively collect relative file paths under `root` satisfying `keep`.
///
/// Paths use forward slashes on every platform and come back sorted, so a
/// scan never depends on filesystem enumeration order. Dotfiles are skipped.
pub fn collect_files<F>(root: &Path, keep: F) -> Result<Vec<String>>
where
  F: Fn(&str) -> bool,
{
  let mut files = Vec::new();
  if root.exists() {
    collect_into(root, "", &keep, &mut files)?;
  }
  files.sort();
  Ok(files)
}

fn collect_into<F>(dir: &Path, relative: &str, keep: &F, files: &mut Vec<String>) -> Result<()>
where
  F: Fn(&str) -> bool,
{
  let entries =
    fs::read_dir(dir).with_context(|| format!("failed to read directory {}", dir.display()))?;
  for entry in entries {
    let entry = entry?;
    let file_name = entry.file_name();
    let name_str = file_name.to_string_lossy();
    if name_str.starts_with('.') {
      continue;
    }

    let child_relative = if relative.is_empty() {
      name_str.to_string()
    } else {
      format!("{relative}/{name_str}")
    };

    let file_type = entry.file_type()?;
    if file_type.is_dir() {
      collect_into(&entry.path(), &child_relative, keep, files)?;
    } else if file_type.is_file() && keep(&child_relative) {
      files.push(child_relative);
    }
  }
  Ok(())
}

/// Whether a relative path carries one of the given extensions.
pub fn has_extension(path: &str, extensions: &[String]) -> bool {
  match path.rsplit_once('.') {
    Some((_, ext)) => extensions.iter().any(|candidate| candidate == ext),
    None => false,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn collects_sorted_relative_paths() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("b/nested")).unwrap();
    fs::write(dir.path().join("b/nested/z.js"), "z").unwrap();
    fs::write(dir.path().join("a.js"), "a").unwrap();
    fs::write(dir.path().join("b/skip.css"), "c").unwrap();
    fs::write(dir.path().join(".hidden.js"), "h").unwrap();

    let files = collect_files(dir.path(), |p| p.ends_with(".js")).unwrap();
    assert_eq!(files, vec!["a.js".to_string(), "b/nested/z.js".to_string()]);
  }

  #[test]
  fn missing_root_yields_no_files() {
    let dir = tempdir().unwrap();
    let files = collect_files(&dir.path().join("absent"), |_| true).unwrap();
    assert!(files.is_empty());
  }

  #[test]
  fn extension_matching_is_exact() {
    let exts = vec!["png".to_string(), "gif".to_string()];
    assert!(has_extension("images/a.png", &exts));
    assert!(!has_extension("images/a.pngx", &exts));
    assert!(!has_extension("images/png", &exts));
  }
}
