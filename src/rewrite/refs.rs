//! In-place textual substitution of revisioned asset paths.

use regex::Regex;

use crate::manifest::Manifest;
use crate::project::ProjectLayout;

/// Outcome of a rewrite pass over one artifact's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
  /// The rewritten text.
  pub text: String,
  /// Number of substitutions applied.
  pub substitutions: usize,
}

/// Replace every occurrence of a manifest original path with its revisioned
/// path.
///
/// Pure function of `(content, manifest)` and idempotent: no original key can
/// match an already-revisioned name, so a second pass applies nothing.
pub fn rewrite_references(content: &str, manifest: &Manifest) -> Rewritten {
  let mut text = content.to_string();
  let mut substitutions = 0;
  for entry in manifest.iter() {
    text = replace_bounded(&text, &entry.original, &entry.revisioned, &mut substitutions);
  }
  Rewritten { text, substitutions }
}

/// Substitute `from` with `to` wherever the match is bounded by non-path
/// characters.
///
/// The character before a match may not belong to a name token (`foo.png`
/// must not match inside `myfoo.png` or `foo.png.bak`), but a `/` prefix is
/// allowed so `assets/images/x.png` still matches an `images/x.png` key. The
/// character after a match may not be any path character, which rules out
/// longer-path false positives.
fn replace_bounded(text: &str, from: &str, to: &str, substitutions: &mut usize) -> String {
  let mut out = String::with_capacity(text.len());
  let mut copied = 0;
  let mut search = 0;

  while let Some(found) = text[search..].find(from) {
    let start = search + found;
    let end = start + from.len();

    let before_ok = text[..start]
      .chars()
      .next_back()
      .is_none_or(|c| !is_name_char(c));
    let after_ok = text[end..].chars().next().is_none_or(|c| !is_path_char(c));

    if before_ok && after_ok {
      out.push_str(&text[copied..start]);
      out.push_str(to);
      copied = end;
      search = end;
      *substitutions += 1;
    } else {
      search = start + from.chars().next().map_or(1, char::len_utf8);
    }
  }

  out.push_str(&text[copied..]);
  out
}

fn is_name_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-')
}

fn is_path_char(c: char) -> bool {
  is_name_char(c) || c == '/'
}

/// Reduce every manifest entry to its image-directory-rooted suffix.
///
/// Hashed images live under `assets/images/` while stylesheets, templates and
/// scripts reference them relative to their own location (`images/…`,
/// `../images/…`), so both sides of each mapping are truncated at the image
/// directory before substitution. Entries without the directory segment keep
/// their full paths.
pub fn image_suffix_manifest(manifest: &Manifest, layout: &ProjectLayout) -> Manifest {
  let marker = format!("{}/", layout.image_dir_name);
  let mut suffixes = Manifest::default();
  for entry in manifest.iter() {
    suffixes.insert(
      image_suffix(&entry.original, &marker),
      image_suffix(&entry.revisioned, &marker),
    );
  }
  suffixes
}

/// Truncate `path` at the first `marker` occurrence that starts a path
/// segment, so `oldimages/` never masquerades as the image directory.
fn image_suffix<'a>(path: &'a str, marker: &str) -> &'a str {
  path
    .match_indices(marker)
    .find(|(idx, _)| *idx == 0 || path[..*idx].ends_with('/'))
    .map_or(path, |(idx, _)| &path[idx..])
}

/// Pattern matching image reference tokens for the layout's image directory
/// and extensions.
pub fn image_reference_pattern(layout: &ProjectLayout) -> Regex {
  let extensions = layout
    .image_extensions
    .iter()
    .map(|ext| regex::escape(ext))
    .collect::<Vec<_>>()
    .join("|");
  let pattern = format!(
    r"{}/[A-Za-z0-9_./-]+\.(?:{})",
    regex::escape(&layout.image_dir_name),
    extensions
  );
  Regex::new(&pattern).expect("invalid image reference pattern")
}

/// Collect reference tokens present in `content` with no manifest entry on
/// either side of the mapping.
///
/// These are left unchanged by [`rewrite_references`]; the caller reports
/// them as soft warnings since some references point at assets intentionally
/// excluded from hashing.
pub fn unresolved_references(content: &str, manifest: &Manifest, pattern: &Regex) -> Vec<String> {
  let mut unresolved = Vec::new();
  for found in pattern.find_iter(content) {
    let bounded_before = content[..found.start()]
      .chars()
      .next_back()
      .is_none_or(|c| !is_name_char(c));
    let bounded_after = content[found.end()..]
      .chars()
      .next()
      .is_none_or(|c| !is_path_char(c));
    if !bounded_before || !bounded_after {
      continue;
    }
    let token = found.as_str();
    if manifest.get(token).is_some() || manifest.contains_revisioned(token) {
      continue;
    }
    if !unresolved.iter().any(|seen| seen == token) {
      unresolved.push(token.to_string());
    }
  }
  unresolved
}

#[cfg(test)]
mod tests {
  use super::*;

  fn manifest() -> Manifest {
    let mut manifest = Manifest::default();
    manifest.insert("images/logo.png", "images/logo-d41d8cd98f.png");
    manifest.insert("images/bg.gif", "images/bg-aabbccddee.gif");
    manifest
  }

  #[test]
  fn rewrites_css_url_references() {
    let css = ".logo { background: url(images/logo.png); }";
    let rewritten = rewrite_references(css, &manifest());
    assert_eq!(
      rewritten.text,
      ".logo { background: url(images/logo-d41d8cd98f.png); }"
    );
    assert_eq!(rewritten.substitutions, 1);
  }

  #[test]
  fn rewrite_is_idempotent() {
    let css = "url(images/logo.png) url('images/bg.gif')";
    let manifest = manifest();
    let once = rewrite_references(css, &manifest);
    let twice = rewrite_references(&once.text, &manifest);
    assert_eq!(once.text, twice.text);
    assert_eq!(twice.substitutions, 0);
  }

  #[test]
  fn matches_through_a_directory_prefix() {
    let html = r#"<img src="assets/images/logo.png">"#;
    let rewritten = rewrite_references(html, &manifest());
    assert_eq!(
      rewritten.text,
      r#"<img src="assets/images/logo-d41d8cd98f.png">"#
    );
  }

  #[test]
  fn rejects_partial_token_matches() {
    let text = "url(images/logo.png.bak) url(oldimages/logo.png) url(images/logo.pngx)";
    let rewritten = rewrite_references(text, &manifest());
    assert_eq!(rewritten.text, text);
    assert_eq!(rewritten.substitutions, 0);
  }

  #[test]
  fn rejected_match_on_a_multibyte_key_advances_safely() {
    let mut manifest = Manifest::default();
    manifest.insert("état/logo.png", "état/logo-d41d8cd98f.png");
    let text = "xétat/logo.png état/logo.png";
    let rewritten = rewrite_references(text, &manifest);
    assert_eq!(rewritten.text, "xétat/logo.png état/logo-d41d8cd98f.png");
    assert_eq!(rewritten.substitutions, 1);
  }

  #[test]
  fn suffix_manifest_rewrites_relative_references_to_nested_images() {
    let layout = ProjectLayout::default();
    let mut manifest = Manifest::default();
    manifest.insert("assets/images/face.png", "assets/images/face-0123456789.png");
    let suffixes = image_suffix_manifest(&manifest, &layout);

    let css = ".face { background: url(../images/face.png); }";
    let rewritten = rewrite_references(css, &suffixes);
    assert_eq!(
      rewritten.text,
      ".face { background: url(../images/face-0123456789.png); }"
    );
    assert_eq!(rewritten.substitutions, 1);
  }

  #[test]
  fn suffix_truncation_requires_a_segment_boundary() {
    let layout = ProjectLayout::default();
    let mut manifest = Manifest::default();
    manifest.insert("oldimages/logo.png", "oldimages/logo-aabbccddee.png");
    let suffixes = image_suffix_manifest(&manifest, &layout);
    assert_eq!(
      suffixes.get("oldimages/logo.png"),
      Some("oldimages/logo-aabbccddee.png")
    );
  }

  #[test]
  fn rewrites_every_occurrence() {
    let js = "load('images/bg.gif');retry('images/bg.gif');";
    let rewritten = rewrite_references(js, &manifest());
    assert_eq!(rewritten.substitutions, 2);
    assert!(!rewritten.text.contains("images/bg.gif'"));
  }

  #[test]
  fn flags_unresolved_references_once() {
    let layout = ProjectLayout::default();
    let pattern = image_reference_pattern(&layout);
    let css = "url(images/missing.png) url(images/missing.png) url(images/logo.png)";
    let unresolved = unresolved_references(css, &manifest(), &pattern);
    assert_eq!(unresolved, vec!["images/missing.png".to_string()]);
  }

  #[test]
  fn revisioned_references_are_not_flagged() {
    let layout = ProjectLayout::default();
    let pattern = image_reference_pattern(&layout);
    let css = "url(images/logo-d41d8cd98f.png)";
    assert!(unresolved_references(css, &manifest(), &pattern).is_empty());
  }
}
