//! Module-wrapper identifier normalization.
//!
//! Declaration ids are rewritten into the project namespace before the app
//! bundle is fingerprinted, so bundles merged from different sources cannot
//! collide in the loader's id space. Content must be final before hashing;
//! running this after the bundle hash would invalidate the manifest entry.

use regex::{Captures, Regex};

use crate::error::RevError;

/// Apply the namespacing rule to one declaration id.
///
/// Ids carrying a path separator are prefixed with `<namespace>-`, bare ids
/// with `<namespace>/`, which keeps every normalized id rooted in the
/// namespace either way.
pub fn namespace_id(namespace: &str, id: &str) -> String {
  if id.contains('/') {
    format!("{namespace}-{id}")
  } else {
    format!("{namespace}/{id}")
  }
}

/// Rewrite every module declaration id in `script` into `namespace`.
///
/// Fails with [`RevError::MalformedModuleDeclaration`] when the script has no
/// recognizable declaration; callers may treat non-module scripts as
/// skippable rather than fatal.
pub fn normalize_module_ids(script: &str, namespace: &str) -> Result<String, RevError> {
  let pattern =
    Regex::new(r#"\bdefine\(\s*(["'])([^"']+)(["'])\s*,"#).expect("invalid define pattern");

  let mut matched = false;
  let normalized = pattern.replace_all(script, |caps: &Captures| {
    matched = true;
    let open = &caps[1];
    let close = &caps[3];
    let id = namespace_id(namespace, &caps[2]);
    format!("define({open}{id}{close},")
  });

  if !matched {
    return Err(RevError::MalformedModuleDeclaration);
  }
  Ok(normalized.into_owned())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bare_ids_get_a_namespace_directory() {
    let script = "define(\"widget\", [], function() {});";
    let normalized = normalize_module_ids(script, "crm").unwrap();
    assert_eq!(normalized, "define(\"crm/widget\", [], function() {});");
  }

  #[test]
  fn path_ids_get_a_namespace_prefix() {
    let script = "define('page/detail', ['dep'], function() {});";
    let normalized = normalize_module_ids(script, "crm").unwrap();
    assert_eq!(
      normalized,
      "define('crm-page/detail', ['dep'], function() {});"
    );
  }

  #[test]
  fn normalizes_every_declaration_in_a_merged_bundle() {
    let bundle = "define(\"widget\", [], function() {});\n\
                  define(\"helper\", [], function() {});\n";
    let normalized = normalize_module_ids(bundle, "crm").unwrap();
    assert!(normalized.contains("define(\"crm/widget\","));
    assert!(normalized.contains("define(\"crm/helper\","));
  }

  #[test]
  fn script_without_declaration_is_malformed() {
    let err = normalize_module_ids("var x = 1;", "crm").unwrap_err();
    assert!(matches!(err, RevError::MalformedModuleDeclaration));
  }
}
