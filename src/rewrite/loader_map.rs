//! Module-loader remap table generation.

use crate::manifest::Manifest;

/// Render the remap statement prepended to the app bundle.
///
/// Produces `<loaderGlobal>.config({map:[["<prefix><orig>","<prefix><rev>"],…]});`
/// with pairs in manifest insertion order, never sorted; the consuming loader
/// resolves original paths through this table at require time.
pub fn loader_map_statement(loader_global: &str, path_prefix: &str, manifest: &Manifest) -> String {
  let pairs: Vec<String> = manifest
    .iter()
    .map(|entry| {
      format!(
        "[{},{}]",
        serde_json::to_string(&format!("{path_prefix}{}", entry.original)).unwrap(),
        serde_json::to_string(&format!("{path_prefix}{}", entry.revisioned)).unwrap(),
      )
    })
    .collect();
  format!("{loader_global}.config({{map:[{}]}});", pairs.join(","))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_pairs_in_insertion_order() {
    let mut manifest = Manifest::default();
    manifest.insert("page/page.js", "page/page-1111111111.js");
    manifest.insert("assets/style/all.css", "assets/style/all-2222222222.css");

    let statement = loader_map_statement("seajs", "crm-dist/", &manifest);
    assert_eq!(
      statement,
      "seajs.config({map:[\
       [\"crm-dist/page/page.js\",\"crm-dist/page/page-1111111111.js\"],\
       [\"crm-dist/assets/style/all.css\",\"crm-dist/assets/style/all-2222222222.css\"]\
       ]});"
    );
  }

  #[test]
  fn empty_manifest_renders_an_empty_table() {
    let statement = loader_map_statement("seajs", "dist/", &Manifest::default());
    assert_eq!(statement, "seajs.config({map:[]});");
  }
}
