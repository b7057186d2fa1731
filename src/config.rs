//! Project configuration loader for describing the revisioned tree layout.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::project::ProjectLayout;

const DEFAULT_CONFIG_FILE: &str = "revpack.config.json";

/// Discoverable project configuration overriding the default layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
  /// Manifest file recording image renames.
  pub image_manifest_file: String,
  /// Manifest file recording script and stylesheet renames.
  pub asset_manifest_file: String,
  /// Manifest file recording the final app bundle rename.
  pub app_manifest_file: String,
  /// Declarative bundle plan consumed by the compose stage.
  pub bundle_plan_file: String,
  /// Name of the aggregate app bundle at the dist root.
  pub app_bundle_file: String,
  /// Directory of boot scripts merged into the app bundle.
  pub app_scripts_dir: String,
  /// Directory holding compiled stylesheets.
  pub style_dir: String,
  /// Entry stylesheet resolved into the template config.
  pub entry_stylesheet: String,
  /// Directory name image references are rooted at.
  pub image_dir_name: String,
  /// File extensions treated as images, without dots.
  pub image_extensions: Vec<String>,
  /// Global object of the consuming module loader.
  pub loader_global: String,
  /// Deploy prefix prepended to every loader remap table entry.
  pub loader_path_prefix: String,
  /// Namespace module-wrapper ids are normalized into.
  pub module_namespace: String,
  /// Flat key:value record consumed by the server-side template page.
  pub template_config_file: String,
  /// Key prefix used inside the template config record.
  pub template_key_prefix: String,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    let layout = ProjectLayout::default();
    Self {
      image_manifest_file: layout.image_manifest_file,
      asset_manifest_file: layout.asset_manifest_file,
      app_manifest_file: layout.app_manifest_file,
      bundle_plan_file: layout.bundle_plan_file,
      app_bundle_file: layout.app_bundle_file,
      app_scripts_dir: layout.app_scripts_dir,
      style_dir: layout.style_dir,
      entry_stylesheet: layout.entry_stylesheet,
      image_dir_name: layout.image_dir_name,
      image_extensions: layout.image_extensions,
      loader_global: layout.loader_global,
      loader_path_prefix: layout.loader_path_prefix,
      module_namespace: layout.module_namespace,
      template_config_file: layout.template_config_file,
      template_key_prefix: layout.template_key_prefix,
    }
  }
}

impl ProjectConfig {
  /// Attempt to load configuration from the provided dist root.
  ///
  /// When the configuration file does not exist or fails to parse we fall back
  /// to default values so callers can continue with the stock layout.
  pub fn discover(dist_root: &Path) -> Self {
    let candidate = dist_root.join(DEFAULT_CONFIG_FILE);
    Self::from_path(&candidate).unwrap_or_default()
  }

  /// Read configuration from a specific JSON file.
  pub fn from_path(path: &Path) -> Option<Self> {
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
  }

  /// Convert the configuration into an owned layout description.
  pub fn into_layout(self) -> ProjectLayout {
    ProjectLayout {
      image_manifest_file: self.image_manifest_file,
      asset_manifest_file: self.asset_manifest_file,
      app_manifest_file: self.app_manifest_file,
      bundle_plan_file: self.bundle_plan_file,
      app_bundle_file: self.app_bundle_file,
      app_scripts_dir: self.app_scripts_dir,
      style_dir: self.style_dir,
      entry_stylesheet: self.entry_stylesheet,
      image_dir_name: self.image_dir_name,
      image_extensions: self.image_extensions,
      loader_global: self.loader_global,
      loader_path_prefix: self.loader_path_prefix,
      module_namespace: self.module_namespace,
      template_config_file: self.template_config_file,
      template_key_prefix: self.template_key_prefix,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  #[test]
  fn discover_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let config = ProjectConfig::discover(dir.path());
    assert_eq!(config.app_bundle_file, "app.js");
    assert_eq!(config.loader_global, "seajs");
  }

  #[test]
  fn partial_config_keeps_remaining_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(DEFAULT_CONFIG_FILE);
    fs::write(&path, r#"{"moduleNamespace": "shop"}"#).unwrap();
    // Field names are snake_case; an unknown camelCase key parses as default.
    let config = ProjectConfig::from_path(&path).unwrap();
    assert_eq!(config.module_namespace, "crm");

    fs::write(&path, r#"{"module_namespace": "shop"}"#).unwrap();
    let config = ProjectConfig::from_path(&path).unwrap();
    assert_eq!(config.module_namespace, "shop");
    assert_eq!(config.loader_global, "seajs");
  }
}
