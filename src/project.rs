//! Layout conventions for a dist tree being revisioned.

use std::path::PathBuf;

/// Filesystem and naming conventions for one deployable bundle tree.
///
/// Every stage reads its file names and path fragments from here rather than
/// hard-coding them, so a project can relocate its style directory or rename
/// its loader global without touching pipeline code.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
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

impl Default for ProjectLayout {
  fn default() -> Self {
    Self {
      image_manifest_file: "rev-imgmanifest.json".into(),
      asset_manifest_file: "rev-manifest.json".into(),
      app_manifest_file: "rev-jsappmanifest.json".into(),
      bundle_plan_file: "buildRoute.json".into(),
      app_bundle_file: "app.js".into(),
      app_scripts_dir: "assets/js".into(),
      style_dir: "assets/style".into(),
      entry_stylesheet: "assets/style/all.css".into(),
      image_dir_name: "images".into(),
      image_extensions: vec!["png".into(), "jpg".into(), "gif".into()],
      loader_global: "seajs".into(),
      loader_path_prefix: "crm-dist/".into(),
      module_namespace: "crm".into(),
      template_config_file: "tpl_config".into(),
      template_key_prefix: "crm".into(),
    }
  }
}

/// A layout bound to a dist root on disk; passed to every stage entry point.
#[derive(Debug, Clone)]
pub struct BuildContext {
  /// Root of the dist tree the pipeline operates on.
  pub dist_root: PathBuf,
  /// Naming conventions for the tree.
  pub layout: ProjectLayout,
}

impl BuildContext {
  /// Bind a layout to a dist root.
  pub fn new(dist_root: impl Into<PathBuf>, layout: ProjectLayout) -> Self {
    Self {
      dist_root: dist_root.into(),
      layout,
    }
  }
}
