//! Artifact classes that receive their own manifest file.

use std::fmt;

use crate::project::ProjectLayout;

/// One manifest file exists per class; rewrite stages load them by class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestClass {
  /// Renamed image assets.
  Images,
  /// Renamed scripts and stylesheets, excluding the app bundle.
  Assets,
  /// The final aggregate app bundle, hashed in a second phase.
  AppBundle,
}

impl ManifestClass {
  /// Every class in a stable order, for iteration and reporting.
  pub const ALL: [ManifestClass; 3] = [
    ManifestClass::Images,
    ManifestClass::Assets,
    ManifestClass::AppBundle,
  ];

  /// On-disk file name of this class's manifest within the dist root.
  pub fn file_name<'a>(&self, layout: &'a ProjectLayout) -> &'a str {
    match self {
      ManifestClass::Images => &layout.image_manifest_file,
      ManifestClass::Assets => &layout.asset_manifest_file,
      ManifestClass::AppBundle => &layout.app_manifest_file,
    }
  }
}

impl fmt::Display for ManifestClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ManifestClass::Images => "images",
      ManifestClass::Assets => "assets",
      ManifestClass::AppBundle => "app-bundle",
    };
    f.write_str(name)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_file_names_from_layout() {
    let layout = ProjectLayout::default();
    assert_eq!(
      ManifestClass::Images.file_name(&layout),
      "rev-imgmanifest.json"
    );
    assert_eq!(ManifestClass::Assets.file_name(&layout), "rev-manifest.json");
    assert_eq!(
      ManifestClass::AppBundle.file_name(&layout),
      "rev-jsappmanifest.json"
    );
  }
}
