//! Propagation of manifest renames into referencing artifacts.
//!
//! Image paths inside CSS, HTML and JS text are substituted in place;
//! script and stylesheet renames are instead declared to the module loader
//! through a remap table prepended to the app bundle, because the loader
//! resolves paths lazily and one static table is cheaper than rewriting
//! every reference site.

mod loader_map;
mod refs;

pub use loader_map::loader_map_statement;
pub use refs::{
  Rewritten, image_reference_pattern, image_suffix_manifest, rewrite_references,
  unresolved_references,
};
