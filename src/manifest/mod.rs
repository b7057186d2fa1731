//! Per-class manifests mapping original artifact paths to revisioned paths.
//!
//! A manifest is created empty at the start of a hashing stage, populated as
//! each artifact is hashed, persisted once the stage completes and loaded
//! read-only by every later rewrite stage. Entries keep insertion order; the
//! loader remap table depends on it.

mod class;
mod store;

pub use class::ManifestClass;
pub use store::{Manifest, ManifestEntry, ManifestStore};
