#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod compose;
pub mod config;
pub mod error;
pub mod manifest;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod project;
pub mod rev;
pub mod rewrite;

pub use compose::{Bundle, BundlePlan};
pub use config::ProjectConfig;
pub use error::{RevError, StageWarning};
pub use manifest::{Manifest, ManifestClass, ManifestEntry, ManifestStore};
pub use models::{Artifact, ArtifactClass};
pub use pipeline::{SEQUENCE, StageId, StageReport, run, verify_sequence};
pub use project::{BuildContext, ProjectLayout};
