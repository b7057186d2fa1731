//! Fixed-sequence pipeline surface.
//!
//! The driver invokes one entry point per stage in the order declared by
//! [`SEQUENCE`]; [`run`] wires the whole thing together after checking the
//! sequence against each stage's declared manifest reads and writes.

mod report;
mod scan;
mod sequence;
pub mod stages;

pub use report::StageReport;
pub use scan::{collect_files, has_extension};
pub use sequence::{SEQUENCE, StageId, StageSpec, verify_sequence};

use anyhow::{Context, Result};

use crate::manifest::ManifestStore;
use crate::project::BuildContext;

/// Run the full fixed stage sequence over a dist tree.
///
/// Hard errors abort the run at the failing stage; soft warnings come back
/// inside the per-stage reports.
pub fn run(ctx: &BuildContext) -> Result<Vec<StageReport>> {
  verify_sequence(&SEQUENCE).context("stage sequence violates its ordering declarations")?;

  let store = ManifestStore::new(&ctx.dist_root, &ctx.layout);
  let reports = vec![
    stages::compose_bundles(ctx)?,
    stages::hash_images(ctx, &store)?,
    stages::rewrite_image_refs(ctx, &store)?,
    stages::hash_assets(ctx, &store)?,
    stages::finalize_app_bundle(ctx, &store)?,
    stages::emit_template_config(ctx, &store)?,
  ];
  Ok(reports)
}
