//! Stage entry points invoked by the driver in the fixed sequence.
//!
//! Each stage completes fully before the next begins; within a stage,
//! per-artifact fingerprinting and rewriting run in parallel while manifest
//! recording happens in deterministic input order.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use same_file::is_same_file;

use crate::compose::{BundlePlan, compose};
use crate::error::{RevError, StageWarning};
use crate::manifest::{Manifest, ManifestClass, ManifestStore};
use crate::models::{Artifact, ArtifactClass};
use crate::normalize::normalize_module_ids;
use crate::pipeline::report::StageReport;
use crate::pipeline::scan::{collect_files, has_extension};
use crate::pipeline::sequence::StageId;
use crate::project::BuildContext;
use crate::rev;
use crate::rewrite::{
  image_reference_pattern, image_suffix_manifest, loader_map_statement, rewrite_references,
  unresolved_references,
};

/// Namespace module ids across the tree, then merge plan bundles and compose
/// the aggregate app bundle.
///
/// The id transit runs first and exactly once over every script: the id rule
/// is not idempotent, and it must also reach scripts that never pass through
/// a merge, like passthrough plan entries and standalone modules.
pub fn compose_bundles(ctx: &BuildContext) -> Result<StageReport> {
  let mut report = StageReport::new(StageId::ComposeBundles);
  let dist = &ctx.dist_root;
  let layout = &ctx.layout;

  namespace_dist_scripts(ctx)?;

  if let Some(plan) = BundlePlan::load(&dist.join(&layout.bundle_plan_file))? {
    for entry in plan.iter() {
      let source_path = dist.join(&entry.source);
      if source_path.is_dir() {
        merge_directory(dist, &entry.source, &entry.output)?;
      } else if source_path.is_file() {
        relocate_file(dist, &entry.source, &entry.output)?;
      } else {
        bail!("bundle plan source `{}` does not exist", entry.source);
      }
      report.processed += 1;
    }
  }

  compose_app_bundle(ctx)?;
  report.processed += 1;
  Ok(report)
}

/// Rewrite every module declaration in the tree into the project namespace.
///
/// Scripts with no recognizable declaration are plain code, not modules, and
/// pass through untouched.
fn namespace_dist_scripts(ctx: &BuildContext) -> Result<()> {
  let dist = &ctx.dist_root;
  let scripts = collect_files(dist, |p| p.ends_with(".js"))?;
  scripts.par_iter().try_for_each(|rel| -> Result<()> {
    let path = dist.join(rel);
    let text =
      fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
    match normalize_module_ids(&text, &ctx.layout.module_namespace) {
      Ok(normalized) => {
        fs::write(&path, normalized)
          .with_context(|| format!("failed to write {}", path.display()))?;
      }
      Err(RevError::MalformedModuleDeclaration) => {}
      Err(err) => return Err(err.into()),
    }
    Ok(())
  })
}

/// Merge every script under a plan directory into one named file, consuming
/// the constituents.
fn merge_directory(dist: &Path, source: &str, output: &str) -> Result<()> {
  let source_path = dist.join(source);
  let scripts = collect_files(&source_path, |p| p.ends_with(".js"))?;

  let mut parts = Vec::with_capacity(scripts.len());
  for rel in &scripts {
    let path = source_path.join(rel);
    let content = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    parts.push(Artifact::new(
      format!("{source}/{rel}"),
      content,
      ArtifactClass::Script,
    ));
  }

  let bundle = compose(parts, output)?;
  for rel in &scripts {
    fs::remove_file(source_path.join(rel))?;
  }

  let output_name = if output.ends_with(".js") {
    output.to_string()
  } else {
    format!("{output}.js")
  };
  let destination = source_path.join(&output_name);
  fs::write(&destination, &bundle.content)
    .with_context(|| format!("failed to write {}", destination.display()))
}

/// Relocate a single plan file without merging.
///
/// An output ending in `/` names a directory; the file keeps its base name.
fn relocate_file(dist: &Path, source: &str, output: &str) -> Result<()> {
  let source_path = dist.join(source);
  let destination = if output.ends_with('/') {
    let base = source.rsplit('/').next().unwrap_or(source);
    dist.join(output.trim_end_matches('/')).join(base)
  } else {
    dist.join(output)
  };

  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)?;
  }
  install_passthrough(&source_path, &destination)
    .with_context(|| format!("failed to relocate `{source}` to `{output}`"))
}

fn install_passthrough(source: &Path, destination: &Path) -> std::io::Result<()> {
  if destination.exists() {
    if is_same_file(source, destination)? {
      return Ok(());
    }
    fs::remove_file(destination)?;
  }

  match fs::hard_link(source, destination) {
    Ok(_) => Ok(()),
    Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
    Err(_) => fs::copy(source, destination).map(|_| ()),
  }
}

/// Merge the boot scripts and any existing app bundle into `app.js`.
fn compose_app_bundle(ctx: &BuildContext) -> Result<()> {
  let dist = &ctx.dist_root;
  let layout = &ctx.layout;
  let scripts_root = dist.join(&layout.app_scripts_dir);
  let boot_scripts = collect_files(&scripts_root, |p| p.ends_with(".js"))?;

  let mut parts = Vec::with_capacity(boot_scripts.len() + 1);
  for rel in &boot_scripts {
    let path = scripts_root.join(rel);
    let content = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    parts.push(Artifact::new(
      format!("{}/{rel}", layout.app_scripts_dir),
      content,
      ArtifactClass::Script,
    ));
  }

  let app_path = dist.join(&layout.app_bundle_file);
  if app_path.is_file() {
    parts.push(Artifact::new(
      layout.app_bundle_file.clone(),
      fs::read(&app_path)?,
      ArtifactClass::Script,
    ));
  }

  let bundle = compose(parts, &layout.app_bundle_file)?;
  for rel in &boot_scripts {
    fs::remove_file(scripts_root.join(rel))?;
  }
  fs::write(&app_path, &bundle.content)
    .with_context(|| format!("failed to write {}", app_path.display()))
}

/// Hash and rename every image, recording the renames in the image manifest.
pub fn hash_images(ctx: &BuildContext, store: &ManifestStore) -> Result<StageReport> {
  let files = collect_files(&ctx.dist_root, |p| {
    has_extension(p, &ctx.layout.image_extensions)
  })?;
  let report = hash_and_rename(ctx, store, StageId::HashImages, ManifestClass::Images, &files)?;
  store.persist(ManifestClass::Images)?;
  Ok(report)
}

/// Hash and rename scripts and stylesheets, excluding the app bundle.
pub fn hash_assets(ctx: &BuildContext, store: &ManifestStore) -> Result<StageReport> {
  let app_bundle = ctx.layout.app_bundle_file.clone();
  let files = collect_files(&ctx.dist_root, |p| {
    (p.ends_with(".js") || p.ends_with(".css")) && p != app_bundle
  })?;
  let report = hash_and_rename(ctx, store, StageId::HashAssets, ManifestClass::Assets, &files)?;
  store.persist(ManifestClass::Assets)?;
  Ok(report)
}

/// Fingerprint the given files in parallel, then record and rename them in
/// input order so manifest insertion order stays deterministic.
fn hash_and_rename(
  ctx: &BuildContext,
  store: &ManifestStore,
  stage: StageId,
  class: ManifestClass,
  files: &[String],
) -> Result<StageReport> {
  let dist = &ctx.dist_root;
  let revisions: Vec<(String, rev::Revision)> = files
    .par_iter()
    .map(|rel| -> Result<(String, rev::Revision)> {
      let path = dist.join(rel);
      let content =
        fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
      let artifact = Artifact::new(rel.clone(), content, artifact_class(class, rel));
      Ok((rel.clone(), rev::revise(&artifact)))
    })
    .collect::<Result<Vec<_>>>()?;

  let mut report = StageReport::new(stage);
  for (original, revision) in revisions {
    if revision.empty {
      report.warnings.push(StageWarning::EmptyContent {
        path: original.clone(),
      });
    }
    store.record(class, &original, &revision.revisioned_path)?;
    let from = dist.join(&original);
    let to = dist.join(&revision.revisioned_path);
    fs::rename(&from, &to)
      .with_context(|| format!("failed to rename {} to {}", from.display(), to.display()))?;
    report.processed += 1;
  }
  Ok(report)
}

fn artifact_class(class: ManifestClass, path: &str) -> ArtifactClass {
  match class {
    ManifestClass::Images => ArtifactClass::Image,
    ManifestClass::Assets if path.ends_with(".css") => ArtifactClass::Style,
    _ => ArtifactClass::Script,
  }
}

/// Propagate image renames into every stylesheet, template and script.
///
/// Substitution keys are the manifest entries truncated at the image
/// directory, so nested images are found through the `images/…`-rooted and
/// relative forms the referencing files actually use.
pub fn rewrite_image_refs(ctx: &BuildContext, store: &ManifestStore) -> Result<StageReport> {
  let dist = &ctx.dist_root;
  let manifest = image_suffix_manifest(&store.load(ManifestClass::Images)?, &ctx.layout);
  let pattern = image_reference_pattern(&ctx.layout);

  let targets = collect_files(dist, |p| {
    p.ends_with(".css") || p.ends_with(".html") || p.ends_with(".js")
  })?;

  let outcomes: Vec<(String, Vec<String>)> = targets
    .par_iter()
    .map(|rel| -> Result<(String, Vec<String>)> {
      let path = dist.join(rel);
      let content =
        fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))?;
      let rewritten = rewrite_references(&content, &manifest);
      let unresolved = unresolved_references(&rewritten.text, &manifest, &pattern);
      if rewritten.substitutions > 0 {
        fs::write(&path, &rewritten.text)
          .with_context(|| format!("failed to write {}", path.display()))?;
      }
      Ok((rel.clone(), unresolved))
    })
    .collect::<Result<Vec<_>>>()?;

  let mut report = StageReport::new(StageId::RewriteImageRefs);
  for (file, unresolved) in outcomes {
    report.processed += 1;
    for reference in unresolved {
      report.warnings.push(StageWarning::UnresolvedReference {
        file: file.clone(),
        reference,
      });
    }
  }
  Ok(report)
}

/// Prepend the loader remap table and hash the app bundle in a second phase.
///
/// The bundle's ids were already normalized at composition; this stage only
/// injects the prologue built from the asset manifest and fingerprints the
/// finished content.
pub fn finalize_app_bundle(ctx: &BuildContext, store: &ManifestStore) -> Result<StageReport> {
  let dist = &ctx.dist_root;
  let layout = &ctx.layout;
  let assets = store.load(ManifestClass::Assets)?;

  let app_path = dist.join(&layout.app_bundle_file);
  let text = fs::read_to_string(&app_path)
    .with_context(|| format!("failed to read {}", app_path.display()))?;

  let prologue = loader_map_statement(&layout.loader_global, &layout.loader_path_prefix, &assets);
  let content = format!("{prologue}\n{text}");

  // Content is final here; fingerprinting any earlier would bake a stale
  // name into the manifest.
  let artifact = Artifact::new(
    layout.app_bundle_file.clone(),
    content.into_bytes(),
    ArtifactClass::Script,
  );
  let revision = rev::revise(&artifact);

  let mut phase_two = Manifest::default();
  phase_two.insert(&artifact.path, &revision.revisioned_path);
  store.merge(ManifestClass::AppBundle, phase_two);

  let destination = dist.join(&revision.revisioned_path);
  fs::write(&destination, &artifact.content)
    .with_context(|| format!("failed to write {}", destination.display()))?;
  fs::remove_file(&app_path)?;
  store.persist(ManifestClass::AppBundle)?;

  let mut report = StageReport::new(StageId::FinalizeAppBundle);
  report.processed = 1;
  Ok(report)
}

/// Resolve the hashed entry stylesheet and app bundle names into the flat
/// template config record.
pub fn emit_template_config(ctx: &BuildContext, store: &ManifestStore) -> Result<StageReport> {
  let layout = &ctx.layout;
  let mut combined = store.load(ManifestClass::Assets)?;
  combined.merge(store.load(ManifestClass::AppBundle)?);

  let mut report = StageReport::new(StageId::EmitTemplateConfig);
  let style_prefix = format!("{}/", layout.style_dir);
  let css = combined
    .get(&layout.entry_stylesheet)
    .map(|path| path.strip_prefix(&style_prefix).unwrap_or(path).to_string());
  let js = combined.get(&layout.app_bundle_file).map(str::to_string);

  if css.is_none() {
    report.warnings.push(StageWarning::MissingTemplateKey {
      key: layout.entry_stylesheet.clone(),
    });
  }
  if js.is_none() {
    report.warnings.push(StageWarning::MissingTemplateKey {
      key: layout.app_bundle_file.clone(),
    });
  }

  if let (Some(css), Some(js)) = (css, js) {
    let prefix = &layout.template_key_prefix;
    let content = format!("{prefix}_css_all:{css}\n{prefix}_js_app:{js}\n");
    let path = ctx.dist_root.join(&layout.template_config_file);
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    report.processed = 1;
  }
  Ok(report)
}
