//! Command line driver running the fixed revisioning sequence over a dist tree.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use revpack::{BuildContext, ProjectConfig, SEQUENCE, pipeline, verify_sequence};

#[derive(Parser)]
#[command(
  name = "revpack",
  version,
  about = "Revision a dist tree in place: hash assets, record manifests, rewrite references."
)]
struct Cli {
  /// Dist tree to revision in place.
  #[arg(long, value_name = "DIR")]
  dist: PathBuf,

  /// JSON layout configuration; defaults to revpack.config.json in the dist
  /// tree when present.
  #[arg(long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Verify the stage ordering declarations and exit without building.
  #[arg(long)]
  check_order: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.check_order {
    verify_sequence(&SEQUENCE)?;
    println!("stage ordering OK");
    return Ok(());
  }

  let config = match &cli.config {
    Some(path) => ProjectConfig::from_path(path)
      .with_context(|| format!("failed to load config from {}", path.display()))?,
    None => ProjectConfig::discover(&cli.dist),
  };

  let ctx = BuildContext::new(cli.dist, config.into_layout());
  let reports = pipeline::run(&ctx)?;

  for report in &reports {
    println!("{}", report.summary());
    for warning in &report.warnings {
      eprintln!("warning: {warning}");
    }
  }
  Ok(())
}
