//! Per-stage outcome summaries.

use crate::error::StageWarning;
use crate::pipeline::StageId;

/// Summary of one completed stage: artifacts touched plus soft warnings.
#[derive(Debug, Clone)]
pub struct StageReport {
  /// Stage the report belongs to.
  pub stage: StageId,
  /// Number of artifacts the stage processed.
  pub processed: usize,
  /// Soft warnings collected while the stage ran.
  pub warnings: Vec<StageWarning>,
}

impl StageReport {
  /// Create an empty report for a stage.
  pub fn new(stage: StageId) -> Self {
    Self {
      stage,
      processed: 0,
      warnings: Vec::new(),
    }
  }

  /// One-line human summary for the driver output.
  pub fn summary(&self) -> String {
    format!(
      "{}: {} artifact(s), {} warning(s)",
      self.stage,
      self.processed,
      self.warnings.len()
    )
  }
}
