// Renderer seam - chart intents handed to the plotting collaborator
//
// The core never draws pixels. Each analysis pass yields one ChartRequest:
// the already-computed table (or correlation matrix), a chart-kind tag, a
// title and the destination image path. A ChartRenderer implementation owns
// everything from there. The built-in SpecFileRenderer serializes the
// request as a JSON chart spec next to the intended image, which is the
// hand-off format the external plotter consumes; artifacts are overwritten
// on every run.

use crate::aggregate::AggregateTable;
use crate::analysis::CorrelationMatrix;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Chart vocabulary understood by the plotting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    HorizontalBar,
    Pie,
    Line,
    DualAxis,
    Heatmap,
}

/// Payload of one chart: a finished aggregate table or the correlation grid.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ChartData {
    Table(AggregateTable),
    Matrix(CorrelationMatrix),
}

/// One chart intent: data, kind tag and destination.
#[derive(Debug, Clone, Serialize)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub title: String,
    /// Intended image artifact, e.g. `category_analysis.png`
    pub output: PathBuf,
    pub data: ChartData,
}

impl ChartRequest {
    pub fn new(
        kind: ChartKind,
        title: &str,
        dir: &Path,
        stem: &str,
        data: ChartData,
    ) -> Self {
        ChartRequest {
            kind,
            title: title.to_string(),
            output: dir.join(format!("{}.png", stem)),
            data,
        }
    }

    /// Artifact file name, for the run footer.
    pub fn artifact_name(&self) -> String {
        self.output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// The collaborator seam. Returns the path of the artifact it produced.
pub trait ChartRenderer {
    fn render(&self, request: &ChartRequest) -> Result<PathBuf>;
}

/// Discards chart intents, logging them. Used when no plotter is attached.
pub struct NullRenderer;

impl ChartRenderer for NullRenderer {
    fn render(&self, request: &ChartRequest) -> Result<PathBuf> {
        debug!(artifact = %request.artifact_name(), kind = ?request.kind, "chart intent discarded");
        Ok(request.output.clone())
    }
}

/// Writes each chart intent as a JSON spec beside the intended image path.
pub struct SpecFileRenderer;

impl ChartRenderer for SpecFileRenderer {
    fn render(&self, request: &ChartRequest) -> Result<PathBuf> {
        let spec_path = request.output.with_extension("json");
        let payload = serde_json::to_string_pretty(request)
            .context("failed to serialize chart spec")?;
        fs::write(&spec_path, payload)
            .with_context(|| format!("failed to write chart spec: {}", spec_path.display()))?;
        debug!(spec = %spec_path.display(), "chart spec written");
        Ok(spec_path)
    }
}

// ============================================================================
// TESTS
// ============================================================================
