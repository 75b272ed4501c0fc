//! One batch run: load, derive, summarize, render.

use crate::charts::{ChartPlotter, StaticChartRenderer};
use crate::config::Config;
use crate::data::{ColumnDeriver, StormLoader, StormTable};
use crate::error::Result;
use crate::output::AnalysisSummary;
use std::path::{Path, PathBuf};
use tracing::info;

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub rows: usize,
    pub summary_path: PathBuf,
    pub charts: Vec<PathBuf>,
    /// Sections that could not be charted.
    pub skipped_charts: usize,
}

/// Load `input` and derive its columns. Errors here end the run.
pub fn prepare(input: &Path) -> Result<StormTable> {
    let observations = StormLoader::load(input)?;
    Ok(ColumnDeriver::derive(&observations))
}

/// Run the full analysis for `input` with `config`.
pub fn run(input: &Path, config: &Config) -> Result<RunReport> {
    config.validate()?;
    let table = prepare(input)?;

    let summary = AnalysisSummary::compute(input, &table, config);
    let summary_path = summary.write_json(&config.output.dir)?;

    let (charts, skipped_charts) = if config.charts.enabled {
        let prepared = ChartPlotter::build_charts(&table, config);
        let rendered = StaticChartRenderer::render_all(
            &prepared,
            &config.output.dir,
            config.charts.width,
            config.charts.height,
        );
        let skipped = crate::charts::SECTION_COUNT - rendered.len();
        (rendered, skipped)
    } else {
        info!("Chart rendering disabled");
        (Vec::new(), 0)
    };

    Ok(RunReport {
        rows: table.len(),
        summary_path,
        charts,
        skipped_charts,
    })
}
