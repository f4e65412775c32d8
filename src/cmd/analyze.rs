use super::common::ViewArgs;
use crate::graph::SchemaView;
use crate::output::{text, AnalyzeJsonOutput};
use std::time::Instant;

pub fn run(args: ViewArgs) -> anyhow::Result<()> {
    let input = args.load()?;
    let start_time = Instant::now();

    let filter = args.filter();
    let view = SchemaView::new(&input.model, &filter);
    let rules = input.config.clusters.naming_rules();
    let summary = AnalyzeJsonOutput::build(
        &args.file.display().to_string(),
        &view,
        &rules,
        &input.warnings,
    );

    tracing::debug!(elapsed = ?start_time.elapsed(), "analysis complete");

    args.emit(&summary, text::format_analyze)
}
