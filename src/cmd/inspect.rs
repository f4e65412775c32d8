//! Commands printing one derived structure each.

use super::common::ViewArgs;
use crate::graph::{Clustering, ConnectionMatrix, DependencyGraph, Hierarchy, Levels, SchemaView};
use crate::output::{
    text, ClustersJsonOutput, HierarchyJsonOutput, LevelsJsonOutput, MatrixJsonOutput,
};
use anyhow::Result;

pub fn run_levels(args: ViewArgs) -> Result<()> {
    let input = args.load()?;
    let filter = args.filter();
    let view = SchemaView::new(&input.model, &filter);

    let levels = Levels::assign(&DependencyGraph::from_view(&view));
    if levels.has_forced_levels() && !args.json {
        eprintln!(
            "note: {} level(s) were forced by dependency cycles",
            levels.forced.len()
        );
    }

    args.emit(&LevelsJsonOutput::from(&levels), text::format_levels)
}

pub fn run_clusters(args: ViewArgs) -> Result<()> {
    let input = args.load()?;
    let filter = args.filter();
    let view = SchemaView::new(&input.model, &filter);

    let clustering = Clustering::with_rules(&view, &input.config.clusters.naming_rules());
    args.emit(&ClustersJsonOutput::from(&clustering), text::format_clusters)
}

pub fn run_hierarchy(args: ViewArgs) -> Result<()> {
    let input = args.load()?;
    let filter = args.filter();
    let view = SchemaView::new(&input.model, &filter);

    let hierarchy = Hierarchy::build(&view)?;
    args.emit(&HierarchyJsonOutput::from(&hierarchy), text::format_hierarchy)
}

pub fn run_matrix(args: ViewArgs) -> Result<()> {
    let input = args.load()?;
    let filter = args.filter();
    let view = SchemaView::new(&input.model, &filter);

    let matrix = ConnectionMatrix::build(&view);
    args.emit(&MatrixJsonOutput::from(&matrix), text::format_matrix)
}
