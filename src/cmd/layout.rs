use super::common::ViewArgs;
use crate::graph::{DependencyGraph, SchemaView};
use crate::layout::{Direction, Engine, ForceLayoutRunner, ForceSimulation, Frame, LayeredLayout};
use crate::output::{text, LayoutJsonOutput};
use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::thread;
use std::time::{Duration, Instant};

pub fn run(
    args: ViewArgs,
    engine: String,
    direction: Option<String>,
    iterations: Option<usize>,
    progress: bool,
) -> Result<()> {
    let engine: Engine = engine.parse().map_err(|e: String| anyhow!(e))?;
    let direction: Option<Direction> = direction
        .map(|d| d.parse())
        .transpose()
        .map_err(|e: String| anyhow!(e))?;

    let input = args.load()?;
    let filter = args.filter();
    let view = SchemaView::new(&input.model, &filter);
    let start_time = Instant::now();

    let doc = match engine {
        Engine::Layered => {
            let mut params = input.config.layered.clone();
            if let Some(direction) = direction {
                params.direction = direction;
            }
            let layout = LayeredLayout::compute(&view, &params);
            LayoutJsonOutput::from(&layout)
        }
        Engine::Force => {
            let mut params = input.config.force.clone();
            if let Some(iterations) = iterations {
                params.iterations = iterations;
            }
            let graph = DependencyGraph::from_view(&view);
            let sim = ForceSimulation::with_graph(&view, &graph, params);
            let frame = run_force(sim, progress && !args.json)?;

            let layered = &input.config.layered;
            LayoutJsonOutput::from_force(
                &view,
                &frame.positions,
                frame.iteration,
                &layered.sizing,
                layered.margin,
            )
        }
    };

    tracing::debug!(engine = %engine, elapsed = ?start_time.elapsed(), "layout complete");

    args.emit(&doc, text::format_layout)
}

/// Drive the simulation on the background runner until it settles
fn run_force(sim: ForceSimulation, progress: bool) -> Result<Frame> {
    let total = sim.params().iterations as u64;
    let mut runner = ForceLayoutRunner::default();
    runner.start(sim);

    if progress {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} steps {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░  ")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));

        while runner.is_running() {
            if let Some(frame) = runner.latest() {
                pb.set_position(frame.iteration as u64);
            }
            thread::sleep(Duration::from_millis(20));
        }
        pb.finish_with_message("settled");
    }

    runner
        .wait()
        .ok_or_else(|| anyhow!("force layout finished without publishing positions"))
}
