//! Unit tests for the layout engines through the public library API.

use schema_atlas::graph::SchemaView;
use schema_atlas::layout::force::SimulationState;
use schema_atlas::layout::{
    Direction, ForceLayoutRunner, ForceParams, ForceSimulation, LayeredLayout, LayeredParams,
};
use schema_atlas::schema::{Column, ForeignKey, SchemaModel, Table};
use std::time::Duration;

fn blog_model() -> SchemaModel {
    SchemaModel::new(
        vec![
            Table::new("users")
                .with_column(Column::new("id", "integer").primary_key())
                .with_column(Column::new("name", "varchar")),
            Table::new("posts")
                .with_column(Column::new("id", "integer").primary_key())
                .with_column(Column::new("author_id", "integer").references("users", "id"))
                .with_column(Column::new("body", "text")),
            Table::new("comments")
                .with_column(Column::new("post_id", "integer").references("posts", "id"))
                .with_column(Column::new("user_id", "integer").references("users", "id")),
            Table::new("tags").with_column(Column::new("id", "integer").primary_key()),
            Table::new("post_tags")
                .with_column(Column::new("post_id", "integer").references("posts", "id"))
                .with_column(Column::new("tag_id", "integer").references("tags", "id")),
        ],
        vec![
            ForeignKey::new("posts", "author_id", "users", "id"),
            ForeignKey::new("comments", "post_id", "posts", "id"),
            ForeignKey::new("comments", "user_id", "users", "id"),
            ForeignKey::new("post_tags", "post_id", "posts", "id"),
            ForeignKey::new("post_tags", "tag_id", "tags", "id"),
        ],
    )
}

#[test]
fn test_layered_no_overlap_both_directions() {
    let model = blog_model();
    let view = SchemaView::full(&model);

    for direction in [Direction::TB, Direction::LR] {
        let params = LayeredParams {
            direction,
            ..LayeredParams::default()
        };
        let layout = LayeredLayout::compute(&view, &params);
        assert_eq!(layout.nodes.len(), 5);

        for (i, a) in layout.nodes.iter().enumerate() {
            for b in &layout.nodes[i + 1..] {
                assert!(!a.overlaps(b), "{} overlaps {} ({})", a.table, b.table, direction);
            }
            assert!(a.x >= 0.0 && a.y >= 0.0);
            assert!(a.x + a.width <= layout.width);
            assert!(a.y + a.height <= layout.height);
        }
    }
}

#[test]
fn test_layered_ranks_follow_references() {
    let model = blog_model();
    let layout = LayeredLayout::compute(&SchemaView::full(&model), &LayeredParams::default());

    let rank = |t: &str| layout.node(t).unwrap().rank;
    assert_eq!(rank("users"), 0);
    assert_eq!(rank("tags"), 0);
    assert_eq!(rank("posts"), 1);
    assert_eq!(rank("comments"), 2);
    assert_eq!(rank("post_tags"), 2);

    // Top-to-bottom: later ranks sit lower
    assert!(layout.node("posts").unwrap().y > layout.node("users").unwrap().y);
}

#[test]
fn test_layered_is_pure() {
    let model = blog_model();
    let view = SchemaView::full(&model);
    let a = LayeredLayout::compute(&view, &LayeredParams::default());
    let b = LayeredLayout::compute(&view, &LayeredParams::default());
    assert_eq!(a.nodes, b.nodes);
    assert_eq!(a.edges, b.edges);
}

#[test]
fn test_force_identical_inputs_identical_positions() {
    let model = blog_model();
    let view = SchemaView::full(&model);

    let mut first = ForceSimulation::new(&view, ForceParams::default());
    let mut second = ForceSimulation::new(&view, ForceParams::default());
    first.run();
    second.run();

    assert_eq!(first.state(), SimulationState::Settled);
    assert_eq!(first.snapshot(), second.snapshot());
}

#[test]
fn test_force_highest_degree_starts_at_center() {
    let model = blog_model();
    let view = SchemaView::full(&model);
    let mut sim = ForceSimulation::new(&view, ForceParams::default());
    sim.initialize();

    // posts touches users, comments and post_tags
    let origin = sim
        .snapshot()
        .into_iter()
        .find(|p| p.x == 0.0 && p.y == 0.0)
        .unwrap();
    assert_eq!(origin.table, "posts");
}

#[test]
fn test_runner_matches_direct_run() {
    let model = blog_model();
    let view = SchemaView::full(&model);
    let params = ForceParams {
        iterations: 60,
        ..ForceParams::default()
    };

    let mut direct = ForceSimulation::new(&view, params.clone());
    direct.run();

    let mut runner = ForceLayoutRunner::new(Duration::ZERO);
    let generation = runner.start(ForceSimulation::new(&view, params));
    let frame = runner.wait().unwrap();

    assert_eq!(frame.generation, generation);
    assert_eq!(frame.iteration, 60);
    assert_eq!(frame.positions, direct.snapshot());
}

#[test]
fn test_runner_restart_only_exposes_new_generation() {
    let model = blog_model();
    let view = SchemaView::full(&model);
    let mut runner = ForceLayoutRunner::new(Duration::from_millis(2));

    let slow = ForceParams {
        iterations: 1_000_000,
        ..ForceParams::default()
    };
    let old = runner.start(ForceSimulation::new(&view, slow));

    let filtered = SchemaModel::new(vec![Table::new("solo")], vec![]);
    let new = runner.start(ForceSimulation::new(
        &SchemaView::full(&filtered),
        ForceParams::default(),
    ));

    let frame = runner.wait().unwrap();
    assert_ne!(old, new);
    assert_eq!(frame.generation, new);
    assert_eq!(frame.positions.len(), 1);
    assert_eq!(frame.positions[0].table, "solo");
}
