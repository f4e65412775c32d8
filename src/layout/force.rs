//! Force-directed layout simulation.
//!
//! The simulation starts from a deterministic ring placement (highest-degree
//! table at the origin, six tables per ring around it) and runs a fixed number
//! of steps. Each step computes every force from the previous step's positions
//! before any position moves, so results depend only on the input.

use crate::graph::{DependencyGraph, SchemaView};
use ahash::AHashSet;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::ops::{Add, AddAssign, Mul, Sub};

/// Physics constants and iteration budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForceParams {
    /// Numerator of the inverse-square repulsion
    pub repulsion: f64,
    /// Spring constant applied to `distance - rest_length`
    pub spring_strength: f64,
    /// Ideal edge length
    pub rest_length: f64,
    /// Pull toward the origin per unit of distance
    pub centering: f64,
    /// Velocity multiplier per step, below 1
    pub damping: f64,
    /// Distance floor for repulsion
    pub min_distance: f64,
    /// Fixed step budget
    pub iterations: usize,
    /// Tables per initial ring
    pub ring_size: usize,
    /// Radius increment between initial rings
    pub ring_spacing: f64,
}

impl Default for ForceParams {
    fn default() -> Self {
        Self {
            repulsion: 20_000.0,
            spring_strength: 0.02,
            rest_length: 180.0,
            centering: 0.002,
            damping: 0.85,
            min_distance: 1.0,
            iterations: 300,
            ring_size: 6,
            ring_spacing: 200.0,
        }
    }
}

/// 2D vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, JsonSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Published position of one table
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct NodePosition {
    pub table: String,
    pub x: f64,
    pub y: f64,
}

/// Simulation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SimulationState {
    /// Created, no positions yet
    Initializing,
    /// Initial placement done, steps remaining
    Simulating,
    /// Step budget spent
    Settled,
}

/// Owned simulation context for one view.
///
/// Discard and recreate it when the view changes; it never carries state
/// across unrelated inputs.
#[derive(Debug, Clone)]
pub struct ForceSimulation {
    params: ForceParams,
    tables: Vec<String>,
    /// Placement order: indices by descending degree
    placement: Vec<usize>,
    /// Distinct undirected table pairs
    edges: Vec<(usize, usize)>,
    positions: Vec<Point>,
    velocities: Vec<Point>,
    forces: Vec<Point>,
    iteration: usize,
    state: SimulationState,
}

impl ForceSimulation {
    /// Create a simulation for a view
    pub fn new(view: &SchemaView, params: ForceParams) -> Self {
        let graph = DependencyGraph::from_view(view);
        Self::with_graph(view, &graph, params)
    }

    /// Create a simulation reusing an existing dependency graph of the view
    pub fn with_graph(view: &SchemaView, graph: &DependencyGraph, params: ForceParams) -> Self {
        let tables: Vec<String> = view.tables().iter().map(|t| t.name.clone()).collect();
        let placement = graph
            .by_degree()
            .into_iter()
            .filter_map(|name| view.position(name))
            .collect();

        let mut seen: AHashSet<(usize, usize)> = AHashSet::new();
        let mut edges = Vec::new();
        for fk in view.edges() {
            let (Some(a), Some(b)) = (
                view.position(&fk.source_table),
                view.position(&fk.target_table),
            ) else {
                continue;
            };
            if a != b && seen.insert((a.min(b), a.max(b))) {
                edges.push((a.min(b), a.max(b)));
            }
        }

        let n = tables.len();
        Self {
            params,
            tables,
            placement,
            edges,
            positions: Vec::with_capacity(n),
            velocities: Vec::with_capacity(n),
            forces: Vec::with_capacity(n),
            iteration: 0,
            state: SimulationState::Initializing,
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Completed steps
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    /// Positions in view order; empty while initializing
    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    /// Distinct undirected edges as view positions
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Position of a table
    pub fn position_of(&self, table: &str) -> Option<Point> {
        self.tables
            .iter()
            .position(|t| t == table)
            .and_then(|i| self.positions.get(i).copied())
    }

    /// Named snapshot of the current positions
    pub fn snapshot(&self) -> Vec<NodePosition> {
        self.tables
            .iter()
            .zip(&self.positions)
            .map(|(table, p)| NodePosition {
                table: table.clone(),
                x: p.x,
                y: p.y,
            })
            .collect()
    }

    /// Place tables on concentric rings: `Initializing -> Simulating`
    pub fn initialize(&mut self) {
        let n = self.tables.len();
        self.positions = vec![Point::ZERO; n];
        self.velocities = vec![Point::ZERO; n];
        self.forces = vec![Point::ZERO; n];
        self.iteration = 0;

        let ring_size = self.params.ring_size.max(1);
        let rest = n.saturating_sub(1);

        for (k, &index) in self.placement.iter().enumerate().skip(1) {
            let slot = k - 1;
            let ring = slot / ring_size;
            let in_ring = ring_size.min(rest - ring * ring_size);
            let angle = -FRAC_PI_2 + TAU * (slot % ring_size) as f64 / in_ring as f64;
            let radius = (ring + 1) as f64 * self.params.ring_spacing;
            self.positions[index] = Point::new(radius * angle.cos(), radius * angle.sin());
        }

        self.state = if n == 0 || self.params.iterations == 0 {
            SimulationState::Settled
        } else {
            SimulationState::Simulating
        };
    }

    /// Advance one step, initializing first if needed. Returns the new state.
    pub fn step(&mut self) -> SimulationState {
        match self.state {
            SimulationState::Initializing => {
                self.initialize();
                if self.state == SimulationState::Settled {
                    return self.state;
                }
            }
            SimulationState::Settled => return self.state,
            SimulationState::Simulating => {}
        }

        self.accumulate_forces();

        let damping = self.params.damping;
        for i in 0..self.positions.len() {
            self.velocities[i] = (self.velocities[i] + self.forces[i]) * damping;
            self.positions[i] += self.velocities[i];
        }

        self.iteration += 1;
        tracing::trace!(iteration = self.iteration, "force step");

        if self.iteration >= self.params.iterations {
            self.state = SimulationState::Settled;
            tracing::debug!(
                iterations = self.iteration,
                tables = self.tables.len(),
                "force layout settled"
            );
        }
        self.state
    }

    /// Run until settled and return the final positions
    pub fn run(&mut self) -> &[Point] {
        while self.step() != SimulationState::Settled {}
        &self.positions
    }

    /// Compute all forces from the current positions without moving anything
    fn accumulate_forces(&mut self) {
        let n = self.positions.len();
        let p = &self.positions;
        let forces = &mut self.forces;
        forces.iter_mut().for_each(|f| *f = Point::ZERO);

        let min_distance = self.params.min_distance;

        // Repulsion between every unordered pair
        for i in 0..n {
            for j in (i + 1)..n {
                let (direction, distance) = separation(p[i], p[j], i, j);
                let d = distance.max(min_distance);
                let push = direction * (self.params.repulsion / (d * d));
                forces[i] += push;
                forces[j] += push * -1.0;
            }
        }

        // Springs toward the rest length
        for &(a, b) in &self.edges {
            let (direction, distance) = separation(p[a], p[b], a, b);
            let pull = direction * (self.params.spring_strength * (distance - self.params.rest_length));
            forces[a] += pull * -1.0;
            forces[b] += pull;
        }

        // Centering
        for (force, &pos) in forces.iter_mut().zip(p.iter()) {
            *force += pos * -self.params.centering;
        }
    }
}

/// Unit vector from `b` to `a` and their distance.
///
/// Coincident points get a fixed direction derived from their indices.
fn separation(a: Point, b: Point, i: usize, j: usize) -> (Point, f64) {
    let delta = a - b;
    let distance = delta.length();
    if distance > 1e-9 {
        (delta * (1.0 / distance), distance)
    } else {
        let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * TAU;
        (Point::new(angle.cos(), angle.sin()), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ForeignKey, SchemaModel, Table};

    fn star_model(leaves: usize) -> SchemaModel {
        let mut tables = vec![Table::new("hub")];
        let mut fks = Vec::new();
        for i in 0..leaves {
            let name = format!("leaf{}", i);
            fks.push(ForeignKey::new(name.clone(), "hub_id", "hub", "id"));
            tables.push(Table::new(name));
        }
        SchemaModel::new(tables, fks)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_initial_rings() {
        let model = star_model(8);
        let view = SchemaView::full(&model);
        let mut sim = ForceSimulation::new(&view, ForceParams::default());
        assert_eq!(sim.state(), SimulationState::Initializing);
        assert!(sim.positions().is_empty());

        sim.initialize();
        assert_eq!(sim.state(), SimulationState::Simulating);

        let hub = sim.position_of("hub").unwrap();
        assert_eq!(hub, Point::ZERO);

        // First leaf sits at the top of ring 1
        let first = sim.position_of("leaf0").unwrap();
        assert!(close(first.x, 0.0));
        assert!(close(first.y, -200.0));

        // Ring 1 holds six tables at radius 200; the last two share ring 2
        for i in 0..6 {
            let p = sim.position_of(&format!("leaf{}", i)).unwrap();
            assert!(close(p.length(), 200.0));
        }
        let seventh = sim.position_of("leaf6").unwrap();
        let eighth = sim.position_of("leaf7").unwrap();
        assert!(close(seventh.length(), 400.0));
        assert!(close(seventh.y, -400.0));
        // Partial ring spreads evenly: two tables are opposite each other
        assert!(close(eighth.y, 400.0));
    }

    #[test]
    fn test_runs_fixed_budget_and_settles() {
        let model = star_model(3);
        let view = SchemaView::full(&model);
        let params = ForceParams {
            iterations: 25,
            ..ForceParams::default()
        };
        let mut sim = ForceSimulation::new(&view, params);

        let mut steps = 0;
        while sim.step() != SimulationState::Settled {
            steps += 1;
        }
        assert_eq!(steps + 1, 25);
        assert_eq!(sim.iteration(), 25);
        assert_eq!(sim.step(), SimulationState::Settled);
        assert_eq!(sim.iteration(), 25);
    }

    #[test]
    fn test_deterministic() {
        let model = star_model(10);
        let view = SchemaView::full(&model);
        let a = ForceSimulation::new(&view, ForceParams::default()).run().to_vec();
        let b = ForceSimulation::new(&view, ForceParams::default()).run().to_vec();
        assert_eq!(a, b);
        assert!(a.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_connected_pair_moves_toward_rest_length() {
        let model = SchemaModel::new(
            vec![Table::new("a"), Table::new("b")],
            vec![ForeignKey::new("b", "a_id", "a", "id")],
        );
        let view = SchemaView::full(&model);
        let params = ForceParams {
            ring_spacing: 1000.0,
            ..ForceParams::default()
        };
        let mut sim = ForceSimulation::new(&view, params);
        sim.run();

        let a = sim.position_of("a").unwrap();
        let b = sim.position_of("b").unwrap();
        let distance = (a - b).length();
        assert!(distance < 1000.0, "spring should pull the pair closer: {}", distance);
    }

    #[test]
    fn test_parallel_keys_make_one_spring() {
        let model = SchemaModel::new(
            vec![Table::new("x"), Table::new("y")],
            vec![
                ForeignKey::new("x", "a", "y", "id"),
                ForeignKey::new("x", "b", "y", "id"),
                ForeignKey::new("y", "c", "x", "id"),
            ],
        );
        let sim = ForceSimulation::new(&SchemaView::full(&model), ForceParams::default());
        assert_eq!(sim.edges(), &[(0, 1)]);
    }

    #[test]
    fn test_empty_and_single_table() {
        let empty = SchemaModel::default();
        let mut sim = ForceSimulation::new(&SchemaView::full(&empty), ForceParams::default());
        assert_eq!(sim.step(), SimulationState::Settled);
        assert!(sim.snapshot().is_empty());

        let single = SchemaModel::new(vec![Table::new("only")], vec![]);
        let mut sim = ForceSimulation::new(&SchemaView::full(&single), ForceParams::default());
        sim.run();
        assert_eq!(sim.position_of("only"), Some(Point::ZERO));
    }
}
