//! Coordinate layouts for node-link views.
//!
//! This module provides:
//! - A layered (rank/position) layout for directed diagram views
//! - A force-directed simulation with deterministic start and fixed budget
//! - A cancelable background runner for the force simulation

pub mod force;
pub mod layered;
pub mod runner;
pub mod sizing;

pub use force::{ForceParams, ForceSimulation, NodePosition};
pub use layered::{LayeredLayout, LayeredParams, LayoutEdge};
pub use runner::{ForceLayoutRunner, Frame};
pub use sizing::NodeSizing;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Flow direction of a layered layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Top to bottom: ranks are rows
    #[default]
    TB,
    /// Left to right: ranks are columns
    LR,
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lr" | "left-right" | "horizontal" => Ok(Direction::LR),
            "tb" | "td" | "top-bottom" | "top-down" | "vertical" => Ok(Direction::TB),
            _ => Err(format!("Unknown direction: {}. Valid options: tb, lr", s)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LR => write!(f, "lr"),
            Direction::TB => write!(f, "tb"),
        }
    }
}

/// Layout engine selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Engine {
    #[default]
    Layered,
    Force,
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "layered" | "dagre" | "sugiyama" => Ok(Engine::Layered),
            "force" | "force-directed" => Ok(Engine::Force),
            _ => Err(format!("Unknown engine: {}. Valid options: layered, force", s)),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Engine::Layered => write!(f, "layered"),
            Engine::Force => write!(f, "force"),
        }
    }
}
