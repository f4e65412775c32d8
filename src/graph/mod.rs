//! Schema-graph analysis.
//!
//! This module provides:
//! - Filtered schema views (search, glob include/exclude, focus)
//! - Dependency and adjacency structures with degree statistics
//! - Connected-component clustering with domain naming
//! - Cycle-tolerant dependency levels and cycle detection
//! - First-found-parent hierarchies for tree layouts
//! - Symmetric connection matrices for heat-map views

pub mod analysis;
pub mod builder;
pub mod cluster;
pub mod hierarchy;
pub mod levels;
pub mod matrix;
pub mod view;

pub use analysis::{cyclic_tables, find_cycles};
pub use builder::DependencyGraph;
pub use cluster::{default_naming_rules, Cluster, Clustering, NamingRule};
pub use hierarchy::{Hierarchy, HierarchyError};
pub use levels::Levels;
pub use matrix::{ConnectionMatrix, EdgeDetail};
pub use view::{Focus, SchemaView, ViewFilter};
