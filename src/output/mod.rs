//! Output documents for derived structures.
//!
//! `json` holds the serializable documents behind `--json` (each with a JSON
//! Schema); `text` renders the same documents for terminals.

pub mod json;
pub mod text;

pub use json::{
    AnalyzeJsonOutput, ClustersJsonOutput, DegreeEntry, HierarchyJsonOutput, LayoutJsonOutput,
    LayoutNode, LevelEntry, LevelsJsonOutput, MatrixJsonOutput, PairEntry, RankEntry, TreeNode,
};
