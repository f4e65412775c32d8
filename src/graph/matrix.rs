//! Symmetric table-by-table relationship counts for heat-map views.

use crate::graph::view::SchemaView;
use ahash::AHashMap;
use schemars::JsonSchema;
use serde::Serialize;

/// One foreign key contributing to a matrix cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct EdgeDetail {
    pub constraint_name: String,
    pub source_table: String,
    pub source_column: String,
    pub target_table: String,
    pub target_column: String,
}

/// Connection matrix over the tables of a view.
///
/// `weight(a, b)` counts the foreign keys between `a` and `b` in either
/// direction; each key adds exactly one to the unordered pair. The diagonal is
/// always zero and self references are not counted.
#[derive(Debug, Clone, Default)]
pub struct ConnectionMatrix {
    /// Row/column labels in view order
    pub tables: Vec<String>,
    cells: Vec<u32>,
    index: AHashMap<String, usize>,
    details: AHashMap<(usize, usize), Vec<EdgeDetail>>,
    totals: Vec<u32>,
    ranking: Vec<usize>,
}

impl ConnectionMatrix {
    /// Build the matrix for a view
    pub fn build(view: &SchemaView) -> Self {
        let n = view.len();
        let tables: Vec<String> = view.tables().iter().map(|t| t.name.clone()).collect();
        let index: AHashMap<String, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i))
            .collect();

        let mut cells = vec![0u32; n * n];
        let mut totals = vec![0u32; n];
        let mut details: AHashMap<(usize, usize), Vec<EdgeDetail>> = AHashMap::new();

        for fk in view.edges() {
            if fk.is_self_reference() {
                continue;
            }
            let (Some(&a), Some(&b)) = (
                index.get(fk.source_table.as_str()),
                index.get(fk.target_table.as_str()),
            ) else {
                continue;
            };

            cells[a * n + b] += 1;
            cells[b * n + a] += 1;
            totals[a] += 1;
            totals[b] += 1;

            details
                .entry((a.min(b), a.max(b)))
                .or_default()
                .push(EdgeDetail {
                    constraint_name: fk.constraint_name.clone(),
                    source_table: fk.source_table.clone(),
                    source_column: fk.source_column.clone(),
                    target_table: fk.target_table.clone(),
                    target_column: fk.target_column.clone(),
                });
        }

        let mut ranking: Vec<usize> = (0..n).collect();
        // Stable: equal totals keep view order
        ranking.sort_by(|&x, &y| totals[y].cmp(&totals[x]));

        Self {
            tables,
            cells,
            index,
            details,
            totals,
            ranking,
        }
    }

    /// Matrix dimension
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Weight between two tables by position
    pub fn weight_at(&self, row: usize, col: usize) -> u32 {
        let n = self.len();
        if row >= n || col >= n {
            return 0;
        }
        self.cells[row * n + col]
    }

    /// Weight between two tables by name; 0 for unknown tables
    pub fn weight(&self, a: &str, b: &str) -> u32 {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&i), Some(&j)) => self.weight_at(i, j),
            _ => 0,
        }
    }

    /// Full matrix as rows
    pub fn rows(&self) -> Vec<Vec<u32>> {
        let n = self.len();
        (0..n).map(|i| self.cells[i * n..(i + 1) * n].to_vec()).collect()
    }

    /// Contributing foreign keys for a pair, in model order
    pub fn details(&self, a: &str, b: &str) -> &[EdgeDetail] {
        let (Some(&i), Some(&j)) = (self.index.get(a), self.index.get(b)) else {
            return &[];
        };
        self.details
            .get(&(i.min(j), i.max(j)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Connected unordered pairs `(a, b, weight)` with `a` before `b` in view order
    pub fn pairs(&self) -> Vec<(&str, &str, u32)> {
        let n = self.len();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                let w = self.cells[i * n + j];
                if w > 0 {
                    pairs.push((self.tables[i].as_str(), self.tables[j].as_str(), w));
                }
            }
        }
        pairs
    }

    /// Total connection count of a table
    pub fn total(&self, table: &str) -> u32 {
        self.index
            .get(table)
            .map(|&i| self.totals[i])
            .unwrap_or(0)
    }

    /// Tables by descending total connection count; ties keep view order
    pub fn ranking(&self) -> Vec<(&str, u32)> {
        self.ranking
            .iter()
            .map(|&i| (self.tables[i].as_str(), self.totals[i]))
            .collect()
    }

    /// Largest off-diagonal weight, for heat-map scaling
    pub fn max_weight(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of weights over unordered pairs
    pub fn total_weight(&self) -> u32 {
        self.totals.iter().sum::<u32>() / 2
    }
}
