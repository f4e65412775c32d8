//! Human-readable renderers for output documents.

use super::json::{
    AnalyzeJsonOutput, ClustersJsonOutput, HierarchyJsonOutput, LayoutJsonOutput,
    LevelsJsonOutput, MatrixJsonOutput, TreeNode,
};

const RULE_WIDTH: usize = 72;

/// Format the analysis summary
pub fn format_analyze(out: &AnalyzeJsonOutput) -> String {
    let mut s = String::new();
    s.push_str(&format!("Schema: {}\n\n", out.input_file));
    s.push_str(&format!("  Tables:          {}\n", out.tables));
    s.push_str(&format!("  Columns:         {}\n", out.columns));
    s.push_str(&format!("  Foreign keys:    {}\n", out.foreign_keys));
    s.push_str(&format!("  Self references: {}\n", out.self_references));
    s.push_str(&format!("  Enums:           {}\n", out.enums));
    s.push_str(&format!(
        "  Levels:          {}{}\n",
        out.level_count,
        if out.forced_levels.is_empty() {
            String::new()
        } else {
            format!(" ({} forced by cycles)", out.forced_levels.len())
        }
    ));
    s.push_str(&format!("  Clusters:        {}\n", out.clusters.len()));

    if !out.warnings.is_empty() {
        s.push_str(&format!("\nWarnings ({}):\n", out.warnings.len()));
        for w in &out.warnings {
            s.push_str(&format!("  ! {}\n", w));
        }
    }

    if !out.most_connected.is_empty() {
        s.push_str("\nMost connected tables:\n");
        s.push_str(&format!(
            "  {:<40} {:>8} {:>8} {:>8}\n",
            "Table", "Degree", "In", "Out"
        ));
        s.push_str(&format!("  {}\n", "─".repeat(RULE_WIDTH - 4)));
        for entry in &out.most_connected {
            s.push_str(&format!(
                "  {:<40} {:>8} {:>8} {:>8}\n",
                truncate(&entry.table, 40),
                entry.degree,
                entry.in_degree,
                entry.out_degree
            ));
        }
    }

    if !out.cycles.is_empty() {
        s.push_str(&format!("\nCycles ({}):\n", out.cycles.len()));
        for path in &out.cycle_paths {
            s.push_str(&format!("  {}\n", path));
        }
    }

    if !out.isolated_tables.is_empty() {
        s.push_str(&format!(
            "\nIsolated tables ({}): {}\n",
            out.isolated_tables.len(),
            out.isolated_tables.join(", ")
        ));
    }

    if !out.clusters.is_empty() {
        s.push_str("\nClusters:\n");
        for c in &out.clusters {
            s.push_str(&format!("  {:<40} {:>6} tables\n", c.name, c.size));
        }
    }

    s
}

/// Format dependency levels
pub fn format_levels(out: &LevelsJsonOutput) -> String {
    let mut s = String::new();
    if out.levels.is_empty() {
        s.push_str("(no tables)\n");
        return s;
    }
    for entry in &out.levels {
        let marker = if entry.forced { " [forced: cycle]" } else { "" };
        s.push_str(&format!(
            "Level {} ({} tables){}\n",
            entry.level,
            entry.tables.len(),
            marker
        ));
        for table in &entry.tables {
            s.push_str(&format!("  {}\n", table));
        }
    }
    s
}

/// Format clusters
pub fn format_clusters(out: &ClustersJsonOutput) -> String {
    let mut s = String::new();
    if out.clusters.is_empty() {
        s.push_str("(no tables)\n");
        return s;
    }
    for cluster in &out.clusters {
        s.push_str(&format!(
            "{} ({} tables, root: {})\n",
            cluster.name,
            cluster.len(),
            cluster.id
        ));
        for table in &cluster.tables {
            s.push_str(&format!("  {}\n", table));
        }
    }
    s
}

/// Format the hierarchy as an indented tree
pub fn format_hierarchy(out: &HierarchyJsonOutput) -> String {
    let mut s = String::new();
    write_tree(&mut s, &out.root, "", true, true);
    s
}

fn write_tree(s: &mut String, node: &TreeNode, prefix: &str, last: bool, top: bool) {
    let label = node.table.as_deref().unwrap_or("(root)");
    let child_prefix = if top {
        s.push_str(label);
        s.push('\n');
        String::new()
    } else {
        let branch = if last { "└── " } else { "├── " };
        s.push_str(&format!("{}{}{}\n", prefix, branch, label));
        format!("{}{}", prefix, if last { "    " } else { "│   " })
    };

    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        write_tree(s, child, &child_prefix, i + 1 == count, false);
    }
}

/// Format the connection matrix as a ranked pair list
pub fn format_matrix(out: &MatrixJsonOutput) -> String {
    let mut s = String::new();
    s.push_str(&format!(
        "{} tables, {} relationships, max cell weight {}\n\n",
        out.tables.len(),
        out.total_weight,
        out.max_weight
    ));

    if !out.ranking.is_empty() {
        s.push_str(&format!("{:<40} {:>8}\n", "Table", "Total"));
        s.push_str(&format!("{}\n", "─".repeat(49)));
        for entry in &out.ranking {
            s.push_str(&format!(
                "{:<40} {:>8}\n",
                truncate(&entry.table, 40),
                entry.total
            ));
        }
    }

    if !out.pairs.is_empty() {
        s.push_str("\nConnected pairs:\n");
        for pair in &out.pairs {
            s.push_str(&format!("  {} <-> {} ({})\n", pair.a, pair.b, pair.weight));
            for d in &pair.details {
                s.push_str(&format!(
                    "      {}: {}.{} -> {}.{}\n",
                    d.constraint_name,
                    d.source_table,
                    d.source_column,
                    d.target_table,
                    d.target_column
                ));
            }
        }
    }

    s
}

/// Format node boxes of a layout
pub fn format_layout(out: &LayoutJsonOutput) -> String {
    let mut s = String::new();
    let mut header = format!("Engine: {}", out.engine);
    if let Some(direction) = out.direction {
        header.push_str(&format!(", direction: {}", direction));
    }
    if let Some(iterations) = out.iterations {
        header.push_str(&format!(", iterations: {}", iterations));
    }
    s.push_str(&header);
    s.push_str(&format!("\nCanvas: {:.0} x {:.0}\n\n", out.width, out.height));

    s.push_str(&format!(
        "{:<32} {:>10} {:>10} {:>8} {:>8}\n",
        "Table", "X", "Y", "Width", "Height"
    ));
    s.push_str(&format!("{}\n", "─".repeat(RULE_WIDTH)));
    for node in &out.nodes {
        s.push_str(&format!(
            "{:<32} {:>10.1} {:>10.1} {:>8.0} {:>8.0}\n",
            truncate(&node.table, 32),
            node.x,
            node.y,
            node.width,
            node.height
        ));
    }
    s
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
