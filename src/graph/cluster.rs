//! Connected-component clustering of tables.
//!
//! Tables are grouped by undirected foreign-key connectivity using union-find
//! with path compression. Cluster order and naming are deterministic for a
//! given input order.

use crate::graph::view::SchemaView;
use ahash::AHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Union-find over table names.
///
/// A name is its own parent until first touched, so no initialization pass is
/// needed.
#[derive(Debug, Default)]
pub struct UnionFind {
    parent: AHashMap<String, String>,
}

impl UnionFind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the root of `x`, compressing the path behind it
    pub fn find(&mut self, x: &str) -> String {
        let mut root = x.to_string();
        while let Some(parent) = self.parent.get(&root) {
            if *parent == root {
                break;
            }
            root = parent.clone();
        }

        let mut current = x.to_string();
        while current != root {
            let next = match self.parent.get(&current) {
                Some(p) => p.clone(),
                None => break,
            };
            self.parent.insert(current, root.clone());
            current = next;
        }

        root
    }

    /// Merge the classes of `a` and `b`; `find(a)`'s root is reparented to `find(b)`'s
    pub fn union(&mut self, a: &str, b: &str) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent.insert(root_a, root_b);
        }
    }
}

/// Keyword rule mapping a cluster to a domain name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NamingRule {
    /// Display name for matching clusters
    pub name: String,
    /// Lowercase substrings searched for in member table names
    pub keywords: Vec<String>,
}

impl NamingRule {
    pub fn new(name: &str, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, members: &[String]) -> bool {
        members.iter().any(|m| {
            let lower = m.to_lowercase();
            self.keywords
                .iter()
                .any(|k| lower.contains(&k.to_lowercase()))
        })
    }
}

/// Ordered rule list; the first matching rule names the cluster
pub fn default_naming_rules() -> Vec<NamingRule> {
    vec![
        NamingRule::new(
            "Users & Auth",
            &["user", "auth", "role", "permission", "session", "account"],
        ),
        NamingRule::new(
            "Orders & Payments",
            &["order", "payment", "invoice", "cart", "checkout", "transaction"],
        ),
        NamingRule::new(
            "Products & Catalog",
            &["product", "catalog", "inventory", "category", "sku", "variant"],
        ),
        NamingRule::new("Content", &["post", "comment", "article", "content", "media", "tag"]),
        NamingRule::new(
            "Messaging",
            &["message", "notification", "email", "chat", "inbox"],
        ),
        NamingRule::new("Logging & Audit", &["log", "audit", "event", "history"]),
        NamingRule::new("Settings & Config", &["setting", "config", "preference", "option"]),
    ]
}

/// Name a cluster: first matching rule, else `"<root> Domain"`, else the bare root
pub fn cluster_name(rules: &[NamingRule], root: &str, members: &[String]) -> String {
    if let Some(rule) = rules.iter().find(|r| r.matches(members)) {
        return rule.name.clone();
    }
    if members.len() > 1 {
        format!("{} Domain", root)
    } else {
        root.to_string()
    }
}

/// A connected component of tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Cluster {
    /// Root table name of the component
    pub id: String,
    /// Presentation name
    pub name: String,
    /// Member tables in view order
    pub tables: Vec<String>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Partition of a view into clusters
#[derive(Debug, Clone, Default)]
pub struct Clustering {
    /// Clusters by descending size, ties by id
    pub clusters: Vec<Cluster>,
    assignment: AHashMap<String, usize>,
}

impl Clustering {
    /// Cluster a view with the default naming rules
    pub fn from_view(view: &SchemaView) -> Self {
        Self::with_rules(view, &default_naming_rules())
    }

    /// Cluster a view with custom naming rules
    pub fn with_rules(view: &SchemaView, rules: &[NamingRule]) -> Self {
        let mut uf = UnionFind::new();
        for fk in view.edges() {
            uf.union(&fk.source_table, &fk.target_table);
        }

        let mut groups: AHashMap<String, Vec<String>> = AHashMap::new();
        for table in view.tables() {
            let root = uf.find(&table.name);
            groups.entry(root).or_default().push(table.name.clone());
        }

        let mut clusters: Vec<Cluster> = groups
            .into_iter()
            .map(|(id, tables)| Cluster {
                name: cluster_name(rules, &id, &tables),
                id,
                tables,
            })
            .collect();

        clusters.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.id.cmp(&b.id)));

        let assignment = clusters
            .iter()
            .enumerate()
            .flat_map(|(i, c)| c.tables.iter().map(move |t| (t.clone(), i)))
            .collect();

        tracing::debug!(clusters = clusters.len(), "clustered schema view");

        Self {
            clusters,
            assignment,
        }
    }

    /// Cluster a table belongs to
    pub fn cluster_of(&self, table: &str) -> Option<&Cluster> {
        self.assignment.get(table).map(|&i| &self.clusters[i])
    }

    /// Check whether two tables share a cluster
    pub fn same_cluster(&self, a: &str, b: &str) -> bool {
        match (self.assignment.get(a), self.assignment.get(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
