//! Seeded schema generator.
//!
//! Tables only reference earlier tables unless back references are requested,
//! so the default output is acyclic apart from self references.

use crate::snapshot::{Column, ForeignKey, Snapshot, Table};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Base table names; later tables reuse them with a numeric suffix
const TABLE_NOUNS: &[&str] = &[
    "users",
    "accounts",
    "roles",
    "sessions",
    "orders",
    "order_items",
    "payments",
    "invoices",
    "products",
    "categories",
    "inventory",
    "posts",
    "comments",
    "tags",
    "messages",
    "notifications",
    "audit_logs",
    "events",
    "settings",
    "preferences",
    "projects",
    "tasks",
    "teams",
    "addresses",
];

const DATA_COLUMNS: &[(&str, &str)] = &[
    ("name", "varchar"),
    ("title", "varchar"),
    ("description", "text"),
    ("status", "varchar"),
    ("amount", "decimal"),
    ("quantity", "integer"),
    ("email", "varchar"),
    ("created_at", "timestamp"),
    ("updated_at", "timestamp"),
    ("is_active", "boolean"),
    ("metadata", "jsonb"),
    ("external_id", "uuid"),
];

/// Generation scale presets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// 12 tables
    Small,
    /// 60 tables
    Medium,
    /// 300 tables
    Large,
    /// 1,500 tables (for layout stress testing)
    XLarge,
}

impl Scale {
    pub fn tables(&self) -> usize {
        match self {
            Scale::Small => 12,
            Scale::Medium => 60,
            Scale::Large => 300,
            Scale::XLarge => 1500,
        }
    }
}

impl std::str::FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" | "s" => Ok(Scale::Small),
            "medium" | "m" => Ok(Scale::Medium),
            "large" | "l" => Ok(Scale::Large),
            "xlarge" | "xl" | "x" => Ok(Scale::XLarge),
            _ => Err(format!(
                "Unknown scale: {}. Use small, medium, large, or xlarge",
                s
            )),
        }
    }
}

/// Shape of the generated schema
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub tables: usize,
    /// Upper bound of foreign keys declared per table
    pub max_foreign_keys: usize,
    /// Chance that a table declares no foreign keys at all
    pub standalone_probability: f64,
    /// Chance that a table references itself (`parent_id`)
    pub self_reference_probability: f64,
    /// Foreign keys pointing from an earlier table to a later one
    pub back_references: usize,
}

impl GeneratorConfig {
    pub fn for_scale(scale: Scale) -> Self {
        Self {
            tables: scale.tables(),
            ..Self::default()
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tables: Scale::Small.tables(),
            max_foreign_keys: 3,
            standalone_probability: 0.1,
            self_reference_probability: 0.05,
            back_references: 0,
        }
    }
}

/// Deterministic snapshot generator
pub struct Generator {
    rng: ChaCha8Rng,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(seed: u64, scale: Scale) -> Self {
        Self::with_config(seed, GeneratorConfig::for_scale(scale))
    }

    pub fn with_config(seed: u64, config: GeneratorConfig) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a snapshot
    pub fn generate(&mut self) -> Snapshot {
        let names: Vec<String> = (0..self.config.tables).map(table_name).collect();
        let mut tables: Vec<Table> = names.iter().map(|name| self.base_table(name)).collect();
        let mut foreign_keys = Vec::new();

        for i in 1..tables.len() {
            if self.rng.random_bool(self.config.standalone_probability) {
                continue;
            }
            let count = self.rng.random_range(1..=self.config.max_foreign_keys.max(1));
            for _ in 0..count {
                let target = self.rng.random_range(0..i);
                foreign_keys.push(add_reference(&mut tables, i, target));
            }
        }

        for i in 0..tables.len() {
            if self.rng.random_bool(self.config.self_reference_probability) {
                foreign_keys.push(add_reference(&mut tables, i, i));
            }
        }

        if tables.len() > 1 {
            for _ in 0..self.config.back_references {
                let source = self.rng.random_range(0..tables.len() - 1);
                let target = self.rng.random_range(source + 1..tables.len());
                foreign_keys.push(add_reference(&mut tables, source, target));
            }
        }

        Snapshot {
            tables,
            foreign_keys,
        }
    }

    fn base_table(&mut self, name: &str) -> Table {
        let mut columns = vec![Column::primary_key("id")];
        let extra = self.rng.random_range(1..=5);
        let start = self.rng.random_range(0..DATA_COLUMNS.len());
        for k in 0..extra {
            let (column, data_type) = DATA_COLUMNS[(start + k) % DATA_COLUMNS.len()];
            let nullable = self.rng.random_bool(0.5);
            columns.push(Column::data(column, data_type, nullable));
        }
        Table {
            name: name.to_string(),
            schema: "public".to_string(),
            columns,
        }
    }
}

fn table_name(i: usize) -> String {
    let noun = TABLE_NOUNS[i % TABLE_NOUNS.len()];
    match i / TABLE_NOUNS.len() {
        0 => noun.to_string(),
        n => format!("{}_{}", noun, n),
    }
}

/// Add a foreign-key column on `source` pointing at `target.id`
fn add_reference(tables: &mut [Table], source: usize, target: usize) -> ForeignKey {
    let target_name = tables[target].name.clone();
    let base = if source == target {
        "parent_id".to_string()
    } else {
        format!("{}_id", target_name)
    };

    let table = &mut tables[source];
    let mut column = base.clone();
    let mut n = 2;
    while table.columns.iter().any(|c| c.name == column) {
        column = format!("{}_{}", base, n);
        n += 1;
    }

    table
        .columns
        .push(Column::foreign_key(&column, &target_name, true));

    ForeignKey {
        constraint_name: format!("fk_{}_{}", table.name, column),
        source_table: table.name.clone(),
        source_column: column,
        target_table: target_name,
        target_column: "id".to_string(),
    }
}
