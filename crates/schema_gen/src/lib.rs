//! Schema snapshot generator for schema-atlas tests and benchmarks.
//!
//! Generates deterministic, seeded schema snapshots with realistic table
//! names, primary keys and foreign keys, in the JSON format `schema-atlas`
//! reads.
//!
//! # Example
//!
//! ```rust
//! use schema_gen::{Generator, Scale};
//!
//! let mut gen = Generator::new(42, Scale::Small);
//! let snapshot = gen.generate();
//!
//! println!("{}", snapshot.to_json().unwrap());
//! ```

pub mod generator;
pub mod snapshot;

pub use generator::{Generator, GeneratorConfig, Scale};
pub use snapshot::{Column, ColumnRef, ForeignKey, Snapshot, Table};
