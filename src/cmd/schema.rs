use crate::json_schema;
use anyhow::{bail, Context, Result};
use schemars::Schema;
use std::fs;
use std::path::PathBuf;

pub fn run(command: Option<String>, output_dir: Option<PathBuf>, list: bool) -> Result<()> {
    if list {
        for name in json_schema::schema_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let schemas: Vec<(String, Schema)> = match command {
        Some(name) => match json_schema::get_schema(&name) {
            Some(schema) => vec![(name, schema)],
            None => bail!(
                "Unknown schema: {}. Available: {}",
                name,
                json_schema::schema_names().join(", ")
            ),
        },
        None => json_schema::all_schemas()
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect(),
    };

    match output_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            for (name, schema) in &schemas {
                let path = dir.join(format!("{}.schema.json", name));
                let mut json = serde_json::to_string_pretty(schema)?;
                json.push('\n');
                fs::write(&path, json)
                    .with_context(|| format!("Failed to write schema: {}", path.display()))?;
                eprintln!("Wrote {}", path.display());
            }
        }
        None if schemas.len() == 1 => {
            println!("{}", serde_json::to_string_pretty(&schemas[0].1)?);
        }
        None => {
            let map: serde_json::Map<String, serde_json::Value> = schemas
                .into_iter()
                .map(|(name, schema)| -> Result<(String, serde_json::Value)> {
                    Ok((name, serde_json::to_value(schema)?))
                })
                .collect::<Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
    }

    Ok(())
}
