//! Read -> dereference -> document pipeline

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};

use crate::almanac::{DependencyGraph, Dereferencer, Record, TableName, almanac_plans};
use crate::config::InputPaths;
use crate::io::{Document, read_about, read_records};

/// Tables that must be loaded to dereference `root`
pub fn required_tables(root: TableName) -> BTreeSet<TableName> {
    DependencyGraph::build(almanac_plans().values()).reachable_from(root)
}

/// Read the given tables from their input files
pub fn load_tables(
    inputs: &InputPaths,
    tables: impl IntoIterator<Item = TableName>,
) -> Result<BTreeMap<TableName, Vec<Record>>> {
    tables
        .into_iter()
        .map(|table| -> Result<(TableName, Vec<Record>)> {
            Ok((table, read_records(table, inputs.table(table))?))
        })
        .collect()
}

/// Load everything `root` depends on and return its dereferenced records
pub fn dereference_table(inputs: &InputPaths, root: TableName) -> Result<Vec<Record>> {
    let tables = load_tables(inputs, required_tables(root))?;

    let mut engine = Dereferencer::new(tables).context("Failed to index input tables")?;
    engine
        .dereference(root)
        .with_context(|| format!("Failed to dereference {}", root))?;

    Ok(engine.into_records(root)?)
}

/// Build the output document: the metadata plus the dereferenced `root` records
pub fn build_document(inputs: &InputPaths, root: TableName) -> Result<Document> {
    let about = read_about(&inputs.about)?;
    let content = dereference_table(inputs, root)?;
    Ok(Document::new(about, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_table(dir: &Path, table: TableName, value: Value) {
        fs::write(dir.join(table.file_name()), value.to_string()).unwrap();
    }

    #[test]
    fn test_required_tables() {
        let expected: BTreeSet<_> = [TableName::Agents, TableName::Documents, TableName::Indications]
            .into_iter()
            .collect();
        assert_eq!(required_tables(TableName::Indications), expected);
        assert_eq!(
            required_tables(TableName::Statements).len(),
            TableName::all_variants().len()
        );
    }

    #[test]
    fn test_build_document_for_partial_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("about.json"), r#"{"release": "draft"}"#).unwrap();
        write_table(dir.path(), TableName::Agents, json!([{"id": 0, "label": "FDA"}]));
        write_table(
            dir.path(),
            TableName::Documents,
            json!([{"id": 0, "agent_id": 0, "name": "label"}]),
        );
        write_table(
            dir.path(),
            TableName::Indications,
            json!([{"id": 0, "document_id": 0, "description": "approved"}]),
        );

        let inputs = InputPaths::in_dir(dir.path());
        let document = build_document(&inputs, TableName::Indications).unwrap();

        assert_eq!(document.about, json!({"release": "draft"}));
        assert_eq!(
            document.content[0]["document"]["organization"],
            json!({"id": 0, "label": "FDA"})
        );
    }

    #[test]
    fn test_missing_input_file_fails() {
        let dir = TempDir::new().unwrap();
        write_table(dir.path(), TableName::Agents, json!([]));

        let inputs = InputPaths::in_dir(dir.path());
        let err = dereference_table(&inputs, TableName::Documents).unwrap_err();
        assert!(err.to_string().contains("File not found"));
    }
}
