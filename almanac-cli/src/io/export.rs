//! Per-record export: one file per record at `<dir>/<table>/<id>.json`

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::Value;

use super::write::write_json;
use crate::almanac::{Record, TableName, record_id};

/// Path of one exported record
pub fn record_path(dir: &Path, table: TableName, id: i64) -> PathBuf {
    dir.join(table.as_str()).join(format!("{}.json", id))
}

/// Write each record of `table` to its own file, returning how many were written
///
/// Every record must carry an integer `id`; nothing is written otherwise.
pub fn export_records(table: TableName, records: &[Record], dir: &Path) -> Result<usize> {
    let targets = records
        .iter()
        .enumerate()
        .map(|(position, record)| match record_id(record) {
            Some(id) => Ok((record_path(dir, table, id), record)),
            None => anyhow::bail!(
                "Cannot export {} record at position {}: it has no integer 'id'",
                table,
                position
            ),
        })
        .collect::<Result<Vec<_>>>()?;

    for (path, record) in &targets {
        write_json(&Value::Object((*record).clone()), &[], path, true)?;
    }

    log::info!(
        "Exported {} {} records to {}",
        targets.len(),
        table,
        dir.join(table.as_str()).display()
    );
    Ok(targets.len())
}
