//! Record lookup by id
//!
//! Each table gets one [`RecordIndex`] built from the ids its records carry
//! when loaded. Lookups go through a borrowed [`TableView`] and never pick
//! between duplicates: an id shared by several records is reported as
//! ambiguous instead.

use std::collections::HashMap;

use super::error::{DereferenceError, DereferenceResult};
use super::types::{Record, TableName, record_id};

/// Where an id lives within its table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Exactly one record, at this position
    Unique(usize),
    /// Several records share the id
    Duplicate(usize),
}

/// Id index for one table: id -> position in the table's record sequence
#[derive(Debug, Clone)]
pub struct RecordIndex {
    table: TableName,
    slots: HashMap<i64, Slot>,
}

impl RecordIndex {
    /// Build the index for `records`
    ///
    /// Fails if any record lacks an integer `id`. Duplicate ids are recorded
    /// and only fail when looked up.
    pub fn build(table: TableName, records: &[Record]) -> DereferenceResult<Self> {
        let mut slots: HashMap<i64, Slot> = HashMap::with_capacity(records.len());
        let mut duplicate_count = 0usize;

        for (position, record) in records.iter().enumerate() {
            let id = record_id(record)
                .ok_or(DereferenceError::InvalidRecordId { table, position })?;

            match slots.get_mut(&id) {
                None => {
                    slots.insert(id, Slot::Unique(position));
                }
                Some(slot) => {
                    duplicate_count += 1;
                    *slot = match *slot {
                        Slot::Unique(_) => Slot::Duplicate(2),
                        Slot::Duplicate(n) => Slot::Duplicate(n + 1),
                    };
                }
            }
        }

        if duplicate_count > 0 {
            log::warn!(
                "{} has {} records sharing an id with another record",
                table,
                duplicate_count
            );
        }

        log::debug!("Indexed {} records of {}", slots.len(), table);

        Ok(RecordIndex { table, slots })
    }

    pub fn table(&self) -> TableName {
        self.table
    }

    /// Position of the single record carrying `id`
    pub fn position(&self, id: i64) -> DereferenceResult<usize> {
        match self.slots.get(&id) {
            Some(Slot::Unique(position)) => Ok(*position),
            Some(Slot::Duplicate(count)) => Err(DereferenceError::AmbiguousReference {
                table: self.table,
                id,
                count: *count,
            }),
            None => Err(DereferenceError::NotFound {
                table: self.table,
                id,
            }),
        }
    }
}

/// Read-only view of a table's records together with its index
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    records: &'a [Record],
    index: &'a RecordIndex,
}

impl<'a> TableView<'a> {
    pub fn new(records: &'a [Record], index: &'a RecordIndex) -> Self {
        TableView { records, index }
    }

    pub fn table(&self) -> TableName {
        self.index.table()
    }

    /// The single record with `id`
    pub fn find_one(&self, id: i64) -> DereferenceResult<&'a Record> {
        let position = self.index.position(id)?;
        self.records
            .get(position)
            .ok_or(DereferenceError::NotFound {
                table: self.table(),
                id,
            })
    }

    /// The records for `ids`, in the order of `ids` (duplicates repeated)
    pub fn find_many(&self, ids: &[i64]) -> DereferenceResult<Vec<&'a Record>> {
        ids.iter().map(|id| self.find_one(*id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(values: serde_json::Value) -> Vec<Record> {
        serde_json::from_value(values).unwrap()
    }

    #[test]
    fn test_find_one() {
        let agents = records(json!([
            {"id": 0, "label": "A"},
            {"id": 7, "label": "B"}
        ]));
        let index = RecordIndex::build(TableName::Agents, &agents).unwrap();
        let view = TableView::new(&agents, &index);

        assert_eq!(view.find_one(7).unwrap()["label"], json!("B"));
    }

    #[test]
    fn test_find_one_does_not_assume_dense_ids() {
        let codings = records(json!([{"id": 3, "code": "X"}]));
        let index = RecordIndex::build(TableName::Codings, &codings).unwrap();
        let view = TableView::new(&codings, &index);

        assert_eq!(view.find_one(3).unwrap()["code"], json!("X"));
        assert_eq!(
            view.find_one(0),
            Err(DereferenceError::NotFound {
                table: TableName::Codings,
                id: 0
            })
        );
    }

    #[test]
    fn test_duplicate_ids_are_ambiguous() {
        let genes = records(json!([
            {"id": 1, "name": "BRAF"},
            {"id": 1, "name": "KRAS"},
            {"id": 2, "name": "EGFR"}
        ]));
        let index = RecordIndex::build(TableName::Genes, &genes).unwrap();
        let view = TableView::new(&genes, &index);

        assert_eq!(
            view.find_one(1),
            Err(DereferenceError::AmbiguousReference {
                table: TableName::Genes,
                id: 1,
                count: 2
            })
        );
        // Unique ids in the same table still resolve
        assert_eq!(view.find_one(2).unwrap()["name"], json!("EGFR"));
    }

    #[test]
    fn test_find_many_preserves_requested_order_and_duplicates() {
        let documents = records(json!([
            {"id": 0, "name": "first"},
            {"id": 1, "name": "second"},
            {"id": 2, "name": "third"}
        ]));
        let index = RecordIndex::build(TableName::Documents, &documents).unwrap();
        let view = TableView::new(&documents, &index);

        let found = view.find_many(&[2, 0, 2]).unwrap();
        let names: Vec<_> = found.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("third"), json!("first"), json!("third")]);
    }

    #[test]
    fn test_find_many_fails_on_first_missing_id() {
        let documents = records(json!([{"id": 0}]));
        let index = RecordIndex::build(TableName::Documents, &documents).unwrap();
        let view = TableView::new(&documents, &index);

        assert!(matches!(
            view.find_many(&[0, 5]),
            Err(DereferenceError::NotFound { id: 5, .. })
        ));
    }

    #[test]
    fn test_build_rejects_records_without_integer_id() {
        let agents = records(json!([{"id": 0}, {"label": "no id"}]));
        assert_eq!(
            RecordIndex::build(TableName::Agents, &agents).unwrap_err(),
            DereferenceError::InvalidRecordId {
                table: TableName::Agents,
                position: 1
            }
        );
    }
}
