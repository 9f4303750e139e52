//! Errors raised while dereferencing tables
//!
//! Every variant is fatal for a pipeline run: the knowledge base is curated,
//! so a dereferencing fault means a data-entry bug that needs fixing.

use thiserror::Error;

use super::types::TableName;

/// Result alias for engine operations
pub type DereferenceResult<T> = std::result::Result<T, DereferenceError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DereferenceError {
    /// No record in `table` carries the referenced id
    #[error("{table} has no record with id {id}")]
    NotFound { table: TableName, id: i64 },

    /// More than one record in `table` carries the referenced id
    #[error("{table} has {count} records with id {id}; ids must be unique")]
    AmbiguousReference {
        table: TableName,
        id: i64,
        count: usize,
    },

    /// A required reference field is absent (also raised when a record was already dereferenced)
    #[error("{table} record is missing required field '{field}'")]
    MissingField { table: TableName, field: String },

    /// A reference field holds something other than an id (or list of ids)
    #[error("{table} field '{field}' is not a valid reference: {reason}")]
    InvalidReference {
        table: TableName,
        field: String,
        reason: String,
    },

    #[error("{table} record sets neither '{field_a}' nor '{field_b}'")]
    MissingPolymorphicField {
        table: TableName,
        field_a: String,
        field_b: String,
    },

    #[error("{table} record sets both '{field_a}' and '{field_b}'; exactly one is allowed")]
    AmbiguousPolymorphicField {
        table: TableName,
        field_a: String,
        field_b: String,
    },

    /// The table dependency graph is not acyclic
    #[error("Circular dependency detected involving: {}", join_tables(.tables))]
    CyclicDependency { tables: Vec<TableName> },

    /// A table was resolved before one of its dependencies
    #[error("{table} cannot be resolved before its dependency {dependency}")]
    DependencyNotResolved {
        table: TableName,
        dependency: TableName,
    },

    #[error("{table} was not loaded")]
    UnknownTable { table: TableName },

    /// A loaded record has no integer `id`
    #[error("{table} record at position {position} has no integer 'id'")]
    InvalidRecordId { table: TableName, position: usize },

    /// Adds the offending record to a field-level failure
    #[error("{table} record {id}: {source}")]
    InRecord {
        table: TableName,
        id: i64,
        #[source]
        source: Box<DereferenceError>,
    },
}

impl DereferenceError {
    /// The underlying failure with any record context removed
    pub fn root_cause(&self) -> &DereferenceError {
        match self {
            DereferenceError::InRecord { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Wrap this error with the id of the record being dereferenced
    pub fn in_record(self, table: TableName, id: i64) -> Self {
        DereferenceError::InRecord {
            table,
            id,
            source: Box::new(self),
        }
    }
}

fn join_tables(tables: &[TableName]) -> String {
    tables
        .iter()
        .map(|t| t.label())
        .collect::<Vec<_>>()
        .join(", ")
}
