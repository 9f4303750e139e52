//! Field transforms: replace raw ids on a record with the records they reference
//!
//! All transforms are destructive and one-way. A record that has already been
//! dereferenced no longer carries its raw id field, so running the same
//! transform twice fails with [`DereferenceError::MissingField`].
//!
//! Key order is kept: the embedded value takes the position of the field it
//! replaces.

use serde_json::Value;

use super::error::{DereferenceError, DereferenceResult};
use super::lookup::TableView;
use super::types::{Record, TableName};

/// Replace a single-id `field` with the referenced record, stored under `rename_to`
///
/// An absent field is a no-op unless `required`. An optional field holding
/// `null` is carried over as `null` under `rename_to`.
pub fn resolve_single(
    record: &mut Record,
    table: TableName,
    field: &str,
    target: TableView<'_>,
    rename_to: &str,
    required: bool,
) -> DereferenceResult<()> {
    let Some(raw) = record.get(field) else {
        return if required {
            Err(missing(table, field))
        } else {
            Ok(())
        };
    };

    let embedded = match raw {
        Value::Null if !required => Value::Null,
        other => {
            let id = as_id(other).ok_or_else(|| invalid(table, field, expected("an integer id", other)))?;
            Value::Object(target.find_one(id)?.clone())
        }
    };

    ensure_free(record, table, field, rename_to)?;
    replace_entry(record, field, rename_to, embedded);
    Ok(())
}

/// Replace a list-of-ids `field` with the referenced records, in order
///
/// Repeated ids produce repeated embedded records.
pub fn resolve_list(
    record: &mut Record,
    table: TableName,
    field: &str,
    target: TableView<'_>,
    required: bool,
) -> DereferenceResult<()> {
    let Some(raw) = record.get(field) else {
        return if required {
            Err(missing(table, field))
        } else {
            Ok(())
        };
    };

    let Value::Array(items) = raw else {
        return Err(invalid(table, field, expected("a list of integer ids", raw)));
    };

    let ids = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            as_id(item).ok_or_else(|| {
                invalid(table, field, format!("item {}: {}", i, expected("an integer id", item)))
            })
        })
        .collect::<DereferenceResult<Vec<i64>>>()?;

    let embedded = target
        .find_many(&ids)?
        .into_iter()
        .map(|r| Value::Object(r.clone()))
        .collect();

    replace_entry(record, field, field, Value::Array(embedded));
    Ok(())
}

/// Resolve whichever of `field_a`/`field_b` holds an id, stored under `rename_to`
///
/// A field counts as set only if it holds an integer; `null`, lists and other
/// values do not. Both source fields are removed.
pub fn resolve_exclusive(
    record: &mut Record,
    table: TableName,
    field_a: &str,
    table_a: TableView<'_>,
    field_b: &str,
    table_b: TableView<'_>,
    rename_to: &str,
) -> DereferenceResult<()> {
    let id_a = record.get(field_a).and_then(as_id);
    let id_b = record.get(field_b).and_then(as_id);

    let (field, embedded) = match (id_a, id_b) {
        (Some(_), Some(_)) => {
            return Err(DereferenceError::AmbiguousPolymorphicField {
                table,
                field_a: field_a.to_string(),
                field_b: field_b.to_string(),
            });
        }
        (None, None) => {
            return Err(DereferenceError::MissingPolymorphicField {
                table,
                field_a: field_a.to_string(),
                field_b: field_b.to_string(),
            });
        }
        (Some(id), None) => (field_a, table_a.find_one(id)?),
        (None, Some(id)) => (field_b, table_b.find_one(id)?),
    };

    let other = if field == field_a { field_b } else { field_a };
    if rename_to != other {
        ensure_free(record, table, field, rename_to)?;
    }

    let embedded = Value::Object(embedded.clone());
    strip_fields(record, &[other]);
    replace_entry(record, field, rename_to, embedded);
    Ok(())
}

/// Remove bookkeeping keys from a record; absent keys are ignored
pub fn strip_fields(record: &mut Record, keys: &[&str]) {
    if !keys.iter().any(|k| record.contains_key(*k)) {
        return;
    }
    let entries = std::mem::take(record);
    for (key, value) in entries {
        if !keys.contains(&key.as_str()) {
            record.insert(key, value);
        }
    }
}

/// Swap `old_key` for `new_key` holding `value`, keeping its position
fn replace_entry(record: &mut Record, old_key: &str, new_key: &str, value: Value) {
    let entries = std::mem::take(record);
    let mut value = Some(value);
    for (key, existing) in entries {
        if key == old_key {
            if let Some(v) = value.take() {
                record.insert(new_key.to_string(), v);
            }
        } else {
            record.insert(key, existing);
        }
    }
}

/// A renamed reference must not overwrite an unrelated key
fn ensure_free(
    record: &Record,
    table: TableName,
    field: &str,
    rename_to: &str,
) -> DereferenceResult<()> {
    if rename_to != field && record.contains_key(rename_to) {
        return Err(invalid(
            table,
            field,
            format!("target key '{}' is already present", rename_to),
        ));
    }
    Ok(())
}

fn as_id(value: &Value) -> Option<i64> {
    value.as_i64()
}

fn missing(table: TableName, field: &str) -> DereferenceError {
    DereferenceError::MissingField {
        table,
        field: field.to_string(),
    }
}

fn invalid(table: TableName, field: &str, reason: String) -> DereferenceError {
    DereferenceError::InvalidReference {
        table,
        field: field.to_string(),
        reason,
    }
}

fn expected(what: &str, found: &Value) -> String {
    let kind = match found {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a non-integer number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    };
    format!("expected {}, found {}", what, kind)
}
