//! Copy indication descriptions onto their statements

use crate::almanac::lookup::{RecordIndex, TableView};
use crate::almanac::{DereferenceError, DereferenceResult, Record, TableName};

const INDICATION_FIELD: &str = "indication_id";
const DESCRIPTION_FIELD: &str = "description";

/// Set each statement's `description` to that of its indication
///
/// Statements without an integer `indication_id`, or whose indication does
/// not exist, are left as they are. Returns the number of statements updated.
pub fn populate_descriptions(
    statements: &mut [Record],
    indications: &[Record],
) -> DereferenceResult<usize> {
    let index = RecordIndex::build(TableName::Indications, indications)?;
    let view = TableView::new(indications, &index);
    let mut updated = 0;

    for statement in statements.iter_mut() {
        let Some(id) = statement.get(INDICATION_FIELD).and_then(|v| v.as_i64()) else {
            continue;
        };

        let indication = match view.find_one(id) {
            Ok(indication) => indication,
            Err(DereferenceError::NotFound { .. }) => {
                log::warn!("Statement references missing indication {}; skipping", id);
                continue;
            }
            Err(e) => return Err(e),
        };

        let description = indication
            .get(DESCRIPTION_FIELD)
            .ok_or_else(|| DereferenceError::MissingField {
                table: TableName::Indications,
                field: DESCRIPTION_FIELD.to_string(),
            })
            .map_err(|e| e.in_record(TableName::Indications, id))?;

        statement.insert(DESCRIPTION_FIELD.to_string(), description.clone());
        updated += 1;
    }

    log::info!("Populated descriptions on {} of {} statements", updated, statements.len());
    Ok(updated)
}
