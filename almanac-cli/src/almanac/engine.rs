//! Dereferencing engine - resolves tables in dependency order
//!
//! The [`Dereferencer`] owns every loaded table. Resolving a table rebuilds
//! its records from read-only views of its (already resolved) dependencies
//! and commits the new records only if every record succeeded, so a failure
//! never leaves a table half-mutated.

use std::collections::{BTreeMap, BTreeSet};

use super::error::{DereferenceError, DereferenceResult};
use super::graph::DependencyGraph;
use super::lookup::{RecordIndex, TableView};
use super::transform::{resolve_exclusive, resolve_list, resolve_single, strip_fields};
use super::types::{FieldReference, Record, TableName, TablePlan, almanac_plans, record_id};

/// Lifecycle of one table within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Unresolved,
    Resolving,
    Resolved,
}

/// A loaded table and its id index
#[derive(Debug)]
struct TableSlot {
    records: Vec<Record>,
    /// Built from the ids the records carried when loaded
    index: RecordIndex,
    state: TableState,
}

/// Expands foreign-key fields across tables into embedded records
#[derive(Debug)]
pub struct Dereferencer {
    plans: BTreeMap<TableName, TablePlan>,
    graph: DependencyGraph,
    tables: BTreeMap<TableName, TableSlot>,
}

impl Dereferencer {
    /// Create an engine over `tables` using the almanac's resolution plans
    pub fn new(tables: BTreeMap<TableName, Vec<Record>>) -> DereferenceResult<Self> {
        Self::with_plans(tables, almanac_plans())
    }

    /// Create an engine with custom resolution plans
    pub fn with_plans(
        tables: BTreeMap<TableName, Vec<Record>>,
        plans: BTreeMap<TableName, TablePlan>,
    ) -> DereferenceResult<Self> {
        let graph = DependencyGraph::build(plans.values());
        let mut engine = Dereferencer {
            plans,
            graph,
            tables: BTreeMap::new(),
        };

        for (table, records) in tables {
            engine.insert(table, records, TableState::Unresolved)?;
        }

        log::info!(
            "Dereferencer loaded {} tables: {:?}",
            engine.tables.len(),
            engine.tables.keys().map(|t| t.label()).collect::<Vec<_>>()
        );

        Ok(engine)
    }

    /// Supply a table whose records are already dereferenced
    ///
    /// Its dependencies are then neither required nor resolved when a
    /// dependent table is dereferenced.
    pub fn insert_resolved(
        &mut self,
        table: TableName,
        records: Vec<Record>,
    ) -> DereferenceResult<()> {
        self.insert(table, records, TableState::Resolved)
    }

    fn insert(
        &mut self,
        table: TableName,
        records: Vec<Record>,
        state: TableState,
    ) -> DereferenceResult<()> {
        let index = RecordIndex::build(table, &records)?;
        log::debug!("Loaded {} records into {} ({:?})", records.len(), table, state);
        self.tables.insert(
            table,
            TableSlot {
                records,
                index,
                state,
            },
        );
        Ok(())
    }

    /// Current state of a table, `None` if it was not loaded
    pub fn state(&self, table: TableName) -> Option<TableState> {
        self.tables.get(&table).map(|slot| slot.state)
    }

    /// Records of a table in their current shape
    pub fn records(&self, table: TableName) -> Option<&[Record]> {
        self.tables.get(&table).map(|slot| slot.records.as_slice())
    }

    /// Take a table's records out of the engine
    pub fn into_records(mut self, table: TableName) -> DereferenceResult<Vec<Record>> {
        self.tables
            .remove(&table)
            .map(|slot| slot.records)
            .ok_or(DereferenceError::UnknownTable { table })
    }

    /// Fully dereference `root` and every table it depends on, transitively
    ///
    /// Each table is resolved once. Calling this again for a resolved table is
    /// a no-op.
    pub fn dereference(&mut self, root: TableName) -> DereferenceResult<()> {
        let resolved = self.resolved_tables();
        let order = self.graph.resolution_order_excluding(root, &resolved)?;

        if order.is_empty() {
            log::debug!("{} is already resolved", root);
            return Ok(());
        }

        log::info!(
            "Resolving {} via: {}",
            root,
            order.iter().map(|t| t.label()).collect::<Vec<_>>().join(" -> ")
        );

        for table in order {
            self.resolve_table(table)?;
        }
        Ok(())
    }

    /// Dereference every loaded table
    pub fn dereference_all(&mut self) -> DereferenceResult<()> {
        let loaded: Vec<TableName> = self.tables.keys().copied().collect();
        for table in loaded {
            self.dereference(table)?;
        }
        Ok(())
    }

    fn resolved_tables(&self) -> BTreeSet<TableName> {
        self.tables
            .iter()
            .filter(|(_, slot)| slot.state == TableState::Resolved)
            .map(|(table, _)| *table)
            .collect()
    }

    /// Resolve one table whose dependencies are already resolved
    fn resolve_table(&mut self, table: TableName) -> DereferenceResult<()> {
        let slot = self
            .tables
            .get_mut(&table)
            .ok_or(DereferenceError::UnknownTable { table })?;

        match slot.state {
            TableState::Resolved => {
                log::debug!("Skipping {}: already resolved", table);
                return Ok(());
            }
            TableState::Resolving => {
                return Err(DereferenceError::CyclicDependency {
                    tables: vec![table],
                });
            }
            TableState::Unresolved => slot.state = TableState::Resolving,
        }

        let outcome = self.build_records(table);

        // The slot was found above and nothing removes tables in between
        let Some(slot) = self.tables.get_mut(&table) else {
            return Err(DereferenceError::UnknownTable { table });
        };

        match outcome {
            Ok(Some(records)) => {
                log::debug!("Resolved {} records of {}", records.len(), table);
                slot.records = records;
                slot.state = TableState::Resolved;
                Ok(())
            }
            Ok(None) => {
                log::debug!("{} has no references to resolve", table);
                slot.state = TableState::Resolved;
                Ok(())
            }
            Err(e) => {
                log::debug!("Failed to resolve {}: {}", table, e);
                slot.state = TableState::Unresolved;
                Err(e)
            }
        }
    }

    /// Build the resolved records of `table`, or `None` if its plan changes nothing
    fn build_records(&self, table: TableName) -> DereferenceResult<Option<Vec<Record>>> {
        let Some(plan) = self.plans.get(&table) else {
            return Ok(None);
        };
        if plan.references.is_empty() && plan.strip.is_empty() {
            return Ok(None);
        }

        for dependency in plan.dependencies() {
            match self.state(dependency) {
                Some(TableState::Resolved) => {}
                Some(_) => {
                    return Err(DereferenceError::DependencyNotResolved { table, dependency });
                }
                None => return Err(DereferenceError::UnknownTable { table: dependency }),
            }
        }

        let slot = self
            .tables
            .get(&table)
            .ok_or(DereferenceError::UnknownTable { table })?;

        slot.records
            .iter()
            .enumerate()
            .map(|(position, record)| -> DereferenceResult<Record> {
                let mut resolved = record.clone();
                self.apply_plan(plan, &mut resolved).map_err(|e| match record_id(record) {
                    Some(id) => e.in_record(table, id),
                    None => DereferenceError::InvalidRecordId { table, position },
                })?;
                Ok(resolved)
            })
            .collect::<DereferenceResult<Vec<Record>>>()
            .map(Some)
    }

    /// Run every step of `plan` on one record
    fn apply_plan(&self, plan: &TablePlan, record: &mut Record) -> DereferenceResult<()> {
        for reference in &plan.references {
            match reference {
                FieldReference::Single {
                    field,
                    target,
                    rename_to,
                    required,
                } => resolve_single(
                    record,
                    plan.table,
                    field,
                    self.view(*target)?,
                    rename_to,
                    *required,
                )?,
                FieldReference::List {
                    field,
                    target,
                    required,
                } => resolve_list(record, plan.table, field, self.view(*target)?, *required)?,
                FieldReference::Exclusive {
                    field_a,
                    table_a,
                    field_b,
                    table_b,
                    rename_to,
                } => resolve_exclusive(
                    record,
                    plan.table,
                    field_a,
                    self.view(*table_a)?,
                    field_b,
                    self.view(*table_b)?,
                    rename_to,
                )?,
            }
        }

        strip_fields(record, &plan.strip);
        Ok(())
    }

    fn view(&self, table: TableName) -> DereferenceResult<TableView<'_>> {
        self.tables
            .get(&table)
            .map(|slot| TableView::new(&slot.records, &slot.index))
            .ok_or(DereferenceError::UnknownTable { table })
    }
}
