//! Dependency graph between tables
//!
//! This module provides functions to:
//! - Build the graph from the tables' resolution plans
//! - Topologically sort it so dependencies resolve before their dependents
//! - Restrict the order to the subgraph reachable from one root table

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::error::{DereferenceError, DereferenceResult};
use super::types::{TableName, TablePlan};

/// Dependency graph for a set of tables
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Adjacency list: table -> tables it references
    dependencies: BTreeMap<TableName, BTreeSet<TableName>>,
    /// Reverse adjacency: table -> tables that reference it
    dependents: BTreeMap<TableName, BTreeSet<TableName>>,
}

impl DependencyGraph {
    /// Build the graph from resolution plans
    ///
    /// A referenced table without a plan of its own is added as a leaf.
    pub fn build<'a>(plans: impl IntoIterator<Item = &'a TablePlan>) -> Self {
        let mut graph = DependencyGraph::default();

        for plan in plans {
            let deps = plan.dependencies();
            for dep in &deps {
                graph.dependencies.entry(*dep).or_default();
                graph.dependents.entry(*dep).or_default().insert(plan.table);
            }
            graph.dependencies.entry(plan.table).or_default().extend(deps);
            graph.dependents.entry(plan.table).or_default();
        }

        graph
    }

    /// All tables in the graph
    pub fn tables(&self) -> impl Iterator<Item = TableName> + '_ {
        self.dependencies.keys().copied()
    }

    /// Tables `table` references directly
    pub fn dependencies_of(&self, table: TableName) -> BTreeSet<TableName> {
        self.dependencies.get(&table).cloned().unwrap_or_default()
    }

    /// `table` plus everything it depends on, transitively
    pub fn reachable_from(&self, table: TableName) -> BTreeSet<TableName> {
        self.reachable_excluding(table, &BTreeSet::new())
    }

    /// Like [`reachable_from`](Self::reachable_from), but never enters a table in `stop`
    fn reachable_excluding(
        &self,
        table: TableName,
        stop: &BTreeSet<TableName>,
    ) -> BTreeSet<TableName> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![table];

        while let Some(current) = stack.pop() {
            if stop.contains(&current) || !seen.insert(current) {
                continue;
            }
            if let Some(deps) = self.dependencies.get(&current) {
                stack.extend(deps.iter().copied());
            }
        }

        seen
    }

    /// Perform topological sort using Kahn's algorithm
    /// Returns every table in resolution order (dependencies first)
    pub fn topological_sort(&self) -> DereferenceResult<Vec<TableName>> {
        let all: BTreeSet<TableName> = self.tables().collect();
        self.sort_subset(&all)
    }

    /// Resolution order for `root` and everything it depends on
    pub fn resolution_order(&self, root: TableName) -> DereferenceResult<Vec<TableName>> {
        let reachable = self.reachable_from(root);
        self.sort_subset(&reachable)
    }

    /// Resolution order for `root`, treating the tables in `resolved` as done
    ///
    /// Dependencies reachable only through an already-resolved table are left
    /// out, so a caller that supplies a pre-resolved table does not need to
    /// supply what that table was built from.
    pub fn resolution_order_excluding(
        &self,
        root: TableName,
        resolved: &BTreeSet<TableName>,
    ) -> DereferenceResult<Vec<TableName>> {
        let reachable = self.reachable_excluding(root, resolved);
        self.sort_subset(&reachable)
    }

    /// Kahn's algorithm restricted to `subset`, ties broken by table name
    fn sort_subset(&self, subset: &BTreeSet<TableName>) -> DereferenceResult<Vec<TableName>> {
        // in-degree = number of unresolved dependencies inside the subset
        let mut in_degree: BTreeMap<TableName, usize> = subset
            .iter()
            .map(|t| {
                let count = self
                    .dependencies
                    .get(t)
                    .map(|deps| deps.iter().filter(|d| subset.contains(d)).count())
                    .unwrap_or(0);
                (*t, count)
            })
            .collect();

        // Start with tables that have no dependencies
        let mut queue: VecDeque<TableName> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(t, _)| *t)
            .collect();

        let mut result = Vec::with_capacity(subset.len());

        while let Some(table) = queue.pop_front() {
            result.push(table);

            // For each table that depends on this one, decrease its in-degree
            if let Some(dependents) = self.dependents.get(&table) {
                for dependent in dependents {
                    if let Some(count) = in_degree.get_mut(dependent) {
                        *count -= 1;
                        if *count == 0 {
                            queue.push_back(*dependent);
                        }
                    }
                }
            }
        }

        if result.len() != subset.len() {
            let remaining: Vec<TableName> = subset
                .iter()
                .filter(|t| !result.contains(t))
                .copied()
                .collect();
            return Err(DereferenceError::CyclicDependency { tables: remaining });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::almanac::types::{FieldReference, almanac_plans};

    fn position(order: &[TableName], table: TableName) -> usize {
        order.iter().position(|t| *t == table).unwrap()
    }

    #[test]
    fn test_full_order_respects_every_edge() {
        let plans = almanac_plans();
        let graph = DependencyGraph::build(plans.values());
        let order = graph.topological_sort().unwrap();

        assert_eq!(order.len(), TableName::all_variants().len());
        for plan in plans.values() {
            for dep in plan.dependencies() {
                assert!(
                    position(&order, dep) < position(&order, plan.table),
                    "{} must come before {}",
                    dep,
                    plan.table
                );
            }
        }
        assert_eq!(order.last(), Some(&TableName::Statements));
    }

    #[test]
    fn test_resolution_order_is_limited_to_reachable_tables() {
        let plans = almanac_plans();
        let graph = DependencyGraph::build(plans.values());

        let order = graph.resolution_order(TableName::Indications).unwrap();
        assert_eq!(
            order,
            vec![TableName::Agents, TableName::Documents, TableName::Indications]
        );
    }

    #[test]
    fn test_leaf_order_is_just_the_leaf() {
        let graph = DependencyGraph::build(almanac_plans().values());
        assert_eq!(
            graph.resolution_order(TableName::Codings).unwrap(),
            vec![TableName::Codings]
        );
    }

    #[test]
    fn test_order_is_deterministic() {
        let plans = almanac_plans();
        let first = DependencyGraph::build(plans.values()).topological_sort().unwrap();
        let second = DependencyGraph::build(plans.values()).topological_sort().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycle_detected() {
        let plans = vec![
            TablePlan::new(
                TableName::Agents,
                vec![FieldReference::single("document_id", TableName::Documents, "document")],
            ),
            TablePlan::new(
                TableName::Documents,
                vec![FieldReference::single("agent_id", TableName::Agents, "organization")],
            ),
            TablePlan::leaf(TableName::Codings),
        ];
        let graph = DependencyGraph::build(plans.iter());

        let err = graph.topological_sort().unwrap_err();
        assert_eq!(
            err,
            DereferenceError::CyclicDependency {
                tables: vec![TableName::Agents, TableName::Documents]
            }
        );

        // The acyclic part of the graph is still usable
        assert_eq!(
            graph.resolution_order(TableName::Codings).unwrap(),
            vec![TableName::Codings]
        );
    }

    #[test]
    fn test_resolution_order_excluding_resolved_tables() {
        let graph = DependencyGraph::build(almanac_plans().values());
        let resolved: BTreeSet<_> = [TableName::Documents].into_iter().collect();

        // Agents is only reachable through Documents
        assert_eq!(
            graph
                .resolution_order_excluding(TableName::Indications, &resolved)
                .unwrap(),
            vec![TableName::Indications]
        );

        let resolved: BTreeSet<_> = [TableName::Indications].into_iter().collect();
        assert!(graph
            .resolution_order_excluding(TableName::Indications, &resolved)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let plans = vec![TablePlan::new(
            TableName::Genes,
            vec![FieldReference::list("genes", TableName::Genes)],
        )];
        let graph = DependencyGraph::build(plans.iter());

        assert!(matches!(
            graph.resolution_order(TableName::Genes),
            Err(DereferenceError::CyclicDependency { .. })
        ));
    }
}
