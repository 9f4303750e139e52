//! Per-table resolution plans
//!
//! A plan describes which fields of a table reference which other tables and
//! how each reference is embedded. One generic driver
//! ([`crate::almanac::Dereferencer`]) interprets every plan.

use std::collections::{BTreeMap, BTreeSet};

use super::table::{ID_FIELD, TableName};

/// One foreign-key field and how it is replaced by the record(s) it references
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldReference {
    /// `field` holds one id; the record is embedded under `rename_to`
    Single {
        field: &'static str,
        target: TableName,
        rename_to: &'static str,
        required: bool,
    },
    /// `field` holds a list of ids; replaced in place by the records
    List {
        field: &'static str,
        target: TableName,
        required: bool,
    },
    /// Exactly one of `field_a`/`field_b` holds an id; embedded under `rename_to`
    Exclusive {
        field_a: &'static str,
        table_a: TableName,
        field_b: &'static str,
        table_b: TableName,
        rename_to: &'static str,
    },
}

impl FieldReference {
    /// Required single reference, renamed
    pub fn single(field: &'static str, target: TableName, rename_to: &'static str) -> Self {
        FieldReference::Single {
            field,
            target,
            rename_to,
            required: true,
        }
    }

    /// Required list reference
    pub fn list(field: &'static str, target: TableName) -> Self {
        FieldReference::List {
            field,
            target,
            required: true,
        }
    }

    /// List reference that may be absent from a record
    pub fn optional_list(field: &'static str, target: TableName) -> Self {
        FieldReference::List {
            field,
            target,
            required: false,
        }
    }

    /// Tables this reference resolves against
    pub fn targets(&self) -> Vec<TableName> {
        match self {
            FieldReference::Single { target, .. } | FieldReference::List { target, .. } => {
                vec![*target]
            }
            FieldReference::Exclusive {
                table_a, table_b, ..
            } => vec![*table_a, *table_b],
        }
    }

    /// Raw fields this reference consumes
    pub fn source_fields(&self) -> Vec<&'static str> {
        match self {
            FieldReference::Single { field, .. } | FieldReference::List { field, .. } => {
                vec![*field]
            }
            FieldReference::Exclusive {
                field_a, field_b, ..
            } => vec![*field_a, *field_b],
        }
    }
}

/// Resolution plan for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePlan {
    pub table: TableName,
    /// References, processed in order
    pub references: Vec<FieldReference>,
    /// Bookkeeping keys removed from every record once its references are embedded
    pub strip: Vec<&'static str>,
    /// Dependencies beyond the reference targets
    pub extra_dependencies: Vec<TableName>,
}

impl TablePlan {
    /// A plan with no references (leaf table)
    pub fn leaf(table: TableName) -> Self {
        TablePlan {
            table,
            references: Vec::new(),
            strip: Vec::new(),
            extra_dependencies: Vec::new(),
        }
    }

    pub fn new(table: TableName, references: Vec<FieldReference>) -> Self {
        TablePlan {
            table,
            references,
            strip: Vec::new(),
            extra_dependencies: Vec::new(),
        }
    }

    pub fn stripping(mut self, keys: &[&'static str]) -> Self {
        self.strip.extend_from_slice(keys);
        self
    }

    pub fn depending_on(mut self, tables: &[TableName]) -> Self {
        self.extra_dependencies.extend_from_slice(tables);
        self
    }

    /// Every table that must be fully resolved before this one
    ///
    /// A self-reference is kept and surfaces as a cycle in the graph.
    pub fn dependencies(&self) -> BTreeSet<TableName> {
        self.references
            .iter()
            .flat_map(|r| r.targets())
            .chain(self.extra_dependencies.iter().copied())
            .collect()
    }

    /// Raw foreign-key fields that must be gone after resolution
    pub fn source_fields(&self) -> Vec<&'static str> {
        self.references
            .iter()
            .flat_map(|r| r.source_fields())
            .collect()
    }
}

/// The almanac's plans, keyed by table
pub fn almanac_plans() -> BTreeMap<TableName, TablePlan> {
    use FieldReference as R;
    use TableName::*;

    let plans = vec![
        TablePlan::leaf(Agents),
        TablePlan::new(Biomarkers, vec![R::optional_list("genes", Genes)]),
        TablePlan::leaf(Codings),
        TablePlan::new(
            Contributions,
            vec![R::single("agent_id", Agents, "contributor")],
        ),
        TablePlan::new(
            Diseases,
            vec![
                R::single("primary_coding_id", Codings, "primaryCoding"),
                R::list("mappings", Mappings),
            ],
        ),
        TablePlan::new(
            Documents,
            vec![R::single("agent_id", Agents, "organization")],
        ),
        TablePlan::new(
            Genes,
            vec![
                R::single("primary_coding_id", Codings, "primaryCoding"),
                R::list("mappings", Mappings),
            ],
        ),
        TablePlan::new(
            Indications,
            vec![R::single("document_id", Documents, "document")],
        ),
        TablePlan::new(Mappings, vec![R::single("coding_id", Codings, "coding")])
            .stripping(&[ID_FIELD, "primary_coding_id"]),
        TablePlan::new(
            Propositions,
            vec![
                R::list("biomarkers", Biomarkers),
                R::single("conditionQualifier_id", Diseases, "conditionQualifier"),
                R::Exclusive {
                    field_a: "therapy_id",
                    table_a: Therapies,
                    field_b: "therapy_group_id",
                    table_b: TherapyGroups,
                    rename_to: "objectTherapeutic",
                },
            ],
        ),
        TablePlan::new(
            Statements,
            vec![
                R::list("contributions", Contributions),
                R::list("reportedIn", Documents),
                R::single("indication_id", Indications, "indication"),
                R::single("proposition_id", Propositions, "proposition"),
                R::single("strength_id", Strengths, "strength"),
            ],
        ),
        TablePlan::new(
            Strengths,
            vec![R::single("primary_coding_id", Codings, "primaryCoding")],
        ),
        TablePlan::new(
            Therapies,
            vec![R::single("primary_coding_id", Codings, "primaryCoding")],
        )
        .depending_on(&[Mappings]),
        TablePlan::new(TherapyGroups, vec![R::list("therapies", Therapies)]),
    ];

    plans.into_iter().map(|p| (p.table, p)).collect()
}
