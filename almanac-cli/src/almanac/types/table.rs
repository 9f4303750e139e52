//! Table names and record types

use std::fmt;
use std::str::FromStr;

/// One row of a table: a flat, string-keyed JSON object
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Key holding a record's identity within its table
pub const ID_FIELD: &str = "id";

/// The closed set of tables making up the almanac
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableName {
    Agents,
    Biomarkers,
    Codings,
    Contributions,
    Diseases,
    Documents,
    Genes,
    Indications,
    Mappings,
    Propositions,
    Statements,
    Strengths,
    Therapies,
    TherapyGroups,
}

impl TableName {
    /// All tables, in alphabetical order
    pub fn all_variants() -> &'static [TableName] {
        &[
            TableName::Agents,
            TableName::Biomarkers,
            TableName::Codings,
            TableName::Contributions,
            TableName::Diseases,
            TableName::Documents,
            TableName::Genes,
            TableName::Indications,
            TableName::Mappings,
            TableName::Propositions,
            TableName::Statements,
            TableName::Strengths,
            TableName::Therapies,
            TableName::TherapyGroups,
        ]
    }

    /// Snake-case key used in file names and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Agents => "agents",
            TableName::Biomarkers => "biomarkers",
            TableName::Codings => "codings",
            TableName::Contributions => "contributions",
            TableName::Diseases => "diseases",
            TableName::Documents => "documents",
            TableName::Genes => "genes",
            TableName::Indications => "indications",
            TableName::Mappings => "mappings",
            TableName::Propositions => "propositions",
            TableName::Statements => "statements",
            TableName::Strengths => "strengths",
            TableName::Therapies => "therapies",
            TableName::TherapyGroups => "therapy_groups",
        }
    }

    /// Display label used in log and error messages
    pub fn label(&self) -> &'static str {
        match self {
            TableName::Agents => "Agents",
            TableName::Biomarkers => "Biomarkers",
            TableName::Codings => "Codings",
            TableName::Contributions => "Contributions",
            TableName::Diseases => "Diseases",
            TableName::Documents => "Documents",
            TableName::Genes => "Genes",
            TableName::Indications => "Indications",
            TableName::Mappings => "Mappings",
            TableName::Propositions => "Propositions",
            TableName::Statements => "Statements",
            TableName::Strengths => "Strengths",
            TableName::Therapies => "Therapies",
            TableName::TherapyGroups => "TherapyGroups",
        }
    }

    /// Default file name of the referenced table, e.g. `therapy_groups.json`
    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TableName {
    type Err = String;

    /// Accepts the snake-case key, the kebab-case CLI spelling or the label
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        TableName::all_variants()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized || t.label().to_lowercase() == normalized)
            .ok_or_else(|| format!("Unknown table '{}'", s))
    }
}

/// Read a record's integer id, if it has one
pub fn record_id(record: &Record) -> Option<i64> {
    record.get(ID_FIELD).and_then(|v| v.as_i64())
}
