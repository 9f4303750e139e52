//! Input file locations

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use serde::Deserialize;

use crate::almanac::TableName;

/// Directory holding the referenced tables by default
pub const DEFAULT_INPUT_DIR: &str = "referenced";

/// File name of the metadata object by default
pub const ABOUT_FILE: &str = "about.json";

/// Resolved path of every input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub about: PathBuf,
    tables: BTreeMap<TableName, PathBuf>,
}

impl Default for InputPaths {
    fn default() -> Self {
        Self::in_dir(Path::new(DEFAULT_INPUT_DIR))
    }
}

impl InputPaths {
    /// Every input at its default file name within `dir`
    pub fn in_dir(dir: &Path) -> Self {
        InputPaths {
            about: dir.join(ABOUT_FILE),
            tables: TableName::all_variants()
                .iter()
                .map(|t| (*t, dir.join(t.file_name())))
                .collect(),
        }
    }

    pub fn table(&self, table: TableName) -> &Path {
        // Every table is populated on construction
        &self.tables[&table]
    }

    pub fn set_table(&mut self, table: TableName, path: PathBuf) {
        self.tables.insert(table, path);
    }

    /// Apply every path set in `overrides`
    pub fn apply(&mut self, overrides: &InputOverrides) {
        if let Some(about) = &overrides.about {
            self.about = about.clone();
        }
        for table in TableName::all_variants() {
            if let Some(path) = overrides.table(*table) {
                self.set_table(*table, path.clone());
            }
        }
    }
}

/// Optional input paths, as given on the command line or in a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Args, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputOverrides {
    /// JSON detailing knowledge base metadata
    #[arg(long, global = true, value_name = "FILE")]
    pub about: Option<PathBuf>,

    /// JSON detailing agents
    #[arg(long, global = true, value_name = "FILE")]
    pub agents: Option<PathBuf>,

    /// JSON detailing biomarkers
    #[arg(long, global = true, value_name = "FILE")]
    pub biomarkers: Option<PathBuf>,

    /// JSON detailing codings
    #[arg(long, global = true, value_name = "FILE")]
    pub codings: Option<PathBuf>,

    /// JSON detailing contributions
    #[arg(long, global = true, value_name = "FILE")]
    pub contributions: Option<PathBuf>,

    /// JSON detailing diseases
    #[arg(long, global = true, value_name = "FILE")]
    pub diseases: Option<PathBuf>,

    /// JSON detailing documents
    #[arg(long, global = true, value_name = "FILE")]
    pub documents: Option<PathBuf>,

    /// JSON detailing genes
    #[arg(long, global = true, value_name = "FILE")]
    pub genes: Option<PathBuf>,

    /// JSON detailing indications
    #[arg(long, global = true, value_name = "FILE")]
    pub indications: Option<PathBuf>,

    /// JSON detailing mappings
    #[arg(long, global = true, value_name = "FILE")]
    pub mappings: Option<PathBuf>,

    /// JSON detailing propositions
    #[arg(long, global = true, value_name = "FILE")]
    pub propositions: Option<PathBuf>,

    /// JSON detailing statements
    #[arg(long, global = true, value_name = "FILE")]
    pub statements: Option<PathBuf>,

    /// JSON detailing strengths
    #[arg(long, global = true, value_name = "FILE")]
    pub strengths: Option<PathBuf>,

    /// JSON detailing therapies
    #[arg(long, global = true, value_name = "FILE")]
    pub therapies: Option<PathBuf>,

    /// JSON detailing therapy groups
    #[arg(long, global = true, value_name = "FILE")]
    pub therapy_groups: Option<PathBuf>,
}

impl InputOverrides {
    pub fn table(&self, table: TableName) -> Option<&PathBuf> {
        match table {
            TableName::Agents => self.agents.as_ref(),
            TableName::Biomarkers => self.biomarkers.as_ref(),
            TableName::Codings => self.codings.as_ref(),
            TableName::Contributions => self.contributions.as_ref(),
            TableName::Diseases => self.diseases.as_ref(),
            TableName::Documents => self.documents.as_ref(),
            TableName::Genes => self.genes.as_ref(),
            TableName::Indications => self.indications.as_ref(),
            TableName::Mappings => self.mappings.as_ref(),
            TableName::Propositions => self.propositions.as_ref(),
            TableName::Statements => self.statements.as_ref(),
            TableName::Strengths => self.strengths.as_ref(),
            TableName::Therapies => self.therapies.as_ref(),
            TableName::TherapyGroups => self.therapy_groups.as_ref(),
        }
    }
}
