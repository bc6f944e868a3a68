//! Logical field → literal column resolution.
//!
//! Data vintages spell some columns differently, so each logical field carries a declared
//! vocabulary of lower-case substrings plus the substrings that mark a *different* field
//! (a "broad category" column must never be taken for the fine-grained category).
//! Resolution runs once per load and the result is passed around as [`ResolvedColumns`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::table::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalField {
    District,
    Block,
    BroadCategory,
    SupportCategory,
    SupportType,
    InputCategory,
    Pillar,
    Beneficiaries,
}

/// One row of the vocabulary table.
#[derive(Debug)]
pub struct FieldVocabulary {
    pub field: LogicalField,
    pub canonical: &'static str,
    pub terms: &'static [&'static str],
    pub excludes: &'static [&'static str],
}

impl FieldVocabulary {
    /// Case-insensitive: some term is a substring and no exclude term is.
    pub fn matches(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.terms.iter().any(|t| lower.contains(t))
            && !self.excludes.iter().any(|t| lower.contains(t))
    }
}

pub const VOCABULARY: &[FieldVocabulary] = &[
    FieldVocabulary {
        field: LogicalField::District,
        canonical: "district_name",
        terms: &["district"],
        excludes: &[],
    },
    FieldVocabulary {
        field: LogicalField::Block,
        canonical: "block_name",
        terms: &["block"],
        excludes: &[],
    },
    FieldVocabulary {
        field: LogicalField::BroadCategory,
        canonical: "broad_category",
        terms: &["broad"],
        excludes: &[],
    },
    FieldVocabulary {
        field: LogicalField::SupportCategory,
        canonical: "categoryofsupport",
        terms: &["categoryofsupport", "category_of_support", "category"],
        excludes: &["broad", "input"],
    },
    FieldVocabulary {
        field: LogicalField::SupportType,
        canonical: "typeofsupport",
        terms: &["typeofsupport", "type_of_support", "support_type"],
        excludes: &["category"],
    },
    FieldVocabulary {
        field: LogicalField::InputCategory,
        canonical: "input_category",
        terms: &["input"],
        excludes: &[],
    },
    FieldVocabulary {
        field: LogicalField::Pillar,
        canonical: "pillar",
        terms: &["pillar"],
        excludes: &[],
    },
    FieldVocabulary {
        field: LogicalField::Beneficiaries,
        canonical: "Beneficiary_Count",
        terms: &["beneficiar"],
        excludes: &[],
    },
];

impl LogicalField {
    pub const ALL: [LogicalField; 8] = [
        LogicalField::District,
        LogicalField::Block,
        LogicalField::BroadCategory,
        LogicalField::SupportCategory,
        LogicalField::SupportType,
        LogicalField::InputCategory,
        LogicalField::Pillar,
        LogicalField::Beneficiaries,
    ];

    /// Key used in config files and `--column FIELD=NAME`.
    pub fn key(&self) -> &'static str {
        match self {
            Self::District => "district",
            Self::Block => "block",
            Self::BroadCategory => "broad_category",
            Self::SupportCategory => "support_category",
            Self::SupportType => "support_type",
            Self::InputCategory => "input_category",
            Self::Pillar => "pillar",
            Self::Beneficiaries => "beneficiaries",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn vocabulary(&self) -> &'static FieldVocabulary {
        // VOCABULARY is declared in the same order as ALL
        &VOCABULARY[*self as usize]
    }

    /// The dashboard cannot say anything without these.
    pub fn is_essential(&self) -> bool {
        matches!(self, Self::District | Self::Beneficiaries)
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

fn resolve_in(
    names: &[String],
    field: LogicalField,
    override_name: Option<&str>,
) -> Option<String> {
    if let Some(name) = override_name {
        if names.iter().any(|n| n == name) {
            return Some(name.to_string());
        }
        warn!(field = %field, column = name, "configured column not in table, falling back");
    }

    let vocab = field.vocabulary();
    if let Some(exact) = names.iter().find(|n| n.as_str() == vocab.canonical) {
        return Some(exact.clone());
    }

    names.iter().find(|n| vocab.matches(n)).cloned()
}

/// Resolve one logical field against the table's columns.
pub fn resolve(table: &Table, field: LogicalField) -> EngineResult<String> {
    resolve_in(&table.column_names(), field, None)
        .ok_or_else(|| EngineError::column_not_found(field.key()))
}

/// Every logical field resolved once for a loaded table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    columns: BTreeMap<LogicalField, String>,
}

impl ResolvedColumns {
    /// `overrides` maps field keys (see [`LogicalField::key`]) to literal column names.
    pub fn resolve(table: &Table, overrides: &BTreeMap<String, String>) -> Self {
        for key in overrides.keys() {
            if LogicalField::from_key(key).is_none() {
                warn!(field = key.as_str(), "ignoring override for unknown field");
            }
        }

        let names = table.column_names();
        let mut columns = BTreeMap::new();
        for field in LogicalField::ALL {
            let override_name = overrides.get(field.key()).map(String::as_str);
            match resolve_in(&names, field, override_name) {
                Some(column) => {
                    debug!(field = %field, column = column.as_str(), "resolved column");
                    columns.insert(field, column);
                }
                None => warn!(field = %field, "no column found"),
            }
        }
        Self { columns }
    }

    pub fn get(&self, field: LogicalField) -> EngineResult<&str> {
        self.columns
            .get(&field)
            .map(String::as_str)
            .ok_or_else(|| EngineError::column_not_found(field.key()))
    }

    pub fn is_resolved(&self, field: LogicalField) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn missing(&self) -> Vec<LogicalField> {
        LogicalField::ALL
            .into_iter()
            .filter(|f| !self.is_resolved(*f))
            .collect()
    }

    /// Fails on the first unresolved essential field.
    pub fn require_essential(&self) -> EngineResult<()> {
        for field in LogicalField::ALL.into_iter().filter(LogicalField::is_essential) {
            self.get(field)?;
        }
        Ok(())
    }
}
