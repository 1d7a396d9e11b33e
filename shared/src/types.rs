//! Core shared record types

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use crate::extract::{int_of, text_of};

/// A discovered company, enriched and filtered on its way to becoming a
/// finalized row.
///
/// Serialized field names match the checkpoint file written by earlier runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateRecord {
    /// Registration number (INN), the stable identity across runs
    #[serde(rename = "inn", deserialize_with = "lenient_text")]
    pub identifier: String,
    #[serde(deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(deserialize_with = "lenient_count")]
    pub employees: u64,
    /// OKVED activity code
    #[serde(rename = "okved_main", deserialize_with = "lenient_text")]
    pub category_code: String,
    #[serde(deserialize_with = "lenient_text")]
    pub source: String,
    #[serde(deserialize_with = "lenient_text")]
    pub revenue_year: String,
    /// Whole currency units as decimal digits, or empty
    #[serde(rename = "revenue", deserialize_with = "lenient_text")]
    pub revenue_amount: String,
    #[serde(deserialize_with = "lenient_text")]
    pub site: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(deserialize_with = "lenient_text")]
    pub region: String,
    /// Free-text blob, comma separated phones/emails/sites
    #[serde(deserialize_with = "lenient_text")]
    pub contacts: String,
}

/// Null or an unexpected type reads as empty text; numbers keep their digits
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(text_of(&Value::deserialize(deserializer)?))
}

/// Null or unparsable counts read as zero
fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(int_of(&Value::deserialize(deserializer)?, 0))
}

impl CandidateRecord {
    pub fn new(identifier: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Attributes resolved for one identifier by an enrichment strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentCard {
    pub identifier: String,
    pub employees: u64,
    pub category_code: String,
    pub region: String,
    pub contacts: String,
    pub revenue_year: String,
    pub revenue_amount: String,
}

impl From<&CandidateRecord> for EnrichmentCard {
    fn from(record: &CandidateRecord) -> Self {
        Self {
            identifier: record.identifier.clone(),
            employees: record.employees,
            category_code: record.category_code.clone(),
            region: record.region.clone(),
            contacts: record.contacts.clone(),
            revenue_year: record.revenue_year.clone(),
            revenue_amount: record.revenue_amount.clone(),
        }
    }
}

/// Resumable checkpoint: identifiers already finalized plus their rows.
///
/// `seen` holds an identifier exactly when `rows` holds one row for it, and
/// `seen` never shrinks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    #[serde(rename = "seen_inn")]
    seen: BTreeSet<String>,
    rows: Vec<CandidateRecord>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from persisted parts, restoring the seen/rows pairing.
    ///
    /// Rows whose identifier already appeared earlier are dropped and any
    /// row identifier missing from `seen` is added. Returns the state and the
    /// number of repairs made.
    pub fn from_parts(seen: BTreeSet<String>, rows: Vec<CandidateRecord>) -> (Self, usize) {
        let mut repairs = 0;
        let mut state = Self {
            seen,
            rows: Vec::with_capacity(rows.len()),
        };
        let mut kept = BTreeSet::new();

        for row in rows {
            if !kept.insert(row.identifier.clone()) {
                repairs += 1;
                continue;
            }
            if state.seen.insert(row.identifier.clone()) {
                repairs += 1;
            }
            state.rows.push(row);
        }

        (state, repairs)
    }

    pub fn is_seen(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    /// Commit an accepted record. Returns false, leaving the state untouched,
    /// when the identifier was finalized before.
    pub fn finalize(&mut self, record: CandidateRecord) -> bool {
        if !self.seen.insert(record.identifier.clone()) {
            return false;
        }
        self.rows.push(record);
        true
    }

    pub fn seen(&self) -> &BTreeSet<String> {
        &self.seen
    }

    pub fn rows(&self) -> &[CandidateRecord] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

/// Pipeline stage, attached to every log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Run,
    Search,
    Gate,
    Enrich,
    Merge,
    Checkpoint,
    Output,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Run => "run",
            Stage::Search => "search",
            Stage::Gate => "gate",
            Stage::Enrich => "enrich",
            Stage::Merge => "merge",
            Stage::Checkpoint => "checkpoint",
            Stage::Output => "output",
        };
        write!(f, "{name}")
    }
}
