//! Merge of a candidate with its enrichment card, and the acceptance filter
//!
//! Precedence is a per-field table: the card is authoritative for headcount
//! and revenue, while descriptive fields the search already filled are kept.

use shared::{CandidateRecord, EnrichmentCard};

/// How a card value combines with the candidate's existing value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Card value always replaces the candidate value
    CardWins,
    /// Card value only fills an empty candidate value
    FillEmpty,
}

/// Fields an enrichment card can contribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeField {
    Employees,
    CategoryCode,
    Region,
    Contacts,
    RevenueYear,
    RevenueAmount,
}

pub const MERGE_RULES: &[(MergeField, Precedence)] = &[
    (MergeField::Employees, Precedence::CardWins),
    (MergeField::CategoryCode, Precedence::FillEmpty),
    (MergeField::Region, Precedence::FillEmpty),
    (MergeField::Contacts, Precedence::FillEmpty),
    (MergeField::RevenueYear, Precedence::CardWins),
    (MergeField::RevenueAmount, Precedence::CardWins),
];

fn merge_text(target: &mut String, value: &str, precedence: Precedence) {
    let value = value.trim();
    match precedence {
        Precedence::CardWins => *target = value.to_string(),
        Precedence::FillEmpty if target.trim().is_empty() => *target = value.to_string(),
        Precedence::FillEmpty => {}
    }
}

/// Apply [`MERGE_RULES`] and retag the source as `<source>+<strategy_tag>`
pub fn apply_card(candidate: &mut CandidateRecord, card: &EnrichmentCard, strategy_tag: &str) {
    for (field, precedence) in MERGE_RULES {
        match field {
            MergeField::Employees => match precedence {
                Precedence::CardWins => candidate.employees = card.employees,
                Precedence::FillEmpty if candidate.employees == 0 => candidate.employees = card.employees,
                Precedence::FillEmpty => {}
            },
            MergeField::CategoryCode => merge_text(&mut candidate.category_code, &card.category_code, *precedence),
            MergeField::Region => merge_text(&mut candidate.region, &card.region, *precedence),
            MergeField::Contacts => merge_text(&mut candidate.contacts, &card.contacts, *precedence),
            MergeField::RevenueYear => merge_text(&mut candidate.revenue_year, &card.revenue_year, *precedence),
            MergeField::RevenueAmount => {
                merge_text(&mut candidate.revenue_amount, &card.revenue_amount, *precedence)
            }
        }
    }
    candidate.source = format!("{}+{}", candidate.source, strategy_tag);
}

/// Why a merged candidate was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    EmployeesOutOfRange { employees: u64 },
    CategoryNotAllowed { category_code: String },
}

/// Business rules a merged row must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptanceFilter {
    pub min_employees: u64,
    pub max_employees: u64,
    pub category_prefixes: Vec<String>,
}

impl AcceptanceFilter {
    pub fn new(min_employees: u64, max_employees: u64, category_prefixes: Vec<String>) -> Self {
        Self {
            min_employees,
            max_employees,
            category_prefixes,
        }
    }

    pub fn check(&self, record: &CandidateRecord) -> Result<(), Rejection> {
        if !(self.min_employees..=self.max_employees).contains(&record.employees) {
            return Err(Rejection::EmployeesOutOfRange {
                employees: record.employees,
            });
        }
        let code = record.category_code.trim();
        if !self.category_prefixes.iter().any(|prefix| code.starts_with(prefix.as_str())) {
            return Err(Rejection::CategoryNotAllowed {
                category_code: code.to_string(),
            });
        }
        Ok(())
    }

    pub fn accepts(&self, record: &CandidateRecord) -> bool {
        self.check(record).is_ok()
    }
}

/// Outcome of merging one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum MergeDecision {
    Accepted(CandidateRecord),
    /// No card resolved; the candidate stays eligible for later runs
    NoCard,
    Rejected(Rejection),
}

/// Combines candidates with the cards of one enrichment strategy
#[derive(Debug, Clone)]
pub struct Merger {
    filter: AcceptanceFilter,
    strategy_tag: &'static str,
}

impl Merger {
    pub fn new(filter: AcceptanceFilter, strategy_tag: &'static str) -> Self {
        Self { filter, strategy_tag }
    }

    pub fn merge(&self, mut candidate: CandidateRecord, card: Option<&EnrichmentCard>) -> MergeDecision {
        let Some(card) = card else {
            return MergeDecision::NoCard;
        };

        apply_card(&mut candidate, card, self.strategy_tag);
        match self.filter.check(&candidate) {
            Ok(()) => MergeDecision::Accepted(candidate),
            Err(rejection) => MergeDecision::Rejected(rejection),
        }
    }
}
