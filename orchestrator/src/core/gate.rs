//! Candidate gate: dedup against the checkpoint and within the run, then cap
//!
//! The gate only reads the seen-set. Identifiers become seen when a row is
//! finalized, never here.

use std::collections::HashSet;

use shared::{CandidateRecord, ProgressState};

/// Candidates enriched per run are capped at `target_count * CANDIDATE_MULTIPLIER`
pub const CANDIDATE_MULTIPLIER: usize = 5;

/// Why candidates were dropped at the gate
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GateStats {
    pub already_seen: usize,
    pub duplicates: usize,
    pub missing_identifier: usize,
    /// Discovered candidates never examined because the cap was reached
    pub over_cap: usize,
}

/// Ordered candidates admitted for enrichment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GatedCandidates {
    pub candidates: Vec<CandidateRecord>,
    pub stats: GateStats,
}

impl GatedCandidates {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Identifiers in candidate order, as sent to enrichment
    pub fn identifiers(&self) -> Vec<String> {
        self.candidates
            .iter()
            .map(|candidate| candidate.identifier.clone())
            .collect()
    }
}

/// Admit discovered candidates in order, keeping the first occurrence of each
/// identifier, until `cap` candidates are admitted.
pub fn gate_candidates(discovered: Vec<CandidateRecord>, state: &ProgressState, cap: usize) -> GatedCandidates {
    let total = discovered.len();
    let mut gated = GatedCandidates::default();
    let mut admitted: HashSet<String> = HashSet::new();
    let mut examined = 0;

    for mut candidate in discovered {
        if gated.candidates.len() >= cap {
            break;
        }
        examined += 1;

        let identifier = candidate.identifier.trim().to_string();
        if identifier.is_empty() {
            gated.stats.missing_identifier += 1;
            continue;
        }
        if state.is_seen(&identifier) {
            gated.stats.already_seen += 1;
            continue;
        }
        if !admitted.insert(identifier.clone()) {
            gated.stats.duplicates += 1;
            continue;
        }

        candidate.identifier = identifier;
        gated.candidates.push(candidate);
    }

    gated.stats.over_cap = total - examined;
    gated
}
