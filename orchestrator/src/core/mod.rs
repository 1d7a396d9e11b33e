//! Core business logic modules
//!
//! Pure functions over candidates, cards and the progress state; no I/O.

pub mod gate;
pub mod merger;
pub mod normalizer;

pub use gate::{gate_candidates, GateStats, GatedCandidates, CANDIDATE_MULTIPLIER};
pub use merger::{apply_card, AcceptanceFilter, MergeDecision, Merger, Rejection};
pub use normalizer::{clean_text, split_contacts, ContactFields, OutputRow, OUTPUT_COLUMNS};
