//! Pure fetcher logic: response parsing and request chunking

pub mod parsing;

pub use parsing::{parse_batch_cards, parse_card, parse_detail, parse_search_item, revenue_units};

/// Split identifiers into order-preserving chunks of at most `size`,
/// each joined with commas for one batch lookup
pub fn chunk_identifiers(identifiers: &[String], size: usize) -> Vec<String> {
    identifiers
        .chunks(size.max(1))
        .map(|chunk| chunk.join(","))
        .collect()
}
