//! Tests for fetcher services
//!
//! Upstream calls go through `MockUpstreamApi`; pacing is disabled unless a
//! test asserts timing, in which case the tokio clock is paused.


/// Ten-digit identifiers `0000000000`, `0000000001`, ...
pub fn identifiers(count: usize) -> Vec<String> {
    (0..count).map(|n| format!("{n:010}")).collect()
}
