//! Service implementations
//!
//! Real implementations of the storage traits. These handle the actual
//! file I/O.

pub mod csv_output;
pub mod progress_store;

#[cfg(test)]
mod tests;

pub use csv_output::CsvOutputWriter;
pub use progress_store::JsonProgressStore;
