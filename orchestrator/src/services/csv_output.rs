//! `;`-delimited CSV output with a UTF-8 byte-order mark

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use shared::{stage_info, CandidateRecord, Stage};
use crate::core::{OutputRow, OUTPUT_COLUMNS};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::traits::OutputWriter;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes finalized rows as a spreadsheet-friendly CSV file
pub struct CsvOutputWriter {
    path: PathBuf,
}

impl CsvOutputWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Render rows to CSV bytes: BOM, header, one CRLF-terminated line per row
pub fn render_csv(rows: &[CandidateRecord]) -> OrchestratorResult<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .terminator(csv::Terminator::CRLF)
        .has_headers(false)
        .from_writer(UTF8_BOM.to_vec());

    writer.write_record(OUTPUT_COLUMNS)?;
    for record in rows {
        writer.serialize(OutputRow::from_record(record))?;
    }

    writer
        .into_inner()
        .map_err(|e| OrchestratorError::IoError(e.into_error()))
}

#[async_trait]
impl OutputWriter for CsvOutputWriter {
    async fn write_rows(&self, rows: &[CandidateRecord]) -> OrchestratorResult<usize> {
        let bytes = render_csv(rows)?;

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&self.path, bytes).await?;

        stage_info!(Stage::Output, rows = rows.len(), "Wrote {}", self.path.display());
        Ok(rows.len())
    }
}
