//! CSV serialization of report rows
//!
//! The header is written as soon as the file is created, so a run that
//! collects nothing still leaves a valid one-line file. Rows are written as
//! they arrive; nothing is held in memory beyond the CSV buffer.

use super::schema::ReportSchema;
use crate::domain::artifact::{ArchiveArtifact, ArtifactName};
use crate::domain::context::ResultExt;
use crate::domain::records::ReportRow;
use crate::domain::result::Result;
use csv::Writer;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Cell value for a column the row has no value for
pub const MISSING_FIELD: &str = "N/A";

const DEFAULT_BUFFER_SIZE: usize = 8192;
const FLUSH_EVERY: u64 = 1000;

/// Streaming CSV writer bound to one report schema
pub struct TabularWriter {
    writer: Writer<BufWriter<File>>,
    name: ArtifactName,
    path: PathBuf,
    schema: ReportSchema,
    rows: u64,
}

impl TabularWriter {
    /// Creates `<dir>/<name>` and writes the header row
    ///
    /// # Errors
    ///
    /// Returns an I/O or CSV error if the directory or file cannot be
    /// created or the header cannot be written.
    pub fn create(dir: impl AsRef<Path>, name: ArtifactName, schema: ReportSchema) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

        let path = dir.join(name.as_str());
        info!(path = %path.display(), columns = schema.width(), "Creating report file");

        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = Writer::from_writer(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file));
        writer.write_record(schema.columns)?;

        Ok(Self {
            writer,
            name,
            path,
            schema,
            rows: 0,
        })
    }

    /// Appends one row in schema column order
    ///
    /// Columns the row does not carry are written as [`MISSING_FIELD`].
    /// Values the row carries are written as-is, empty strings included.
    pub fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        let cells = self
            .schema
            .columns
            .iter()
            .map(|column| row.get(column).unwrap_or(MISSING_FIELD));
        self.writer.write_record(cells)?;
        self.rows += 1;

        if self.rows % FLUSH_EVERY == 0 {
            self.writer.flush()?;
            debug!(rows = self.rows, "Report progress");
        }

        Ok(())
    }

    /// Appends several rows
    pub fn write_rows<'a>(&mut self, rows: impl IntoIterator<Item = &'a ReportRow>) -> Result<()> {
        for row in rows {
            self.write_row(row)?;
        }
        Ok(())
    }

    /// Data rows written so far
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Path of the file being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the file and returns it as an artifact
    pub fn finish(mut self) -> Result<ArchiveArtifact> {
        self.writer.flush()?;
        drop(self.writer);

        let content = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read back {}", self.path.display()))?;

        info!(
            path = %self.path.display(),
            rows = self.rows,
            bytes = content.len(),
            "Report file written"
        );

        Ok(ArchiveArtifact::new(self.name, self.path, content, self.rows))
    }
}

/// Writes a complete report in one call
pub fn write_report(
    dir: impl AsRef<Path>,
    name: ArtifactName,
    schema: ReportSchema,
    rows: &[ReportRow],
) -> Result<ArchiveArtifact> {
    let mut writer = TabularWriter::create(dir, name, schema)?;
    writer.write_rows(rows)?;
    writer.finish()
}
