//! Report schemas and the CSV writer

pub mod schema;
pub mod writer;

pub use schema::{ReportKind, ReportSchema, GROUP_SETTINGS_FIELDS};
pub use writer::{write_report, TabularWriter, MISSING_FIELD};
