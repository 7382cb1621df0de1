//! CSV [`DatasetSink`]: one file per dataset, header row first.

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::OutputConfig;
use crate::contract::{DatasetSink, WriteReport};
use crate::error::SinkError;
use crate::project::{RepositoryRecord, UserRecord};

pub struct CsvSink {
    users: PathBuf,
    repositories: PathBuf,
    delimiter: u8,
}

impl CsvSink {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            users: output.users.clone(),
            repositories: output.repositories.clone(),
            delimiter: output.delimiter,
        }
    }
}

impl DatasetSink for CsvSink {
    fn write(
        &self,
        users: &[UserRecord],
        repositories: &[RepositoryRecord],
    ) -> Result<WriteReport, SinkError> {
        write_table(&self.users, "users", self.delimiter, &UserRecord::COLUMNS, users)?;
        write_table(
            &self.repositories,
            "repositories",
            self.delimiter,
            &RepositoryRecord::COLUMNS,
            repositories,
        )?;

        Ok(WriteReport {
            users_path: self.users.clone(),
            users_written: users.len(),
            repositories_path: self.repositories.clone(),
            repositories_written: repositories.len(),
        })
    }
}

/// Overwrite `path` with a header row and one row per record.
///
/// The header is written explicitly so an empty dataset still gets one.
fn write_table<R: Serialize>(
    path: &Path,
    dataset: &'static str,
    delimiter: u8,
    columns: &[&str],
    rows: &[R],
) -> Result<(), SinkError> {
    let csv_err = |source: csv::Error| {
        error!(dataset, path = %path.display(), error = %source, "Failed to write dataset");
        SinkError::Csv {
            dataset,
            path: path.to_path_buf(),
            source,
        }
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;

    writer.write_record(columns).map_err(csv_err)?;
    for row in rows {
        writer.serialize(row).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| {
        error!(dataset, path = %path.display(), error = %source, "Failed to flush dataset");
        SinkError::Io {
            dataset,
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!(dataset, rows = rows.len(), path = %path.display(), "Wrote dataset");
    Ok(())
}
