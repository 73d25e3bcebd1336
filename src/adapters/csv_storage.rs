use crate::domain::model::{Row, WriteMode, WriteOutcome};
use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use indexmap::IndexSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// CSV files under a base directory. Absolute paths bypass the base.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_rows(&self, path: &str) -> Result<Vec<Row>> {
        let full_path = self.resolve(path);
        if !full_path.is_file() {
            return Err(EtlError::FileNotFoundError {
                path: full_path.display().to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&full_path)?;
        let headers = reader.headers()?.clone();

        let mut rows: Vec<Row> = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(headers.iter().zip(record.iter()).collect());
        }

        tracing::debug!("📂 Read {} rows from {}", rows.len(), full_path.display());
        Ok(rows)
    }

    async fn write_rows(&self, path: &str, rows: &[Row], mode: WriteMode) -> Result<WriteOutcome> {
        let full_path = self.resolve(path);
        if rows.is_empty() {
            return Ok(WriteOutcome {
                path: full_path,
                rows_written: 0,
                header_written: false,
            });
        }

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let columns = column_union(rows);
        let existing = match mode {
            WriteMode::Overwrite => None,
            WriteMode::CreateOrAppend => read_header(&full_path)?,
        };

        if let Some(existing) = &existing {
            if !existing.iter().map(String::as_str).eq(columns.iter().copied()) {
                return Err(EtlError::ColumnMismatchError {
                    path: full_path.display().to_string(),
                    existing: existing.join(", "),
                    incoming: columns.iter().copied().collect::<Vec<_>>().join(", "),
                });
            }
        }

        let header_written = existing.is_none();
        let file = if header_written {
            File::create(&full_path)?
        } else {
            OpenOptions::new().append(true).open(&full_path)?
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if header_written {
            writer.write_record(columns.iter().copied())?;
        }
        for row in rows {
            writer.write_record(columns.iter().map(|column| row.get(column).unwrap_or("")))?;
        }
        writer.flush()?;

        tracing::debug!(
            "💾 {} {} rows to {}",
            if header_written { "Wrote" } else { "Appended" },
            rows.len(),
            full_path.display()
        );

        Ok(WriteOutcome {
            path: full_path,
            rows_written: rows.len(),
            header_written,
        })
    }

    async fn remove_file(&self, path: &str) -> Result<bool> {
        let full_path = self.resolve(path);
        if !full_path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&full_path)?;
        tracing::debug!("🗑️ Removed {}", full_path.display());
        Ok(true)
    }
}

/// Every column used by the batch, first row's columns first.
fn column_union(rows: &[Row]) -> IndexSet<&str> {
    rows.iter().flat_map(|row| row.columns()).collect()
}

/// Header of an existing file; `None` when the file is missing or empty.
fn read_header(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.is_file() || fs::metadata(path)?.len() == 0 {
        return Ok(None);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut record = csv::StringRecord::new();
    if !reader.read_record(&mut record)? {
        return Ok(None);
    }
    Ok(Some(record.iter().map(str::to_string).collect()))
}
