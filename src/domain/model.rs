use indexmap::IndexMap;
use std::path::PathBuf;

/// One CSV line: column name to cell text, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub data: IndexMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Trimmed cell value, `None` when the column is missing or blank.
    pub fn get_trimmed(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// What the pipeline does with an input row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Needs a detail request before it can be written.
    Fetch,
    /// Goes straight to the output, after `pass_through`.
    PassThrough,
    /// Dropped from further processing.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Truncate and write a fresh header.
    Overwrite,
    /// Write a header only when the file is new or empty, otherwise append
    /// after checking that the existing header matches.
    CreateOrAppend,
}

/// Where a job's rows end up, relative to the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub file: String,
    pub mode: WriteMode,
}

impl OutputTarget {
    pub fn overwrite(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            mode: WriteMode::Overwrite,
        }
    }

    pub fn create_or_append(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            mode: WriteMode::CreateOrAppend,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub path: PathBuf,
    pub rows_written: usize,
    pub header_written: bool,
}
