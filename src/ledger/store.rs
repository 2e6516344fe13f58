//! LedgerStore - CSV read, atomic rewrite and append

use crate::config::TrackerConfig;
use crate::error::{TrackError, TrackResult};
use crate::models::{LedgerRow, LedgerSchema};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// In-memory ledger: the header layout it was read with plus rows in file order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    schema: LedgerSchema,
    rows: Vec<LedgerRow>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::empty()
    }
}

impl Ledger {
    /// Empty ledger using the canonical header
    pub fn empty() -> Self {
        Self {
            schema: LedgerSchema::canonical(),
            rows: Vec::new(),
        }
    }

    pub fn new(schema: LedgerSchema, rows: Vec<LedgerRow>) -> Self {
        Self { schema, rows }
    }

    pub fn schema(&self) -> &LedgerSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[LedgerRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [LedgerRow] {
        &mut self.rows
    }

    pub fn push(&mut self, row: LedgerRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of rows whose derived identity equals `identity`
    pub fn find(&self, identity: &str, prefix: &str) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.identity(prefix).as_deref() == Some(identity))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Identities that occur in more than one row, with their counts
    pub fn duplicates(&self, prefix: &str) -> Vec<(String, usize)> {
        let mut counts = std::collections::BTreeMap::new();
        for identity in self.rows.iter().filter_map(|row| row.identity(prefix)) {
            *counts.entry(identity).or_insert(0usize) += 1;
        }
        counts.into_iter().filter(|(_, count)| *count > 1).collect()
    }

    /// Convert to the canonical header and canonical status spelling. Rows
    /// with an unrecognized status keep it. Returns false when there was
    /// nothing to change.
    pub fn migrate(&mut self) -> bool {
        let stale_status = self
            .rows
            .iter()
            .any(|row| matches!(row.known_stage(), Some(stage) if row.status_text() != stage.name()));
        if self.schema.is_canonical() && !stale_status {
            return false;
        }

        self.schema = self.schema.migrated();
        for row in &mut self.rows {
            row.canonicalize_status();
        }
        true
    }
}

/// Reads and writes the ledger file
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(config: &TrackerConfig) -> Self {
        Self::at(config.ledger_path())
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load all rows in file order. Fails with `MissingLedger` when the file
    /// does not exist; an empty file is an empty canonical ledger.
    pub fn load(&self) -> TrackResult<Ledger> {
        let file = self.open()?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let header: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
        if header.iter().all(|h| h.trim().is_empty()) {
            return Ok(Ledger::empty());
        }

        let schema = LedgerSchema::from_header(header)?;
        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(idx + 2);
            rows.push(schema.decode(&record, line)?);
        }

        Ok(Ledger::new(schema, rows))
    }

    /// Like [`load`](Self::load), but a missing ledger is an empty one
    pub fn load_or_empty(&self) -> TrackResult<Ledger> {
        match self.load() {
            Err(TrackError::MissingLedger(_)) => Ok(Ledger::empty()),
            other => other,
        }
    }

    /// Rewrite the whole ledger atomically: temp file in the same directory,
    /// then rename over the previous file
    pub fn save(&self, ledger: &Ledger) -> TrackResult<()> {
        let temp_file = self.prepare(ledger)?;
        temp_file.persist(&self.path)?;
        tracing::debug!(path = %self.path.display(), rows = ledger.len(), "ledger saved");
        Ok(())
    }

    /// First half of [`save`](Self::save): a fully written and synced temp file
    /// that has not yet replaced the ledger
    pub fn prepare(&self, ledger: &Ledger) -> TrackResult<NamedTempFile> {
        let parent = self.parent_dir();
        fs::create_dir_all(&parent)?;

        let mut temp_file = NamedTempFile::new_in(&parent)?;
        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_writer(temp_file.as_file_mut());
            writer.write_record(ledger.schema().header())?;
            for row in ledger.rows() {
                writer.write_record(ledger.schema().encode(row))?;
            }
            writer.flush()?;
        }
        temp_file.as_file().sync_all()?;

        Ok(temp_file)
    }

    /// Add one row without rewriting the file. The complete line (with a
    /// leading newline if the file lacks a trailing one) goes out in a single
    /// write. A missing ledger is created with the canonical header.
    pub fn append(&self, row: &LedgerRow) -> TrackResult<()> {
        let (schema, mut buffer) = match self.read_schema()? {
            Some(schema) => {
                let buffer = if self.ends_without_newline()? {
                    b"\n".to_vec()
                } else {
                    Vec::new()
                };
                (schema, buffer)
            }
            None => {
                let schema = LedgerSchema::canonical();
                let header = encode_record(schema.header())?;
                (schema, header)
            }
        };
        buffer.extend(encode_record(&schema.encode(row))?);

        fs::create_dir_all(self.parent_dir())?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&buffer)?;
        file.sync_data()?;

        tracing::debug!(path = %self.path.display(), "ledger row appended");
        Ok(())
    }

    /// Ledger contents as opaque text
    pub fn raw_text(&self) -> TrackResult<String> {
        let mut content = String::new();
        self.open()?.read_to_string(&mut content)?;
        Ok(content)
    }

    fn open(&self) -> TrackResult<File> {
        File::open(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TrackError::MissingLedger(self.path.clone()),
            _ => TrackError::Io(e),
        })
    }

    fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Schema from the header line only; `None` if the file is missing or empty
    fn read_schema(&self) -> TrackResult<Option<LedgerSchema>> {
        let file = match self.open() {
            Ok(file) => file,
            Err(TrackError::MissingLedger(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut line = String::new();
        BufReader::new(file).read_line(&mut line)?;
        if line.trim().is_empty() {
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(line.as_bytes());
        let header = reader.headers()?.iter().map(|h| h.to_string()).collect();
        LedgerSchema::from_header(header).map(Some)
    }

    fn ends_without_newline(&self) -> TrackResult<bool> {
        let mut file = self.open()?;
        if file.metadata()?.len() == 0 {
            return Ok(false);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut last = [0u8; 1];
        file.read_exact(&mut last)?;
        Ok(last[0] != b'\n')
    }
}

fn encode_record<I, T>(fields: I) -> TrackResult<Vec<u8>>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
    writer.write_record(fields)?;
    writer.into_inner().map_err(|e| TrackError::Io(e.into_error()))
}
