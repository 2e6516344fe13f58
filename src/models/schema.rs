//! Versioned ledger schema reader
//!
//! Two header layouts are in circulation:
//! - `Tracker`: `Date,Time,Company,Position,Resume_File,PDF_File,Status,Notes`
//! - `Pipeline`: `Date,Time,Company,Position,HTML_Path,PDF_Path,Status,Notes`
//!
//! Both normalize into one [`LedgerRow`] shape at load time. The header that
//! was read is kept verbatim so a rewrite reproduces the same columns in the
//! same order; converting to the canonical layout is an explicit migration.

use super::row::LedgerRow;
use super::stage::Stage;
use crate::error::{TrackError, TrackResult};
use std::collections::BTreeMap;

/// Header written for every newly created ledger
pub const CANONICAL_HEADER: [&str; 8] = [
    "Date", "Time", "Company", "Position", "HTML_Path", "PDF_Path", "Status", "Notes",
];

/// Known header layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Legacy layout written by the interactive tracker (`Resume_File`/`PDF_File`)
    Tracker,
    /// Canonical layout written by the conversion pipeline (`HTML_Path`/`PDF_Path`)
    Pipeline,
}

/// Canonical field a header column maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Time,
    Company,
    Position,
    Source,
    Document,
    Status,
    Notes,
}

impl Field {
    fn recognize(column: &str) -> Option<(Field, Option<SchemaVersion>)> {
        let field = match column.trim().to_lowercase().as_str() {
            "date" => (Field::Date, None),
            "time" => (Field::Time, None),
            "company" => (Field::Company, None),
            "position" => (Field::Position, None),
            "resume_file" => (Field::Source, Some(SchemaVersion::Tracker)),
            "html_path" => (Field::Source, Some(SchemaVersion::Pipeline)),
            "pdf_file" => (Field::Document, Some(SchemaVersion::Tracker)),
            "pdf_path" => (Field::Document, Some(SchemaVersion::Pipeline)),
            "status" => (Field::Status, None),
            "notes" => (Field::Notes, None),
            _ => return None,
        };
        Some(field)
    }
}

/// A ledger header resolved against the known layouts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSchema {
    version: SchemaVersion,
    header: Vec<String>,
    fields: Vec<Option<Field>>,
}

impl LedgerSchema {
    /// Schema used when the ledger is created from scratch
    pub fn canonical() -> Self {
        let header = CANONICAL_HEADER.iter().map(|s| s.to_string()).collect();
        Self::pipeline(header)
    }

    /// Resolve a header row. Requires a `Status` column and one document column.
    pub fn from_header(header: Vec<String>) -> TrackResult<Self> {
        let (fields, version) = resolve_columns(&header);
        let has_status = fields.contains(&Some(Field::Status));
        match version {
            Some(version) if has_status => Ok(Self {
                version,
                header,
                fields,
            }),
            _ => Err(TrackError::UnknownSchema(header.join(","))),
        }
    }

    fn pipeline(header: Vec<String>) -> Self {
        let (fields, _) = resolve_columns(&header);
        Self {
            version: SchemaVersion::Pipeline,
            header,
            fields,
        }
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn is_canonical(&self) -> bool {
        self.header.iter().map(String::as_str).eq(CANONICAL_HEADER)
    }

    /// Decode one data record; `line` is the 1-based file line. A status that
    /// matches no stage leaves the row untracked rather than failing the load.
    pub fn decode(&self, record: &csv::StringRecord, line: usize) -> TrackResult<LedgerRow> {
        let mut row = LedgerRow::default();
        let mut extra = BTreeMap::new();
        let mut status = None;

        for (idx, column) in self.header.iter().enumerate() {
            let value = record.get(idx).unwrap_or("").to_string();
            match self.fields[idx] {
                Some(Field::Date) => row.date = value,
                Some(Field::Time) => row.time = value,
                Some(Field::Company) => row.company = value,
                Some(Field::Position) => row.position = value,
                Some(Field::Source) => row.source_path = value,
                Some(Field::Document) => row.document_path = value,
                Some(Field::Notes) => row.notes = value,
                Some(Field::Status) => status = Some(value),
                None => {
                    extra.insert(column.clone(), value);
                }
            }
        }

        let raw = status.unwrap_or_default();
        match Stage::from_status(&raw) {
            Some(stage) => row.stage = stage,
            None => {
                tracing::debug!(status = %raw, line, "unrecognized status, row left untracked");
                row.unrecognized_at = Some(line);
            }
        }
        row.status_raw = raw;
        row.extra = extra;
        row.overflow = record
            .iter()
            .skip(self.header.len())
            .map(str::to_string)
            .collect();
        Ok(row)
    }

    /// Encode a row in this schema's column order, followed by any fields the
    /// row carried past the end of the header
    pub fn encode(&self, row: &LedgerRow) -> Vec<String> {
        let mut fields: Vec<String> = self
            .header
            .iter()
            .zip(&self.fields)
            .map(|(column, field)| match field {
                Some(Field::Date) => row.date.clone(),
                Some(Field::Time) => row.time.clone(),
                Some(Field::Company) => row.company.clone(),
                Some(Field::Position) => row.position.clone(),
                Some(Field::Source) => row.source_path.clone(),
                Some(Field::Document) => row.document_path.clone(),
                Some(Field::Status) => row.status_text().to_string(),
                Some(Field::Notes) => row.notes.clone(),
                None => row.extra.get(column).cloned().unwrap_or_default(),
            })
            .collect();
        fields.extend(row.overflow.iter().cloned());
        fields
    }

    /// Canonical schema that keeps this schema's unrecognized columns at the end
    pub fn migrated(&self) -> Self {
        let mut header: Vec<String> = CANONICAL_HEADER.iter().map(|s| s.to_string()).collect();
        for (column, field) in self.header.iter().zip(&self.fields) {
            if field.is_none() && !header.contains(column) {
                header.push(column.clone());
            }
        }
        Self::pipeline(header)
    }
}

/// Map each column onto a field; the first occurrence of a field wins and later
/// duplicates are carried as unrecognized columns
fn resolve_columns(header: &[String]) -> (Vec<Option<Field>>, Option<SchemaVersion>) {
    let mut fields = Vec::with_capacity(header.len());
    let mut version = None;

    for column in header {
        match Field::recognize(column) {
            Some((field, _)) if fields.contains(&Some(field)) => fields.push(None),
            Some((field, hint)) => {
                if field == Field::Document {
                    version = hint;
                }
                fields.push(Some(field));
            }
            None => fields.push(None),
        }
    }

    (fields, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &str) -> Vec<String> {
        cols.split(',').map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_recognizes_tracker_layout() {
        let schema = LedgerSchema::from_header(header(
            "Date,Time,Company,Position,Resume_File,PDF_File,Status,Notes",
        ))
        .unwrap();
        assert_eq!(schema.version(), SchemaVersion::Tracker);
        assert!(!schema.is_canonical());
    }

    #[test]
    fn test_recognizes_pipeline_layout_case_insensitive() {
        let schema = LedgerSchema::from_header(header("date,TIME,Company,Position,html_path,Pdf_Path,status,Notes"))
            .unwrap();
        assert_eq!(schema.version(), SchemaVersion::Pipeline);
    }

    #[test]
    fn test_rejects_header_without_document_column() {
        let err = LedgerSchema::from_header(header("Date,Company,Status")).unwrap_err();
        assert!(matches!(err, TrackError::UnknownSchema(_)));
    }

    #[test]
    fn test_decode_keeps_extra_columns_in_place() {
        let schema =
            LedgerSchema::from_header(header("Date,PDF_Path,Status,Salary,Notes")).unwrap();
        let record = csv::StringRecord::from(vec![
            "2025-01-02",
            "Resume/To_Apply/resume_acme.pdf",
            "READY",
            "100k",
            "note",
        ]);
        let row = schema.decode(&record, 2).unwrap();
        assert_eq!(row.stage, Stage::Ready);
        assert_eq!(row.extra.get("Salary").map(String::as_str), Some("100k"));
        assert_eq!(schema.encode(&row), vec![
            "2025-01-02",
            "Resume/To_Apply/resume_acme.pdf",
            "READY",
            "100k",
            "note",
        ]);
    }

    #[test]
    fn test_decode_unknown_status_leaves_row_untracked() {
        let schema = LedgerSchema::canonical();
        let record = csv::StringRecord::from(vec!["", "", "", "", "", "x.pdf", "Interview", ""]);
        let row = schema.decode(&record, 7).unwrap();
        assert_eq!(row.known_stage(), None);
        assert_eq!(row.unrecognized_at, Some(7));
        assert_eq!(schema.encode(&row)[6], "Interview");
    }

    #[test]
    fn test_decode_keeps_fields_past_header() {
        let schema = LedgerSchema::canonical();
        let record = csv::StringRecord::from(vec![
            "2025-01-02",
            "09:00:00",
            "Acme",
            "Swe",
            "",
            "Resume/To_Apply/resume_acme-swe.pdf",
            "Ready",
            "met recruiter",
            "will follow up",
        ]);
        let row = schema.decode(&record, 2).unwrap();
        assert_eq!(row.notes, "met recruiter");

        let encoded = schema.encode(&row);
        assert_eq!(encoded.len(), 9);
        assert_eq!(encoded[8], "will follow up");
    }

    #[test]
    fn test_migrated_appends_unknown_columns() {
        let schema = LedgerSchema::from_header(header(
            "Date,Time,Company,Position,Resume_File,PDF_File,Status,Notes,Link",
        ))
        .unwrap();
        let migrated = schema.migrated();
        assert_eq!(migrated.version(), SchemaVersion::Pipeline);
        assert_eq!(migrated.header().last().map(String::as_str), Some("Link"));
        assert_eq!(&migrated.header()[..8], &CANONICAL_HEADER.map(String::from)[..]);
    }
}
