use super::stage::Stage;
use crate::locator::identity_from_path;
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;

/// Placeholder written into file columns by manual entries
pub const MANUAL_ENTRY: &str = "Manual Entry";

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// One ledger record, normalized from whichever header layout it was read with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerRow {
    /// Insertion date (`%Y-%m-%d`), never rewritten
    pub date: String,
    /// Insertion time (`%H:%M:%S`), never rewritten
    pub time: String,
    pub company: String,
    pub position: String,
    /// Draft/source document column (`Resume_File` or `HTML_Path`); the
    /// location column for drafted rows
    pub source_path: String,
    /// Final document, relative to the project root (`PDF_File` or `PDF_Path`)
    pub document_path: String,
    /// Meaningless when the status is unrecognized, see [`known_stage`](Self::known_stage)
    pub stage: Stage,
    /// Status text as read; rewritten only when the stage changes
    pub(crate) status_raw: String,
    /// Ledger line of a row whose status matches no stage. Such rows are
    /// carried verbatim and never transitioned.
    pub(crate) unrecognized_at: Option<usize>,
    pub notes: String,
    /// Columns outside the known layouts, keyed by header name
    pub extra: BTreeMap<String, String>,
    /// Fields past the end of the header, written back as read
    pub(crate) overflow: Vec<String>,
}

impl LedgerRow {
    /// Create a row stamped with the current local date and time. `path` lands
    /// in the location column for `stage`.
    pub fn new(
        company: impl Into<String>,
        position: impl Into<String>,
        path: impl Into<String>,
        stage: Stage,
    ) -> Self {
        let now = Local::now();
        let mut row = Self {
            date: now.format(DATE_FORMAT).to_string(),
            time: now.format(TIME_FORMAT).to_string(),
            company: company.into(),
            position: position.into(),
            stage,
            status_raw: stage.name().to_string(),
            ..Default::default()
        };
        *row.stage_path_mut(stage) = path.into();
        row
    }

    pub fn with_source(mut self, source_path: impl Into<String>) -> Self {
        self.source_path = source_path.into();
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Stage, or `None` when the status cell holds something else
    /// (`Interview`, `Rejected`, ...)
    pub fn known_stage(&self) -> Option<Stage> {
        match self.unrecognized_at {
            Some(_) => None,
            None => Some(self.stage),
        }
    }

    /// Status text written back to the ledger
    pub fn status_text(&self) -> &str {
        if self.status_raw.is_empty() && self.unrecognized_at.is_none() {
            self.stage.name()
        } else {
            &self.status_raw
        }
    }

    /// Column recording the artifact location for `stage`: drafts live in the
    /// source column, every later stage in the document column
    pub fn stage_path(&self, stage: Stage) -> &str {
        match stage {
            Stage::Drafted => &self.source_path,
            _ => &self.document_path,
        }
    }

    fn stage_path_mut(&mut self, stage: Stage) -> &mut String {
        match stage {
            Stage::Drafted => &mut self.source_path,
            _ => &mut self.document_path,
        }
    }

    /// Move the row to a new stage and location. The status cell keeps its
    /// spelling when the stage does not change.
    pub fn set_stage(&mut self, stage: Stage, path: impl Into<String>) {
        if self.known_stage() != Some(stage) {
            self.status_raw = stage.name().to_string();
        }
        self.stage = stage;
        self.unrecognized_at = None;
        *self.stage_path_mut(stage) = path.into();
    }

    /// Rewrite the status cell in its canonical spelling; unrecognized
    /// statuses are left alone
    pub fn canonicalize_status(&mut self) {
        if self.unrecognized_at.is_none() {
            self.status_raw = self.stage.name().to_string();
        }
    }

    /// Artifact identity derived from the document file's base name, falling
    /// back to the source file; manual entries have none
    pub fn identity(&self, prefix: &str) -> Option<String> {
        [&self.document_path, &self.source_path]
            .into_iter()
            .filter(|p| !p.trim().is_empty() && p.trim() != MANUAL_ENTRY)
            .find_map(|p| identity_from_path(p, prefix))
    }

    pub fn created_at(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()?;
        let time = NaiveTime::parse_from_str(self.time.trim(), TIME_FORMAT)
            .unwrap_or(NaiveTime::MIN);
        Some(date.and_time(time))
    }
}

impl Serialize for LedgerRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LedgerRow", 10)?;
        state.serialize_field("date", &self.date)?;
        state.serialize_field("time", &self.time)?;
        state.serialize_field("company", &self.company)?;
        state.serialize_field("position", &self.position)?;
        state.serialize_field("source_path", &self.source_path)?;
        state.serialize_field("document_path", &self.document_path)?;
        state.serialize_field("stage", &self.known_stage())?;
        state.serialize_field("status", self.status_text())?;
        state.serialize_field("notes", &self.notes)?;
        if self.extra.is_empty() {
            state.skip_field("extra")?;
        } else {
            state.serialize_field("extra", &self.extra)?;
        }
        state.end()
    }
}

/// Split a label such as `acme-senior-swe` into company and position, the way
/// rows produced by the conversion job are labelled
pub fn company_and_position(identity: &str) -> (String, String) {
    let words: Vec<String> = identity
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();

    match words.split_first() {
        Some((company, rest)) if !rest.is_empty() => (company.clone(), rest.join(" ")),
        Some((company, _)) => (company.clone(), "Unknown Position".to_string()),
        None => (String::new(), "Unknown Position".to_string()),
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
