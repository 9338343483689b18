use polars::prelude::*;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

use crate::domain::RosterError;

pub const COLUMN_NAMES: [&str; 5] = ["id", "name", "email", "section", "status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    pub const ALL: [Status; 2] = [Status::Active, Status::Inactive];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Active => f.write_str("Active"),
            Status::Inactive => f.write_str("Inactive"),
        }
    }
}

impl FromStr for Status {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Status::Active),
            "inactive" => Ok(Status::Inactive),
            _ => Err(RosterError::InvalidRecord(format!(
                "unknown status \"{}\"",
                s.trim()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    S3A,
    S3B,
    S3C,
    S3D,
    S3E,
    S3F,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::S3A,
        Section::S3B,
        Section::S3C,
        Section::S3D,
        Section::S3E,
        Section::S3F,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::S3A => "3A",
            Section::S3B => "3B",
            Section::S3C => "3C",
            Section::S3D => "3D",
            Section::S3E => "3E",
            Section::S3F => "3F",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or_else(|| RosterError::InvalidRecord(format!("unknown section \"{}\"", s.trim())))
    }
}

/// One student in the roster. Records never change after they were loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub section: Section,
    pub status: Status,
}

impl Record {
    pub fn new(id: u32, name: &str, email: &str, section: Section, status: Status) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            section,
            status,
        }
    }

    /// `#007` style identifier shown in the table.
    pub fn display_id(&self) -> String {
        format!("#{:03}", self.id)
    }

    pub fn initials(&self) -> String {
        self.name
            .split(' ')
            .filter_map(|part| part.chars().next())
            .collect()
    }

    pub fn to_csv_row(&self) -> String {
        [
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.section.to_string(),
            self.status.to_string(),
        ]
        .iter()
        .map(|cell| wrap_cell_content(cell))
        .collect::<Vec<String>>()
        .join(",")
    }
}

fn wrap_cell_content(c: &str) -> String {
    let needs_escaping = c.contains('"');
    let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
    let mut out = String::from(c);

    if needs_escaping {
        out = out.replace('"', "\"\"");
    }
    if needs_wrapping || needs_escaping {
        out = format!("\"{out}\"");
    }
    out
}

pub fn seed_records() -> Vec<Record> {
    use Section::*;
    use Status::*;
    vec![
        Record::new(1, "John Doe", "john@example.com", S3A, Active),
        Record::new(2, "Jane Smith", "jane@example.com", S3B, Active),
        Record::new(3, "Robert Johnson", "robert@example.com", S3C, Inactive),
        Record::new(4, "Emily Davis", "emily@example.com", S3D, Active),
        Record::new(5, "Michael Wilson", "michael@example.com", S3E, Active),
        Record::new(6, "Sarah Brown", "sarah@example.com", S3F, Inactive),
        Record::new(7, "David Miller", "david@example.com", S3A, Active),
        Record::new(8, "Jennifer Taylor", "jennifer@example.com", S3B, Active),
        Record::new(9, "James Anderson", "james@example.com", S3C, Inactive),
        Record::new(10, "Lisa Thomas", "lisa@example.com", S3D, Active),
        Record::new(11, "Daniel White", "daniel@example.com", S3E, Active),
    ]
}

/// Read a roster export with the header `id,name,email,section,status`.
///
/// The file is only read, never written back.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_csv(path: &Path) -> Result<Vec<Record>, RosterError> {
    check_file(path)?;
    let start_time = Instant::now();

    let df = LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()?
        .collect()?;

    // Each column is extracted in its own thread.
    let columns: Result<Vec<Vec<String>>, RosterError> = COLUMN_NAMES
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let columns = columns?;

    let mut records = Vec::with_capacity(df.height());
    let mut seen = HashSet::new();
    for row in 0..df.height() {
        let record = parse_row(row, &columns)?;
        if !seen.insert(record.id) {
            return Err(RosterError::InvalidRecord(format!(
                "row {}: duplicate id {}",
                row + 1,
                record.id
            )));
        }
        trace!("Loaded {:?}", record);
        records.push(record);
    }

    info!(
        "Loaded {} records from {} in {}ms",
        records.len(),
        path.display(),
        start_time.elapsed().as_millis()
    );
    Ok(records)
}

fn check_file(path: &Path) -> Result<(), RosterError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RosterError::FileNotFound,
        ErrorKind::PermissionDenied => RosterError::PermissionDenied,
        _ => RosterError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(RosterError::LoadingFailed("Not a file!".into()));
    }
    debug!("Roster file {} has {} bytes", path.display(), metadata.len());
    Ok(())
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<Vec<String>, RosterError> {
    let col = df
        .column(col_name)
        .map_err(|_| RosterError::LoadingFailed(format!("missing column \"{col_name}\"")))?
        .cast(&DataType::String)?;
    let series = col.str()?;
    Ok(series
        .into_iter()
        .map(|value| value.map(|s| s.trim().to_string()).unwrap_or_default())
        .collect())
}

fn parse_row(row: usize, columns: &[Vec<String>]) -> Result<Record, RosterError> {
    let cell = |c: usize| columns[c][row].as_str();
    let invalid = |msg: String| RosterError::InvalidRecord(format!("row {}: {msg}", row + 1));

    let id = cell(0)
        .parse::<u32>()
        .ok()
        .filter(|&id| id > 0)
        .ok_or_else(|| invalid(format!("id must be a positive integer, got \"{}\"", cell(0))))?;
    let name = cell(1);
    if name.is_empty() {
        return Err(invalid("name is empty".into()));
    }
    let email = cell(2);
    if email.is_empty() {
        return Err(invalid("email is empty".into()));
    }
    let reason = |e: RosterError| match e {
        RosterError::InvalidRecord(msg) => invalid(msg),
        other => other,
    };
    let section = cell(3).parse::<Section>().map_err(reason)?;
    let status = cell(4).parse::<Status>().map_err(reason)?;

    Ok(Record::new(id, name, email, section, status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn seed_list_has_unique_ids() {
        let records = seed_records();
        assert_eq!(records.len(), 11);
        let ids: HashSet<u32> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 11);
        assert_eq!(
            records.iter().filter(|r| r.status == Status::Active).count(),
            8
        );
    }

    #[test]
    fn parses_enums_case_insensitively() {
        assert_eq!(" active ".parse::<Status>().unwrap(), Status::Active);
        assert_eq!("INACTIVE".parse::<Status>().unwrap(), Status::Inactive);
        assert_eq!("3f".parse::<Section>().unwrap(), Section::S3F);
        assert!("4A".parse::<Section>().is_err());
        assert!("pending".parse::<Status>().is_err());
    }

    #[test]
    fn unknown_values_are_reported_as_written() {
        let err = " PENDING ".parse::<Status>().unwrap_err();
        assert_eq!(err.to_string(), "invalid record: unknown status \"PENDING\"");
        let err = "4a".parse::<Section>().unwrap_err();
        assert_eq!(err.to_string(), "invalid record: unknown section \"4a\"");
    }

    #[test]
    fn presentation_helpers() {
        let record = &seed_records()[6];
        assert_eq!(record.display_id(), "#007");
        assert_eq!(record.initials(), "DM");
        assert_eq!(
            record.to_csv_row(),
            "7,\"David Miller\",david@example.com,3A,Active"
        );
    }

    #[test]
    fn csv_cells_with_quotes_are_escaped() {
        assert_eq!(wrap_cell_content("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(wrap_cell_content("plain"), "plain");
    }

    #[test]
    fn loads_roster_csv() {
        let records = load_csv(&fixture("students.csv")).unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].name, "Ada Lovelace");
        assert_eq!(records[0].section, Section::S3B);
        assert_eq!(records[1].status, Status::Inactive);
        assert_eq!(records[3].id, 12);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = load_csv(&fixture("duplicate_ids.csv")).unwrap_err();
        assert!(matches!(err, RosterError::InvalidRecord(msg) if msg.contains("duplicate id 2")));
    }

    #[test]
    fn rejects_missing_columns() {
        let err = load_csv(&fixture("missing_status.csv")).unwrap_err();
        assert!(matches!(err, RosterError::LoadingFailed(msg) if msg.contains("status")));
    }

    #[test]
    fn rejects_unknown_section() {
        let err = load_csv(&fixture("bad_section.csv")).unwrap_err();
        assert_eq!(err.to_string(), "invalid record: row 1: unknown section \"4A\"");
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_csv(&fixture("does_not_exist.csv")).unwrap_err();
        assert!(matches!(err, RosterError::FileNotFound));
    }

    #[test]
    fn directory_is_not_a_file() {
        let err = load_csv(&fixture("")).unwrap_err();
        assert!(matches!(err, RosterError::LoadingFailed(_)));
    }
}
