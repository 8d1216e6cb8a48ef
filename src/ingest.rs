//! Parsing of uploaded interaction files.
//!
//! Uploads are CSV with a header row. `message`, `timestamp`, `customer` and
//! `channel` are required; every other column is optional and falls back to
//! a neutral default. Header names are matched case-insensitively with
//! punctuation ignored, so the export header (`ID`, `Sentiment`, ...) and
//! `csat_prediction`/`csatPrediction` all resolve.
//!
//! Text cells are kept verbatim; only numeric and date cells are trimmed.
//! Rows without an `id` get a fresh UUID.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::InteractionRecord;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unsupported file type for {0}; expected a .csv file")]
    UnsupportedFileType(PathBuf),
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("line {line}: invalid {column} value {value:?}: {reason}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        reason: String,
    },
}

const DEFAULT_AGENT: &str = "Unassigned";
const DEFAULT_CATEGORY: &str = "General";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Id,
    Message,
    Sentiment,
    Channel,
    Agent,
    Customer,
    Category,
    Confidence,
    Keywords,
    Csat,
    Timestamp,
}

impl Column {
    fn from_header(header: &str) -> Option<Self> {
        let key: String = header
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let column = match key.as_str() {
            "id" => Column::Id,
            "message" => Column::Message,
            "sentiment" => Column::Sentiment,
            "channel" => Column::Channel,
            "agent" => Column::Agent,
            "customer" => Column::Customer,
            "category" => Column::Category,
            "confidence" => Column::Confidence,
            "keywords" => Column::Keywords,
            "csat" | "csatprediction" => Column::Csat,
            "timestamp" => Column::Timestamp,
            _ => return None,
        };
        Some(column)
    }

    fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Message => "message",
            Column::Sentiment => "sentiment",
            Column::Channel => "channel",
            Column::Agent => "agent",
            Column::Customer => "customer",
            Column::Category => "category",
            Column::Confidence => "confidence",
            Column::Keywords => "keywords",
            Column::Csat => "csat_prediction",
            Column::Timestamp => "timestamp",
        }
    }
}

const REQUIRED: [Column; 4] = [
    Column::Message,
    Column::Timestamp,
    Column::Customer,
    Column::Channel,
];

/// Read records from a `.csv` file on disk.
pub fn read_records(path: &Path) -> Result<Vec<InteractionRecord>, IngestError> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return Err(IngestError::UnsupportedFileType(path.to_path_buf()));
    }

    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_records(file)?;
    info!(path = %path.display(), count = records.len(), "loaded interaction records");
    Ok(records)
}

/// Parse CSV from any reader. A header with no rows yields an empty list.
pub fn parse_records<R: Read>(reader: R) -> Result<Vec<InteractionRecord>, IngestError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut columns: HashMap<Column, usize> = HashMap::new();
    for (index, header) in reader.headers()?.iter().enumerate() {
        match Column::from_header(header) {
            Some(column) => {
                columns.entry(column).or_insert(index);
            }
            None => debug!(header, "ignoring unknown column"),
        }
    }
    for column in REQUIRED {
        if !columns.contains_key(&column) {
            return Err(IngestError::MissingColumn(column.name()));
        }
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let fields = row?;
        let line = fields
            .position()
            .map(|position| position.line())
            .unwrap_or(index as u64 + 2);
        let row = Row {
            fields: &fields,
            columns: &columns,
            line,
        };
        records.push(row.to_record()?);
    }

    Ok(records)
}

struct Row<'a> {
    fields: &'a csv::StringRecord,
    columns: &'a HashMap<Column, usize>,
    line: u64,
}

impl Row<'_> {
    fn get(&self, column: Column) -> Option<&str> {
        let index = *self.columns.get(&column)?;
        self.fields.get(index).filter(|value| !value.is_empty())
    }

    /// Cell with surrounding whitespace removed, for numbers and dates.
    fn value(&self, column: Column) -> Option<&str> {
        self.get(column).map(str::trim).filter(|value| !value.is_empty())
    }

    fn text(&self, column: Column, default: &str) -> String {
        self.get(column).unwrap_or(default).to_string()
    }

    fn invalid(&self, column: Column, value: &str, reason: impl ToString) -> IngestError {
        IngestError::InvalidField {
            line: self.line,
            column: column.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn number(&self, column: Column) -> Result<Option<f64>, IngestError> {
        let Some(value) = self.value(column) else {
            return Ok(None);
        };
        let parsed: f64 = value
            .parse()
            .map_err(|err: std::num::ParseFloatError| self.invalid(column, value, err))?;
        if !parsed.is_finite() {
            return Err(self.invalid(column, value, "not a finite number"));
        }
        Ok(Some(parsed))
    }

    fn csat(&self) -> Result<Option<u8>, IngestError> {
        let Some(value) = self.value(Column::Csat) else {
            return Ok(None);
        };
        match value.parse::<u8>() {
            Ok(score) if (1..=5).contains(&score) => Ok(Some(score)),
            Ok(_) => Err(self.invalid(Column::Csat, value, "expected a rating from 1 to 5")),
            Err(err) => Err(self.invalid(Column::Csat, value, err)),
        }
    }

    fn timestamp(&self) -> Result<DateTime<Utc>, IngestError> {
        let value = self.value(Column::Timestamp).unwrap_or_default();
        parse_timestamp(value)
            .ok_or_else(|| self.invalid(Column::Timestamp, value, "unrecognised date-time"))
    }

    fn to_record(&self) -> Result<InteractionRecord, IngestError> {
        let sentiment = self.number(Column::Sentiment)?;
        let confidence = match self.number(Column::Confidence)? {
            Some(value) => value,
            // an unscored row carries no classifier confidence
            None if sentiment.is_none() => 0.0,
            None => 1.0,
        };

        Ok(InteractionRecord {
            id: self
                .get(Column::Id)
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            message: self.text(Column::Message, ""),
            sentiment: sentiment.unwrap_or(0.0),
            channel: self.text(Column::Channel, ""),
            agent: self.text(Column::Agent, DEFAULT_AGENT),
            customer: self.text(Column::Customer, ""),
            category: self.text(Column::Category, DEFAULT_CATEGORY),
            confidence,
            keywords: self.get(Column::Keywords).map(split_keywords).unwrap_or_default(),
            csat_prediction: self.csat()?,
            timestamp: self.timestamp()?,
        })
    }
}

fn split_keywords(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ';' || c == '|')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

/// RFC 3339 first, then naive date-times and bare dates taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_minimal_upload() {
        let input = "\
message,timestamp,customer,channel
\"Late again, very upset\",2026-10-18T09:30:00Z,ana@example.com,Email
Thanks!,2026-10-18 10:00:00,ben@example.com,Chat
";
        let records = parse_records(input.as_bytes()).expect("valid upload");
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert!(Uuid::parse_str(&first.id).is_ok());
        assert_eq!(first.message, "Late again, very upset");
        assert_eq!(first.sentiment, 0.0);
        assert_eq!(first.confidence, 0.0);
        assert_eq!(first.agent, "Unassigned");
        assert_eq!(first.category, "General");
        assert!(first.keywords.is_empty());
        assert_eq!(first.csat_prediction, None);
        assert_eq!(
            first.timestamp,
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).single().expect("valid")
        );
        assert_ne!(records[1].id, first.id);
    }

    #[test]
    fn parses_full_columns_with_any_header_case() {
        let input = "\
ID,Message,Sentiment,Channel,Agent,Timestamp,Customer,Category,Confidence,Keywords,csatPrediction
t-9,Refund please,-0.712,Phone,Emma,2026-10-17,cy@example.com,Billing,0.81,billing; refund,2
";
        let records = parse_records(input.as_bytes()).expect("valid upload");
        let record = &records[0];
        assert_eq!(record.id, "t-9");
        assert!((record.sentiment - -0.712).abs() < 1e-12);
        assert_eq!(record.agent, "Emma");
        assert_eq!(record.category, "Billing");
        assert!((record.confidence - 0.81).abs() < 1e-12);
        assert_eq!(record.keywords, vec!["billing", "refund"]);
        assert_eq!(record.csat_prediction, Some(2));
    }

    #[test]
    fn generated_ids_never_clash_with_explicit_ones() {
        let input = "\
id,message,timestamp,customer,channel
,first,2026-10-18,a@example.com,Chat
ticket-1,second,2026-10-18,b@example.com,Chat
";
        let records = parse_records(input.as_bytes()).expect("valid upload");
        assert_eq!(records[1].id, "ticket-1");
        assert_ne!(records[0].id, "ticket-1");
        assert!(Uuid::parse_str(&records[0].id).is_ok());
    }

    #[test]
    fn text_cells_keep_whitespace_and_numbers_are_trimmed() {
        let input = "message,timestamp,customer,channel,sentiment,csat\n\
\"  padded message \", 2026-10-18T09:30:00Z , a@example.com,Chat, -0.5 , 2 \n";
        let records = parse_records(input.as_bytes()).expect("valid upload");
        let record = &records[0];
        assert_eq!(record.message, "  padded message ");
        assert_eq!(record.customer, " a@example.com");
        assert!((record.sentiment - -0.5).abs() < 1e-12);
        assert_eq!(record.csat_prediction, Some(2));
        assert_eq!(
            record.timestamp,
            Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).single().expect("valid")
        );
    }

    #[test]
    fn header_only_file_is_empty_not_an_error() {
        let records = parse_records("message,timestamp,customer,channel\n".as_bytes())
            .expect("header only");
        assert!(records.is_empty());
    }

    #[test]
    fn missing_required_column_is_reported() {
        let err = parse_records("message,timestamp,customer\nhi,2026-10-18,a@b.c\n".as_bytes())
            .expect_err("channel missing");
        assert!(matches!(err, IngestError::MissingColumn("channel")));
    }

    #[test]
    fn invalid_values_name_line_and_column() {
        let input = "message,timestamp,customer,channel,sentiment\nhi,2026-10-18,a@b.c,Chat,bad\n";
        match parse_records(input.as_bytes()) {
            Err(IngestError::InvalidField { line, column, value, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "sentiment");
                assert_eq!(value, "bad");
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let input = "message,timestamp,customer,channel\nhi,yesterday,a@b.c,Chat\n";
        assert!(matches!(
            parse_records(input.as_bytes()),
            Err(IngestError::InvalidField { column: "timestamp", .. })
        ));

        let input = "message,timestamp,customer,channel,csat\nhi,2026-10-18,a@b.c,Chat,9\n";
        assert!(matches!(
            parse_records(input.as_bytes()),
            Err(IngestError::InvalidField { column: "csat_prediction", .. })
        ));
    }

    #[test]
    fn ragged_rows_are_csv_errors() {
        let input = "message,timestamp,customer,channel\nhi,2026-10-18\n";
        assert!(matches!(parse_records(input.as_bytes()), Err(IngestError::Csv(_))));
    }

    #[test]
    fn non_csv_paths_are_rejected() {
        let err = read_records(Path::new("upload.xlsx")).expect_err("wrong type");
        assert!(matches!(err, IngestError::UnsupportedFileType(_)));
    }

    #[test]
    fn timestamps_accept_common_shapes() {
        assert!(parse_timestamp("2026-10-18T09:30:00.123Z").is_some());
        assert!(parse_timestamp("2026-10-18T09:30:00+02:00").is_some());
        assert!(parse_timestamp("2026-10-18 09:30").is_some());
        assert!(parse_timestamp("18/10/2026").is_none());
    }
}
