use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::SecondsFormat;
use thiserror::Error;
use tracing::info;

use crate::models::InteractionRecord;

pub const EXPORT_HEADER: [&str; 8] = [
    "ID", "Message", "Sentiment", "Channel", "Agent", "Timestamp", "Customer", "Category",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush export: {0}")]
    Flush(#[from] std::io::Error),
}

/// Write records as delimited text. Sentiment keeps three decimals and
/// timestamps use RFC 3339 with as many fractional digits as the instant
/// needs, so re-parsing yields the same instant.
pub fn write_records<W: Write>(writer: W, records: &[InteractionRecord]) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(EXPORT_HEADER)?;

    for record in records {
        let sentiment = format!("{:.3}", record.sentiment);
        let timestamp = record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        writer.write_record([
            record.id.as_str(),
            record.message.as_str(),
            sentiment.as_str(),
            record.channel.as_str(),
            record.agent.as_str(),
            timestamp.as_str(),
            record.customer.as_str(),
            record.category.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn export_to_path(path: &Path, records: &[InteractionRecord]) -> Result<(), ExportError> {
    let file = std::fs::File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_records(std::io::BufWriter::new(file), records)?;
    info!(path = %path.display(), count = records.len(), "exported interaction records");
    Ok(())
}
