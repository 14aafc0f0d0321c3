//! CSV ingest for batch mode.
//!
//! Expected columns (header names are case-insensitive, order is free):
//!
//! ```text
//! id,principal,penalty_rate_percent,days_remaining,total_maturity_days
//! ```
//!
//! `id` is optional (the line number is used instead). Rows that fail to
//! parse are skipped and reported; a missing required column fails the whole
//! file.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::domain::{EngineConfig, Field, PenaltyRequest};
use crate::error::AppError;
use crate::io::fields::RequestDraft;

/// A parsed batch row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRow {
    pub line: usize,
    pub id: String,
    pub request: PenaltyRequest,
}

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: parsed rows + row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedRequests {
    pub rows: Vec<BatchRow>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load batch requests from a CSV file.
pub fn load_requests(path: &Path, config: &EngineConfig) -> Result<IngestedRequests, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_requests(file, config)
}

/// Load batch requests from any reader.
pub fn read_requests<R: Read>(reader: R, config: &EngineConfig) -> Result<IngestedRequests, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut out = IngestedRequests::default();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header and CSV lines are 1-based.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(line, error = %e, "skipping unparseable CSV row");
                out.row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let id = get(&record, &header_map, "id")
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let cell = |field: Field| get(&record, &header_map, field.column_name()).unwrap_or("");

        let draft = RequestDraft::from_text(
            cell(Field::Principal),
            cell(Field::PenaltyRatePercent),
            cell(Field::DaysRemaining),
            cell(Field::TotalMaturityDays),
        );

        match draft.finish(config) {
            Ok(request) => out.rows.push(BatchRow {
                line,
                id: id.unwrap_or_else(|| format!("row-{line}")),
                request,
            }),
            Err(e) => {
                warn!(line, id = id.as_deref().unwrap_or(""), error = %e, "skipping invalid CSV row");
                out.row_errors.push(RowError {
                    line,
                    id,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(out)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, h)| (h.trim().to_ascii_lowercase(), idx))
        .collect()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = Field::REQUEST
        .iter()
        .map(|f| f.column_name())
        .filter(|name| !header_map.contains_key(*name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::new(
            2,
            format!("CSV is missing required column(s): {}", missing.join(", ")),
        ))
    }
}

fn get<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    header_map.get(name).and_then(|&idx| record.get(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn reads_rows_and_reports_bad_ones() {
        let csv = "\
id,principal,penalty_rate_percent,days_remaining,total_maturity_days
A,1.0,10,30,365
B,0,10,5,10
,2,20,300,365
C,abc,10,1,
";
        let ingested = read_requests(csv.as_bytes(), &EngineConfig::default()).unwrap();
        assert_eq!(ingested.rows_read, 4);
        assert_eq!(ingested.rows.len(), 3);
        assert_eq!(ingested.rows[0].id, "A");
        assert_eq!(ingested.rows[0].request, PenaltyRequest::new(dec!(1), dec!(10), 30, 365));
        // Zero principal parses; the engine rejects it later.
        assert_eq!(ingested.rows[1].id, "B");
        assert_eq!(ingested.rows[2].id, "row-4");

        assert_eq!(ingested.row_errors.len(), 1);
        let err = &ingested.row_errors[0];
        assert_eq!(err.line, 5);
        assert_eq!(err.id.as_deref(), Some("C"));
        assert!(err.message.contains("principal must be a number"));
        assert!(err.message.contains("totalMaturityDays is required"));
    }

    #[test]
    fn header_names_are_case_insensitive() {
        let csv = "Total_Maturity_Days,Days_Remaining,Penalty_Rate_Percent,Principal\n365,0,5,10\n";
        let ingested = read_requests(csv.as_bytes(), &EngineConfig::default()).unwrap();
        assert_eq!(ingested.rows.len(), 1);
        assert_eq!(ingested.rows[0].request, PenaltyRequest::new(dec!(10), dec!(5), 0, 365));
    }

    #[test]
    fn missing_column_is_fatal() {
        let csv = "id,principal,days_remaining\nA,1,2\n";
        let err = read_requests(csv.as_bytes(), &EngineConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("penalty_rate_percent"));
        assert!(err.to_string().contains("total_maturity_days"));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "principal,penalty_rate_percent,days_remaining,total_maturity_days").unwrap();
        writeln!(file, "100,5,10,20").unwrap();
        let ingested = load_requests(file.path(), &EngineConfig::default()).unwrap();
        assert_eq!(ingested.rows.len(), 1);
    }

    #[test]
    fn missing_file_is_an_input_error() {
        let err = load_requests(Path::new("/definitely/not/here.csv"), &EngineConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
