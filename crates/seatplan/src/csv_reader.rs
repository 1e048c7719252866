use crate::constants::{EXPECTED_GENDER_HEADER, EXPECTED_NAME_HEADER};
use crate::error::{Result, SeatPlanError};

use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;

/// One row of a roster file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub gender: Option<String>,
}

/// Reads a roster from a CSV file
///
/// # Errors
/// Returns error if the file cannot be read or the CSV format is invalid
pub fn read_roster_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RosterEntry>> {
    let file = std::fs::File::open(path)?;
    read_roster_from_reader(file)
}

/// Read CSV with `Name,Gender` format.
/// - The gender column may be missing or blank
/// - Blank rows are skipped
/// - Names keep file order
pub fn read_roster_from_reader<R: Read>(reader: R) -> Result<Vec<RosterEntry>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    validate_csv_headers(&mut rdr)?;

    let mut entries = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let rec = result?;
        let row = i + 2; // 1-indexed, plus header

        if let Some(entry) = parse_record(&rec, row)? {
            entries.push(entry);
        }
    }

    log::debug!("read {} roster entries", entries.len());
    Ok(entries)
}

fn validate_csv_headers<R: Read>(csv_reader: &mut csv::Reader<R>) -> Result<()> {
    let headers = csv_reader
        .headers()
        .map_err(|e| SeatPlanError::CsvHeader(format!("Failed to read headers: {}", e)))?;

    let name_header = headers
        .get(0)
        .ok_or_else(|| SeatPlanError::CsvHeader("Missing name column at index 0".to_string()))?;
    if !name_header.eq_ignore_ascii_case(EXPECTED_NAME_HEADER) {
        return Err(SeatPlanError::CsvHeader(format!(
            "Expected '{}' in column 0, found '{}'",
            EXPECTED_NAME_HEADER, name_header
        )));
    }

    if let Some(gender_header) = headers.get(1)
        && !gender_header.eq_ignore_ascii_case(EXPECTED_GENDER_HEADER)
    {
        return Err(SeatPlanError::CsvHeader(format!(
            "Expected '{}' in column 1, found '{}'",
            EXPECTED_GENDER_HEADER, gender_header
        )));
    }

    Ok(())
}

fn parse_record(rec: &StringRecord, row: usize) -> Result<Option<RosterEntry>> {
    if rec.iter().all(|f| f.trim().is_empty()) {
        log::warn!("row {row}: blank, skipped");
        return Ok(None);
    }

    let name = rec.get(0).map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(SeatPlanError::CsvRow {
            row,
            message: "name is blank".to_string(),
        });
    }

    let gender = rec
        .get(1)
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string);

    if rec.len() > 2 {
        log::warn!("row {row}: ignoring {} extra columns", rec.len() - 2);
    }

    Ok(Some(RosterEntry {
        name: name.to_string(),
        gender,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_roster_from_reader() {
        let data = "Name,Gender\nLina,F\n Berat , M \nAzra,\n";
        let entries = read_roster_from_reader(data.as_bytes()).unwrap();
        assert_eq!(
            entries,
            vec![
                RosterEntry {
                    name: "Lina".to_string(),
                    gender: Some("F".to_string())
                },
                RosterEntry {
                    name: "Berat".to_string(),
                    gender: Some("M".to_string())
                },
                RosterEntry {
                    name: "Azra".to_string(),
                    gender: None
                },
            ]
        );
    }

    #[test]
    fn test_name_only_file() {
        let data = "name\nLina\nAzra\n";
        let entries = read_roster_from_reader(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.gender.is_none()));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let data = "Name,Gender\nLina,F\n,\nAzra,F\n";
        let entries = read_roster_from_reader(data.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_bad_header() {
        let data = "Student,Gender\nLina,F\n";
        let err = read_roster_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, SeatPlanError::CsvHeader(_)));

        let data = "Name,Sex\nLina,F\n";
        let err = read_roster_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, SeatPlanError::CsvHeader(_)));
    }

    #[test]
    fn test_missing_name_reports_row() {
        let data = "Name,Gender\nLina,F\n,M\n";
        let err = read_roster_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, SeatPlanError::CsvRow { row: 3, .. }));
    }

    #[test]
    fn test_read_roster_csv_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Name,Gender").unwrap();
        writeln!(file, "Mahdi,M").unwrap();
        writeln!(file, "Jeremie,M").unwrap();
        file.flush().unwrap();

        let entries = read_roster_csv(file.path()).unwrap();
        assert_eq!(entries[1].name, "Jeremie");
    }

    #[test]
    fn test_missing_file() {
        let err = read_roster_csv("no_such_roster.csv").unwrap_err();
        assert!(matches!(err, SeatPlanError::Io(_)));
    }
}
