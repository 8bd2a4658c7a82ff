/// Measurement table: wide-form tensile strength readings loaded from CSV
///
/// Columns are named `{Sample}_{Treatment}` (e.g. `S1_T3`) next to a shared
/// `Time` column. Cells may be empty; those are kept as missing readings.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim};

use crate::error::{DashboardError, Result};

/// Physical specimen under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sample {
    S1,
    S2,
    S3,
    S4,
}

impl Sample {
    pub const ALL: [Sample; 4] = [Sample::S1, Sample::S2, Sample::S3, Sample::S4];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sample::S1 => "S1",
            Sample::S2 => "S2",
            Sample::S3 => "S3",
            Sample::S4 => "S4",
        }
    }

    /// Label used for the per-sample tabs
    pub fn tab_label(&self) -> &'static str {
        match self {
            Sample::S1 => "Sample 1",
            Sample::S2 => "Sample 2",
            Sample::S3 => "Sample 3",
            Sample::S4 => "Sample 4",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn parse(s: &str) -> Option<Sample> {
        Sample::ALL.into_iter().find(|x| x.as_str() == s)
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Experimental condition applied to a sample.
///
/// Declaration order is the chart order: Pre first, then T1..T5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Treatment {
    Pre,
    T1,
    T2,
    T3,
    T4,
    T5,
}

impl Treatment {
    pub const ALL: [Treatment; 6] = [
        Treatment::Pre,
        Treatment::T1,
        Treatment::T2,
        Treatment::T3,
        Treatment::T4,
        Treatment::T5,
    ];

    /// Every treatment except the `Pre` baseline
    pub const APPLIED: [Treatment; 5] = [
        Treatment::T1,
        Treatment::T2,
        Treatment::T3,
        Treatment::T4,
        Treatment::T5,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Treatment::Pre => "Pre",
            Treatment::T1 => "T1",
            Treatment::T2 => "T2",
            Treatment::T3 => "T3",
            Treatment::T4 => "T4",
            Treatment::T5 => "T5",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn parse(s: &str) -> Option<Treatment> {
        Treatment::ALL.into_iter().find(|x| x.as_str() == s)
    }
}

impl std::fmt::Display for Treatment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// (Sample, Treatment) pair decoded from a `S1_T3`-style name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnKey {
    pub sample: Sample,
    pub treatment: Treatment,
}

impl ColumnKey {
    /// Decode `S<digit>_` followed by `T<digit>` or `Pre`. Nothing else is accepted.
    pub fn parse(name: &str) -> Option<ColumnKey> {
        let (sample, treatment) = name.split_once('_')?;
        Some(ColumnKey {
            sample: Sample::parse(sample)?,
            treatment: Treatment::parse(treatment)?,
        })
    }

    pub fn name(&self) -> String {
        format!("{}_{}", self.sample, self.treatment)
    }
}

/// One `{Sample}_{Treatment}` column of readings, aligned with `MeasurementTable::times`
#[derive(Debug, Clone)]
pub struct MeasurementColumn {
    pub key: ColumnKey,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementTable {
    pub source_path: PathBuf,
    /// Row index: one Time value per row
    pub times: Vec<f64>,
    /// Kept columns, in file order
    pub columns: Vec<MeasurementColumn>,
    /// Headers that did not decode into (Sample, Treatment)
    pub ignored_columns: Vec<String>,
    /// Rows dropped because their Time cell was empty
    pub skipped_rows: usize,
}

impl MeasurementTable {
    /// Load a measurement CSV from disk
    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| DashboardError::io(path, e))?;
        let mut table = Self::from_reader(file)?;
        table.source_path = path.to_path_buf();
        log::info!(
            "Loaded {}: {} rows, {} columns ({} ignored)",
            path.display(),
            table.times.len(),
            table.columns.len(),
            table.ignored_columns.len()
        );
        Ok(table)
    }

    /// Parse measurement CSV text from any reader
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();

        let mut seen = HashSet::new();
        for name in headers.iter() {
            if !seen.insert(name) {
                return Err(DashboardError::DuplicateColumn(name.to_string()));
            }
        }

        let time_idx = headers
            .iter()
            .position(|h| h == "Time")
            .ok_or(DashboardError::MissingTimeColumn)?;

        let mut table = MeasurementTable::default();
        let mut kept: Vec<usize> = Vec::new();
        for (idx, name) in headers.iter().enumerate() {
            if idx == time_idx {
                continue;
            }
            match ColumnKey::parse(name) {
                Some(key) => {
                    kept.push(idx);
                    table.columns.push(MeasurementColumn {
                        key,
                        values: Vec::new(),
                    });
                }
                None => {
                    log::warn!("Ignoring column '{}': not a Sample_Treatment name", name);
                    table.ignored_columns.push(name.to_string());
                }
            }
        }

        for (row_idx, record) in rdr.records().enumerate() {
            let record = record?;
            let row = row_idx + 1;
            // Short rows pad with missing cells; extra cells have no column
            if record.len() > headers.len() {
                return Err(DashboardError::RowLength {
                    row,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            let time = parse_cell(record.get(time_idx).unwrap_or(""), row, "Time")?;
            let Some(time) = time else {
                log::warn!("Skipping row {}: no Time value", row);
                table.skipped_rows += 1;
                continue;
            };
            table.times.push(time);
            for (col, &idx) in table.columns.iter_mut().zip(kept.iter()) {
                let value = parse_cell(record.get(idx).unwrap_or(""), row, headers.get(idx).unwrap_or(""))?;
                col.values.push(value);
            }
        }

        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.times.len()
    }

    /// Columns belonging to one sample, in file order
    pub fn columns_for(&self, sample: Sample) -> impl Iterator<Item = &MeasurementColumn> + '_ {
        self.columns.iter().filter(move |c| c.key.sample == sample)
    }

    #[cfg(test)]
    pub fn column(&self, sample: Sample, treatment: Treatment) -> Option<&MeasurementColumn> {
        self.columns
            .iter()
            .find(|c| c.key.sample == sample && c.key.treatment == treatment)
    }
}

/// Empty and NaN cells are missing readings; anything else must be numeric.
fn parse_cell(raw: &str, row: usize, column: &str) -> Result<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(DashboardError::InvalidCell {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
Time,S1_Pre,S1_T1,S2_Pre,Notes
0.0,0.10,0.20,,a
0.5,0.40,,1.50,b
1.0,,0.30,NaN,c
";

    #[test]
    fn test_column_key_parse() {
        let key = ColumnKey::parse("S1_T3").unwrap();
        assert_eq!(key.sample, Sample::S1);
        assert_eq!(key.treatment, Treatment::T3);
        assert_eq!(ColumnKey::parse("S4_Pre").unwrap().treatment, Treatment::Pre);
        assert!(ColumnKey::parse("S10_Pre").is_none());
        assert!(ColumnKey::parse("S5_T1").is_none());
        assert!(ColumnKey::parse("S1_T6").is_none());
        assert!(ColumnKey::parse("S1T1").is_none());
        assert!(ColumnKey::parse("Time").is_none());
    }

    #[test]
    fn test_treatment_order_is_explicit() {
        let mut shuffled = vec![Treatment::T3, Treatment::Pre, Treatment::T1];
        shuffled.sort();
        assert_eq!(shuffled, vec![Treatment::Pre, Treatment::T1, Treatment::T3]);
        assert_eq!(Treatment::ALL[0].as_str(), "Pre");
    }

    #[test]
    fn test_load_with_missing_values() {
        let table = MeasurementTable::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(table.times, vec![0.0, 0.5, 1.0]);
        assert_eq!(table.columns.len(), 3);
        assert_eq!(table.ignored_columns, vec!["Notes".to_string()]);

        let s1_t1 = table.column(Sample::S1, Treatment::T1).unwrap();
        assert_eq!(s1_t1.values, vec![Some(0.20), None, Some(0.30)]);
        let s2_pre = table.column(Sample::S2, Treatment::Pre).unwrap();
        assert_eq!(s2_pre.values, vec![None, Some(1.50), None]);
        assert_eq!(table.columns_for(Sample::S1).count(), 2);
        assert_eq!(table.columns_for(Sample::S3).count(), 0);
    }

    #[test]
    fn test_missing_time_column() {
        let err = MeasurementTable::from_reader("S1_Pre\n1.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingTimeColumn));
    }

    #[test]
    fn test_duplicate_column() {
        let err = MeasurementTable::from_reader("Time,S1_Pre,S1_Pre\n0,1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::DuplicateColumn(ref c) if c == "S1_Pre"));
    }

    #[test]
    fn test_invalid_cell_reports_position() {
        let err = MeasurementTable::from_reader("Time,S1_Pre\n0,1\n1,abc\n".as_bytes()).unwrap_err();
        match err {
            DashboardError::InvalidCell { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "S1_Pre");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_short_rows_pad_missing() {
        let table =
            MeasurementTable::from_reader("Time,S1_Pre,S2_Pre\n0,1.0,2.0\n1,1.5\n".as_bytes()).unwrap();
        assert_eq!(table.times, vec![0.0, 1.0]);
        let s2_pre = table.column(Sample::S2, Treatment::Pre).unwrap();
        assert_eq!(s2_pre.values, vec![Some(2.0), None]);
        let s1_pre = table.column(Sample::S1, Treatment::Pre).unwrap();
        assert_eq!(s1_pre.values, vec![Some(1.0), Some(1.5)]);
    }

    #[test]
    fn test_long_rows_are_rejected() {
        let err = MeasurementTable::from_reader("Time,S1_Pre\n0,1\n1,2,3\n".as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::RowLength { row: 2, expected: 2, found: 3 }
        ));
    }

    #[test]
    fn test_csv_error_message_not_doubled() {
        let bad = csv::ReaderBuilder::new()
            .from_reader("a,b\n1,2,3\n".as_bytes())
            .records()
            .find_map(|r| r.err())
            .unwrap();
        let text = DashboardError::from(bad).to_string();
        assert_eq!(text.matches("CSV error").count(), 1, "{}", text);
    }

    #[test]
    fn test_rows_without_time_are_skipped() {
        let table = MeasurementTable::from_reader("Time,S1_Pre\n0,1\n,2\n2,3\n".as_bytes()).unwrap();
        assert_eq!(table.times, vec![0.0, 2.0]);
        assert_eq!(table.skipped_rows, 1);
        assert_eq!(table.columns[0].values, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_load_csv_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(&path, CSV).unwrap();
        let table = MeasurementTable::load_csv(&path).unwrap();
        assert_eq!(table.source_path, path);
        assert_eq!(table.row_count(), 3);

        let missing = MeasurementTable::load_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(missing, DashboardError::Io { .. }));
    }
}
