//! Tabular dataset loaded once at startup.
//!
//! The dataset backs the form's dropdown choices and the exploratory charts.
//! It is parsed from a CSV file with a header row and never mutated after
//! loading.

use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Columns the prediction form reads its controls from
pub const FORM_COLUMNS: [&str; 6] = ["age", "sex", "bmi", "children", "smoker", "region"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset is empty (no header row)")]
    Empty,
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: unterminated quoted field")]
    UnterminatedQuote { line: usize },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Missing cells are `None`
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.data {
            ColumnData::Numeric(values) => Some(values),
            ColumnData::Categorical(_) => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[String]> {
        match &self.data {
            ColumnData::Categorical(values) => Some(values),
            ColumnData::Numeric(_) => None,
        }
    }

    /// Cell at `row` as JSON (`null` for a missing number)
    pub fn json_value(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Numeric(values) => match values.get(row).copied().flatten() {
                Some(v) => serde_json::Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
                None => Value::Null,
            },
            ColumnData::Categorical(values) => values
                .get(row)
                .map(|v| Value::String(v.clone()))
                .unwrap_or(Value::Null),
        }
    }

    /// Distinct non-empty values in first-seen order
    pub fn distinct_values(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        let rendered: Box<dyn Iterator<Item = String> + '_> = match &self.data {
            ColumnData::Numeric(values) => Box::new(values.iter().flatten().map(|v| v.to_string())),
            ColumnData::Categorical(values) => {
                Box::new(values.iter().filter(|v| !v.is_empty()).cloned())
            }
        };
        for value in rendered {
            if !seen.contains(&value) {
                seen.push(value);
            }
        }
        seen
    }
}

/// Immutable in-memory table
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Load a CSV file and check that every form column is present
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(BufReader::new(file)).map_err(|e| match e {
            DatasetError::Io { source, .. } => DatasetError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        dataset.require_columns(&FORM_COLUMNS)?;

        info!(
            path = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.columns.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Parse CSV text with a header row
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DatasetError> {
        let mut header: Option<Vec<String>> = None;
        let mut cells: Vec<Vec<String>> = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|source| DatasetError::Io {
                path: PathBuf::new(),
                source,
            })?;
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let fields = split_record(line, line_no)?;
            match &header {
                None => {
                    let names: Vec<String> = fields.iter().map(|f| f.trim().to_string()).collect();
                    for (idx, name) in names.iter().enumerate() {
                        if names[..idx].contains(name) {
                            return Err(DatasetError::DuplicateColumn(name.clone()));
                        }
                    }
                    cells = vec![Vec::new(); names.len()];
                    header = Some(names);
                }
                Some(names) => {
                    if fields.len() != names.len() {
                        return Err(DatasetError::FieldCount {
                            line: line_no,
                            expected: names.len(),
                            found: fields.len(),
                        });
                    }
                    for (column, field) in cells.iter_mut().zip(fields) {
                        column.push(field);
                    }
                }
            }
        }

        let names = header.ok_or(DatasetError::Empty)?;
        let rows = cells.first().map(Vec::len).unwrap_or(0);
        let columns = names
            .into_iter()
            .zip(cells)
            .map(|(name, raw)| Column {
                data: infer_column(raw),
                name,
            })
            .collect::<Vec<_>>();

        debug!(rows, columns = columns.len(), "Parsed CSV dataset");
        Ok(Self { columns, rows })
    }

    pub fn require_columns(&self, names: &[&str]) -> Result<(), DatasetError> {
        for name in names {
            if self.column(name).is_none() {
                return Err(DatasetError::MissingColumn(name.to_string()));
            }
        }
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.names_of_kind(ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.names_of_kind(ColumnKind::Categorical)
    }

    /// Distinct values of `name` in first-seen order, empty if the column is absent
    pub fn distinct_values(&self, name: &str) -> Vec<String> {
        self.column(name)
            .map(Column::distinct_values)
            .unwrap_or_default()
    }

    fn names_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind() == kind)
            .map(|c| c.name.clone())
            .collect()
    }
}

/// A column is numeric when it has at least one value and every non-empty cell parses
fn infer_column(raw: Vec<String>) -> ColumnData {
    let mut parsed = Vec::with_capacity(raw.len());
    let mut any_value = false;

    for cell in &raw {
        let cell = cell.trim();
        if cell.is_empty() {
            parsed.push(None);
            continue;
        }
        match cell.parse::<f64>() {
            Ok(v) => {
                any_value = true;
                parsed.push(Some(v));
            }
            Err(_) => return ColumnData::Categorical(raw),
        }
    }

    if any_value {
        ColumnData::Numeric(parsed)
    } else {
        ColumnData::Categorical(raw)
    }
}

/// Split one CSV record, honouring double quotes and `""` escapes
fn split_record(line: &str, line_no: usize) -> Result<Vec<String>, DatasetError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(DatasetError::UnterminatedQuote { line: line_no });
    }
    fields.push(current);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "age,sex,bmi,children,smoker,region,charges\n\
19,female,27.9,0,yes,southwest,16884.924\n\
18,male,33.77,1,no,southeast,1725.5523\n\
28,male,33.0,3,no,southeast,4449.462\n\
33,male,22.705,0,no,northwest,21984.47061\n";

    fn sample() -> Dataset {
        Dataset::from_reader(Cursor::new(SAMPLE)).unwrap()
    }

    #[test]
    fn test_parse_infers_column_kinds() {
        let ds = sample();
        assert_eq!(ds.row_count(), 4);
        assert_eq!(ds.numeric_columns(), vec!["age", "bmi", "children", "charges"]);
        assert_eq!(ds.categorical_columns(), vec!["sex", "smoker", "region"]);
    }

    #[test]
    fn test_distinct_values_keep_first_seen_order() {
        let ds = sample();
        assert_eq!(ds.distinct_values("sex"), vec!["female", "male"]);
        assert_eq!(ds.distinct_values("smoker"), vec!["yes", "no"]);
        assert_eq!(ds.distinct_values("region"), vec!["southwest", "southeast", "northwest"]);
        assert!(ds.distinct_values("planet").is_empty());
    }

    #[test]
    fn test_field_count_mismatch_is_rejected() {
        let text = "age,sex\n30,female\n31\n";
        let err = Dataset::from_reader(Cursor::new(text)).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::FieldCount { line: 3, expected: 2, found: 1 }
        ));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = Dataset::from_reader(Cursor::new("\n\n")).unwrap_err();
        assert!(matches!(err, DatasetError::Empty));
    }

    #[test]
    fn test_quoted_fields() {
        let text = "name,note\n\"Smith, J\",\"said \"\"hi\"\"\"\n";
        let ds = Dataset::from_reader(Cursor::new(text)).unwrap();
        let names = ds.column("name").unwrap().as_categorical().unwrap();
        assert_eq!(names[0], "Smith, J");
        let notes = ds.column("note").unwrap().as_categorical().unwrap();
        assert_eq!(notes[0], "said \"hi\"");
    }

    #[test]
    fn test_unterminated_quote() {
        let text = "a,b\n\"open,1\n";
        let err = Dataset::from_reader(Cursor::new(text)).unwrap_err();
        assert!(matches!(err, DatasetError::UnterminatedQuote { line: 2 }));
    }

    #[test]
    fn test_missing_numeric_cells() {
        let text = "age,bmi\n30,\n40,22.5\n";
        let ds = Dataset::from_reader(Cursor::new(text)).unwrap();
        let bmi = ds.column("bmi").unwrap().as_numeric().unwrap();
        assert_eq!(bmi, &[None, Some(22.5)]);
        assert_eq!(ds.column("bmi").unwrap().json_value(0), Value::Null);
    }

    #[test]
    fn test_require_columns() {
        let ds = Dataset::from_reader(Cursor::new("age,sex\n30,male\n")).unwrap();
        let err = ds.require_columns(&FORM_COLUMNS).unwrap_err();
        assert!(matches!(err, DatasetError::MissingColumn(ref c) if c == "bmi"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Dataset::load(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }

    #[test]
    fn test_duplicate_column() {
        let err = Dataset::from_reader(Cursor::new("age,age\n1,2\n")).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateColumn(ref c) if c == "age"));
    }
}
