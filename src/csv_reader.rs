use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::dataset::{DataSet, Value};
use crate::error::{PassengerError, Result};

#[derive(Clone, Copy, PartialEq, Debug)]
enum ColumnKind {
    Integer,
    Real,
    Text,
}

pub fn read_data(path: &Path) -> Result<DataSet> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => PassengerError::SourceNotFound(path.to_path_buf()),
        _ => PassengerError::parse(path, e),
    })?;
    let dataset = read_from(path, file)?;
    debug!(path = %path.display(), rows = dataset.len(), "read csv data");
    Ok(dataset)
}

fn read_from<R: Read>(path: &Path, reader: R) -> Result<DataSet> {
    let mut rdr = csv::Reader::from_reader(reader);
    let columns = rdr
        .headers()
        .map_err(|e| PassengerError::parse(path, e))?
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    if columns.is_empty() {
        return Err(PassengerError::parse(path, "missing header row"));
    }

    let mut cells = Vec::<csv::StringRecord>::new();
    for result in rdr.records() {
        cells.push(result.map_err(|e| PassengerError::parse(path, e))?);
    }

    let kinds = (0..columns.len())
        .map(|idx| infer_kind(cells.iter().map(|row| &row[idx])))
        .collect::<Vec<_>>();

    let rows = cells
        .iter()
        .map(|row| {
            row.iter()
                .zip(&kinds)
                .map(|(cell, kind)| typed_value(cell, *kind))
                .collect()
        })
        .collect();
    Ok(DataSet::new(columns, rows))
}

/// A column is numeric only when every non-empty cell parses.
fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut kind = ColumnKind::Integer;
    for cell in cells.filter(|c| !c.is_empty()) {
        if kind == ColumnKind::Integer && cell.parse::<i64>().is_err() {
            kind = ColumnKind::Real;
        }
        if kind == ColumnKind::Real && cell.parse::<f64>().is_err() {
            return ColumnKind::Text;
        }
    }
    kind
}

/// Empty and non-finite (`NaN`, `inf`) cells are missing values.
fn typed_value(cell: &str, kind: ColumnKind) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    match kind {
        ColumnKind::Integer => cell.parse().map(Value::Integer).unwrap_or(Value::Null),
        ColumnKind::Real => match cell.parse::<f64>() {
            Ok(r) if r.is_finite() => Value::Real(r),
            _ => Value::Null,
        },
        ColumnKind::Text => Value::Text(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &[u8]) -> Result<DataSet> {
        read_from(Path::new("titanic.csv"), contents)
    }

    const MANIFEST: &str = "\
PassengerId,Survived,Name,Age,Fare,Cabin
1,0,\"Braund, Mr. Owen Harris\",22,7.25,
2,1,\"Cumings, Mrs. John Bradley\",38,71.2833,C85
3,1,\"Heikkinen, Miss. Laina\",,7.925,
";

    #[test]
    fn infers_column_types() {
        let data = parse(MANIFEST.as_bytes()).unwrap();
        assert_eq!(data.columns(), ["PassengerId", "Survived", "Name", "Age", "Fare", "Cabin"]);
        let records = data.list_all();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get("PassengerId"), Some(&Value::Integer(1)));
        assert_eq!(records[0].get("Name"), Some(&Value::Text("Braund, Mr. Owen Harris".into())));
        assert_eq!(records[1].get("Fare"), Some(&Value::Real(71.2833)));
        assert_eq!(records[2].get("Age"), Some(&Value::Null));
        assert_eq!(records[1].get("Cabin"), Some(&Value::Text("C85".into())));
    }

    #[test]
    fn mixed_integer_and_real_cells_become_real() {
        let data = parse(b"Fare\n10\n2.5\n").unwrap();
        let fares = data.column_values("Fare").unwrap().cloned().collect::<Vec<_>>();
        assert_eq!(fares, vec![Value::Real(10.0), Value::Real(2.5)]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse(b"a,b\n1,2\n3\n").unwrap_err();
        assert!(matches!(err, PassengerError::Parse { .. }));
    }

    #[test]
    fn empty_file_has_no_header() {
        let err = parse(b"").unwrap_err();
        assert!(matches!(err, PassengerError::Parse { message, .. } if message.contains("header")));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = parse(b"PassengerId,Name\n1,\xff\xfe\n").unwrap_err();
        assert!(matches!(err, PassengerError::Parse { .. }));
    }

    #[test]
    fn non_finite_reals_are_missing() {
        let data = parse(b"PassengerId,Fare\n1,10\n2,NaN\n3,inf\n4,30.5\n").unwrap();
        let fares = data.column_values("Fare").unwrap().cloned().collect::<Vec<_>>();
        assert_eq!(
            fares,
            vec![Value::Real(10.0), Value::Null, Value::Null, Value::Real(30.5)]
        );
    }

    #[test]
    fn missing_file_is_source_not_found() {
        let err = read_data(Path::new("/nonexistent/titanic.csv")).unwrap_err();
        assert!(matches!(err, PassengerError::SourceNotFound(_)));
    }
}
