use std::path::Path;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, warn};

use crate::dataset::{DataSet, Value};
use crate::error::{PassengerError, Result};

pub fn open(path: &Path) -> Result<Connection> {
    if !path.exists() {
        return Err(PassengerError::SourceNotFound(path.to_path_buf()));
    }
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Ok(Connection::open_with_flags(path, flags)?)
}

/// Reads every row of `table` and closes the connection, on success or failure.
pub fn read_table(conn: Connection, table: &str) -> Result<DataSet> {
    let result = select_all(&conn, table);
    if let Err((_, e)) = conn.close() {
        warn!(error = %e, "failed to close sqlite connection");
    }
    let dataset = result?;
    debug!(table, rows = dataset.len(), "read sqlite table");
    Ok(dataset)
}

fn select_all(conn: &Connection, table: &str) -> Result<DataSet> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_identifier(table)))?;
    let columns = stmt
        .column_names()
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            (0..width)
                .map(|idx| row.get_ref(idx).map(to_value))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(DataSet::new(columns, rows))
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        ValueRef::Text(t) | ValueRef::Blob(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_db(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("titanic.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE titanic (PassengerId INTEGER, Name TEXT, Fare REAL, Cabin TEXT);
             INSERT INTO titanic VALUES (1, 'Braund', 7.25, NULL);
             INSERT INTO titanic VALUES (2, 'Cumings', 71.2833, 'C85');",
        )
        .unwrap();
        path
    }

    #[test]
    fn reads_rows_with_storage_types() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open(&manifest_db(&dir)).unwrap();
        let data = read_table(conn, "titanic").unwrap();
        assert_eq!(data.columns(), ["PassengerId", "Name", "Fare", "Cabin"]);
        let records = data.list_all();
        assert_eq!(records[0].get("Cabin"), Some(&Value::Null));
        assert_eq!(records[1].get("Fare"), Some(&Value::Real(71.2833)));
        assert_eq!(records[1].get("PassengerId"), Some(&Value::Integer(2)));
    }

    #[test]
    fn unknown_table_is_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open(&manifest_db(&dir)).unwrap();
        let err = read_table(conn, "passengers").unwrap_err();
        assert!(matches!(err, PassengerError::Query(_)));
    }

    #[test]
    fn table_name_cannot_break_out_of_identifier() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open(&manifest_db(&dir)).unwrap();
        assert!(read_table(conn, "titanic\"; DROP TABLE titanic; --").is_err());
    }

    #[test]
    fn missing_database_is_source_not_found() {
        let err = open(Path::new("/nonexistent/titanic.db")).unwrap_err();
        assert!(matches!(err, PassengerError::SourceNotFound(_)));
    }
}
