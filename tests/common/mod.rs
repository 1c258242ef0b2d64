#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const THREE_PASSENGERS: &str = "\
PassengerId,Name,Fare
1,Braund,10
2,Cumings,20
3,Heikkinen,70
";

pub fn write_csv(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("titanic.csv");
    fs::write(&path, contents).unwrap();
    path
}

pub fn write_sqlite(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("titanic.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE titanic (PassengerId INTEGER, Name TEXT, Fare REAL);
         INSERT INTO titanic VALUES (1, 'Braund', 10.0);
         INSERT INTO titanic VALUES (2, 'Cumings', 20.0);
         INSERT INTO titanic VALUES (3, 'Heikkinen', 70.0);",
    )
    .unwrap();
    path
}

pub fn csv_config(dir: &TempDir, csv: &Path) -> PathBuf {
    write_config(dir, serde_json::json!({ "data_source": "csv", "csv_file_path": csv }))
}

pub fn sqlite_config(dir: &TempDir, db: &Path) -> PathBuf {
    write_config(dir, serde_json::json!({ "data_source": "sqlite", "sqlite_db_file": db }))
}

fn write_config(dir: &TempDir, config: serde_json::Value) -> PathBuf {
    let path = dir.path().join("data_config.json");
    fs::write(&path, config.to_string()).unwrap();
    path
}
