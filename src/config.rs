use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{PassengerError, Result};
use crate::source::DataSource;

pub const DEFAULT_SQLITE_TABLE: &'static str = "titanic";

fn default_sqlite_table() -> String {
    DEFAULT_SQLITE_TABLE.to_string()
}

/// Contents of the data config file. Keys belonging to the other source are
/// ignored, so one file can carry both paths.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "data_source", rename_all = "lowercase")]
pub enum DataConfig {
    Csv {
        csv_file_path: PathBuf,
    },
    Sqlite {
        sqlite_db_file: PathBuf,
        #[serde(default = "default_sqlite_table")]
        sqlite_table: String,
    },
}

impl DataConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_error = |message: String| PassengerError::Config {
            path: path.to_path_buf(),
            message,
        };
        let contents = fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| config_error(e.to_string()))
    }

    pub fn source(&self) -> DataSource {
        match self {
            DataConfig::Csv { csv_file_path } => DataSource::Csv {
                path: csv_file_path.clone(),
            },
            DataConfig::Sqlite {
                sqlite_db_file,
                sqlite_table,
            } => DataSource::Sqlite {
                path: sqlite_db_file.clone(),
                table: sqlite_table.clone(),
            },
        }
    }
}
