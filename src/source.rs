use std::path::PathBuf;

use tracing::info;

use crate::dataset::DataSet;
use crate::error::Result;
use crate::{csv_reader, sqlite_reader};

/// Where a request's passenger table comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Csv { path: PathBuf },
    Sqlite { path: PathBuf, table: String },
}

impl DataSource {
    /// Materializes the whole table. Nothing is returned on failure.
    pub fn load(&self) -> Result<DataSet> {
        let dataset = match self {
            DataSource::Csv { path } => csv_reader::read_data(path)?,
            DataSource::Sqlite { path, table } => {
                let conn = sqlite_reader::open(path)?;
                sqlite_reader::read_table(conn, table)?
            }
        };
        info!(source = ?self, rows = dataset.len(), "loaded passenger data");
        Ok(dataset)
    }
}
