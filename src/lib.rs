pub mod chart;
pub mod config;
pub mod csv_reader;
pub mod dataset;
pub mod error;
pub mod histogram;
pub mod server;
pub mod source;
pub mod sqlite_reader;

pub use config::DataConfig;
pub use dataset::{DataSet, Record, Value};
pub use error::{PassengerError, Result};
pub use source::DataSource;
