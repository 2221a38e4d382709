use std::io;

use parquet::{errors::ParquetError, schema::types::ColumnPath};
use parquet_stream_format::FormatError;

#[derive(Debug, thiserror::Error)]
pub enum ParquetStreamError {
    #[error("Format Error: {0}")]
    Format(#[from] FormatError),

    /// The footer bytes were located but could not be decoded.
    #[error("Failed to decode footer metadata: {0}")]
    Metadata(#[from] ParquetError),

    #[error("IO Error: {0}")]
    IOError(#[from] io::Error),

    #[error("Missing column {0} from file schema")]
    MissingColumn(ColumnPath),
}
