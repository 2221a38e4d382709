use std::io;

use crate::MAGIC_SIZE;

/// Why a byte range was rejected as a Parquet container.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContainerDefect {
    #[error("too small, {length} bytes")]
    TooSmall { length: u64 },

    #[error("expected magic number at tail {expected:?} but found {actual:?}")]
    TailMagic {
        expected: [u8; MAGIC_SIZE],
        actual: [u8; MAGIC_SIZE],
    },

    #[error("expected magic number at head {expected:?} but found {actual:?}")]
    HeadMagic {
        expected: [u8; MAGIC_SIZE],
        actual: [u8; MAGIC_SIZE],
    },
}

#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    /// The byte source could not be drained when the buffer was built.
    #[error("Failed to materialize byte source: {0}")]
    SourceUnavailable(#[source] io::Error),

    #[error("Incorrect seek position: {offset}, buffer length: {length}")]
    OutOfRange { offset: u64, length: u64 },

    /// A read asked for more bytes than remain after the cursor.
    #[error("Unexpected end of data: stream size: {length} pos: {position} len: {requested}")]
    EndOfData {
        position: u64,
        requested: u64,
        length: u64,
    },

    #[error("{name} is not a Parquet file ({reason})")]
    InvalidContainer {
        name: String,
        reason: ContainerDefect,
    },

    #[error(
        "Corrupted file: the footer index {footer_start} is not within the file of length {file_length}"
    )]
    CorruptedTrailer { footer_start: i64, file_length: u64 },
}

impl From<FormatError> for io::Error {
    fn from(err: FormatError) -> Self {
        let kind = match &err {
            FormatError::SourceUnavailable(inner) => inner.kind(),
            FormatError::OutOfRange { .. } => io::ErrorKind::InvalidInput,
            FormatError::EndOfData { .. } => io::ErrorKind::UnexpectedEof,
            FormatError::InvalidContainer { .. } | FormatError::CorruptedTrailer { .. } => {
                io::ErrorKind::InvalidData
            }
        };
        io::Error::new(kind, err)
    }
}
