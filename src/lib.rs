//! Read Parquet footers from byte sources that cannot seek.
//!
//! Parquet keeps its metadata at the end of the file, so readers normally
//! need random access. This crate drains a plain [`std::io::Read`] into a
//! [`StreamBuffer`], validates the trailer with a [`FooterLocator`] and hands
//! the footer bytes to a [`MetadataDecoder`], by default the `parquet` crate's
//! Thrift decoder.
pub use parquet;
pub use parquet_stream_format as format;
pub use parquet_stream_format::{
    ContainerDefect, FooterLocator, FooterSpan, FormatError, StreamBuffer, MAGIC,
};

pub mod decoder;
pub mod error;
pub mod reader;

pub use decoder::{MetadataDecoder, ParquetMetadataDecoder, RowGroupFilter};
pub use error::ParquetStreamError;
pub use reader::{read_footer, read_footer_from, read_footer_with, ParquetStreamReader};

#[cfg(test)]
mod test_util;

#[cfg(doctest)]
doc_comment::doctest!("../README.md", readme);
