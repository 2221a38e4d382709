//! Reading the footer of a Parquet file from a forward-only source.
use std::{collections::HashMap, io::Read};

use parquet::{
    file::metadata::{FileMetaData, ParquetMetaData, RowGroupMetaData},
    schema::types::{ColumnDescPtr, ColumnPath},
};
use parquet_stream_format::{FooterLocator, StreamBuffer};

use crate::{
    decoder::{MetadataDecoder, ParquetMetadataDecoder, RowGroupFilter},
    error::ParquetStreamError,
};

/// Drain `source` and decode the footer of the Parquet file it contains,
/// keeping the row groups selected by `filter`.
///
/// The source is dropped once the footer has been read.
pub fn read_footer<R: Read>(
    source: R,
    filter: &RowGroupFilter,
) -> Result<ParquetMetaData, ParquetStreamError> {
    let mut buffer = StreamBuffer::new(source)?;
    read_footer_from(&mut buffer, filter)
}

/// [`read_footer`] for a source that was already materialized.
pub fn read_footer_from<R>(
    buffer: &mut StreamBuffer<R>,
    filter: &RowGroupFilter,
) -> Result<ParquetMetaData, ParquetStreamError> {
    read_footer_with(buffer, &FooterLocator::new(), &ParquetMetadataDecoder, filter)
}

/// Locate the footer with `locator` and hand the positioned buffer to
/// `decoder`. The decoder only runs once the trailer has been validated.
pub fn read_footer_with<R, D>(
    buffer: &mut StreamBuffer<R>,
    locator: &FooterLocator<'_>,
    decoder: &D,
    filter: &D::Filter,
) -> Result<D::Metadata, ParquetStreamError>
where
    D: MetadataDecoder,
{
    let span = locator.locate_footer(buffer)?;
    decoder.decode(buffer, &span, filter)
}

/// A materialized Parquet file together with its decoded footer.
pub struct ParquetStreamReader<R> {
    buffer: StreamBuffer<R>,
    metadata: ParquetMetaData,
    paths: HashMap<ColumnPath, ColumnDescPtr>,
}

impl<R: Read> ParquetStreamReader<R> {
    pub fn from_reader(source: R, filter: &RowGroupFilter) -> Result<Self, ParquetStreamError> {
        let mut buffer = StreamBuffer::new(source)?;
        let metadata = read_footer_from(&mut buffer, filter)?;
        Ok(Self::new(buffer, metadata))
    }
}

impl<R> ParquetStreamReader<R> {
    /// Pair a buffer with a footer that was already read from it.
    pub fn new(buffer: StreamBuffer<R>, metadata: ParquetMetaData) -> Self {
        let paths = metadata
            .file_metadata()
            .schema_descr()
            .columns()
            .iter()
            .map(|column| (column.path().clone(), column.clone()))
            .collect();
        Self {
            buffer,
            metadata,
            paths,
        }
    }

    pub fn metadata(&self) -> &ParquetMetaData {
        &self.metadata
    }

    pub fn file_metadata(&self) -> &FileMetaData {
        self.metadata.file_metadata()
    }

    pub fn row_groups(&self) -> &[RowGroupMetaData] {
        self.metadata.row_groups()
    }

    /// Leaf columns in schema order.
    pub fn columns(&self) -> &[ColumnDescPtr] {
        self.file_metadata().schema_descr().columns()
    }

    pub fn column(&self, path: &ColumnPath) -> Result<&ColumnDescPtr, ParquetStreamError> {
        self.paths
            .get(path)
            .ok_or_else(|| ParquetStreamError::MissingColumn(path.clone()))
    }

    pub fn buffer_mut(&mut self) -> &mut StreamBuffer<R> {
        &mut self.buffer
    }

    /// Drop the materialized file and return the source it was drained from.
    pub fn close(self) -> R {
        self.buffer.close()
    }
}
