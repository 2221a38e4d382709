//! Turning located footer bytes into metadata.
use std::collections::BTreeSet;

use parquet::file::metadata::{ParquetMetaData, ParquetMetaDataReader, RowGroupMetaData};
use parquet_stream_format::{FooterSpan, StreamBuffer};

use crate::error::ParquetStreamError;

/// Decodes the footer of a located container.
///
/// `decode` is called with the buffer positioned at
/// [`FooterSpan::footer_start`]. Errors raised by the buffer while the decoder
/// consumes it must be passed through as [`ParquetStreamError::Format`].
pub trait MetadataDecoder {
    type Metadata;
    /// Selection handed through untouched from the caller.
    type Filter;

    fn decode<R>(
        &self,
        buffer: &mut StreamBuffer<R>,
        span: &FooterSpan,
        filter: &Self::Filter,
    ) -> Result<Self::Metadata, ParquetStreamError>;
}

/// Which row groups to keep from a decoded footer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RowGroupFilter {
    #[default]
    NoFilter,
    /// Keep the schema and file metadata only.
    SkipRowGroups,
    /// Keep row groups whose midpoint lies in `[start, end)`, useful for
    /// splitting one file between several readers by byte range.
    Range { start: i64, end: i64 },
    /// Keep row groups starting at one of these offsets.
    Offsets(BTreeSet<i64>),
}

impl RowGroupFilter {
    pub fn range(start: i64, end: i64) -> Self {
        Self::Range { start, end }
    }

    pub fn offsets(offsets: impl IntoIterator<Item = i64>) -> Self {
        Self::Offsets(offsets.into_iter().collect())
    }

    pub fn keeps(&self, row_group: &RowGroupMetaData) -> bool {
        match self {
            Self::NoFilter => true,
            Self::SkipRowGroups => false,
            Self::Range { start, end } => {
                let midpoint = row_group_midpoint(row_group);
                *start <= midpoint && midpoint < *end
            }
            Self::Offsets(offsets) => offsets.contains(&row_group_start(row_group)),
        }
    }

    pub fn apply(&self, metadata: ParquetMetaData) -> ParquetMetaData {
        if *self == Self::NoFilter {
            return metadata;
        }
        let row_groups = metadata
            .row_groups()
            .iter()
            .filter(|row_group| self.keeps(row_group))
            .cloned()
            .collect();
        ParquetMetaData::new(metadata.file_metadata().clone(), row_groups)
    }
}

/// File offset of the first page of a row group.
///
/// That is the dictionary page of the first column when it precedes the
/// first data page, otherwise the first data page.
pub fn row_group_start(row_group: &RowGroupMetaData) -> i64 {
    match row_group.columns().first() {
        Some(column) => {
            let data_page = column.data_page_offset();
            match column.dictionary_page_offset() {
                Some(dictionary) if dictionary > 0 && dictionary < data_page => dictionary,
                _ => data_page,
            }
        }
        None => row_group.file_offset().unwrap_or(0),
    }
}

pub fn row_group_midpoint(row_group: &RowGroupMetaData) -> i64 {
    row_group_start(row_group) + row_group.compressed_size() / 2
}

/// Decodes Thrift `FileMetaData` footers with the `parquet` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParquetMetadataDecoder;

impl MetadataDecoder for ParquetMetadataDecoder {
    type Metadata = ParquetMetaData;
    type Filter = RowGroupFilter;

    fn decode<R>(
        &self,
        buffer: &mut StreamBuffer<R>,
        span: &FooterSpan,
        filter: &RowGroupFilter,
    ) -> Result<ParquetMetaData, ParquetStreamError> {
        let footer = buffer.read_exact(span.footer_length() as usize)?;
        let metadata = ParquetMetaDataReader::decode_metadata(footer)?;
        Ok(filter.apply(metadata))
    }
}
