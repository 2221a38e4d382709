//! Container-level plumbing for reading Parquet files from forward-only
//! sources.
//!
//! A Parquet file can only be decoded by jumping to its tail, so a plain
//! [`std::io::Read`] (stdin, a socket, an HTTP body) is first drained into a
//! [`StreamBuffer`]. The [`FooterLocator`] then validates the trailer and
//! leaves the buffer positioned at the start of the serialized footer, ready
//! for a metadata decoder.
mod error;
pub mod buffer;
pub mod footer;

pub use buffer::StreamBuffer;
pub use error::{ContainerDefect, FormatError};
pub use footer::{FooterLocator, FooterSpan};

/// Magic number written at both ends of a Parquet file.
pub const MAGIC: [u8; 4] = *b"PAR1";

pub const MAGIC_SIZE: usize = MAGIC.len();

/// Size of the little-endian footer length stored just before the tail magic.
pub const FOOTER_LENGTH_SIZE: usize = 4;

pub fn valid_magic(buf: &[u8]) -> bool {
    buf == MAGIC
}
