use std::{fmt, ops::Range};

use log::{Level, Log, Metadata, Record};

use crate::{
    ContainerDefect, FOOTER_LENGTH_SIZE, FormatError, MAGIC, MAGIC_SIZE, StreamBuffer, valid_magic,
};

/// Location of the serialized footer inside a Parquet file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FooterSpan {
    footer_start: u64,
    footer_length: u64,
    total_length: u64,
}

impl FooterSpan {
    pub fn new(footer_start: u64, footer_length: u64, total_length: u64) -> Self {
        Self {
            footer_start,
            footer_length,
            total_length,
        }
    }

    pub fn footer_start(&self) -> u64 {
        self.footer_start
    }

    pub fn footer_length(&self) -> u64 {
        self.footer_length
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Offset of the 4-byte footer length, right after the footer body.
    pub fn length_field_offset(&self) -> u64 {
        self.footer_start + self.footer_length
    }

    pub fn range(&self) -> Range<u64> {
        self.footer_start..self.length_field_offset()
    }
}

/// Finds and validates the footer of a Parquet file held in a
/// [`StreamBuffer`].
///
/// The tail of a file is laid out as:
/// ```text
/// <footer: serialized FileMetaData>
/// <footer length: 4 bytes little-endian unsigned integer>
/// <magic: "PAR1">
/// ```
///
/// Diagnostics go to the injected [`Log`] handle, which defaults to whatever
/// logger the process installed.
pub struct FooterLocator<'a> {
    logger: &'a dyn Log,
    require_header_magic: bool,
}

impl Default for FooterLocator<'static> {
    fn default() -> Self {
        Self {
            logger: log::logger(),
            require_header_magic: false,
        }
    }
}

impl FooterLocator<'static> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<'a> FooterLocator<'a> {
    pub fn with_logger<'b>(self, logger: &'b dyn Log) -> FooterLocator<'b> {
        FooterLocator {
            logger,
            require_header_magic: self.require_header_magic,
        }
    }

    /// Also check the magic number at offset 0.
    pub fn require_header_magic(mut self, require: bool) -> Self {
        self.require_header_magic = require;
        self
    }

    /// [`FooterLocator::locate`] using the buffer's own length.
    pub fn locate_footer<R>(&self, buffer: &mut StreamBuffer<R>) -> Result<FooterSpan, FormatError> {
        let total_length = buffer.len();
        self.locate(buffer, total_length)
    }

    /// Validate the trailer of a file of `total_length` bytes and leave
    /// `buffer` positioned at the first byte of the footer.
    ///
    /// Nothing is handed on unless every check passes: a short file, a bad
    /// magic number, or a footer length pointing outside the file all fail
    /// here.
    pub fn locate<R>(
        &self,
        buffer: &mut StreamBuffer<R>,
        total_length: u64,
    ) -> Result<FooterSpan, FormatError> {
        self.debug(format_args!("File length {total_length}"));
        // MAGIC + data + footer + footer length + MAGIC
        if total_length < (MAGIC_SIZE + FOOTER_LENGTH_SIZE + MAGIC_SIZE) as u64 {
            return Err(FormatError::InvalidContainer {
                name: buffer.name().to_string(),
                reason: ContainerDefect::TooSmall {
                    length: total_length,
                },
            });
        }

        if self.require_header_magic {
            buffer.seek(0)?;
            let actual = read_magic(buffer)?;
            if !valid_magic(&actual) {
                return Err(FormatError::InvalidContainer {
                    name: buffer.name().to_string(),
                    reason: ContainerDefect::HeadMagic {
                        expected: MAGIC,
                        actual,
                    },
                });
            }
        }

        let length_field_offset = total_length - (FOOTER_LENGTH_SIZE + MAGIC_SIZE) as u64;
        self.debug(format_args!("reading footer index at {length_field_offset}"));
        buffer.seek(length_field_offset)?;
        let footer_length = buffer.read_u32_le()?;

        let actual = read_magic(buffer)?;
        if !valid_magic(&actual) {
            return Err(FormatError::InvalidContainer {
                name: buffer.name().to_string(),
                reason: ContainerDefect::TailMagic {
                    expected: MAGIC,
                    actual,
                },
            });
        }

        let footer_start = length_field_offset as i64 - i64::from(footer_length);
        self.debug(format_args!(
            "read footer length: {footer_length}, footer index: {footer_start}"
        ));
        if footer_start < MAGIC_SIZE as i64 || footer_start >= length_field_offset as i64 {
            return Err(FormatError::CorruptedTrailer {
                footer_start,
                file_length: total_length,
            });
        }

        let footer_start = footer_start as u64;
        buffer.seek(footer_start)?;
        Ok(FooterSpan::new(
            footer_start,
            u64::from(footer_length),
            total_length,
        ))
    }

    fn debug(&self, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder()
            .level(Level::Debug)
            .target(module_path!())
            .build();
        if self.logger.enabled(&metadata) {
            self.logger.log(
                &Record::builder()
                    .metadata(metadata)
                    .args(args)
                    .module_path_static(Some(module_path!()))
                    .file_static(Some(file!()))
                    .build(),
            );
        }
    }
}

fn read_magic<R>(buffer: &mut StreamBuffer<R>) -> Result<[u8; MAGIC_SIZE], FormatError> {
    let mut magic = [0u8; MAGIC_SIZE];
    magic.copy_from_slice(buffer.read_exact(MAGIC_SIZE)?);
    Ok(magic)
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;

    /// `MAGIC || body || footer || u32_le(footer.len()) || MAGIC`
    fn container(body: &[u8], footer: &[u8]) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(body);
        out.extend_from_slice(footer);
        out.extend_from_slice(&(footer.len() as u32).to_le_bytes());
        out.extend_from_slice(&MAGIC);
        out
    }

    fn with_footer_length(mut data: Vec<u8>, footer_length: u32) -> Vec<u8> {
        let at = data.len() - FOOTER_LENGTH_SIZE - MAGIC_SIZE;
        data[at..at + FOOTER_LENGTH_SIZE].copy_from_slice(&footer_length.to_le_bytes());
        data
    }

    #[derive(Default)]
    struct Capture(Mutex<Vec<String>>);

    impl Log for Capture {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= Level::Debug
        }

        fn log(&self, record: &Record) {
            self.0.lock().unwrap().push(record.args().to_string());
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_locate() -> eyre::Result<()> {
        let data = container(&[b'X'; 100], &[b'F'; 50]);
        assert_eq!(data.len(), 162);

        let mut buffer = StreamBuffer::from_bytes(data);
        let span = FooterLocator::new().locate(&mut buffer, 162)?;
        assert_eq!(span, FooterSpan::new(104, 50, 162));
        assert_eq!(span.length_field_offset(), 154);
        assert_eq!(span.range(), 104..154);
        assert_eq!(buffer.position(), 104);
        assert_eq!(buffer.read_exact(50)?, &[b'F'; 50]);
        Ok(())
    }

    #[test]
    fn test_locate_footer_start_formula() -> eyre::Result<()> {
        for (body, footer) in [(0usize, 1usize), (3, 17), (250, 4096)] {
            let data = container(&vec![0x11; body], &vec![0x22; footer]);
            let length = data.len() as u64;
            let mut buffer = StreamBuffer::from_bytes(data);
            let span = FooterLocator::new().locate_footer(&mut buffer)?;
            assert_eq!(
                span.footer_start(),
                length - 4 - MAGIC_SIZE as u64 - footer as u64
            );
            assert_eq!(span.footer_length(), footer as u64);
        }
        Ok(())
    }

    #[test]
    fn test_too_small() {
        let mut buffer = StreamBuffer::from_bytes(b"PAR1\0\0\0PAR1".to_vec()).with_name("tiny");
        let err = FooterLocator::new().locate_footer(&mut buffer).unwrap_err();
        match err {
            FormatError::InvalidContainer { name, reason } => {
                assert_eq!(name, "tiny");
                assert_eq!(reason, ContainerDefect::TooSmall { length: 11 });
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Rejected before any seek.
        assert_eq!(buffer.position(), 0);
    }

    #[test]
    fn test_tail_magic_mismatch() {
        let mut data = container(b"body", b"footer");
        let n = data.len();
        data[n - MAGIC_SIZE..].copy_from_slice(b"PAR0");
        let mut buffer = StreamBuffer::from_bytes(data).with_name("s3://bucket/key");

        let err = FooterLocator::new().locate_footer(&mut buffer).unwrap_err();
        assert!(err.to_string().starts_with("s3://bucket/key is not a Parquet file"));
        match err {
            FormatError::InvalidContainer { reason, .. } => assert_eq!(
                reason,
                ContainerDefect::TailMagic {
                    expected: *b"PAR1",
                    actual: *b"PAR0"
                }
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_corrupted_footer_length() {
        let data = container(&[0u8; 10], &[1u8; 10]);
        let length_field_offset = (data.len() - 8) as u32;

        // One byte too long reaches into the leading magic.
        let data = with_footer_length(data, length_field_offset - MAGIC_SIZE as u32 + 1);
        let mut buffer = StreamBuffer::from_bytes(data);
        let err = FooterLocator::new().locate_footer(&mut buffer).unwrap_err();
        assert!(matches!(
            err,
            FormatError::CorruptedTrailer {
                footer_start: 3,
                file_length: 32
            }
        ));
    }

    #[test]
    fn test_footer_length_extremes() {
        let data = container(&[0u8; 10], &[1u8; 10]);

        let mut buffer = StreamBuffer::from_bytes(with_footer_length(data.clone(), 0));
        let err = FooterLocator::new().locate_footer(&mut buffer).unwrap_err();
        assert!(matches!(
            err,
            FormatError::CorruptedTrailer {
                footer_start: 24,
                ..
            }
        ));

        let mut buffer = StreamBuffer::from_bytes(with_footer_length(data, u32::MAX));
        let err = FooterLocator::new().locate_footer(&mut buffer).unwrap_err();
        assert!(matches!(err, FormatError::CorruptedTrailer { .. }));
    }

    #[test]
    fn test_smallest_valid_file() -> eyre::Result<()> {
        // One footer byte, no body.
        let mut buffer = StreamBuffer::from_bytes(container(&[], &[0x15]));
        let span = FooterLocator::new().locate_footer(&mut buffer)?;
        assert_eq!(span, FooterSpan::new(4, 1, 13));
        Ok(())
    }

    #[test]
    fn test_header_magic() -> eyre::Result<()> {
        let mut data = container(b"body", b"footer");
        let locator = FooterLocator::new().require_header_magic(true);

        let mut buffer = StreamBuffer::from_bytes(data.clone());
        locator.locate_footer(&mut buffer)?;

        data[..MAGIC_SIZE].copy_from_slice(b"ORC\0");
        let mut buffer = StreamBuffer::from_bytes(data.clone());
        let err = locator.locate_footer(&mut buffer).unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidContainer {
                reason: ContainerDefect::HeadMagic { .. },
                ..
            }
        ));

        // Off by default.
        let mut buffer = StreamBuffer::from_bytes(data);
        FooterLocator::new().locate_footer(&mut buffer)?;
        Ok(())
    }

    #[test]
    fn test_declared_length_beyond_buffer() {
        let data = container(b"body", b"footer");
        let length = data.len() as u64;
        let mut buffer = StreamBuffer::from_bytes(data);
        let err = FooterLocator::new()
            .locate(&mut buffer, length + 8)
            .unwrap_err();
        assert!(matches!(err, FormatError::OutOfRange { .. }));
    }

    #[test]
    fn test_injected_logger() -> eyre::Result<()> {
        let capture = Capture::default();
        let mut buffer = StreamBuffer::from_bytes(container(&[b'X'; 100], &[b'F'; 50]));
        FooterLocator::new()
            .with_logger(&capture)
            .locate_footer(&mut buffer)?;

        let lines = capture.0.lock().unwrap().clone();
        assert_eq!(
            lines,
            vec![
                "File length 162".to_string(),
                "reading footer index at 154".to_string(),
                "read footer length: 50, footer index: 104".to_string(),
            ]
        );
        Ok(())
    }
}
