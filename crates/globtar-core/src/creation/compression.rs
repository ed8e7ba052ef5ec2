//! Compression stage.
//!
//! User levels follow a 1-9 scale:
//!
//! - **1-3**: Fast compression (lower CPU usage, larger files)
//! - **6**: Default compression (balanced)
//! - **7-9**: Best compression (higher CPU usage, smaller files)

use crate::io::SinkWriter;
use flate2::write::GzEncoder;
use std::io;
use std::io::Write;

/// Converts user compression level (1-9) to flate2 compression level.
///
/// # Mapping
///
/// - `None` or `Some(6)`: Default compression
/// - `1-3`: Fast compression
/// - `7-9`: Best compression
/// - Other values: Literal level
///
/// # Examples
///
/// ```
/// use globtar_core::creation::compression::compression_level_to_flate2;
///
/// assert_eq!(compression_level_to_flate2(None), flate2::Compression::default());
/// assert_eq!(compression_level_to_flate2(Some(1)), flate2::Compression::fast());
/// assert_eq!(compression_level_to_flate2(Some(9)), flate2::Compression::best());
/// ```
#[must_use]
pub fn compression_level_to_flate2(level: Option<u8>) -> flate2::Compression {
    match level {
        None | Some(6) => flate2::Compression::default(),
        Some(1..=3) => flate2::Compression::fast(),
        Some(7..=9) => flate2::Compression::best(),
        Some(n) => flate2::Compression::new(u32::from(n)),
    }
}

/// Writer the tar encoder writes into: the sink, optionally behind gzip.
#[derive(Debug)]
pub enum OutputWriter<W: Write> {
    /// Uncompressed tar.
    Plain(SinkWriter<W>),
    /// Gzip-framed tar.
    Gzip(GzEncoder<SinkWriter<W>>),
}

impl<W: Write> OutputWriter<W> {
    /// Wraps `destination`, adding gzip framing if requested.
    pub fn new(destination: W, gzip: bool, level: Option<u8>) -> Self {
        let sink = SinkWriter::new(destination);
        if gzip {
            Self::Gzip(GzEncoder::new(sink, compression_level_to_flate2(level)))
        } else {
            Self::Plain(sink)
        }
    }

    /// Returns the sink at the bottom of the chain.
    #[must_use]
    pub fn sink(&self) -> &SinkWriter<W> {
        match self {
            Self::Plain(sink) => sink,
            Self::Gzip(encoder) => encoder.get_ref(),
        }
    }

    /// Returns the sink at the bottom of the chain, mutably.
    pub fn sink_mut(&mut self) -> &mut SinkWriter<W> {
        match self {
            Self::Plain(sink) => sink,
            Self::Gzip(encoder) => encoder.get_mut(),
        }
    }

    /// Writes the gzip trailer (if any) and flushes the destination.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination rejects the final bytes.
    pub fn try_finish(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(sink) => sink.flush(),
            Self::Gzip(encoder) => {
                encoder.try_finish()?;
                encoder.get_mut().flush()
            }
        }
    }
}

impl<W: Write> Write for OutputWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(sink) => sink.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(sink) => sink.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}
