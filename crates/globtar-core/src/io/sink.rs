//! Output sink wrapper for the archive pipeline.
//!
//! [`SinkWriter`] sits at the very end of the writer chain (below the tar
//! builder and the optional gzip encoder). It counts the bytes that reach the
//! destination, remembers whether the destination ever rejected a write, and
//! can be sealed so that nothing more reaches the destination once the
//! pipeline has been aborted.

use std::io;
use std::io::Write;

/// Wrapper writer that tracks what actually reached the destination.
///
/// # Examples
///
/// ```
/// use globtar_core::io::SinkWriter;
/// use std::io::Write;
///
/// let mut writer = SinkWriter::new(Vec::new());
///
/// writer.write_all(b"Hello, ")?;
/// writer.write_all(b"World!")?;
/// assert_eq!(writer.total_bytes(), 13);
///
/// writer.seal();
/// writer.write_all(b"dropped")?;
/// assert_eq!(writer.get_ref(), b"Hello, World!");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct SinkWriter<W> {
    inner: W,
    bytes_written: u64,
    failed: bool,
    sealed: bool,
}

impl<W> SinkWriter<W> {
    /// Creates a new sink writer around `inner`.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
            failed: false,
            sealed: false,
        }
    }

    /// Returns the number of bytes the destination accepted.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Returns `true` if the destination rejected a write or flush.
    #[must_use]
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Discards every later write instead of forwarding it.
    ///
    /// Used when the pipeline aborts: the tar builder and gzip encoder both
    /// write trailers when dropped, and those must not land after partial
    /// output.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Returns `true` once [`SinkWriter::seal`] has been called.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns a reference to the destination.
    #[must_use]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the destination.
    ///
    /// Writes made directly through this reference are not counted.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Consumes the wrapper and returns the destination.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for SinkWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.sealed {
            return Ok(buf.len());
        }
        match self.inner.write(buf) {
            Ok(n) => {
                self.bytes_written += n as u64;
                Ok(n)
            }
            Err(e) => {
                if e.kind() != io::ErrorKind::Interrupted {
                    self.failed = true;
                }
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.sealed {
            return Ok(());
        }
        self.inner.flush().inspect_err(|_| self.failed = true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left on device"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_writer_counts_bytes() {
        let mut writer = SinkWriter::new(Vec::new());

        writer.write_all(b"Hello").unwrap();
        assert_eq!(writer.total_bytes(), 5);

        write!(writer, " {}", 42).unwrap();
        assert_eq!(writer.total_bytes(), 8);
        assert_eq!(writer.into_inner(), b"Hello 42");
    }

    #[test]
    fn test_sink_writer_partial_write() {
        struct LimitedWriter {
            inner: Vec<u8>,
            max_write: usize,
        }

        impl Write for LimitedWriter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                let to_write = buf.len().min(self.max_write);
                self.inner.extend_from_slice(&buf[..to_write]);
                Ok(to_write)
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut writer = SinkWriter::new(LimitedWriter {
            inner: Vec::new(),
            max_write: 3,
        });

        assert_eq!(writer.write(b"hello").unwrap(), 3);
        assert_eq!(writer.total_bytes(), 3);

        writer.write_all(b"world").unwrap();
        assert_eq!(writer.total_bytes(), 8);
        assert_eq!(writer.get_ref().inner, b"helworld");
    }

    #[test]
    fn test_sink_writer_records_failure() {
        let mut writer = SinkWriter::new(FullDisk);
        assert!(!writer.has_failed());

        assert!(writer.write_all(b"data").is_err());
        assert!(writer.has_failed());
        assert_eq!(writer.total_bytes(), 0);
    }

    #[test]
    fn test_sealed_writer_discards() {
        let mut writer = SinkWriter::new(FullDisk);
        writer.seal();

        assert!(writer.is_sealed());
        writer.write_all(b"trailer").unwrap();
        writer.flush().unwrap();
        assert!(!writer.has_failed());
        assert_eq!(writer.total_bytes(), 0);
    }
}
