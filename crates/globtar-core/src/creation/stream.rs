//! Pull-based archive byte stream.

use crate::creation::encoder::ArchiveEncoder;
use crate::creation::encoder::Step;
use crate::creation::report::CreationReport;
use std::io;
use std::io::Read;

/// Archive bytes produced on demand.
///
/// The pipeline only advances when everything it produced so far has been
/// read, so at most one header or one content chunk is buffered. Errors are
/// returned as `io::Error`s wrapping an [`ArchiveError`](crate::ArchiveError)
/// (see [`ArchiveError::from_io`](crate::ArchiveError::from_io)). After an
/// error every further read fails.
///
/// Dropping the stream before the end closes any open file handle.
///
/// # Examples
///
/// ```no_run
/// use globtar_core::create_tar_stream;
/// use globtar_core::creation::CreationConfig;
/// use std::io;
///
/// let config = CreationConfig::default().with_root_path("dist").with_gzip(true);
/// let mut stream = create_tar_stream(&["**/*.js"], &config)?;
/// io::copy(&mut stream, &mut io::stdout())?;
/// println!("{} files", stream.report().files_added);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct TarStream {
    encoder: ArchiveEncoder<'static, Vec<u8>>,
    offset: usize,
    done: bool,
    failed: bool,
}

impl TarStream {
    pub(crate) fn new(encoder: ArchiveEncoder<'static, Vec<u8>>) -> Self {
        Self {
            encoder,
            offset: 0,
            done: false,
            failed: false,
        }
    }

    /// Returns the report; complete once the stream reached end of file.
    #[must_use]
    pub fn report(&self) -> &CreationReport {
        self.encoder.report()
    }

    /// Returns `true` once the archive has been fully produced.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.done
    }
}

impl Read for TarStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let pending = self.encoder.destination_mut();
            if self.offset < pending.len() {
                let n = buf.len().min(pending.len() - self.offset);
                buf[..n].copy_from_slice(&pending[self.offset..self.offset + n]);
                self.offset += n;
                if self.offset == pending.len() {
                    pending.clear();
                    self.offset = 0;
                }
                return Ok(n);
            }

            if self.failed {
                return Err(io::Error::other("archive stream failed earlier"));
            }
            if self.done {
                return Ok(0);
            }

            match self.encoder.advance() {
                Ok(Step::Finished) => self.done = true,
                Ok(_) => {}
                Err(e) => {
                    self.failed = true;
                    self.encoder.destination_mut().clear();
                    self.offset = 0;
                    return Err(e.into_io());
                }
            }
        }
    }
}
