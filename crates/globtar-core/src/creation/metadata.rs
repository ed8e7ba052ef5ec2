//! Metadata resolution for matched entries.
//!
//! Each selected path is stat'd, classified, and converted into the header
//! fields recorded in the archive. Special files (pipes, sockets, devices)
//! are classified from their metadata before anything is opened, so a named
//! pipe never blocks the pipeline.

use crate::ArchiveError;
use crate::Result;
use std::fmt;
use std::fs;
use std::fs::File;
use std::fs::Metadata;
use std::io;
use std::path::Path;
#[cfg(not(unix))]
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Kind of an archived entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory (header only).
    Directory,
    /// Symbolic link whose target content is archived as a regular file.
    SymlinkAsFile,
}

/// Permission mode in conventional three-digit notation (e.g. `755`).
///
/// The value is built from the owner, group, and other bit groups of the
/// raw mode, one decimal digit per group. It is converted back to octal
/// bits only when the tar header is written.
///
/// # Examples
///
/// ```
/// use globtar_core::creation::PermissionMode;
///
/// let mode = PermissionMode::from_raw(Some(0o100_755));
/// assert_eq!(mode.decimal(), 755);
/// assert_eq!(mode.header_bits(), 0o755);
/// assert_eq!(mode.to_string(), "755");
///
/// assert_eq!(PermissionMode::from_raw(None).decimal(), 777);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionMode(u16);

impl PermissionMode {
    /// Raw mode assumed when the platform does not expose one.
    pub const DEFAULT_RAW: u32 = 0b111_111_111;

    /// Builds the mode from raw platform bits.
    #[must_use]
    pub fn from_raw(raw: Option<u32>) -> Self {
        let raw = raw.unwrap_or(Self::DEFAULT_RAW);
        let owner = (raw >> 6) & 0b111;
        let group = (raw >> 3) & 0b111;
        let other = raw & 0b111;
        // each group is at most 7, so the result is at most 777
        #[allow(clippy::cast_possible_truncation)]
        Self((owner * 100 + group * 10 + other) as u16)
    }

    /// Returns the decimal-digit-per-group value (e.g. `755`).
    #[must_use]
    pub const fn decimal(self) -> u16 {
        self.0
    }

    /// Returns the octal bits written to the tar header (e.g. `0o755`).
    #[must_use]
    pub const fn header_bits(self) -> u32 {
        let value = self.0 as u32;
        (value / 100) * 64 + ((value / 10) % 10) * 8 + value % 10
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Header fields for one archive entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    /// Entry classification.
    pub kind: EntryKind,
    /// Content length; `None` for directories.
    pub size: Option<u64>,
    /// Permission mode.
    pub mode: PermissionMode,
    /// Owning user id (0 if unavailable).
    pub uid: u64,
    /// Owning group id (0 if unavailable).
    pub gid: u64,
    /// Modification time in whole seconds since the epoch.
    pub mtime: u64,
}

impl EntryMetadata {
    /// Converts filesystem metadata into header fields.
    #[must_use]
    pub fn from_fs(kind: EntryKind, metadata: &Metadata) -> Self {
        let fields = PlatformFields::read(metadata);
        let size = match kind {
            EntryKind::Directory => None,
            EntryKind::File | EntryKind::SymlinkAsFile => Some(metadata.len()),
        };
        Self {
            kind,
            size,
            mode: PermissionMode::from_raw(fields.mode),
            uid: fields.uid.unwrap_or(0),
            gid: fields.gid.unwrap_or(0),
            mtime: mtime_seconds(metadata),
        }
    }
}

/// Optional platform metadata; absent fields fall back to documented defaults.
#[derive(Debug, Clone, Copy, Default)]
struct PlatformFields {
    mode: Option<u32>,
    uid: Option<u64>,
    gid: Option<u64>,
}

impl PlatformFields {
    #[cfg(unix)]
    fn read(metadata: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            mode: Some(metadata.mode()),
            uid: Some(u64::from(metadata.uid())),
            gid: Some(u64::from(metadata.gid())),
        }
    }

    #[cfg(not(unix))]
    fn read(_metadata: &Metadata) -> Self {
        Self::default()
    }
}

/// Floor of the modification time in seconds since the epoch.
///
/// Falls back to the current time if the platform has no modification time,
/// and clamps pre-epoch timestamps to 0.
fn mtime_seconds(metadata: &Metadata) -> u64 {
    let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
    modified
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Identity of a file on disk, independent of the name used to reach it.
///
/// Used to keep the archive being written out of its own selection. On unix
/// this is the device and inode pair; elsewhere the canonical path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileIdentity {
    #[cfg(unix)]
    device: u64,
    #[cfg(unix)]
    inode: u64,
    #[cfg(not(unix))]
    path: PathBuf,
}

impl FileIdentity {
    /// Identifies the open `file`, which was opened as `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be stat'd (or, off unix,
    /// canonicalized).
    #[cfg(unix)]
    pub fn of_file(file: &File, _path: &Path) -> io::Result<Self> {
        use std::os::unix::fs::MetadataExt;
        let metadata = file.metadata()?;
        Ok(Self {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    /// Identifies the open `file`, which was opened as `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be stat'd (or, off unix,
    /// canonicalized).
    #[cfg(not(unix))]
    pub fn of_file(_file: &File, path: &Path) -> io::Result<Self> {
        Ok(Self {
            path: fs::canonicalize(path)?,
        })
    }
}

/// Outcome of resolving a selected path.
#[derive(Debug)]
pub enum Resolution {
    /// Regular file (or symlink to one), opened for reading.
    File(EntryMetadata, File),
    /// Directory; no handle is kept.
    Directory(EntryMetadata),
    /// Anything else. The entry is dropped; the payload describes its type.
    Special(&'static str),
}

/// Stats and classifies `source` (relative to `root`).
///
/// Symbolic links are followed: a link to a file resolves to
/// [`EntryKind::SymlinkAsFile`], a link to a directory to a directory.
/// Files are opened here and re-stat'd through the handle, so the recorded
/// size matches the file that will actually be read.
///
/// # Errors
///
/// Returns [`ArchiveError::Resolution`] if the entry cannot be stat'd or
/// opened, including when it vanished after matching or is a dangling link.
pub fn resolve(source: &Path, root: &Path) -> Result<Resolution> {
    let full = root.join(source);
    let link_metadata =
        fs::symlink_metadata(&full).map_err(|e| ArchiveError::resolution(&full, e))?;
    let is_symlink = link_metadata.file_type().is_symlink();
    let metadata = if is_symlink {
        fs::metadata(&full).map_err(|e| ArchiveError::resolution(&full, e))?
    } else {
        link_metadata
    };

    if metadata.is_dir() {
        return Ok(Resolution::Directory(EntryMetadata::from_fs(
            EntryKind::Directory,
            &metadata,
        )));
    }
    if !metadata.is_file() {
        return Ok(Resolution::Special(describe_special(&metadata)));
    }

    let file = File::open(&full).map_err(|e| ArchiveError::resolution(&full, e))?;
    let metadata = file
        .metadata()
        .map_err(|e| ArchiveError::resolution(&full, e))?;
    if !metadata.is_file() {
        return Ok(Resolution::Special(describe_special(&metadata)));
    }

    let kind = if is_symlink {
        EntryKind::SymlinkAsFile
    } else {
        EntryKind::File
    };
    Ok(Resolution::File(EntryMetadata::from_fs(kind, &metadata), file))
}

#[cfg(unix)]
fn describe_special(metadata: &Metadata) -> &'static str {
    use std::os::unix::fs::FileTypeExt;
    let file_type = metadata.file_type();
    if file_type.is_fifo() {
        "named pipe"
    } else if file_type.is_socket() {
        "socket"
    } else if file_type.is_block_device() || file_type.is_char_device() {
        "device"
    } else {
        "special file"
    }
}

#[cfg(not(unix))]
fn describe_special(_metadata: &Metadata) -> &'static str {
    "special file"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_mode_groups_as_decimal_digits() {
        assert_eq!(PermissionMode::from_raw(Some(0o755)).decimal(), 755);
        assert_eq!(PermissionMode::from_raw(Some(0o100_644)).decimal(), 644);
        assert_eq!(PermissionMode::from_raw(Some(0o040_700)).decimal(), 700);
    }

    #[test]
    fn test_mode_all_bits_and_default() {
        assert_eq!(PermissionMode::from_raw(Some(0o777)).decimal(), 777);
        assert_eq!(PermissionMode::from_raw(None).decimal(), 777);
    }

    #[test]
    fn test_mode_header_bits() {
        assert_eq!(PermissionMode::from_raw(Some(0o755)).header_bits(), 0o755);
        assert_eq!(PermissionMode::from_raw(Some(0o7)).header_bits(), 0o7);
        assert_eq!(PermissionMode::from_raw(None).header_bits(), 0o777);
    }

    #[test]
    fn test_mode_display_pads() {
        assert_eq!(PermissionMode::from_raw(Some(0o7)).to_string(), "007");
        assert_eq!(PermissionMode::from_raw(Some(0o640)).to_string(), "640");
    }

    #[test]
    fn test_file_identity_ignores_name() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.tar");
        let other = temp.path().join("other.tar");
        fs::write(&path, "archive").unwrap();
        fs::write(&other, "archive").unwrap();

        let written = File::open(&path).unwrap();
        let reopened = File::open(temp.path().join(".").join("out.tar")).unwrap();
        let different = File::open(&other).unwrap();

        let identity = FileIdentity::of_file(&written, &path).unwrap();
        assert_eq!(
            FileIdentity::of_file(&reopened, &temp.path().join(".").join("out.tar")).unwrap(),
            identity
        );
        assert_ne!(FileIdentity::of_file(&different, &other).unwrap(), identity);
    }

    #[test]
    fn test_resolve_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.js"), "hello").unwrap();

        match resolve(Path::new("a.js"), temp.path()).unwrap() {
            Resolution::File(metadata, _) => {
                assert_eq!(metadata.kind, EntryKind::File);
                assert_eq!(metadata.size, Some(5));
                assert!(metadata.mtime > 0);
            }
            other => panic!("expected file, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("dir")).unwrap();

        match resolve(Path::new("dir"), temp.path()).unwrap() {
            Resolution::Directory(metadata) => {
                assert_eq!(metadata.kind, EntryKind::Directory);
                assert_eq!(metadata.size, None);
            }
            other => panic!("expected directory, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_missing_is_resolution_error() {
        let temp = TempDir::new().unwrap();
        let err = resolve(Path::new("gone.js"), temp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_reads_unix_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("run.sh");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        let Resolution::File(metadata, _) = resolve(Path::new("run.sh"), temp.path()).unwrap()
        else {
            panic!("expected file");
        };
        assert_eq!(metadata.mode.decimal(), 755);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_symlink_as_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("target.txt"), "linked content").unwrap();
        std::os::unix::fs::symlink("target.txt", temp.path().join("link.txt")).unwrap();

        let Resolution::File(metadata, _) = resolve(Path::new("link.txt"), temp.path()).unwrap()
        else {
            panic!("expected file");
        };
        assert_eq!(metadata.kind, EntryKind::SymlinkAsFile);
        assert_eq!(metadata.size, Some(14));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_dangling_symlink_fails() {
        let temp = TempDir::new().unwrap();
        std::os::unix::fs::symlink("missing.txt", temp.path().join("dangling")).unwrap();

        let err = resolve(Path::new("dangling"), temp.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_fifo_is_special() {
        let temp = TempDir::new().unwrap();
        let fifo = temp.path().join("pipe");
        let status = std::process::Command::new("mkfifo").arg(&fifo).status();
        if !status.is_ok_and(|s| s.success()) {
            return;
        }

        match resolve(Path::new("pipe"), temp.path()).unwrap() {
            Resolution::Special(description) => assert_eq!(description, "named pipe"),
            other => panic!("expected special entry, got {other:?}"),
        }
    }
}
