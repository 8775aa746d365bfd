use std::fs::{self, DirEntry};
use std::io;
use std::path::{Path, PathBuf};

/// What a single directory child contributes to a scan.
///
/// Classification never follows symbolic links: a link to a directory is
/// `Other`, so cycles and double counting cannot happen.
#[derive(Debug)]
pub enum ChildOutcome {
    Directory { path: PathBuf },
    File { path: PathBuf, len: u64 },
    /// Symlinks, devices, sockets and the like. Counted as a zero-byte file.
    Other { path: PathBuf },
    /// Vanished or unreadable entry. Contributes nothing.
    Inaccessible {
        path: Option<PathBuf>,
        error: io::Error,
    },
}

impl ChildOutcome {
    pub fn classify(entry: io::Result<DirEntry>) -> Self {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => return Self::Inaccessible { path: None, error },
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(error) => {
                return Self::Inaccessible {
                    path: Some(path),
                    error,
                }
            }
        };

        if file_type.is_dir() {
            Self::Directory { path }
        } else if file_type.is_file() {
            match entry.metadata() {
                Ok(meta) => Self::File {
                    path,
                    len: meta.len(),
                },
                Err(error) => Self::Inaccessible {
                    path: Some(path),
                    error,
                },
            }
        } else {
            Self::Other { path }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Directory { path } | Self::File { path, .. } | Self::Other { path } => {
                Some(path)
            }
            Self::Inaccessible { path, .. } => path.as_deref(),
        }
    }
}

/// Open `dir` and classify its direct children lazily.
///
/// Only the failure to open `dir` itself is an error; per-child failures come
/// back as [`ChildOutcome::Inaccessible`].
pub fn read_children(dir: &Path) -> io::Result<impl Iterator<Item = ChildOutcome>> {
    Ok(fs::read_dir(dir)?.map(ChildOutcome::classify))
}
