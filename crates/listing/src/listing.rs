use crate::{ListingError, Result};
use dirlens_priority_cache::CachePriority;
use dirlens_protocol::{human_bytes, ListingEntry};
use dirlens_scanner::{read_children, ChildOutcome, DirectorySizeAggregator, FolderSize};
use std::path::{Path, PathBuf};

/// One-level breakdown of a directory, largest children first.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub path: PathBuf,
    pub entries: Vec<ListingEntry>,
    pub total: FolderSize,
}

impl CachePriority for Listing {
    type Priority = u64;

    fn priority(&self) -> u64 {
        self.total.byte_total
    }
}

struct MeasuredChild {
    path: PathBuf,
    is_folder: bool,
    size: FolderSize,
}

impl MeasuredChild {
    fn into_entry(self, parent_bytes: u64) -> ListingEntry {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());
        ListingEntry {
            proportion: proportion(self.size.byte_total, parent_bytes),
            name,
            path: self.path.display().to_string(),
            is_folder: self.is_folder,
            human_size: human_bytes(self.size.byte_total),
            file_count: self.size.file_count,
            bytes: self.size.byte_total,
        }
    }
}

/// Share of `whole`. A zero total yields `0.0` for every part.
#[allow(clippy::cast_precision_loss)]
fn proportion(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}

/// Measure every direct child of `dir` and normalize against their sum.
///
/// Blocking: walks the filesystem through `aggregator`. Only failing to open
/// `dir` itself is an error.
pub fn build_listing(aggregator: &DirectorySizeAggregator, dir: &Path) -> Result<Listing> {
    let children =
        read_children(dir).map_err(|err| ListingError::from_open(dir.to_path_buf(), err))?;

    let mut measured = Vec::new();
    let mut total = FolderSize::ZERO;
    let mut regular_files = FolderSize::ZERO;
    for child in children {
        let (path, is_folder, size) = match child {
            ChildOutcome::Directory { path } => {
                let size = aggregator.folder_size(&path);
                (path, true, size)
            }
            ChildOutcome::File { path, len } => {
                regular_files += FolderSize::single_file(len);
                (path, false, FolderSize::single_file(len))
            }
            ChildOutcome::Other { path } => {
                log::debug!("Listing unusual entry {} as empty", path.display());
                (path, false, FolderSize::single_file(0))
            }
            ChildOutcome::Inaccessible { path, error } => {
                log::debug!(
                    "Leaving out {}: {error}",
                    path.as_deref().unwrap_or(dir).display()
                );
                continue;
            }
        };
        total += size;
        measured.push(MeasuredChild {
            path,
            is_folder,
            size,
        });
    }

    let telemetry = aggregator.telemetry();
    if telemetry.first_visit(dir) {
        telemetry.record_discovered(regular_files);
    }

    let mut entries: Vec<ListingEntry> = measured
        .into_iter()
        .map(|child| child.into_entry(total.byte_total))
        .collect();
    entries.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.name.cmp(&b.name)));

    Ok(Listing {
        path: dir.to_path_buf(),
        entries,
        total,
    })
}
