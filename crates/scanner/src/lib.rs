//! # dirlens scanner
//!
//! Recursive disk usage for one directory tree at a time.
//!
//! ## Pipeline
//!
//! ```text
//! folder_size(path)
//!     │
//!     ├──> Exclusion list (case-insensitive prefixes)
//!     │      └─> (0, 0), no filesystem access
//!     │
//!     ├──> Priority cache (keyed by path)
//!     │      └─> previously computed subtree
//!     │
//!     └──> read_dir + classify each child
//!            ├─> directory ──> folder_size(child)   (symlinks are not followed)
//!            ├─> file      ──> +1 file, +len bytes
//!            ├─> other     ──> +1 file, +0 bytes
//!            └─> error     ──> contributes nothing
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use dirlens_scanner::{DirectorySizeAggregator, ExclusionList, ScanTelemetry};
//! use std::sync::Arc;
//!
//! let telemetry = Arc::new(ScanTelemetry::new());
//! let aggregator = DirectorySizeAggregator::new(
//!     32_768,
//!     ExclusionList::new(["/proc", "/dev"]),
//!     telemetry.clone(),
//! );
//! let size = aggregator.folder_size("/home".as_ref());
//! println!("{} files, {} bytes", size.file_count, size.byte_total);
//! ```

mod aggregator;
mod entry;
mod exclusions;
mod progress;
mod size;
mod telemetry;

pub use aggregator::DirectorySizeAggregator;
pub use entry::{read_children, ChildOutcome};
pub use exclusions::{ExclusionList, DEFAULT_EXCLUDED_PREFIXES};
pub use progress::ProgressThrottle;
pub use size::FolderSize;
pub use telemetry::{ScanTelemetry, TelemetrySnapshot};
