//! # dirlens listing
//!
//! Proportional one-level directory breakdowns for treemap-style views.
//!
//! ## Flow
//!
//! ```text
//! get_listing(path)
//!     │
//!     ├──> Listing cache hit ──────────────> cached snapshot
//!     │
//!     └──> Listing lock (bounded wait) ──┬─> timeout ─> Contention error
//!                                        │
//!                                        └─> children of path
//!                                               ├─> files: own length
//!                                               └─> dirs:  DirectorySizeAggregator
//!                                                          │
//!                                                          └─> proportion = bytes / parent total
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use dirlens_listing::{DirlensConfig, ScanContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = ScanContext::new(&DirlensConfig::load(None)?)?;
//!     let response = context.get_listing("/home".as_ref()).await?;
//!     for entry in &response.entries {
//!         println!("{:>6.2}% {}", entry.proportion * 100.0, entry.name);
//!     }
//!     println!("{}", response.summary.headline);
//!     Ok(())
//! }
//! ```

mod config;
mod context;
mod error;
mod listing;
mod service;

pub use config::{DirlensConfig, CONFIG_PATH_ENV, LOCK_TIMEOUT_ENV};
pub use context::ScanContext;
pub use error::{ConfigError, ListingError, Result};
pub use listing::{build_listing, Listing};
pub use service::ListingService;
