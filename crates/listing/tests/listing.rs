use dirlens_listing::{DirlensConfig, ListingError, ScanContext};
use dirlens_protocol::ListingEntry;
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn sample_tree() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    fs::write(temp.path().join("a.txt"), vec![b'a'; 100]).expect("write a.txt");
    let sub = temp.path().join("sub");
    fs::create_dir(&sub).expect("create sub");
    fs::write(sub.join("b.txt"), vec![b'b'; 300]).expect("write b.txt");
    temp
}

fn context_with(config: DirlensConfig) -> ScanContext {
    ScanContext::new(&config).expect("context")
}

fn context() -> ScanContext {
    context_with(DirlensConfig {
        exclude: Vec::new(),
        ..DirlensConfig::default()
    })
}

fn canonical(temp: &TempDir) -> std::path::PathBuf {
    fs::canonicalize(temp.path()).expect("canonicalize")
}

fn entry<'a>(entries: &'a [ListingEntry], name: &str) -> &'a ListingEntry {
    entries
        .iter()
        .find(|entry| entry.name == name)
        .unwrap_or_else(|| panic!("missing entry {name}"))
}

#[tokio::test]
async fn proportions_follow_byte_share() {
    let temp = sample_tree();
    let response = context().get_listing(temp.path()).await.expect("listing");

    assert_eq!(response.entries.len(), 2);
    let a = entry(&response.entries, "a.txt");
    let sub = entry(&response.entries, "sub");
    assert_eq!(a.proportion, 0.25);
    assert!(!a.is_folder);
    assert_eq!((a.file_count, a.bytes), (1, 100));
    assert_eq!(a.human_size, "100 B");
    assert_eq!(sub.proportion, 0.75);
    assert!(sub.is_folder);
    assert_eq!((sub.file_count, sub.bytes), (1, 300));

    // largest first
    assert_eq!(response.entries[0].name, "sub");

    let sum: f64 = response.entries.iter().map(|e| e.proportion).sum();
    assert!((sum - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn proportions_sum_to_one_for_uneven_sizes() {
    let temp = TempDir::new().expect("tempdir");
    for (i, len) in [7usize, 13, 1, 997, 42, 3].into_iter().enumerate() {
        fs::write(temp.path().join(format!("f{i}")), vec![0u8; len]).expect("write");
    }
    let nested = temp.path().join("nested").join("deeper");
    fs::create_dir_all(&nested).expect("nested");
    fs::write(nested.join("x"), vec![0u8; 123]).expect("write");

    let response = context().get_listing(temp.path()).await.expect("listing");
    let sum: f64 = response.entries.iter().map(|e| e.proportion).sum();
    assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");
}

#[tokio::test]
async fn summary_reports_discovered_totals() {
    let temp = sample_tree();
    let response = context().get_listing(temp.path()).await.expect("listing");

    assert_eq!(response.summary.total_files, 2);
    assert_eq!(response.summary.total_bytes, 400);
    assert!(response.summary.primary_scan_seconds >= 0.0);
    assert!(response
        .summary
        .headline
        .ends_with("found 400 B across 2 files."));
}

#[tokio::test]
async fn empty_directory_lists_nothing() {
    let temp = TempDir::new().expect("tempdir");
    let response = context().get_listing(temp.path()).await.expect("listing");
    assert!(response.entries.is_empty());
}

#[tokio::test]
async fn zero_total_gives_zero_proportions() {
    let temp = TempDir::new().expect("tempdir");
    fs::write(temp.path().join("empty-a"), b"").expect("write");
    fs::write(temp.path().join("empty-b"), b"").expect("write");
    fs::create_dir(temp.path().join("empty-dir")).expect("mkdir");

    let response = context().get_listing(temp.path()).await.expect("listing");
    assert_eq!(response.entries.len(), 3);
    assert!(response.entries.iter().all(|e| e.proportion == 0.0));
}

#[tokio::test]
async fn excluded_child_counts_as_empty() {
    let temp = sample_tree();
    let context = context_with(DirlensConfig {
        exclude: vec![canonical(&temp).join("SUB").display().to_string()],
        ..DirlensConfig::default()
    });

    let response = context.get_listing(temp.path()).await.expect("listing");
    assert_eq!(entry(&response.entries, "sub").bytes, 0);
    assert_eq!(entry(&response.entries, "a.txt").proportion, 1.0);
}

#[tokio::test]
async fn missing_path_is_not_found() {
    let temp = TempDir::new().expect("tempdir");
    let err = context()
        .get_listing(&temp.path().join("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn file_path_cannot_be_listed() {
    let temp = sample_tree();
    let err = context()
        .get_listing(&temp.path().join("a.txt"))
        .await
        .unwrap_err();
    assert!(matches!(err, ListingError::Access { .. }), "{err}");
}

#[tokio::test]
async fn overlapping_requests_within_timeout_all_succeed() {
    let temp = sample_tree();
    let context = Arc::new(context());

    let mut tasks = Vec::new();
    for target in [temp.path().to_path_buf(), temp.path().join("sub")] {
        for _ in 0..3 {
            let context = Arc::clone(&context);
            let target = target.clone();
            tasks.push(tokio::spawn(async move {
                context.get_listing(&target).await
            }));
        }
    }
    for task in tasks {
        task.await.expect("join").expect("listing");
    }

    assert_eq!(context.telemetry().snapshot().total_files, 2);
    assert_eq!(context.scan_status().message, "400 B discovered across 2 files");
}

#[tokio::test]
async fn folder_size_matches_listing_total() {
    let temp = sample_tree();
    let context = context();
    let size = context.folder_size(temp.path()).await.expect("size");
    assert_eq!((size.file_count, size.byte_total), (2, 400));
}

#[tokio::test]
async fn dotted_alias_of_a_listed_root_is_not_counted_again() {
    let temp = sample_tree();
    let context = context();

    let direct = context.get_listing(temp.path()).await.expect("listing");
    let aliased = context
        .get_listing(&temp.path().join("sub").join(".."))
        .await
        .expect("aliased listing");

    assert_eq!(aliased.path, direct.path);
    assert_eq!(aliased.entries, direct.entries);
    assert_eq!(aliased.summary.total_files, 2);
    assert_eq!(aliased.summary.total_bytes, 400);
    assert_eq!(context.listings().cache_stats().hits, 1);
}

#[tokio::test]
async fn dotted_path_cannot_dodge_an_exclusion() {
    let temp = sample_tree();
    fs::create_dir(temp.path().join("other")).expect("mkdir");
    let context = context_with(DirlensConfig {
        exclude: vec![canonical(&temp).join("sub").display().to_string()],
        ..DirlensConfig::default()
    });

    let size = context
        .folder_size(&temp.path().join("other").join("..").join("sub"))
        .await
        .expect("size");
    assert_eq!((size.file_count, size.byte_total), (0, 0));
}
