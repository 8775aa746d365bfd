use dirlens_protocol::{grouped_count, ListingResponse};

/// Plain text table of a listing, largest entries first.
pub fn render_listing(response: &ListingResponse) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", response.path));
    if response.entries.is_empty() {
        out.push_str("  (empty)\n");
    }
    for entry in &response.entries {
        let marker = if entry.is_folder { "/" } else { "" };
        out.push_str(&format!(
            "{:>8.2}%  {:>10}  {:>12} files  {}{}\n",
            entry.proportion * 100.0,
            entry.human_size,
            grouped_count(entry.file_count),
            entry.name,
            marker
        ));
    }
    out.push_str(&response.summary.headline);
    out
}
