const BINARY_SIZE_UNIT: f64 = 1024.0;
const SIZE_SUFFIXES: &[&str] = &["", "K", "M", "G", "T", "P", "E"];

/// Human readable byte amount in binary units: `100 B`, `1.5 KB`, `1.0 MB`.
///
/// Scaled values keep at least one decimal and at most two.
pub fn human_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut suffix = SIZE_SUFFIXES[0];
    for next in &SIZE_SUFFIXES[1..] {
        if value < BINARY_SIZE_UNIT {
            break;
        }
        value /= BINARY_SIZE_UNIT;
        suffix = next;
    }

    let mut rendered = format!("{value:.2}");
    while rendered.ends_with('0') {
        rendered.pop();
    }
    if rendered.ends_with('.') {
        rendered.push('0');
    }
    format!("{rendered} {suffix}B")
}

/// `1234567` -> `1,234,567`
pub fn grouped_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
