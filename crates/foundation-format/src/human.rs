//! Human-readable renderings of sizes, durations, counts, and ratios.

const SIZE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Format a byte count with binary units.
///
/// Plain bytes are shown as an integer; larger units get one decimal.
///
/// ```
/// use foundation_format::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.5 KB");
/// assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5.0 GB");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", SIZE_UNITS[unit])
}

/// Format a duration given in seconds.
///
/// | range     | example    |
/// |-----------|------------|
/// | < 1 ms    | `250µs`    |
/// | < 1 s     | `45ms`     |
/// | < 1 min   | `12.3s`    |
/// | < 1 h     | `5m 30s`   |
/// | otherwise | `2h 15m`   |
///
/// Negative and non-finite inputs render as `0s`.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return "0s".to_string();
    }
    if seconds < 0.001 {
        return format!("{}µs", (seconds * 1_000_000.0).round() as u64);
    }
    if seconds < 1.0 {
        return format!("{}ms", (seconds * 1000.0).round() as u64);
    }
    if seconds < 60.0 {
        return format!("{seconds:.1}s");
    }
    let total = seconds as u64;
    if total < 3600 {
        return format!("{}m {}s", total / 60, total % 60);
    }
    format!("{}h {}m", total / 3600, (total % 3600) / 60)
}

/// Format an integer with thousands separators.
///
/// ```
/// use foundation_format::format_number;
///
/// assert_eq!(format_number(1_234_567), "1,234,567");
/// assert_eq!(format_number(-1000), "-1,000");
/// ```
#[must_use]
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if n < 0 {
        out.insert(0, '-');
    }
    out
}

/// Format a ratio as a percentage with `decimals` places.
///
/// `0.256` with one decimal is `25.6%`.
#[must_use]
pub fn format_percentage(ratio: f64, decimals: usize) -> String {
    format!("{:.decimals$}%", ratio * 100.0)
}

/// Truncate to at most `max_len` characters, marking the cut with `...`.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return s.chars().take(max_len).collect();
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{kept}...")
}
