//! Size labels: formatting raw byte counts and normalizing caption sizes.

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Format a byte count with binary (1024) units and two decimals.
///
/// Picks the largest unit in which the value is at least 1, e.g.
/// `1_610_612_736` -> `"1.50 GB"`, `536_870_912` -> `"512.00 MB"`.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.2} {}", value, UNITS[unit])
}

/// Normalize a size declared in a caption (`"1.45gb"`, `"700 mb"`) to
/// `"<number> <UNIT>"`. The number is kept as written.
pub fn normalize_size(number: &str, unit: &str) -> String {
    format!("{} {}", number.trim(), unit.trim().to_uppercase())
}
