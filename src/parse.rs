//! Lenient numeric parsing for scraped trend metrics.
//!
//! The log importer receives human-readable magnitude strings ("134K", "1.2M",
//! "37%"). A single malformed value must never fail an entire batch, so every
//! helper here returns `None` instead of an error.

/// Parses magnitude strings like "134K" -> 134000.0 and "1.2M" -> 1200000.0.
/// Plain numeric strings pass through; thousands separators are tolerated.
/// Falls back to extracting the leading numeric characters from noisy input,
/// and yields None when nothing numeric remains.
pub fn parse_magnitude(value: &str) -> Option<f64> {
    let v = value.trim().replace(',', "");
    if v.is_empty() {
        return None;
    }

    let (number_part, multiplier) = match v.chars().last() {
        Some('k') | Some('K') => (&v[..v.len() - 1], 1_000.0),
        Some('m') | Some('M') => (&v[..v.len() - 1], 1_000_000.0),
        _ => (v.as_str(), 1.0),
    };

    if let Ok(n) = number_part.trim().parse::<f64>() {
        return Some(n * multiplier);
    }

    // Noisy input ("~1.5k views"): keep only digits and dots and retry without
    // the suffix multiplier, mirroring the upstream importer's salvage path.
    let digits: String = v.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    digits.parse::<f64>().ok()
}

/// Parses percent strings like "37%" -> 37.0. Yields None for unparsable input.
pub fn parse_percent(value: &str) -> Option<f64> {
    let v = value.trim().replace('%', "");
    v.trim().parse::<f64>().ok()
}
