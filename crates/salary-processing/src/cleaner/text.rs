//! Free-text normalization for passthrough fields.

/// Strip repeated layers of wrapping quotes and surrounding whitespace.
///
/// `"""value"""`, `""value""`, `"value"` and `'value'` all become `value`.
pub(crate) fn strip_wrapping_quotes(value: &str) -> &str {
    let mut cleaned = value.trim();

    loop {
        let unwrapped = ['"', '\''].into_iter().find_map(|q| {
            if cleaned.len() < 2 {
                return None;
            }
            cleaned.strip_prefix(q)?.strip_suffix(q)
        });

        match unwrapped {
            Some(inner) => cleaned = inner.trim(),
            None => break,
        }
    }

    cleaned
}

/// Lower-case and trim a text value; empty results become `None`.
pub fn normalize_text(value: Option<&str>) -> Option<String> {
    let cleaned = strip_wrapping_quotes(value?).to_lowercase();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Ordinal rank of a (normalized) seniority level.
pub fn seniority_rank(level: &str) -> Option<i32> {
    let rank = match level.trim() {
        "intern" | "internship" => 0,
        "junior" | "entry" | "entry level" | "entry-level" => 1,
        "midlevel" | "mid-level" | "mid level" | "mid" => 2,
        "senior" => 3,
        "lead" | "staff" | "principal" => 4,
        "head" | "director" => 5,
        _ => return None,
    };
    Some(rank)
}
