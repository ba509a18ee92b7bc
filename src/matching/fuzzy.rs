use similar::TextDiff;

/// Similarity of the shorter string against the best-aligned equal-length
/// window of the longer one, on a 0-100 scale. Empty input scores 0.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (shorter, longer) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if shorter.is_empty() {
        return 0.0;
    }
    let needle: String = shorter.iter().collect();

    let mut best = 0.0_f64;
    for window in longer.windows(shorter.len()) {
        let window: String = window.iter().collect();
        let score = ratio(&needle, &window);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

/// Character-level diff similarity on a 0-100 scale.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    f64::from(TextDiff::from_chars(a, b).ratio()) * 100.0
}
