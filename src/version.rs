//! Parsing and ordering of Go version strings.
//!
//! Versions are kept as plain strings (`1.18`, `1.19.3`, `1.20rc1`, `tip`)
//! because that is how they appear on disk and on go.dev; this module
//! defines the grammar and the newest-first order over them.

use std::cmp::Ordering;

/// The synthetic version that tracks the development branch.
pub const TIP: &str = "tip";

/// Parse a version string into `(major, minor, tail)`, where `tail` is the
/// `rc`/`beta` suffix, if any. `1.19.3` parses as `(19, 3, "")`.
///
/// Parsing is permissive: segments that fail to parse read as zero, so
/// callers that need validation must use [`is_valid`] first.
pub fn parse(v: &str) -> (u32, u32, &str) {
    let mut v = v;
    let mut tail = "";
    if let Some(i) = v.find("beta") {
        if i > 0 {
            tail = &v[i..];
            v = &v[..i];
        }
    }
    if let Some(i) = v.find("rc") {
        if i > 0 {
            tail = &v[i..];
            v = &v[..i];
        }
    }

    let mut parts = v.strip_prefix("1.").unwrap_or(v).split('.');
    let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (major, minor, tail)
}

/// Newest-first order: `tip` sorts before everything, then higher versions
/// first; a final release sorts before its pre-releases, and two
/// pre-releases compare by their tail strings, lexically larger first
/// (which happens to put `rc` above `beta`).
pub fn compare(a: &str, b: &str) -> Ordering {
    match (a == TIP, b == TIP) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }

    let (major_a, minor_a, tail_a) = parse(a);
    let (major_b, minor_b, tail_b) = parse(b);

    major_b
        .cmp(&major_a)
        .then(minor_b.cmp(&minor_a))
        .then_with(|| match (tail_a.is_empty(), tail_b.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => tail_b.cmp(tail_a),
        })
}

/// Whether `a` sorts strictly before `b` in the newest-first order.
pub fn less(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Less
}

/// Check a version string against the grammar `1[.N[.N]][(rc|beta)N]`
/// where `N` is a number without a leading zero. The `tip` sentinel is
/// always valid.
pub fn is_valid(v: &str) -> bool {
    if v == TIP {
        return true;
    }

    let (numeric, tail) = match v.find(|c: char| c.is_ascii_alphabetic()) {
        Some(i) => v.split_at(i),
        None => (v, ""),
    };

    if !tail.is_empty() {
        let n = tail.strip_prefix("rc").or_else(|| tail.strip_prefix("beta"));
        match n {
            Some(n) if is_number(n) => {}
            _ => return false,
        }
    }

    let mut parts = numeric.split('.');
    if parts.next() != Some("1") {
        return false;
    }
    let mut segments = 0;
    for part in parts {
        segments += 1;
        if segments > 2 || !is_number(part) {
            return false;
        }
    }
    true
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && !s.starts_with('0') && s.bytes().all(|b| b.is_ascii_digit())
}

/// Collapse a newest-first sorted list to the latest patch of each release
/// line (`1.20rc3,1.20rc2,1.19.5,1.19.4` becomes `1.20rc3,1.19.5`).
///
/// Panics if the input is not sorted; passing an unsorted list is a bug in
/// the caller, not a recoverable condition.
pub fn latest_patches(versions: &[String]) -> Vec<String> {
    assert!(
        versions.windows(2).all(|w| compare(&w[0], &w[1]) != Ordering::Greater),
        "version list is not sorted"
    );

    let mut latest = Vec::new();
    let mut prev = None;
    for version in versions {
        let (release, _, _) = parse(version);
        if prev != Some(release) {
            prev = Some(release);
            latest.push(version.clone());
        }
    }
    latest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(parse("1.18"), (18, 0, ""));
        assert_eq!(parse("1.19.3"), (19, 3, ""));
        assert_eq!(parse("1.20rc1"), (20, 0, "rc1"));
        assert_eq!(parse("1.21beta2"), (21, 0, "beta2"));
        assert_eq!(parse("tip"), (0, 0, ""));
        assert_eq!(parse("garbage"), (0, 0, ""));
    }

    #[test]
    fn test_order() {
        // newest first, tip before everything, finals before pre-releases.
        let ordered = [
            "tip", "1.20", "1.20rc3", "1.20rc2", "1.20beta1", "1.19.5", "1.19", "1.18.9",
        ];
        for (i, a) in ordered.iter().enumerate() {
            for b in &ordered[i + 1..] {
                assert!(less(a, b), "{a} should sort before {b}");
                assert!(!less(b, a), "{b} should not sort before {a}");
            }
        }
    }

    #[test]
    fn test_is_valid() {
        for v in ["tip", "1", "1.18", "1.19.3", "1.20rc1", "1.21beta2"] {
            assert!(is_valid(v), "{v} should be valid");
        }
        for v in ["", "go1.18", "2.0", "1.018", "1.18.2.1", "1.20rc", "1.20rc0", "main", "1.x"] {
            assert!(!is_valid(v), "{v} should be invalid");
        }
    }

    #[test]
    fn test_latest_patches() {
        let versions: Vec<String> = [
            "tip", "1.20rc3", "1.20rc2", "1.20rc1", "1.19.5", "1.19.4", "1.19.3",
        ]
        .iter()
        .map(|v| v.to_string())
        .collect();

        assert_eq!(latest_patches(&versions), vec!["tip", "1.20rc3", "1.19.5"]);
    }

    #[test]
    #[should_panic(expected = "version list is not sorted")]
    fn test_latest_patches_unsorted() {
        let versions: Vec<String> = ["1.19.5", "1.20rc1"].iter().map(|v| v.to_string()).collect();
        latest_patches(&versions);
    }
}
