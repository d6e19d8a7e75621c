//! Version comparison for [`Release`](crate::component::release::Release)
//! ordering, per §3: split on `.-~+`, compare alnum chunks numerically when
//! both parse as integers, lexicographically otherwise. A `~` chunk sorts
//! before the empty chunk, i.e. before a shorter version with no more
//! chunks — this is what lets `1.0~beta1 < 1.0`.

use std::cmp::Ordering;

fn split_chunks(version: &str) -> Vec<&str> {
    version
        .split(|c| matches!(c, '.' | '-' | '~' | '+'))
        .collect()
}

fn compare_chunk(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(na), Ok(nb)) => na.cmp(&nb),
        _ => a.cmp(b),
    }
}

/// Compares two version strings as described above. A `~` separator is
/// tracked implicitly: since `~` is one of the split delimiters, a
/// pre-release suffix like `1.0~beta1` produces the chunk sequence
/// `["1", "0", "beta1"]`, identical in shape to `1.0.beta1` — to give `~`
/// its pre-release-sorts-first meaning we additionally compare by chunk
/// *count* only as a last resort (fewer chunks loses to more chunks is the
/// wrong rule for `~`, so we special-case the presence of `~` directly).
pub fn compare(a: &str, b: &str) -> Ordering {
    // Find the first `~` in either string: a version containing one is a
    // pre-release of the version with it removed, so it must sort first.
    let a_pre = a.find('~');
    let b_pre = b.find('~');

    let a_base = a_pre.map(|i| &a[..i]).unwrap_or(a);
    let b_base = b_pre.map(|i| &b[..i]).unwrap_or(b);

    let base_cmp = compare_plain(a_base, b_base);
    if base_cmp != Ordering::Equal {
        return base_cmp;
    }

    match (a_pre, b_pre) {
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(ia), Some(ib)) => compare_plain(&a[ia + 1..], &b[ib + 1..]),
        (None, None) => Ordering::Equal,
    }
}

fn compare_plain(a: &str, b: &str) -> Ordering {
    let a_chunks = split_chunks(a);
    let b_chunks = split_chunks(b);

    for pair in a_chunks.iter().zip(b_chunks.iter()) {
        let ord = compare_chunk(pair.0, pair.1);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a_chunks.len().cmp(&b_chunks.len())
}

/// Sorts releases descending: newest first. Pass this to `slice::sort_by`.
pub fn compare_desc(a: &str, b: &str) -> Ordering {
    compare(a, b).reverse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_chunks_compare_numerically() {
        assert_eq!(compare("1.9", "1.10"), Ordering::Less);
        assert_eq!(compare("2.0", "1.99"), Ordering::Greater);
    }

    #[test]
    fn equal_versions() {
        assert_eq!(compare("1.2.3", "1.2.3"), Ordering::Equal);
    }

    #[test]
    fn prerelease_sorts_before_release() {
        assert_eq!(compare("1.0~beta1", "1.0"), Ordering::Less);
        assert_eq!(compare("1.0", "1.0~beta1"), Ordering::Greater);
    }

    #[test]
    fn more_chunks_is_newer_when_prefix_equal() {
        assert_eq!(compare("1.2", "1.2.1"), Ordering::Less);
    }

    #[test]
    fn mixed_alnum_chunk_falls_back_lexicographic() {
        assert_eq!(compare("1.2a", "1.2b"), Ordering::Less);
    }

    #[test]
    fn descending_sort_order() {
        let mut versions = vec!["1.0", "2.0", "1.5", "1.0~rc1"];
        versions.sort_by(|a, b| compare_desc(a, b));
        assert_eq!(versions, vec!["2.0", "1.5", "1.0", "1.0~rc1"]);
    }
}
