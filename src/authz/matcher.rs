//! Glob-style pattern matching over permission and resource names
//!
//! `*` matches any run of characters (including the empty run), `?` matches
//! exactly one character. A pattern without wildcard characters is an exact
//! string comparison. Matching is case-sensitive and never falls back to
//! substring matching. Date-math expressions (`<...>`) are matched literally
//! by callers that special-case them before delegating here.

use std::collections::BTreeSet;

/// True if `pattern` contains at least one glob metacharacter.
pub fn contains_wildcard(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Match a single glob pattern against a candidate string.
pub fn matches(pattern: &str, candidate: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    if !contains_wildcard(pattern) {
        return pattern == candidate;
    }

    let pattern_bytes = pattern.as_bytes();
    let value_bytes = candidate.as_bytes();
    let (mut p_idx, mut v_idx) = (0usize, 0usize);
    let (mut star_idx, mut match_idx) = (None, 0usize);

    while v_idx < value_bytes.len() {
        if p_idx < pattern_bytes.len() && pattern_bytes[p_idx] == b'*' {
            star_idx = Some(p_idx);
            match_idx = v_idx;
            p_idx += 1;
            continue;
        }

        if p_idx < pattern_bytes.len()
            && (pattern_bytes[p_idx] == b'?' || pattern_bytes[p_idx] == value_bytes[v_idx])
        {
            p_idx += 1;
            v_idx += 1;
            continue;
        }

        if let Some(star) = star_idx {
            p_idx = star + 1;
            match_idx += 1;
            v_idx = match_idx;
            continue;
        }

        return false;
    }

    while p_idx < pattern_bytes.len() && pattern_bytes[p_idx] == b'*' {
        p_idx += 1;
    }

    p_idx == pattern_bytes.len()
}

/// True if any pattern matches the candidate. Empty pattern set never matches.
pub fn match_any<P: AsRef<str>>(patterns: &[P], candidate: &str) -> bool {
    patterns.iter().any(|p| matches(p.as_ref(), candidate))
}

/// Match a pattern set against a candidate set.
///
/// With `require_all_candidates = false` this is true if any pattern matches
/// any candidate; with `true`, every candidate must be matched by at least
/// one pattern.
pub fn match_any_of<P: AsRef<str>, C: AsRef<str>>(
    patterns: &[P],
    candidates: &[C],
    require_all_candidates: bool,
) -> bool {
    if patterns.is_empty() || candidates.is_empty() {
        return false;
    }

    if require_all_candidates {
        candidates
            .iter()
            .all(|c| match_any(patterns, c.as_ref()))
    } else {
        candidates
            .iter()
            .any(|c| match_any(patterns, c.as_ref()))
    }
}

/// True if every pattern has at least one matching candidate (conjunctive).
pub fn all_patterns_matched<P: AsRef<str>, C: AsRef<str>>(patterns: &[P], candidates: &[C]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    patterns
        .iter()
        .all(|p| candidates.iter().any(|c| matches(p.as_ref(), c.as_ref())))
}

/// The subset of `patterns` that match the candidate.
pub fn matching_patterns<'a, P: AsRef<str>>(patterns: &'a [P], candidate: &str) -> BTreeSet<&'a str> {
    patterns
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| matches(p, candidate))
        .collect()
}

/// The subset of `patterns` that match at least one of the candidates.
pub fn matching_patterns_of<'a, P: AsRef<str>, C: AsRef<str>>(
    patterns: &'a [P],
    candidates: &[C],
) -> BTreeSet<&'a str> {
    patterns
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| candidates.iter().any(|c| matches(p, c.as_ref())))
        .collect()
}

/// The subset of `candidates` matched by a single pattern, in input order.
pub fn matching_candidates<'a, C: AsRef<str>>(pattern: &str, candidates: &'a [C]) -> Vec<&'a str> {
    candidates
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| matches(pattern, c))
        .collect()
}
