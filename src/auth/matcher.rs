//! Scope matching
//!
//! A rule's scope is a set of attribute patterns. `*` inside a pattern matches any run
//! of characters, so `*` alone matches every value, including a wildcard request.
//! A request value of `*` asks for every entry and is only covered by a pattern that
//! itself matches the literal `*`.

use super::types::Scope;

pub fn wildcard_match(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let (mut p_idx, mut v_idx) = (0usize, 0usize);
    let (mut star_idx, mut match_idx) = (None, 0usize);
    let pattern_bytes = pattern.as_bytes();
    let value_bytes = value.as_bytes();

    while v_idx < value_bytes.len() {
        if p_idx < pattern_bytes.len() && pattern_bytes[p_idx] == b'*' {
            star_idx = Some(p_idx);
            match_idx = v_idx;
            p_idx += 1;
            continue;
        }

        if p_idx < pattern_bytes.len() && pattern_bytes[p_idx] == value_bytes[v_idx] {
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

/// Whether the request scope satisfies every attribute pattern of the matcher.
///
/// Attributes the matcher does not mention are unconstrained.
pub fn scope_matches(matcher: &Scope, request: &Scope) -> bool {
    matcher.iter().all(|(attribute, pattern)| {
        request
            .get(attribute)
            .is_some_and(|value| wildcard_match(pattern, value))
    })
}
