//! Argv matcher
//!
//! Position-wise comparison of an expected pattern against a received argv.
//! No backtracking: each position is judged in isolation, so the cost is
//! linear in argv length regardless of how many wildcards or regexes it
//! contains.

use crate::model::PatternElement;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// `true` iff `received` matches `expected` position-by-position and the
/// lengths agree.
pub fn argv_match(expected: &[PatternElement], received: &[String]) -> bool {
    if expected.len() != received.len() {
        return false;
    }
    expected
        .iter()
        .zip(received.iter())
        .all(|(pattern, actual)| element_matches(pattern, actual))
}

fn element_matches(pattern: &PatternElement, actual: &str) -> bool {
    match pattern {
        PatternElement::Literal(text) => text == actual,
        PatternElement::Wildcard => true,
        PatternElement::Regex(source) => compiled_regex(source)
            .map(|re| re.is_match(actual))
            .unwrap_or(false),
    }
}

fn regex_cache() -> &'static Mutex<HashMap<String, Regex>> {
    static CACHE: OnceLock<Mutex<HashMap<String, Regex>>> = OnceLock::new();
    CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Regex patterns are compiled once per distinct source string, cached for
/// the lifetime of the process. A scenario's patterns are validated at load
/// time, so a compile failure here would already have been caught; this
/// cache only avoids recompiling the same pattern on every invocation of a
/// long-running replay session. `Regex` clones are cheap (an `Arc` behind
/// the scenes), so handing out a clone from the cache is free.
fn compiled_regex(source: &str) -> Option<Regex> {
    let cache = regex_cache();
    let mut cache = cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(re) = cache.get(source) {
        return Some(re.clone());
    }
    // Anchored full-string match
    let anchored = format!("^(?:{})$", source);
    let re = Regex::new(&anchored).ok()?;
    cache.insert(source.to_string(), re.clone());
    Some(re)
}

/// One position's match detail, used by the diagnostic formatter to show
/// the first differing position with expected/received side by side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDetail {
    pub kind: ElementKind,
    pub matched: bool,
    /// Human-readable rendering of the expected pattern at this position.
    pub pattern: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Literal,
    Wildcard,
    Regex,
}

/// Per-position match detail for `expected` against `received`, used to
/// render an `ArgvMismatch` diagnostic. Positions beyond the shorter of the
/// two inputs are reported as non-matching.
pub fn element_details(expected: &[PatternElement], received: &[String]) -> Vec<ElementDetail> {
    let len = expected.len().max(received.len());
    (0..len)
        .map(|i| match expected.get(i) {
            Some(pattern) => {
                let matched = received
                    .get(i)
                    .map(|actual| element_matches(pattern, actual))
                    .unwrap_or(false);
                let (kind, rendered) = match pattern {
                    PatternElement::Literal(text) => (ElementKind::Literal, text.clone()),
                    PatternElement::Wildcard => (ElementKind::Wildcard, "*".to_string()),
                    PatternElement::Regex(source) => {
                        (ElementKind::Regex, format!("regex:{}", source))
                    }
                };
                ElementDetail {
                    kind,
                    matched,
                    pattern: rendered,
                }
            }
            None => ElementDetail {
                kind: ElementKind::Literal,
                matched: false,
                pattern: String::new(),
            },
        })
        .collect()
}

/// Index of the first position at which `expected` and `received` disagree,
/// or `None` if every reported position matches (including the
/// length-mismatch case, where the shorter side's trailing positions never
/// match).
pub fn first_difference(expected: &[PatternElement], received: &[String]) -> Option<usize> {
    element_details(expected, received)
        .iter()
        .position(|d| !d.matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> PatternElement {
        PatternElement::Literal(s.to_string())
    }

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_literal_match() {
        let expected = vec![lit("kubectl"), lit("get"), lit("pods")];
        assert!(argv_match(&expected, &argv(&["kubectl", "get", "pods"])));
    }

    #[test]
    fn length_mismatch_never_matches() {
        let expected = vec![lit("kubectl"), lit("get")];
        assert!(!argv_match(&expected, &argv(&["kubectl", "get", "pods"])));
    }

    #[test]
    fn wildcard_matches_any_single_element() {
        let expected = vec![lit("kubectl"), lit("get"), PatternElement::Wildcard];
        assert!(argv_match(&expected, &argv(&["kubectl", "get", "anything"])));
    }

    #[test]
    fn regex_requires_full_string_match() {
        let expected = vec![
            lit("kubectl"),
            lit("get"),
            PatternElement::Regex("pods?|deployments?".to_string()),
        ];
        assert!(argv_match(&expected, &argv(&["kubectl", "get", "pods"])));
        assert!(argv_match(&expected, &argv(&["kubectl", "get", "deployment"])));
        assert!(!argv_match(&expected, &argv(&["kubectl", "get", "podsXYZ"])));
    }

    #[test]
    fn first_difference_reports_earliest_mismatch() {
        let expected = vec![lit("a"), lit("b"), lit("c")];
        let received = argv(&["a", "X", "c"]);
        assert_eq!(first_difference(&expected, &received), Some(1));
    }

    #[test]
    fn compiled_regex_is_cached_across_calls() {
        let source = "cached-pattern-[0-9]+";
        let first = compiled_regex(source).expect("compiles");
        let second = compiled_regex(source).expect("compiles");
        assert!(first.is_match("cached-pattern-1"));
        assert!(second.is_match("cached-pattern-1"));
        assert_eq!(regex_cache().lock().unwrap().len() >= 1, true);
    }

    #[test]
    fn no_backtracking_each_position_independent() {
        // A regex that could "consume" neighbouring tokens in a backtracking
        // engine must still only ever judge its own position.
        let expected = vec![PatternElement::Regex("a.*".to_string()), lit("b")];
        assert!(argv_match(&expected, &argv(&["anything", "b"])));
        assert!(!argv_match(&expected, &argv(&["anything", "c"])));
    }
}
