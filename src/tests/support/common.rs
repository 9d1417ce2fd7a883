use crate::arena::Arena;
use crate::http::query::{Filter, Mode, Scope};

/// Arena size large enough for every URL the suites build.
pub const ROOMY: usize = 16 * 1024;

/// Rewrites `url` with a fresh, roomy arena and returns an owned result.
pub fn rewrite(filter: &Filter, url: &str, mode: Mode) -> String {
    rewrite_with(ROOMY, filter, url, mode)
}

/// Rewrites `url` with an arena of exactly `capacity` bytes.
pub fn rewrite_with(capacity: usize, filter: &Filter, url: &str, mode: Mode) -> String {
    let mut buf = vec![0u8; capacity];
    let mut arena = Arena::new(&mut buf);
    filter.apply(&mut arena, url, mode).to_string()
}

/// Builds a filter from `(kind, pattern)` pairs, kind being
/// `exact`, `glob` or `regex`.
pub fn make_filter(sort: bool, uniq: bool, scope: Scope, predicates: &[(&str, &str)]) -> Filter {
    let mut f = Filter::new(sort, uniq, scope);
    for (kind, pattern) in predicates {
        match *kind {
            "exact" => f.add_exact(*pattern),
            "glob" => f.add_glob(*pattern),
            "regex" => assert_ok(f.add_regex(pattern)),
            other => panic!("unknown predicate kind {other:?}"),
        }
    }
    f
}

/// Asserts that an error is None.
pub fn assert_ok<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|e| panic!("unexpected error: {}", e))
}

/// Asserts that two values are equal.
pub fn assert_equal<T: PartialEq + std::fmt::Debug>(want: T, got: T) {
    if want != got {
        panic!("want={:?} got={:?}", want, got);
    }
}
