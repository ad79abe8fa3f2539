//! Property-based testing strategies for volley templates.
//!
//! This module provides reusable proptest strategies for generating
//! template strings and individual tags, so parser and runtime tests
//! across the workspace share the same input shapes.
//!
//! # Examples
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use volley_test::strategies::*;
//!
//! proptest! {
//!     #[test]
//!     fn test_something(template in arb_template()) {
//!         // Your test here
//!     }
//! }
//! ```

use proptest::prelude::*;

/// Strategy for generating sequence tags like `{3:40}`.
///
/// Returns a tuple of (tag_string, start, end).
pub fn arb_sequence_tag() -> impl Strategy<Value = (String, i64, i64)> {
    (1i64..50, 0i64..50).prop_map(|(start, span)| {
        let end = start + span;
        (format!("{{{start}:{end}}}"), start, end)
    })
}

/// Strategy for generating random tags like `{5-90}`.
///
/// Returns a tuple of (tag_string, min, max).
pub fn arb_random_tag() -> impl Strategy<Value = (String, i64, i64)> {
    (1i64..50, 0i64..50).prop_map(|(min, span)| {
        let max = min + span;
        (format!("{{{min}-{max}}}"), min, max)
    })
}

/// Strategy for generating random-text tags like `{w3-8}`.
///
/// Returns a tuple of (tag_string, min_length, max_length).
pub fn arb_rand_text_tag() -> impl Strategy<Value = (String, usize, usize)> {
    (
        prop::sample::select(vec!["t", "u", "l", "w", "h", "H", "d"]),
        1usize..8,
        0usize..8,
    )
        .prop_map(|(category, min, span)| {
            let max = min + span;
            (format!("{{{category}{min}-{max}}}"), min, max)
        })
}

/// Strategy for generating pick tags like `{red|green|blue}`.
///
/// Returns a tuple of (tag_string, pool).
pub fn arb_choose_tag() -> impl Strategy<Value = (String, Vec<String>)> {
    prop::collection::vec(prop::string::string_regex("[a-z]{1,6}").unwrap(), 2..5)
        .prop_map(|pool| (format!("{{{}}}", pool.join("|")), pool))
}

/// Strategy for generating literal text between tags.
///
/// Avoids tag markers, quotes and backslashes so the text survives
/// tokenization unchanged.
pub fn arb_echo_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9 ,.&=/?_-]{1,12}").unwrap()
}

/// Strategy for generating whole templates: literal text interleaved
/// with tags of every generator family.
pub fn arb_template() -> impl Strategy<Value = String> {
    let part = prop_oneof![
        arb_echo_text(),
        arb_sequence_tag().prop_map(|(tag, _, _)| tag),
        arb_random_tag().prop_map(|(tag, _, _)| tag),
        arb_rand_text_tag().prop_map(|(tag, _, _)| tag),
        arb_choose_tag().prop_map(|(tag, _)| tag),
    ];
    prop::collection::vec(part, 0..6).prop_map(|parts| parts.concat())
}
