//! Common assertion helpers for test output validation

#![allow(dead_code)]

use predicates::prelude::*;

/// Creates a predicate that checks for the error banner
pub fn is_error() -> impl Predicate<str> {
    predicates::str::contains("✕ Error:")
}

/// Creates a predicate that checks for a success line mentioning `text`
pub fn success_with(text: &str) -> impl Predicate<str> {
    predicates::str::contains("✓").and(predicates::str::contains(text.to_string()))
}

/// Creates a predicate that checks for the skipped remote warning
pub fn remote_skipped() -> impl Predicate<str> {
    predicates::str::contains("Remote upload skipped")
}

/// Creates a predicate that checks a commit id shaped `YYYY-MM-DDTHH-MM-SS-mmmZ-xxxxxxxx`
pub fn has_commit_id() -> impl Predicate<str> {
    predicates::str::is_match(r"\d{4}-\d{2}-\d{2}T\d{2}-\d{2}-\d{2}-\d{3}Z-[0-9a-f]{8}")
        .expect("valid regex")
}
