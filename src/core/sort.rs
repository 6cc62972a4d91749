//! Comparator selection and text collation

use crate::core::record::Record;
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Human-oriented string ordering.
///
/// Three levels, each consulted only on a tie at the one before:
/// - base letters, case-folded with accents stripped, so "Émulsifier"
///   sorts among the E's and "aspirin" next to "Aspirin"
/// - accents, unaccented first
/// - case, lower-case first
///
/// The result is a total order.
pub fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| b.cmp(a))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Three-way comparator for `key`
pub fn comparator<T: Record>(key: T::Sort) -> impl Fn(&T, &T) -> Ordering {
    move |a: &T, b: &T| a.compare(b, key)
}
