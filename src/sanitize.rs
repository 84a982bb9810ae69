// SPDX-License-Identifier: MIT

//! Filesystem-safe name normalization

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a candidate filename into a filesystem-safe ASCII string.
///
/// Ampersands become the word `and`, accented characters are decomposed and
/// stripped of their combining marks, and anything outside ASCII letters,
/// digits, spaces, hyphens, and periods is dropped. Total function: the
/// result may be empty when the input carries no eligible characters.
pub fn sanitize(raw: &str) -> String {
    raw.replace('&', "and")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '.'))
        .collect()
}
