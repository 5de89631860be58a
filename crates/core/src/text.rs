use std::sync::OnceLock;

use regex::Regex;

fn whitespace_run() -> &'static Regex {
    static RE_SPACES: OnceLock<Regex> = OnceLock::new();
    RE_SPACES.get_or_init(|| Regex::new(r"\s{2,}").unwrap())
}

fn newline_run() -> &'static Regex {
    static RE_NEWLINES: OnceLock<Regex> = OnceLock::new();
    RE_NEWLINES.get_or_init(|| Regex::new(r"\n{2,}").unwrap())
}

/// Collapse whitespace in raw extracted page text.
///
/// Runs of two or more whitespace characters become a single space, then runs
/// of two or more newlines become a single newline. The order is fixed: the
/// newline pass only sees what the space pass left behind.
pub fn normalize_whitespace(text: &str) -> String {
    let spaced = whitespace_run().replace_all(text, " ");
    newline_run().replace_all(&spaced, "\n").into_owned()
}

/// Collapse runs of two or more whitespace characters into a single space.
pub fn collapse_spaces(text: &str) -> String {
    whitespace_run().replace_all(text, " ").into_owned()
}
