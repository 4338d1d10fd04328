use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ASCII only: any other byte, accented letters included, separates tokens.
    static ref RE: Regex = Regex::new(r"[A-Za-z0-9]+").expect("valid regex");
}

/// Split text into lowercase alphanumeric tokens, in document order.
///
/// Everything that is not an ASCII letter or digit acts as a separator and
/// empty runs are discarded. No stopword removal and no stemming happen here;
/// see [`crate::stemmer::normalize`] for the latter.
pub fn tokenize(text: &str) -> Vec<String> {
    RE.find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .collect()
}
