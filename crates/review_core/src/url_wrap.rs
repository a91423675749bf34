//! Display-only wrap hints for long URLs shared by both sides of a diff.

use std::collections::HashSet;
use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Zero-width space used as the break opportunity.
pub const WRAP_MARKER: char = '\u{200B}';

/// Characters after which a break opportunity is inserted.
pub const WRAP_CHARS: &[char] = &[':', '/', '.', '-', '_', '?', '=', '&', '%', '#', '~'];

static URL_CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"'\[\]{}|\\^`]+"#).expect("static url pattern")
});

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Byte ranges of URL-shaped substrings in `text`, in order of appearance.
fn url_spans(text: &str) -> Vec<Range<usize>> {
    URL_CANDIDATE
        .find_iter(text)
        .filter_map(|m| {
            let trimmed = trim_url_candidate(m.as_str());
            if Url::parse(trimmed).is_err() {
                return None;
            }
            Some(m.start()..m.start() + trimmed.len())
        })
        .collect()
}

/// URL-shaped substrings of `text`, in order of appearance.
pub fn find_urls(text: &str) -> Vec<&str> {
    url_spans(text).into_iter().map(|span| &text[span]).collect()
}

// Drops sentence punctuation and unbalanced closing parentheses that the
// greedy pattern swallowed.
fn trim_url_candidate(candidate: &str) -> &str {
    let mut end = candidate.len();
    loop {
        let current = &candidate[..end];
        let Some(last) = current.chars().last() else {
            break;
        };
        if TRAILING_PUNCTUATION.contains(&last) {
            end -= last.len_utf8();
            continue;
        }
        if last == ')' && current.matches(')').count() > current.matches('(').count() {
            end -= 1;
            continue;
        }
        break;
    }
    &candidate[..end]
}

/// Inserts [`WRAP_MARKER`] after every wrap-eligible character of `url`.
pub fn insert_break_opportunities(url: &str) -> String {
    let mut out = String::with_capacity(url.len() + url.len() / 2);
    for ch in url.chars() {
        out.push(ch);
        if WRAP_CHARS.contains(&ch) {
            out.push(WRAP_MARKER);
        }
    }
    out
}

/// Removes every [`WRAP_MARKER`] from `text`.
pub fn strip_wrap_markers(text: &str) -> String {
    text.chars().filter(|c| *c != WRAP_MARKER).collect()
}

/// Adds identical break opportunities to every URL that appears verbatim in
/// both texts. URLs present on only one side are left untouched.
pub fn process_wrappable_urls(old_text: &str, new_text: &str) -> (String, String) {
    let old_urls: HashSet<&str> = find_urls(old_text).into_iter().collect();
    let common: HashSet<&str> = find_urls(new_text)
        .into_iter()
        .filter(|url| old_urls.contains(url))
        .collect();

    if common.is_empty() {
        return (old_text.to_string(), new_text.to_string());
    }
    (
        rewrite_common_urls(old_text, &common),
        rewrite_common_urls(new_text, &common),
    )
}

fn rewrite_common_urls(text: &str, common: &HashSet<&str>) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for span in url_spans(text) {
        let url = &text[span.clone()];
        if !common.contains(url) {
            continue;
        }
        out.push_str(&text[last..span.start]);
        out.push_str(&insert_break_opportunities(url));
        last = span.end;
    }
    out.push_str(&text[last..]);
    out
}
