//! Text fitting and clean-up helpers
//!
//! Width is measured per `char`, and truncation always lands on a char
//! boundary, so multi-byte text is never split mid-sequence.

use alloc::string::String;

use crate::traits::{FontFace, TextMeasure};

/// Single-glyph ellipsis appended to truncated text
pub const ELLIPSIS: char = '…';

/// Truncate `s` to at most `max_chars` chars, ending in [`ELLIPSIS`]
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.into();
    }
    if max_chars <= 1 {
        return ELLIPSIS.into();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// Fit `s` into `max_px` by dropping whole trailing words
///
/// Falls back to char-level trimming when `s` is a single word or even the
/// first word cannot fit with an ellipsis. The result, including any
/// appended ellipsis, never measures wider than `max_px`; when not even a
/// lone ellipsis fits the result is empty.
pub fn fit_words_px<M: TextMeasure + ?Sized>(
    measure: &M,
    font: FontFace,
    s: &str,
    max_px: i32,
) -> String {
    if max_px <= 0 {
        return String::new();
    }
    let work = s.trim();
    if measure.text_width(font, work) <= max_px {
        return work.into();
    }
    if !work.contains(' ') {
        return trim_chars(measure, font, work, max_px);
    }

    let mut out = work;
    while let Some(space) = out.rfind(' ') {
        let candidate = out[..space].trim_end();
        if candidate.is_empty() {
            break;
        }
        let with_dots = with_ellipsis(candidate);
        if measure.text_width(font, &with_dots) <= max_px {
            return with_dots;
        }
        out = candidate;
    }

    trim_chars(measure, font, out, max_px)
}

fn with_ellipsis(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + ELLIPSIS.len_utf8());
    out.push_str(s);
    out.push(ELLIPSIS);
    out
}

/// Pop chars off `word` until it fits with an ellipsis
fn trim_chars<M: TextMeasure + ?Sized>(
    measure: &M,
    font: FontFace,
    word: &str,
    max_px: i32,
) -> String {
    let mut end = word.len();
    while let Some((idx, _)) = word[..end].char_indices().next_back() {
        end = idx;
        let candidate = with_ellipsis(&word[..end]);
        if measure.text_width(font, &candidate) <= max_px {
            return candidate;
        }
    }
    String::new()
}

/// Replace the six entities the feed uses, in a fixed order
///
/// Not a general entity decoder: `&amp;lt;` becomes `<` because `&amp;`
/// is handled before `&lt;`.
pub fn html_decode(s: &mut String) {
    const ENTITIES: [(&str, &str); 6] = [
        ("&nbsp;", " "),
        ("&amp;", "&"),
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&apos;", "'"),
    ];
    for (entity, plain) in ENTITIES {
        if s.contains(entity) {
            *s = s.replace(entity, plain);
        }
    }
}

/// Cut `s` after its earliest `.`, `!` or `?`
///
/// A cut sentence comes back trimmed. Text without a terminator is
/// returned exactly as given, surrounding whitespace included.
pub fn keep_first_sentence(s: &str) -> &str {
    match s.find(['.', '!', '?']) {
        Some(idx) => s[..=idx].trim(),
        None => s,
    }
}

/// Remove every `<...>` span; an unterminated `<` truncates the string
pub fn strip_tags(s: &mut String) {
    while let Some(lt) = s.find('<') {
        match s[lt + 1..].find('>') {
            Some(rel) => s.replace_range(lt..=lt + 1 + rel, ""),
            None => {
                s.truncate(lt);
                break;
            }
        }
    }
}

/// Collapse runs of spaces to a single space
pub fn collapse_spaces(s: &mut String) {
    let mut prev_space = false;
    s.retain(|c| {
        let keep = !(c == ' ' && prev_space);
        prev_space = c == ' ';
        keep
    });
}

/// ASCII case-insensitive substring test
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let (h, n) = (haystack.as_bytes(), needle.as_bytes());
    n.is_empty() || h.windows(n.len()).any(|w| w.eq_ignore_ascii_case(n))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Monospace measure: every char is `px` wide
    pub struct FixedMeasure(pub i32);

    impl TextMeasure for FixedMeasure {
        fn text_width(&self, _font: FontFace, text: &str) -> i32 {
            text.chars().count() as i32 * self.0
        }

        fn font_height(&self, _font: FontFace) -> i32 {
            13
        }
    }

    /// Proportional measure: narrow punctuation, wide capitals
    struct VariableMeasure;

    impl TextMeasure for VariableMeasure {
        fn text_width(&self, _font: FontFace, text: &str) -> i32 {
            text.chars()
                .map(|c| match c {
                    ' ' | '.' | ',' | 'i' | 'l' => 3,
                    'A'..='Z' => 9,
                    ELLIPSIS => 8,
                    _ => 6,
                })
                .sum()
        }

        fn font_height(&self, _font: FontFace) -> i32 {
            13
        }
    }

    #[test]
    fn test_ellipsize() {
        assert_eq!(ellipsize("Euston", 10), "Euston");
        assert_eq!(ellipsize("Euston", 6), "Euston");
        assert_eq!(ellipsize("Euston", 4), "Eus…");
        assert_eq!(ellipsize("Euston", 1), "…");
        assert_eq!(ellipsize("Euston", 0), "…");
        assert_eq!(ellipsize("", 0), "");
    }

    #[test]
    fn test_fit_words_drops_whole_words() {
        let m = FixedMeasure(10);
        let out = fit_words_px(&m, FontFace::Tiny, "London Kings Cross", 130);
        assert_eq!(out, "London Kings…");
        let out = fit_words_px(&m, FontFace::Tiny, "London Kings Cross", 70);
        assert_eq!(out, "London…");
    }

    #[test]
    fn test_fit_words_fits_unchanged() {
        let m = FixedMeasure(10);
        assert_eq!(fit_words_px(&m, FontFace::Tiny, "  Euston  ", 60), "Euston");
    }

    #[test]
    fn test_fit_words_single_word_char_trim() {
        let m = FixedMeasure(10);
        assert_eq!(fit_words_px(&m, FontFace::Tiny, "Wolverhampton", 50), "Wolv…");
    }

    #[test]
    fn test_fit_words_first_word_too_wide() {
        let m = FixedMeasure(10);
        assert_eq!(fit_words_px(&m, FontFace::Tiny, "Wolverhampton Low Level", 40), "Wol…");
    }

    #[test]
    fn test_fit_words_degenerate_widths() {
        let m = FixedMeasure(10);
        assert_eq!(fit_words_px(&m, FontFace::Tiny, "Euston", 0), "");
        assert_eq!(fit_words_px(&m, FontFace::Tiny, "Euston", -5), "");
        assert_eq!(fit_words_px(&m, FontFace::Tiny, "Euston", 5), "");
        assert_eq!(fit_words_px(&m, FontFace::Tiny, "Euston", 10), "…");
    }

    #[test]
    fn test_html_decode() {
        let mut s = String::from("Trains &amp; buses running &nbsp;late");
        html_decode(&mut s);
        assert_eq!(s, "Trains & buses running  late");

        let mut s = String::from("&lt;b&gt; &quot;x&quot; &apos;y&apos; &copy;");
        html_decode(&mut s);
        assert_eq!(s, "<b> \"x\" 'y' &copy;");
    }

    #[test]
    fn test_keep_first_sentence() {
        assert_eq!(
            keep_first_sentence("Delays expected. Please check before you travel."),
            "Delays expected."
        );
        assert_eq!(keep_first_sentence("Stop! Then go."), "Stop!");
        assert_eq!(keep_first_sentence("Is it late? Yes."), "Is it late?");
        assert_eq!(keep_first_sentence("No terminator"), "No terminator");
    }

    #[test]
    fn test_keep_first_sentence_trims_only_when_cut() {
        assert_eq!(keep_first_sentence("  Lifts closed. More later"), "Lifts closed.");
        assert_eq!(keep_first_sentence("  no stop here  "), "  no stop here  ");
    }

    #[test]
    fn test_strip_tags() {
        let mut s = String::from("<p>Line <a href=\"x\">closed</a> today</p>");
        strip_tags(&mut s);
        assert_eq!(s, "Line closed today");

        let mut s = String::from("Disruption <a href=");
        strip_tags(&mut s);
        assert_eq!(s, "Disruption ");
    }

    #[test]
    fn test_collapse_spaces() {
        let mut s = String::from("a  b     c d");
        collapse_spaces(&mut s);
        assert_eq!(s, "a b c d");
    }

    proptest! {
        #[test]
        fn prop_fit_words_never_exceeds(s in "[a-zA-Z .,é]{0,60}", w in 1i32..400) {
            let out = fit_words_px(&VariableMeasure, FontFace::Tiny, &s, w);
            prop_assert!(VariableMeasure.text_width(FontFace::Tiny, &out) <= w);

            let out = fit_words_px(&FixedMeasure(7), FontFace::Tiny, &s, w);
            prop_assert!(FixedMeasure(7).text_width(FontFace::Tiny, &out) <= w);
        }

        #[test]
        fn prop_fit_words_keeps_whole_words(s in "[a-z]{1,8}( [a-z]{1,8}){1,6}", w in 1i32..300) {
            let m = FixedMeasure(7);
            let out = fit_words_px(&m, FontFace::Tiny, &s, w);
            let first_len = s.split(' ').next().map(|f| f.len()).unwrap_or(0);
            if let Some(body) = out.strip_suffix(ELLIPSIS) {
                // Either a whole-word prefix or a trim of the first word
                let whole = s.starts_with(body)
                    && (s.len() == body.len() || s.as_bytes()[body.len()] == b' ');
                prop_assert!(whole || body.len() < first_len);
            } else {
                prop_assert!(out.is_empty() || out == s);
            }
        }

        #[test]
        fn prop_ellipsize_bounded_prefix(s in ".{0,40}", n in 0usize..50) {
            let out = ellipsize(&s, n);
            let len = out.chars().count();
            if s.chars().count() <= n {
                prop_assert_eq!(out, s);
            } else {
                prop_assert!(len <= n.max(1));
                let body = out.strip_suffix(ELLIPSIS).unwrap();
                prop_assert!(s.starts_with(body));
            }
        }
    }
}
