//! Streaming tag extraction over a raw SOAP/XML response.
//!
//! The scanner never builds a tree. Each call walks the buffer forward
//! looking for an opening tag whose *local* name matches, then searches
//! for the closing tag spelled with the same namespace prefix, and hands
//! back the slice in between. Prefixes are ignored when matching because
//! the upstream service does not keep them stable between releases.
//!
//! Malformed input never panics: a `<` without a `>` simply ends the scan.

/// An opening tag located by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenTag<'a> {
    /// Namespace prefix without the colon, empty when unprefixed
    prefix: &'a str,
    /// Byte offset just past the opening tag's `>`
    inner_start: usize,
}

/// Result of looking for an element's close
enum Match<'a> {
    /// Element fully closed: inner slice and offset past the close tag
    Closed(&'a str, usize),
    /// Opening tag found but never closed
    Unclosed(usize),
}

/// Find the next opening tag named `local` at or after `from`
fn open_tag<'a>(buf: &'a str, local: &str, from: usize) -> Option<OpenTag<'a>> {
    let bytes = buf.as_bytes();
    let mut i = from;

    while i < bytes.len() {
        let lt = i + bytes[i..].iter().position(|&b| b == b'<')?;
        if bytes.get(lt + 1) == Some(&b'/') {
            i = lt + 1;
            continue;
        }
        let gt = lt + 1 + bytes[lt + 1..].iter().position(|&b| b == b'>')?;

        let head = &buf[lt + 1..gt];
        let name = head.split(' ').next().unwrap_or(head);
        let (prefix, bare) = match name.find(':') {
            Some(colon) => (&name[..colon], &name[colon + 1..]),
            None => ("", name),
        };

        if bare == local {
            return Some(OpenTag {
                prefix,
                inner_start: gt + 1,
            });
        }
        i = gt + 1;
    }

    None
}

/// Find `</prefix:local>` at or after `from`, returning (start, end) offsets
fn close_tag(buf: &str, prefix: &str, local: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = buf.as_bytes();
    let mut i = from;

    while i + 1 < bytes.len() {
        let start = i + buf[i..].find("</")?;
        if let Some(rest) = strip_close(&buf[start + 2..], prefix, local) {
            return Some((start, buf.len() - rest.len()));
        }
        i = start + 2;
    }

    None
}

/// Strip `prefix:local>` from the front of `s`
fn strip_close<'b>(s: &'b str, prefix: &str, local: &str) -> Option<&'b str> {
    let s = if prefix.is_empty() {
        s
    } else {
        s.strip_prefix(prefix)?.strip_prefix(':')?
    };
    s.strip_prefix(local)?.strip_prefix('>')
}

fn locate<'a>(buf: &'a str, local: &str, from: usize) -> Option<Match<'a>> {
    if from > buf.len() || local.is_empty() {
        return None;
    }
    let open = open_tag(buf, local, from)?;
    match close_tag(buf, open.prefix, local, open.inner_start) {
        Some((end, after)) => Some(Match::Closed(&buf[open.inner_start..end], after)),
        None => Some(Match::Unclosed(open.inner_start)),
    }
}

/// Return the inner text of the first closed element named `local`
///
/// Scanning starts at byte offset `from`. An opening tag with no matching
/// close is passed over and the scan continues, so the first sufficiently
/// closed match wins.
pub fn find_first<'a>(buf: &'a str, local: &str, from: usize) -> Option<&'a str> {
    let mut pos = from;
    loop {
        match locate(buf, local, pos)? {
            Match::Closed(inner, _) => return Some(inner),
            Match::Unclosed(next) => pos = next,
        }
    }
}

/// Return the inner text of the next element named `local` after `cursor`
///
/// On success the cursor moves past the consumed closing tag, ready for
/// the next sibling. When the next matching element is never closed the
/// scan ends: the cursor moves to the end of the buffer and `None` is
/// returned.
pub fn find_next<'a>(buf: &'a str, local: &str, cursor: &mut usize) -> Option<&'a str> {
    match locate(buf, local, *cursor) {
        Some(Match::Closed(inner, after)) => {
            *cursor = after;
            Some(inner)
        }
        Some(Match::Unclosed(_)) => {
            *cursor = buf.len();
            None
        }
        None => None,
    }
}

/// Iterator over sibling elements with the same local name
#[derive(Debug, Clone)]
pub struct Elements<'a, 'n> {
    buf: &'a str,
    local: &'n str,
    cursor: usize,
}

impl<'a, 'n> Elements<'a, 'n> {
    /// Iterate every `local` element in `buf`, in document order
    pub fn new(buf: &'a str, local: &'n str) -> Self {
        Self {
            buf,
            local,
            cursor: 0,
        }
    }

    /// Current scan position in bytes
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl<'a> Iterator for Elements<'a, '_> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        find_next(self.buf, self.local, &mut self.cursor)
    }
}

/// Convenience: iterate `local` elements inside `buf`
pub fn elements<'a, 'n>(buf: &'a str, local: &'n str) -> Elements<'a, 'n> {
    Elements::new(buf, local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_find_first_unprefixed() {
        let xml = "<a><b>hello</b></a>";
        assert_eq!(find_first(xml, "b", 0), Some("hello"));
        assert_eq!(find_first(xml, "a", 0), Some("<b>hello</b>"));
    }

    #[test]
    fn test_find_first_ignores_prefix() {
        let xml = "<lt4:locationName>Euston</lt4:locationName>";
        assert_eq!(find_first(xml, "locationName", 0), Some("Euston"));
    }

    #[test]
    fn test_find_first_requires_same_prefix_on_close() {
        let xml = "<x:std>10:05</y:std><x:std>10:07</x:std>";
        // First opening closes only with </x:std>, which appears later
        assert_eq!(find_first(xml, "std", 0), Some("10:05</y:std><x:std>10:07"));
    }

    #[test]
    fn test_find_first_ignores_attributes() {
        let xml = r#"<soap:Fault xmlns:soap="urn:x"><faultstring>bad</faultstring></soap:Fault>"#;
        assert_eq!(find_first(xml, "faultstring", 0), Some("bad"));
        assert!(find_first(xml, "Fault", 0).is_some());
    }

    #[test]
    fn test_find_first_skips_closing_tags() {
        let xml = "</service><service>one</service>";
        assert_eq!(find_first(xml, "service", 0), Some("one"));
    }

    #[test]
    fn test_find_first_skips_unclosed_candidate() {
        let xml = "<a:eta>never closed<b:eta>07:10</b:eta>";
        assert_eq!(find_first(xml, "eta", 0), Some("07:10"));
    }

    #[test]
    fn test_find_first_missing() {
        assert_eq!(find_first("<a>1</a>", "b", 0), None);
        assert_eq!(find_first("", "b", 0), None);
        assert_eq!(find_first("<a>1</a>", "a", 100), None);
    }

    #[test]
    fn test_find_first_from_offset() {
        let xml = "<t>1</t><t>2</t>";
        assert_eq!(find_first(xml, "t", 1), Some("2"));
    }

    #[test]
    fn test_find_first_does_not_match_longer_names() {
        let xml = "<stdx>no</stdx><std>yes</std>";
        assert_eq!(find_first(xml, "std", 0), Some("yes"));
    }

    #[test]
    fn test_unterminated_lt_ends_scan() {
        assert_eq!(find_first("<a>1</a><b", "b", 0), None);
    }

    #[test]
    fn test_self_closing_not_matched() {
        let xml = "<platform/><platform>4</platform>";
        assert_eq!(find_first(xml, "platform", 0), Some("4"));
    }

    #[test]
    fn test_find_next_two_siblings() {
        let xml = "<ts><lt:service>one</lt:service><lt:service>two</lt:service></ts>";
        let mut cursor = 0;
        assert_eq!(find_next(xml, "service", &mut cursor), Some("one"));
        assert_eq!(find_next(xml, "service", &mut cursor), Some("two"));
        assert_eq!(find_next(xml, "service", &mut cursor), None);
        assert_eq!(find_next(xml, "service", &mut cursor), None);
    }

    #[test]
    fn test_find_next_cursor_past_close() {
        let xml = "<m>a</m>tail";
        let mut cursor = 0;
        assert_eq!(find_next(xml, "m", &mut cursor), Some("a"));
        assert_eq!(&xml[cursor..], "tail");
    }

    #[test]
    fn test_find_next_unclosed_ends_scan() {
        let xml = "<m>a</m><m>broken<m>c</m>";
        let mut cursor = 0;
        assert_eq!(find_next(xml, "m", &mut cursor), Some("a"));
        // "<m>broken" pairs with the later "</m>", so it is consumed whole
        assert_eq!(find_next(xml, "m", &mut cursor), Some("broken<m>c"));

        let xml = "<m>a</m><n:m>broken</m>";
        let mut cursor = 0;
        assert_eq!(find_next(xml, "m", &mut cursor), Some("a"));
        assert_eq!(find_next(xml, "m", &mut cursor), None);
        assert_eq!(cursor, xml.len());
    }

    #[test]
    fn test_elements_iterator() {
        let xml = "<msg><text>A</text></msg><msg><text>B</text></msg>";
        let inner: heapless::Vec<&str, 4> = elements(xml, "msg").collect();
        assert_eq!(inner.as_slice(), &["<text>A</text>", "<text>B</text>"]);
    }

    #[test]
    fn test_multibyte_content() {
        let xml = "<t>Café – überall</t>";
        assert_eq!(find_first(xml, "t", 0), Some("Café – überall"));
    }

    proptest! {
        #[test]
        fn prop_never_panics(buf in ".{0,200}", from in 0usize..250) {
            let _ = find_first(&buf, "service", from);
            let mut cursor = 0;
            let mut steps = 0;
            while find_next(&buf, "service", &mut cursor).is_some() {
                steps += 1;
                prop_assert!(steps <= buf.len());
            }
        }

        #[test]
        fn prop_sibling_payloads_in_order(
            items in proptest::collection::vec("[a-zA-Z0-9 ]{0,12}", 0..6),
            prefix in prop_oneof![Just(""), Just("lt4:"), Just("ns:")],
        ) {
            let mut xml = heapless::String::<512>::new();
            for item in &items {
                let _ = xml.push_str("<");
                let _ = xml.push_str(prefix);
                let _ = xml.push_str("service>");
                let _ = xml.push_str(item);
                let _ = xml.push_str("</");
                let _ = xml.push_str(prefix);
                let _ = xml.push_str("service>");
            }
            let found: heapless::Vec<&str, 8> = elements(&xml, "service").collect();
            prop_assert_eq!(found.len(), items.len());
            for (got, want) in found.iter().zip(items.iter()) {
                prop_assert_eq!(*got, want.as_str());
            }
        }
    }
}
