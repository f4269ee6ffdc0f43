//! HTTP/1.1 request head parsing
//!
//! Only what the control surface needs: method, path without the query,
//! and `Content-Length`. Header names are matched case-insensitively.

/// Largest request head accepted
pub const MAX_HEAD_LEN: usize = 1024;

/// Largest request body accepted
pub const MAX_BODY_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Method {
    Get,
    Post,
    Delete,
    Other,
}

impl Method {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "DELETE" => Method::Delete,
            _ => Method::Other,
        }
    }
}

/// Errors while reading a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Request line or a header could not be read
    Malformed,
    /// Head or declared body exceeds the buffer
    TooLarge,
}

/// A parsed request head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHead<'a> {
    pub method: Method,
    pub path: &'a str,
    pub content_length: usize,
    /// Bytes up to and including the blank line
    pub head_len: usize,
}

fn head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4)
}

/// Parse the head at the start of `buf`
///
/// Returns `Ok(None)` while the blank line has not arrived yet.
pub fn parse_head(buf: &[u8]) -> Result<Option<RequestHead<'_>>, RequestError> {
    let Some(head_len) = head_end(buf) else {
        return if buf.len() >= MAX_HEAD_LEN {
            Err(RequestError::TooLarge)
        } else {
            Ok(None)
        };
    };
    let head = core::str::from_utf8(&buf[..head_len]).map_err(|_| RequestError::Malformed)?;
    let mut lines = head.split("\r\n");

    let request_line = lines.next().ok_or(RequestError::Malformed)?;
    let mut parts = request_line.split(' ');
    let method = Method::parse(parts.next().ok_or(RequestError::Malformed)?);
    let target = parts.next().filter(|t| t.starts_with('/')).ok_or(RequestError::Malformed)?;
    let path = target.split('?').next().unwrap_or(target);

    let mut content_length = 0;
    for line in lines.filter(|l| !l.is_empty()) {
        let (name, value) = line.split_once(':').ok_or(RequestError::Malformed)?;
        if name.trim().eq_ignore_ascii_case("content-length") {
            content_length = value.trim().parse().map_err(|_| RequestError::Malformed)?;
        }
    }
    if content_length > MAX_BODY_LEN {
        return Err(RequestError::TooLarge);
    }

    Ok(Some(RequestHead {
        method,
        path,
        content_length,
        head_len,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post() {
        let raw = b"POST /api/settings?x=1 HTTP/1.1\r\nHost: board\r\ncontent-length: 17\r\n\r\n{\"station\":\"EUS\"}";
        let head = parse_head(raw).unwrap().unwrap();
        assert_eq!(head.method, Method::Post);
        assert_eq!(head.path, "/api/settings");
        assert_eq!(head.content_length, 17);
        assert_eq!(&raw[head.head_len..], b"{\"station\":\"EUS\"}");
    }

    #[test]
    fn test_incomplete_head() {
        assert_eq!(parse_head(b"GET / HTTP/1.1\r\nHost: x\r\n"), Ok(None));
    }

    #[test]
    fn test_malformed() {
        assert_eq!(parse_head(b"GET\r\n\r\n"), Err(RequestError::Malformed));
        assert_eq!(
            parse_head(b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n"),
            Err(RequestError::Malformed)
        );
    }

    #[test]
    fn test_body_too_large() {
        assert_eq!(
            parse_head(b"POST / HTTP/1.1\r\nContent-Length: 999999\r\n\r\n"),
            Err(RequestError::TooLarge)
        );
    }
}
