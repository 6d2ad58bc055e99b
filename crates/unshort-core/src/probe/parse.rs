//! Extract the redirect target from raw response header lines.

use super::ProbeError;

/// Returns the value of the last `Location` header of the final response in `lines`.
///
/// A status line (`HTTP/...`) starts a new response and resets what was seen
/// so far, so interim `1xx` headers never leak into the result. Duplicate
/// `Location` headers are tolerated; the last one listed wins, and an empty
/// last value means no redirect.
pub(crate) fn location_from_headers(lines: &[Vec<u8>]) -> Result<Option<String>, ProbeError> {
    let mut location = None;

    for raw in lines {
        let text = String::from_utf8_lossy(raw);
        let line = text.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            location = None;
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            if !name.trim().eq_ignore_ascii_case("location") {
                continue;
            }
            if std::str::from_utf8(raw).is_err() {
                return Err(ProbeError::MalformedHeader);
            }
            let value = value.trim();
            location = if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            };
        }
    }

    Ok(location)
}

/// Length of the head at the start of `buf`, up to and including the blank
/// line that ends the first non-`1xx` response, once it has fully arrived.
pub(crate) fn final_head_len(buf: &[u8]) -> Option<usize> {
    let mut start = 0;
    loop {
        let end = start + blank_line_end(&buf[start..])?;
        if !is_interim(&buf[start..end]) {
            return Some(end);
        }
        start = end;
    }
}

/// Splits a raw head into lines, each keeping its line terminator.
pub(crate) fn split_lines(head: &[u8]) -> Vec<Vec<u8>> {
    head.split_inclusive(|&b| b == b'\n')
        .map(<[u8]>::to_vec)
        .collect()
}

fn blank_line_end(buf: &[u8]) -> Option<usize> {
    let newlines = buf.iter().enumerate().filter(|&(_, &b)| b == b'\n');
    for (i, _) in newlines {
        let rest = &buf[i + 1..];
        if rest.starts_with(b"\n") {
            return Some(i + 2);
        }
        if rest.starts_with(b"\r\n") {
            return Some(i + 3);
        }
    }
    None
}

fn is_interim(head: &[u8]) -> bool {
    head.split(|&b| b == b' ')
        .nth(1)
        .is_some_and(|code| code.len() == 3 && code[0] == b'1')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<Vec<u8>> {
        raw.iter().map(|l| format!("{}\r\n", l).into_bytes()).collect()
    }

    #[test]
    fn location_from_redirect() {
        let h = lines(&[
            "HTTP/1.1 301 Moved Permanently",
            "Location: https://example.com/x",
            "Content-Length: 0",
            "",
        ]);
        assert_eq!(
            location_from_headers(&h).unwrap().as_deref(),
            Some("https://example.com/x")
        );
    }

    #[test]
    fn header_name_is_case_insensitive() {
        let h = lines(&["HTTP/2 302", "location: https://example.com/lower", ""]);
        assert_eq!(
            location_from_headers(&h).unwrap().as_deref(),
            Some("https://example.com/lower")
        );
    }

    #[test]
    fn no_location_header() {
        let h = lines(&["HTTP/1.1 200 OK", "Content-Type: text/html", ""]);
        assert_eq!(location_from_headers(&h).unwrap(), None);
    }

    #[test]
    fn last_location_wins() {
        let h = lines(&[
            "HTTP/1.1 301 Moved Permanently",
            "Location: https://first.example.com/",
            "Location: https://second.example.com/",
            "",
        ]);
        assert_eq!(
            location_from_headers(&h).unwrap().as_deref(),
            Some("https://second.example.com/")
        );
    }

    #[test]
    fn value_keeps_colons() {
        let h = lines(&["HTTP/1.1 301", "Location: https://example.com:8443/a?b=c:d", ""]);
        assert_eq!(
            location_from_headers(&h).unwrap().as_deref(),
            Some("https://example.com:8443/a?b=c:d")
        );
    }

    #[test]
    fn empty_location_is_not_a_redirect() {
        let h = lines(&["HTTP/1.1 301", "Location:   ", ""]);
        assert_eq!(location_from_headers(&h).unwrap(), None);
    }

    #[test]
    fn interim_response_headers_are_discarded() {
        let h = lines(&[
            "HTTP/1.1 103 Early Hints",
            "Location: https://interim.example.com/",
            "",
            "HTTP/1.1 200 OK",
            "Content-Length: 0",
            "",
        ]);
        assert_eq!(location_from_headers(&h).unwrap(), None);
    }

    #[test]
    fn non_utf8_location_is_malformed() {
        let mut h = lines(&["HTTP/1.1 301"]);
        h.push(b"Location: https://example.com/\xff\xfe\r\n".to_vec());
        assert!(matches!(
            location_from_headers(&h),
            Err(ProbeError::MalformedHeader)
        ));
    }

    #[test]
    fn non_utf8_unrelated_header_is_ignored() {
        let mut h = lines(&["HTTP/1.1 301", "Location: https://example.com/ok"]);
        h.push(b"X-Legacy: caf\xe9\r\n".to_vec());
        assert_eq!(
            location_from_headers(&h).unwrap().as_deref(),
            Some("https://example.com/ok")
        );
    }

    #[test]
    fn raw_head_ends_at_blank_line() {
        let buf = b"HTTP/1.1 301 Moved\r\nLocation: /a\r\n\r\nbody bytes";
        assert_eq!(final_head_len(buf), Some(buf.len() - "body bytes".len()));
        assert_eq!(final_head_len(b"HTTP/1.1 301 Moved\r\nLocation: /a\r\n"), None);
    }

    #[test]
    fn raw_head_skips_interim_response() {
        let buf = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 302 Found\r\nLocation: /b\r\n\r\n";
        assert_eq!(final_head_len(buf), Some(buf.len()));
        assert_eq!(final_head_len(b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 302"), None);
    }

    #[test]
    fn raw_head_with_repeated_location_keeps_last() {
        let buf = b"HTTP/1.1 301 Moved\r\nLocation: https://first.example.com/\r\nLocation: https://second.example.com/\r\n\r\n";
        let head = split_lines(&buf[..final_head_len(buf).unwrap()]);
        assert_eq!(head.len(), 4);
        assert_eq!(
            location_from_headers(&head).unwrap().as_deref(),
            Some("https://second.example.com/")
        );
    }
}
