/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 16/10/26
******************************************************************************/

//! Line framing for feed bodies.

use crate::utils::StreamError;
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::warn;

/// Splits a byte stream into text lines of bounded length.
///
/// A line ends at `\n`; one trailing `\r` is removed. The length limit applies to
/// the line without its `\n`, and a line over the limit is an error: nothing
/// of it is ever yielded. Bytes that are not valid UTF-8 are replaced with
/// `U+FFFD` and the line is still yielded.
#[derive(Debug, Clone)]
pub(crate) struct FeedLineCodec {
    max_length: usize,
    /// Offset up to which the buffer is known to hold no `\n`.
    next_index: usize,
}

impl FeedLineCodec {
    pub(crate) fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
        }
    }

    fn take_line(&mut self, buf: &mut BytesMut, end: usize, consumed: usize) -> String {
        self.next_index = 0;
        let mut line = buf.split_to(consumed);
        line.truncate(end);
        if line.last() == Some(&b'\r') {
            line.truncate(end - 1);
        }
        decode_text(&line)
    }
}

fn decode_text(line: &[u8]) -> String {
    match std::str::from_utf8(line) {
        Ok(text) => text.to_owned(),
        Err(e) => {
            warn!(
                "Line of {} bytes is not valid UTF-8 ({}), replacing invalid sequences",
                line.len(),
                e
            );
            String::from_utf8_lossy(line).into_owned()
        }
    }
}

impl Decoder for FeedLineCodec {
    type Item = String;
    type Error = StreamError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, StreamError> {
        // A terminator past max_length means the line is already too long.
        let read_to = buf.len().min(self.max_length.saturating_add(1));
        let newline = buf[self.next_index..read_to]
            .iter()
            .position(|b| *b == b'\n')
            .map(|offset| self.next_index + offset);

        match newline {
            Some(end) => Ok(Some(self.take_line(buf, end, end + 1))),
            None if buf.len() > self.max_length => Err(StreamError::LineTooLong {
                limit: self.max_length,
            }),
            None => {
                self.next_index = read_to;
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, StreamError> {
        match self.decode(buf)? {
            Some(line) => Ok(Some(line)),
            None if buf.is_empty() => Ok(None),
            None => {
                let end = buf.len();
                Ok(Some(self.take_line(buf, end, end)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut FeedLineCodec, buf: &mut BytesMut) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = codec.decode(buf).unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_splits_complete_lines() {
        let mut codec = FeedLineCodec::new(64);
        let mut buf = BytesMut::from(&b"{\"a\":1}\n{\"b\":2}\r\n"[..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["{\"a\":1}", "{\"b\":2}"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_waits_for_partial_line() {
        let mut codec = FeedLineCodec::new(64);
        let mut buf = BytesMut::from(&b"hel"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"lo\nwor");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("hello".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"ld\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("world".to_string()));
    }

    #[test]
    fn test_empty_lines_are_yielded() {
        let mut codec = FeedLineCodec::new(8);
        let mut buf = BytesMut::from(&b"\n\r\nx\n"[..]);
        assert_eq!(decode_all(&mut codec, &mut buf), vec!["", "", "x"]);
    }

    #[test]
    fn test_line_at_limit_is_accepted() {
        let mut codec = FeedLineCodec::new(4);
        let mut buf = BytesMut::from(&b"abcd\n"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("abcd".to_string()));
    }

    #[test]
    fn test_line_over_limit_fails() {
        let mut codec = FeedLineCodec::new(4);
        let mut buf = BytesMut::from(&b"abcde\n"[..]);
        match codec.decode(&mut buf) {
            Err(StreamError::LineTooLong { limit }) => assert_eq!(limit, 4),
            other => panic!("expected LineTooLong, got {:?}", other),
        }
    }

    #[test]
    fn test_line_over_limit_fails_before_terminator_arrives() {
        let mut codec = FeedLineCodec::new(4);
        let mut buf = BytesMut::from(&b"abc"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"def");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(StreamError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_eof_yields_unterminated_line() {
        let mut codec = FeedLineCodec::new(16);
        let mut buf = BytesMut::from(&b"first\nlast"[..]);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("first".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some("last".to_string()));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_eof_on_empty_buffer() {
        let mut codec = FeedLineCodec::new(16);
        let mut buf = BytesMut::new();
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut codec = FeedLineCodec::new(16);
        let mut buf = BytesMut::from(&b"ok\xffok\n"[..]);
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some("ok\u{fffd}ok".to_string())
        );
    }
}
