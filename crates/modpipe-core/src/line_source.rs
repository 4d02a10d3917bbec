//! Line-oriented input records.
//!
//! [`LineSource`] lazily yields one record per input line. Trailing
//! whitespace (the line terminator included) is stripped and blank lines
//! are kept, so the number of records always equals the number of lines.
//! Lines longer than [`MAX_LINE_BYTES`] are cut on a character boundary
//! and the remainder of the line is discarded.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Longest record, in bytes, before truncation.
pub const MAX_LINE_BYTES: usize = 64;

// Extra bytes kept past the limit so a character straddling it stays whole.
const UTF8_SLACK: usize = 3;

/// Iterator over the records of a reader.
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    max_len: usize,
    buf: Vec<u8>,
}

impl LineSource<BufReader<File>> {
    /// Open `path` for reading.
    pub fn open(path: &Path) -> io::Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> LineSource<R> {
    /// Records of `reader`, truncated at [`MAX_LINE_BYTES`].
    pub fn new(reader: R) -> Self {
        Self::with_max_len(reader, MAX_LINE_BYTES)
    }

    /// Same as [`LineSource::new`] with a custom record limit.
    pub fn with_max_len(reader: R, max_len: usize) -> Self {
        Self {
            reader,
            max_len,
            buf: Vec::with_capacity(max_len + UTF8_SLACK),
        }
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        let keep = self.max_len + UTF8_SLACK;
        let mut read_any = false;

        // Copy at most `keep` bytes of the line; skip the rest up to '\n'.
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };
            if available.is_empty() {
                break;
            }
            read_any = true;

            let (line, used, at_end) = match available.iter().position(|&b| b == b'\n') {
                Some(i) => (&available[..i], i + 1, true),
                None => (available, available.len(), false),
            };
            let room = keep.saturating_sub(self.buf.len());
            self.buf.extend_from_slice(&line[..line.len().min(room)]);
            self.reader.consume(used);

            if at_end {
                break;
            }
        }

        if !read_any {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buf);
        let line = truncate(&line, self.max_len);
        Some(Ok(line.trim_end().to_string()))
    }
}

/// Longest prefix of `s` that fits in `max` bytes and ends on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read, Write};

    fn records(input: &str) -> Vec<String> {
        LineSource::new(Cursor::new(input.as_bytes().to_vec()))
            .collect::<io::Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn strips_trailing_whitespace() {
        assert_eq!(records("hello  \r\nworld\t\n"), vec!["hello", "world"]);
    }

    #[test]
    fn keeps_leading_whitespace() {
        assert_eq!(records("  indented\n"), vec!["  indented"]);
    }

    #[test]
    fn blank_lines_are_records() {
        assert_eq!(records("a\n\n   \nb\n"), vec!["a", "", "", "b"]);
    }

    #[test]
    fn last_line_without_newline() {
        assert_eq!(records("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(records("").is_empty());
    }

    #[test]
    fn long_lines_are_truncated_and_remainder_dropped() {
        let long = "x".repeat(100);
        let got = records(&format!("{long}\nnext\n"));
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].len(), MAX_LINE_BYTES);
        assert_eq!(got[1], "next");
    }

    #[test]
    fn huge_line_is_not_buffered() {
        let huge = io::repeat(b'x').take(8 << 20).chain(&b"\nnext\n"[..]);
        let mut source = LineSource::new(BufReader::new(huge));

        let first = source.next().unwrap().unwrap();
        assert_eq!(first.len(), MAX_LINE_BYTES);
        assert!(source.buf.len() <= MAX_LINE_BYTES + UTF8_SLACK);
        assert!(source.buf.capacity() < 1024, "capacity {}", source.buf.capacity());

        assert_eq!(source.next().unwrap().unwrap(), "next");
        assert!(source.next().is_none());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 'é' is two bytes; a 3-byte limit must not split the second one.
        let got: Vec<String> = LineSource::with_max_len(Cursor::new("éé".as_bytes()), 3)
            .map(Result::unwrap)
            .collect();
        assert_eq!(got, vec!["é"]);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let got: Vec<String> = LineSource::new(Cursor::new(&b"ok\xff\n"[..]))
            .map(Result::unwrap)
            .collect();
        assert_eq!(got, vec!["ok\u{fffd}"]);
    }

    #[test]
    fn open_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "one\ntwo\n").unwrap();
        let got: Vec<String> = LineSource::open(file.path())
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(got, vec!["one", "two"]);
    }

    #[test]
    fn open_missing_file_fails() {
        assert!(LineSource::open(Path::new("/nonexistent/modpipe/input.txt")).is_err());
    }
}
