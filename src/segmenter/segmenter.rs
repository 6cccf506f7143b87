use std::io::BufRead;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

// [1], [2.2], [3.1.2]
static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[0-9.]+\]").unwrap());
static TRAILING_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+$").unwrap());
static BRACKETED_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\[\]]*\]").unwrap());

/// A labelled span of source text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub label: String,
    pub text: String,
}

impl Location {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmenterOptions {
    /// Append line numbers to section labels ("3.2" becomes "3.2.7").
    pub use_line_numbers: bool,
    /// Emit the final location at end of input even when it holds no text.
    pub emit_empty_tail: bool,
}

// A line split around its location markers
enum Fragment<'a> {
    Marker(&'a str),
    Text(&'a str),
}

fn split_fragments(line: &str) -> Vec<Fragment<'_>> {
    let mut fragments = Vec::new();
    let mut last_end = 0;
    for found in MARKER_REGEX.find_iter(line) {
        fragments.push(Fragment::Text(&line[last_end..found.start()]));
        let marker = found.as_str();
        fragments.push(Fragment::Marker(&marker[1..marker.len() - 1]));
        last_end = found.end();
    }
    fragments.push(Fragment::Text(&line[last_end..]));
    fragments
}

fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Turns a line-oriented reader into a forward-only stream of locations.
///
/// Bracketed markers of digits and periods open a new section. Without any
/// markers every line becomes its own location numbered by a running line
/// counter, which a trailing run of digits on a line resynchronises.
pub struct LocationSegmenter<R: BufRead> {
    reader: R,
    options: SegmenterOptions,
    buffer: String,
    section: String,
    line_number: u64,
    // locations produced by the current line but not yet handed out
    pending: Vec<Location>,
    pending_index: usize,
    line: String,
    finished: bool,
}

impl<R: BufRead> LocationSegmenter<R> {
    pub fn new(reader: R, options: SegmenterOptions) -> Self {
        Self {
            reader,
            options,
            buffer: String::new(),
            section: String::new(),
            line_number: 1,
            pending: Vec::with_capacity(4),
            pending_index: 0,
            line: String::with_capacity(256),
            finished: false,
        }
    }

    fn formatted_label(&self) -> String {
        if !self.section.is_empty() && self.options.use_line_numbers {
            format!("{}.{}", self.section, self.line_number)
        } else if !self.section.is_empty() {
            self.section.clone()
        } else {
            self.line_number.to_string()
        }
    }

    fn flush(&mut self) -> Location {
        let label = self.formatted_label();
        Location::new(label, std::mem::take(&mut self.buffer))
    }

    fn advance_line_number(&mut self) {
        match self.line_number.checked_add(1) {
            Some(next) => self.line_number = next,
            None => warn!(line_number = self.line_number, "line counter saturated"),
        }
    }

    fn process_line(&mut self, line: &str) {
        let content = line.trim_end_matches(['\n', '\r']);
        if let Some(found) = TRAILING_NUMBER_REGEX.find(content) {
            match found.as_str().parse::<u64>() {
                Ok(number) => self.line_number = number,
                Err(e) => warn!(
                    number = found.as_str(),
                    error = %e,
                    "line number out of range, keeping the running count"
                ),
            }
        }

        for fragment in split_fragments(line) {
            match fragment {
                Fragment::Marker(section) => {
                    if !self.buffer.is_empty() && !self.section.is_empty() && !is_blank(&self.buffer)
                    {
                        let location = self.flush();
                        self.pending.push(location);
                    } else if !self.buffer.is_empty() && !is_blank(&self.buffer) {
                        warn!(
                            text = %self.buffer.trim(),
                            "discarding text that precedes the first location marker"
                        );
                    }
                    self.buffer.clear();
                    self.section = section.to_string();
                    self.line_number = 1;
                }
                Fragment::Text(text) => {
                    if text.is_empty() || is_blank(text) {
                        continue;
                    }
                    for bracketed in BRACKETED_REGEX.find_iter(text) {
                        warn!(
                            marker = bracketed.as_str(),
                            "malformed location marker treated as text"
                        );
                    }
                    self.buffer.push_str(text);
                }
            }
        }

        if !self.buffer.is_empty() && (self.options.use_line_numbers || self.section.is_empty()) {
            let location = self.flush();
            self.pending.push(location);
            self.advance_line_number();
        }
    }

    fn next_pending(&mut self) -> Option<Location> {
        if self.pending_index < self.pending.len() {
            let location = std::mem::take(&mut self.pending[self.pending_index]);
            self.pending_index += 1;
            return Some(location);
        }
        None
    }

    // Reads lines until at least one location is ready or the input ends
    fn advance(&mut self) -> Result<bool> {
        self.pending.clear();
        self.pending_index = 0;
        while self.pending.is_empty() {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            let line = std::mem::take(&mut self.line);
            self.process_line(&line);
            self.line = line;
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for LocationSegmenter<R> {
    type Item = Result<Location>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(location) = self.next_pending() {
            return Some(Ok(location));
        }
        if self.finished {
            return None;
        }
        match self.advance() {
            Ok(true) => self.next_pending().map(Ok),
            Ok(false) => {
                self.finished = true;
                if !self.buffer.is_empty() || self.options.emit_empty_tail {
                    Some(Ok(self.flush()))
                } else {
                    None
                }
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Cursor;

    fn segment(input: &str, options: SegmenterOptions) -> Vec<Location> {
        LocationSegmenter::new(Cursor::new(input), options)
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_sections_without_line_numbers() {
        let locations = segment("[1] arma virumque\n[2] cano", SegmenterOptions::default());
        assert_eq!(
            locations,
            vec![
                Location::new("1", " arma virumque\n"),
                Location::new("2", " cano"),
            ]
        );
    }

    #[test]
    fn test_line_numbers_without_markers() {
        let locations = segment("primus\nsecundus\n", SegmenterOptions::default());
        let labels: Vec<&str> = locations.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2"]);
        assert_eq!(locations[0].text, "primus\n");
        assert_eq!(locations[1].text, "secundus\n");
    }

    #[test]
    fn test_empty_tail_is_opt_in() {
        let options = SegmenterOptions {
            emit_empty_tail: true,
            ..Default::default()
        };
        let locations = segment("primus\nsecundus\n", options);
        assert_eq!(locations.len(), 3);
        assert_eq!(locations[2], Location::new("3", ""));
    }

    #[test]
    fn test_sections_with_line_numbers() {
        let options = SegmenterOptions {
            use_line_numbers: true,
            ..Default::default()
        };
        let locations = segment("[3.2] arma\nvirumque\n[3.3] cano\n", options);
        let labels: Vec<&str> = locations.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["3.2.1", "3.2.2", "3.3.1"]);
    }

    #[test]
    fn test_section_spans_several_lines() {
        let locations = segment("[1] arma\nvirumque\n[2] cano\n", SegmenterOptions::default());
        assert_eq!(locations[0], Location::new("1", " arma\nvirumque\n"));
        assert_eq!(locations[1], Location::new("2", " cano\n"));
    }

    #[test]
    fn test_trailing_number_resynchronises_counter() {
        let locations = segment("arma virumque\ncano 10\nTroiae\n", SegmenterOptions::default());
        let labels: Vec<&str> = locations.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "10", "11"]);
        // the hint stays in the text
        assert_eq!(locations[1].text, "cano 10\n");
    }

    #[test]
    fn test_huge_line_numbers_do_not_overflow() {
        let locations = segment(
            "arma 18446744073709551615\ncano\n",
            SegmenterOptions::default(),
        );
        let labels: Vec<&str> = locations.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["18446744073709551615", "18446744073709551615"]);

        // too large to count with, so the running count carries on
        let locations = segment(
            "arma\ncano 123456789012345678901234567890\nTroiae\n",
            SegmenterOptions::default(),
        );
        let labels: Vec<&str> = locations.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_read_error_ends_stream() {
        let mut segmenter = LocationSegmenter::new(
            Cursor::new(b"arma\n\xff\xfe\ncano\n".to_vec()),
            SegmenterOptions::default(),
        );
        assert_eq!(segmenter.next().unwrap().unwrap(), Location::new("1", "arma\n"));
        assert!(matches!(segmenter.next(), Some(Err(Error::Io(_)))));
        assert!(segmenter.next().is_none());
    }

    #[test]
    fn test_malformed_marker_is_text() {
        let locations = segment("[a.b] arma\n", SegmenterOptions::default());
        assert_eq!(locations, vec![Location::new("1", "[a.b] arma\n")]);
    }

    #[test]
    fn test_whitespace_fragments_are_dropped() {
        let locations = segment("[1]   \n[2] cano\n", SegmenterOptions::default());
        assert_eq!(locations, vec![Location::new("2", " cano\n")]);
    }

    #[test]
    fn test_several_markers_on_one_line() {
        let locations = segment("[1] arma [2] virumque [3] cano\n", SegmenterOptions::default());
        assert_eq!(
            locations,
            vec![
                Location::new("1", " arma "),
                Location::new("2", " virumque "),
                Location::new("3", " cano\n"),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("", SegmenterOptions::default()).is_empty());
        let options = SegmenterOptions {
            emit_empty_tail: true,
            ..Default::default()
        };
        assert_eq!(segment("", options), vec![Location::new("1", "")]);
    }

    #[test]
    fn test_lazy_pull() {
        let mut segmenter =
            LocationSegmenter::new(Cursor::new("primus\nsecundus\n"), SegmenterOptions::default());
        let first = segmenter.next().unwrap().unwrap();
        assert_eq!(first.label, "1");
        // the second line has not been read yet
        assert_eq!(segmenter.line_number, 2);
        assert!(segmenter.buffer.is_empty());
    }
}
