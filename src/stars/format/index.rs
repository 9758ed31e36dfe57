//! Line cursor over the `.irf` index stream.
//!
//! The index stream is line-oriented text with whitespace-separated tokens.
//! The first token of a line is its keyword. Multi-line records run until a
//! physical line whose last token is the terminator (`/`).

use std::io::{BufRead, Seek, SeekFrom};

use encoding_rs::Encoding;
use log::trace;

use crate::stars::types::error::{Result, StarsError};

/// Forward-only tokenizer over the index stream with one line of lookahead.
///
/// Blank lines are skipped and never reach the caller. Bytes that are not
/// valid in the configured encoding are replaced rather than rejected.
#[derive(Debug)]
pub struct IndexStreamReader<R> {
    inner: R,
    encoding: &'static Encoding,
    buf: Vec<u8>,
    peeked: Option<Vec<String>>,
    /// Physical line number of `peeked`.
    peeked_line: usize,
    /// Physical line number of the last line handed out.
    last_line: usize,
    /// Physical lines read from `inner` so far.
    lines_read: usize,
}

impl<R: BufRead> IndexStreamReader<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            inner,
            encoding,
            buf: Vec::new(),
            peeked: None,
            peeked_line: 0,
            last_line: 0,
            lines_read: 0,
        }
    }

    /// Loads the next non-blank line into the lookahead slot, if it is empty.
    fn fill_peek(&mut self) -> Result<()> {
        while self.peeked.is_none() {
            self.buf.clear();
            if self.inner.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(());
            }
            self.lines_read += 1;
            let (text, _, _) = self.encoding.decode(&self.buf);
            let tokens: Vec<String> = text.split_whitespace().map(str::to_owned).collect();
            if !tokens.is_empty() {
                self.peeked = Some(tokens);
                self.peeked_line = self.lines_read;
            }
        }
        Ok(())
    }

    /// The keyword of the next line, or `None` at end of stream.
    pub fn peek_keyword(&mut self) -> Result<Option<&str>> {
        self.fill_peek()?;
        Ok(self
            .peeked
            .as_ref()
            .and_then(|tokens| tokens.first())
            .map(String::as_str))
    }

    /// All tokens of the next line without consuming it.
    pub fn peek_tokens(&mut self) -> Result<Option<&[String]>> {
        self.fill_peek()?;
        Ok(self.peeked.as_deref())
    }

    /// Consumes the next line and returns its tokens.
    pub fn next_line_tokens(&mut self) -> Result<Option<Vec<String>>> {
        self.fill_peek()?;
        let tokens = self.peeked.take();
        if tokens.is_some() {
            self.last_line = self.peeked_line;
        }
        Ok(tokens)
    }

    /// Consumes the next line, treating end of stream as a malformed index.
    ///
    /// Used for the rows of fixed-length tables, where the header already
    /// promised how many lines follow.
    pub fn expect_line(&mut self, context: &str) -> Result<Vec<String>> {
        let after = self.last_line;
        self.next_line_tokens()?.ok_or_else(|| StarsError::MalformedIndex {
            line: after,
            reason: format!("end of stream while reading {}", context),
        })
    }

    /// Consumes one multi-line record starting at the current line.
    ///
    /// Tokens from every physical line are concatenated until a line ends
    /// with `terminator`. The result starts with the keyword and does not
    /// include the terminator.
    pub fn read_record_until(&mut self, terminator: &str) -> Result<Vec<String>> {
        let mut tokens = self.next_line_tokens()?.ok_or_else(|| StarsError::MalformedIndex {
            line: self.last_line,
            reason: "expected a record but reached end of stream".to_string(),
        })?;
        let start_line = self.last_line;

        while tokens.last().map(String::as_str) != Some(terminator) {
            match self.next_line_tokens()? {
                Some(more) => tokens.extend(more),
                None => {
                    return Err(StarsError::MalformedIndex {
                        line: start_line,
                        reason: format!(
                            "{} record reached end of stream before terminator '{}'",
                            tokens[0], terminator
                        ),
                    });
                }
            }
        }
        tokens.pop();
        trace!(
            "Read multi-line {} record: lines {}-{}, {} tokens",
            tokens.first().map(String::as_str).unwrap_or(terminator),
            start_line,
            self.last_line,
            tokens.len()
        );
        Ok(tokens)
    }

    /// Physical line number of the lookahead line, or of the last consumed
    /// line when nothing is buffered.
    pub fn line_number(&self) -> usize {
        if self.peeked.is_some() {
            self.peeked_line
        } else {
            self.last_line
        }
    }
}

impl<R: BufRead + Seek> IndexStreamReader<R> {
    /// Restarts from the first line. Restarting mid-stream is not supported.
    pub fn rewind(&mut self) -> Result<()> {
        self.inner.seek(SeekFrom::Start(0))?;
        self.peeked = None;
        self.peeked_line = 0;
        self.last_line = 0;
        self.lines_read = 0;
        Ok(())
    }
}
