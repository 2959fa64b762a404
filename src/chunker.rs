//! Record chunking for the query source
//!
//! Turns a stream of variable-size, sentinel-delimited records into bounded
//! blocks. A block never splits a record: a trailing partial record is pushed
//! back (buffer truncated, source cursor rewound to the record's start) and
//! re-read on the next call. The one exception is a single record larger than
//! the block limit, which is allowed to outgrow the limit and always forms a
//! block of its own.
//!
//! The line reader is bounded at [`MAX_LINE_LEN`]. An overlong header line is
//! truncated there and the remainder of the line discarded; an overlong
//! payload line is split, leaving the source mid-line so the rest comes back
//! as a continuation line, with a line break re-inserted between the halves.
//! The payload format tolerates arbitrary re-wrapping of sequence lines, so
//! the split is harmless; the header truncation loses bytes and always has.

use std::io::{BufRead, Seek, SeekFrom};

use anyhow::{bail, Context, Result};

use crate::protocol::{MAX_LINE_LEN, SENTINEL};

/// Streaming block reader over a seekable query source.
///
/// The cursor (the byte offset where the next unread record begins) lives
/// inside: it advances as lines are consumed and rewinds only when a partial
/// record is pushed back.
pub struct Chunker<R> {
    source: R,
    limit: usize,
    pos: u64,
}

impl<R: BufRead + Seek> Chunker<R> {
    /// `source` must be positioned at its start; `limit` bounds a block's
    /// serialized size except for single oversized records.
    pub fn new(source: R, limit: usize) -> Self {
        Self {
            source,
            limit,
            pos: 0,
        }
    }

    /// Current resume position in the source, in bytes.
    #[allow(dead_code)] // exercised by the pushback tests
    pub fn cursor(&self) -> u64 {
        self.pos
    }

    /// Read the next block of whole records, or `None` once the source is
    /// exhausted.
    ///
    /// Malformed input is fatal: a header still unterminated at end-of-source,
    /// or any trailing content with no final line break.
    pub fn next_block(&mut self) -> Result<Option<Vec<u8>>> {
        let mut block: Vec<u8> = Vec::with_capacity(self.limit);
        let mut cap = self.limit;
        let mut records = 0usize;
        let mut last_record_block_off = 0usize;
        let mut last_record_src_off = 0u64;

        loop {
            let line_off = self.pos;
            let Some(line) = self.read_line_bounded()? else {
                return Ok(if records > 0 { Some(block) } else { None });
            };
            let is_header = line.first() == Some(&SENTINEL);

            // +1 accounts for the line terminator appended below.
            if is_header && records >= 1 && block.len() + line.len() + 1 > self.limit {
                // The buffered records end on a record boundary; only this
                // header needs pushing back. Checked against the configured
                // limit rather than the grown capacity so that an oversized
                // record is always alone in its block.
                self.rewind(line_off)?;
                return Ok(Some(block));
            }
            if block.len() + line.len() + 1 > cap {
                if records > 1 {
                    // A partial record is buffered; drop it and rewind to
                    // where it started so the next block re-reads it whole.
                    block.truncate(last_record_block_off);
                    self.rewind(last_record_src_off)?;
                    return Ok(Some(block));
                }
                // A single record in progress may outgrow the limit.
                while block.len() + line.len() + 1 > cap {
                    cap *= 2;
                }
            }

            if is_header {
                records += 1;
                last_record_block_off = block.len();
                last_record_src_off = line_off;
            }

            block.extend_from_slice(&line);
            block.push(b'\n');
        }
    }

    /// Read one line (without its terminator), bounded at [`MAX_LINE_LEN`].
    ///
    /// Returns `None` at a clean end-of-source. For an overlong header the
    /// remainder of the line is discarded; for an overlong payload line the
    /// source is left mid-line.
    fn read_line_bounded(&mut self) -> Result<Option<Vec<u8>>> {
        let mut line: Vec<u8> = Vec::new();
        loop {
            let buf = self.source.fill_buf().context("read from query source")?;
            if buf.is_empty() {
                if line.is_empty() {
                    return Ok(None);
                }
                bail!("incomplete last line in query source (no final line break)");
            }

            let room = MAX_LINE_LEN - line.len();
            if let Some(nl) = buf.iter().take(room).position(|&b| b == b'\n') {
                line.extend_from_slice(&buf[..nl]);
                self.advance(nl + 1);
                return Ok(Some(line));
            }

            let take = room.min(buf.len());
            line.extend_from_slice(&buf[..take]);
            self.advance(take);

            if line.len() == MAX_LINE_LEN {
                if line.first() == Some(&SENTINEL) {
                    self.discard_rest_of_line()?;
                }
                return Ok(Some(line));
            }
        }
    }

    /// Consume up to and including the next line break.
    fn discard_rest_of_line(&mut self) -> Result<()> {
        loop {
            let buf = self.source.fill_buf().context("read from query source")?;
            if buf.is_empty() {
                bail!("record header incomplete at end of input");
            }
            if let Some(nl) = buf.iter().position(|&b| b == b'\n') {
                self.advance(nl + 1);
                return Ok(());
            }
            let len = buf.len();
            self.advance(len);
        }
    }

    fn advance(&mut self, n: usize) {
        self.source.consume(n);
        self.pos += n as u64;
    }

    fn rewind(&mut self, to: u64) -> Result<()> {
        self.source
            .seek(SeekFrom::Start(to))
            .context("rewind query source")?;
        self.pos = to;
        Ok(())
    }
}
