//! Line framing for tokio.
//!
//! [`LineCodec`] splits a byte stream into LF-terminated lines, decodes them
//! with a configurable character encoding and strips the line terminator.
//! Outbound, it encodes a line and appends CR-LF.
//!
//! Problems with a single line (too long, not decodable) are yielded as an
//! inner `Err` item rather than a decoder error, so the stream keeps going.

use std::borrow::Cow;
use std::io;

use bytes::{Buf, BytesMut};
use encoding::Encoding;
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

/// Upper bound on one line including tags and CR-LF.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Errors produced by [`LineCodec`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LineCodecError {
    /// Reading from or writing to the transport failed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// A line exceeded the configured limit and was discarded.
    #[error("line of {actual} bytes exceeds limit of {limit}")]
    LineTooLong {
        /// Bytes discarded, terminator included.
        actual: usize,
        /// The configured limit.
        limit: usize,
    },

    /// A line was not valid in the configured encoding.
    #[error("line is not valid {encoding}")]
    Decode {
        /// Name of the encoding.
        encoding: &'static str,
    },

    /// A line has characters the configured encoding cannot represent.
    #[error("line is not representable in {encoding}")]
    Encode {
        /// Name of the encoding.
        encoding: &'static str,
    },

    /// The encoding label is not recognised.
    #[error("unknown encoding {0:?}")]
    UnknownEncoding(String),
}

/// A decoded line, or the reason one was dropped.
pub type LineResult = Result<String, LineCodecError>;

/// LF-delimited line codec with character encoding support.
#[derive(Debug)]
pub struct LineCodec {
    encoding: &'static Encoding,
    /// Index of the next byte to check for LF.
    next_index: usize,
    max_len: usize,
    /// Bytes dropped so far from an over-long line.
    discarding: Option<usize>,
}

impl LineCodec {
    /// Creates a codec for the encoding named by `label` (e.g. `"utf-8"`,
    /// `"latin1"`) with the default line limit.
    pub fn new(label: &str) -> Result<Self, LineCodecError> {
        Self::with_max_len(label, MAX_IRC_LINE_LEN)
    }

    /// Creates a codec with a custom line limit.
    pub fn with_max_len(label: &str, max_len: usize) -> Result<Self, LineCodecError> {
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| LineCodecError::UnknownEncoding(label.to_owned()))?;
        Ok(LineCodec {
            encoding,
            next_index: 0,
            max_len,
            discarding: None,
        })
    }

    /// The active encoding's canonical name.
    pub fn encoding_name(&self) -> &'static str {
        self.encoding.name()
    }

    pub(crate) fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// The line limit in bytes.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    fn decode_line(&self, line: &[u8]) -> LineResult {
        let line = trim_terminator(line);
        self.encoding
            .decode_without_bom_handling_and_without_replacement(line)
            .map(Cow::into_owned)
            .ok_or(LineCodecError::Decode {
                encoding: self.encoding.name(),
            })
    }
}

fn trim_terminator(mut line: &[u8]) -> &[u8] {
    while let [rest @ .., b'\r' | b'\n'] = line {
        line = rest;
    }
    line
}

impl Decoder for LineCodec {
    type Item = LineResult;
    type Error = LineCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<LineResult>, LineCodecError> {
        loop {
            let newline = src[self.next_index..]
                .iter()
                .position(|b| *b == b'\n')
                .map(|offset| self.next_index + offset);

            match (self.discarding, newline) {
                (Some(dropped), Some(end)) => {
                    src.advance(end + 1);
                    self.next_index = 0;
                    self.discarding = None;
                    return Ok(Some(Err(LineCodecError::LineTooLong {
                        actual: dropped + end + 1,
                        limit: self.max_len,
                    })));
                }
                (Some(dropped), None) => {
                    let len = src.len();
                    src.advance(len);
                    self.next_index = 0;
                    self.discarding = Some(dropped + len);
                    return Ok(None);
                }
                (None, Some(end)) => {
                    let line = src.split_to(end + 1);
                    self.next_index = 0;

                    if line.len() > self.max_len {
                        return Ok(Some(Err(LineCodecError::LineTooLong {
                            actual: line.len(),
                            limit: self.max_len,
                        })));
                    }
                    // Blank keepalive lines are not messages.
                    if trim_terminator(&line).is_empty() {
                        continue;
                    }
                    return Ok(Some(self.decode_line(&line)));
                }
                (None, None) => {
                    if src.len() > self.max_len {
                        self.discarding = Some(0);
                        continue;
                    }
                    self.next_index = src.len();
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<LineResult>, LineCodecError> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }
        if self.discarding.take().is_some() || src.is_empty() {
            src.clear();
            return Ok(None);
        }

        // Unterminated final line.
        let line = src.split_to(src.len());
        self.next_index = 0;
        if trim_terminator(&line).is_empty() {
            return Ok(None);
        }
        Ok(Some(self.decode_line(&line)))
    }
}

impl Encoder<String> for LineCodec {
    type Error = LineCodecError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), LineCodecError> {
        let (bytes, _, unmappable) = self.encoding.encode(&line);
        if unmappable {
            return Err(LineCodecError::Encode {
                encoding: self.encoding.name(),
            });
        }
        dst.reserve(bytes.len() + 2);
        dst.extend_from_slice(&bytes);
        dst.extend_from_slice(b"\r\n");
        Ok(())
    }
}
