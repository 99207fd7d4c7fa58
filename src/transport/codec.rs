//! Line framing for IRC streams.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::Error;
use crate::message::EOL;

use super::MAX_IRC_LINE_LEN;

/// Splits a byte stream on `\n` and yields lines without their terminator.
///
/// A trailing `\r` is removed, blank lines are skipped and invalid UTF-8 is
/// replaced rather than rejected. The encoder appends CRLF unless the line
/// already ends in `\n`.
#[derive(Clone, Debug)]
pub struct LineCodec {
    // Bytes already scanned without finding a newline.
    next_index: usize,
    max_line_len: usize,
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl LineCodec {
    pub fn new() -> Self {
        Self::with_max_line_len(MAX_IRC_LINE_LEN)
    }

    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            next_index: 0,
            max_line_len,
        }
    }

    fn take_line(&mut self, buf: &mut BytesMut, end: usize) -> Result<Option<String>, Error> {
        self.next_index = 0;
        let frame = buf.split_to(end + 1);
        if end > self.max_line_len {
            return Err(Error::MessageTooLong(end));
        }
        let text = String::from_utf8_lossy(&frame[..end]);
        let text = text.trim_end_matches('\r');
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(text.to_owned()))
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Error> {
        loop {
            let Some(offset) = buf[self.next_index..].iter().position(|&b| b == b'\n') else {
                if buf.len() > self.max_line_len {
                    return Err(Error::MessageTooLong(buf.len()));
                }
                self.next_index = buf.len();
                return Ok(None);
            };
            let end = self.next_index + offset;
            if let Some(line) = self.take_line(buf, end)? {
                return Ok(Some(line));
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<String>, Error> {
        if let Some(line) = self.decode(buf)? {
            return Ok(Some(line));
        }
        if buf.is_empty() {
            return Ok(None);
        }
        // Unterminated final fragment.
        let end = buf.len();
        buf.put_u8(b'\n');
        self.take_line(buf, end)
    }
}

impl Encoder<String> for LineCodec {
    type Error = Error;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<(), Error> {
        dst.reserve(line.len() + EOL.len());
        dst.put_slice(line.as_bytes());
        if !line.ends_with('\n') {
            dst.put_slice(EOL.as_bytes());
        }
        Ok(())
    }
}
