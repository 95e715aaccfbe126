// Incremental UTF-8 decoding of raw stream chunks
use std::str;

const REPLACEMENT: char = '\u{FFFD}';

/// Decodes chunks exactly as the transport delivers them, one string per chunk.
///
/// A multi-byte sequence cut by a chunk boundary is held back and completed
/// by the next chunk. Invalid bytes become U+FFFD.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Utf8ChunkDecoder::default()
    }

    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest = &bytes[..];
        loop {
            match str::from_utf8(rest) {
                Ok(s) => {
                    out.push_str(s);
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix is well formed
                    out.push_str(str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(n) => {
                            out.push(REPLACEMENT);
                            rest = &tail[n..];
                        }
                        None => {
                            self.pending.extend_from_slice(tail);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at end of stream: a sequence that never completed becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            String::new()
        } else {
            self.pending.clear();
            REPLACEMENT.to_string()
        }
    }

    /// Bytes held back waiting for the rest of a sequence.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }
}
