//! Chunk plumbing between the transport and the aggregator: incremental
//! UTF-8 decoding and newline framing. Both types keep the incomplete tail
//! of one chunk buffered for the next.

/// Incremental UTF-8 decoder. Response bodies carry multi-byte text, and a
/// transport chunk boundary can split a code point just as it can split a
/// JSON record; the trailing incomplete sequence is carried into the next
/// `push`. Invalid sequences become U+FFFD, matching lossy text decoding.
#[derive(Debug, Default)]
pub struct ChunkDecoder {
    carry: Vec<u8>,
}

impl ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.carry.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.carry) {
                Ok(valid) => {
                    out.push_str(valid);
                    self.carry.clear();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&self.carry[..valid_up_to]));
                    match e.error_len() {
                        // Invalid sequence in the middle: replace and move on.
                        Some(bad) => {
                            out.push('\u{FFFD}');
                            self.carry.drain(..valid_up_to + bad);
                        }
                        // Incomplete sequence at the end: keep for next chunk.
                        None => {
                            self.carry.drain(..valid_up_to);
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush whatever is still buffered at end-of-stream. A dangling partial
    /// sequence decodes lossily rather than disappearing.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.carry).into_owned();
        self.carry.clear();
        tail
    }
}

/// Splits decoded text into complete, trimmed candidate records. A record is
/// complete once its newline arrives; the trailing fragment stays buffered
/// across `feed` calls. Blank and whitespace-only lines are dropped here so
/// the aggregator only ever sees parse candidates.
#[derive(Debug, Default)]
pub struct LineSplitter {
    buffer: String,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate records completed by this chunk, in arrival order. No length
    /// limit is imposed; a large record simply stays buffered until its
    /// newline shows up.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=pos).collect();
            let line = line.trim();
            if !line.is_empty() {
                lines.push(line.to_string());
            }
        }
        lines
    }

    /// Residual record at end-of-stream, if any. The backend terminates every
    /// record with a newline, but a provider that omits the last one would
    /// otherwise silently lose its final record.
    pub fn finish(&mut self) -> Option<String> {
        let residual = std::mem::take(&mut self.buffer);
        let residual = residual.trim();
        if residual.is_empty() {
            None
        } else {
            Some(residual.to_string())
        }
    }
}
