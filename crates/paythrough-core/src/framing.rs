//! Finds where one JSON document ends in a growing byte buffer.
//!
//! Both the host pipe and the node socket deliver documents in arbitrary
//! chunks. [`DocumentScanner`] remembers how far it has looked, so each
//! byte is inspected once no matter how many reads a document spans.

/// Incremental scanner for the end of a top-level JSON object or array.
#[derive(Debug, Default, Clone)]
pub struct DocumentScanner {
    pos: usize,
    depth: usize,
    started: bool,
    in_string: bool,
    escaped: bool,
}

impl DocumentScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset just past the first complete document in `buf`, if it has
    /// arrived.
    ///
    /// `buf` must be the same buffer as on previous calls, only grown.
    /// When the document does not start with `{` or `[`, the whole buffer
    /// is returned so the parser can judge it.
    pub fn scan(&mut self, buf: &[u8]) -> Option<usize> {
        while self.pos < buf.len() {
            let byte = buf[self.pos];
            if !self.started {
                match byte {
                    b if b.is_ascii_whitespace() => {}
                    b'{' | b'[' => {
                        self.started = true;
                        self.depth = 1;
                    }
                    _ => return Some(buf.len()),
                }
                self.pos += 1;
                continue;
            }
            self.pos += 1;

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
                continue;
            }
            match byte {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth -= 1;
                    if self.depth == 0 {
                        return Some(self.pos);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Forget progress, for when the scanned bytes have been consumed.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
