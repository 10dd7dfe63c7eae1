pub const DEFAULT_MAX_LINE_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FramingError {
    #[error("line exceeds {limit} bytes")]
    TooLong { limit: usize },
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
}

/// Splits a byte stream into newline-terminated lines.
///
/// At most the line limit plus the last chunk is ever buffered: an overlong line is reported
/// once and then discarded up to its terminating newline. A bad line only costs that line.
#[derive(Debug)]
pub struct LineFramer {
    buffer: Vec<u8>,
    max_line_len: usize,
    discarding: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl LineFramer {
    pub fn new(max_line_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_line_len: max_line_len.max(1),
            discarding: false,
        }
    }

    pub fn max_line_len(&self) -> usize {
        self.max_line_len
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds received bytes. Call `next_line` until it returns `None` afterwards.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn next_line(&mut self) -> Option<Result<String, FramingError>> {
        loop {
            let Some(end) = self.buffer.iter().position(|b| *b == b'\n') else {
                if self.discarding {
                    self.buffer.clear();
                } else if self.buffer.len() > self.max_line_len {
                    self.buffer.clear();
                    self.discarding = true;
                    return Some(Err(FramingError::TooLong {
                        limit: self.max_line_len,
                    }));
                }
                return None;
            };

            let mut line: Vec<u8> = self.buffer.drain(..=end).collect();
            line.pop();

            if self.discarding {
                self.discarding = false;
                continue;
            }
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if line.len() > self.max_line_len {
                return Some(Err(FramingError::TooLong {
                    limit: self.max_line_len,
                }));
            }

            return Some(String::from_utf8(line).map_err(|_| FramingError::InvalidUtf8));
        }
    }
}
