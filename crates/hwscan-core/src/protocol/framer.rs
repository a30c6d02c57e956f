use super::LOGIN_PROMPT;

/// Longest unterminated line kept before the buffer is discarded.
pub const MAX_LINE_LEN: usize = 1024;

/// Reassembles lines from a byte stream.
///
/// Controllers terminate lines with `\r`, `\n`, or both; empty lines are
/// skipped. The login prompt arrives without a terminator and is detected
/// separately by [`LineFramer::take_login_prompt`].
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: Vec<u8>,
    discarded: usize,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pops the next complete, non-empty line.
    pub fn next_line(&mut self) -> Option<String> {
        loop {
            let Some(end) = self.buf.iter().position(|&b| b == b'\r' || b == b'\n') else {
                if self.buf.len() > MAX_LINE_LEN {
                    self.discarded += self.buf.len();
                    self.buf.clear();
                }
                return None;
            };
            let line: Vec<u8> = self.buf.drain(..=end).take(end).collect();
            let text = String::from_utf8_lossy(&line);
            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }
    }

    /// Consumes a pending unterminated login prompt, if one is buffered.
    pub fn take_login_prompt(&mut self) -> bool {
        let prompted = String::from_utf8_lossy(&self.buf)
            .trim_end()
            .ends_with(LOGIN_PROMPT);
        if prompted {
            self.buf.clear();
            return true;
        }
        false
    }

    /// Bytes dropped because a line exceeded [`MAX_LINE_LEN`].
    pub fn discarded(&self) -> usize {
        self.discarded
    }
}

/// Whether a complete line is the controller's login prompt.
pub fn is_login_prompt(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(LOGIN_PROMPT)
}
