//! Line framer — rolling text buffer to newline-delimited records.
//!
//! Emits every complete line in arrival order, strips one trailing `\r`, and
//! holds the unterminated tail until more text arrives or the stream ends.

#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: String,
}

impl LineFramer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` and drain every complete line now in the buffer.
    pub fn push(&mut self, text: &str) -> Vec<String> {
        self.buffer.push_str(text);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buffer[start..].find('\n') {
            let end = start + offset;
            lines.push(strip_cr(&self.buffer[start..end]).to_string());
            start = end + 1;
        }
        if start > 0 {
            self.buffer.drain(..start);
        }
        lines
    }

    /// Take the final unterminated record, if any.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = strip_cr(&rest);
        if rest.is_empty() { None } else { Some(rest.to_string()) }
    }

    /// Length of the partial line currently buffered.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

#[cfg(test)]
#[path = "framer_test.rs"]
mod tests;
