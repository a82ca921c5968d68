//! Incremental decoder for `text/event-stream` bodies
//!
//! Chunks may split lines (and UTF-8 sequences) anywhere; only complete
//! events are returned.

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    /// Feed a chunk and return the data payloads of every completed event
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.handle_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush a trailing event that was not terminated by a blank line
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
            self.handle_line(&line);
        }
        self.take_event()
    }

    fn handle_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.take_event();
        }
        if line.starts_with(':') {
            return None;
        }
        if let Some(data) = line.strip_prefix("data:") {
            self.data_lines
                .push(data.strip_prefix(' ').unwrap_or(data).to_string());
        }
        None
    }

    fn take_event(&mut self) -> Option<String> {
        if self.data_lines.is_empty() {
            return None;
        }
        Some(std::mem::take(&mut self.data_lines).join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        assert!(decoder.push(b":1}\r\n").is_empty());
        let events = decoder.push(b"\r\ndata: {\"b\":2}\r\n\r\n");
        assert_eq!(events, vec!["{\"a\":1}".to_string(), "{\"b\":2}".to_string()]);
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b": keep-alive\nevent: message\ndata: x\n\n");
        assert_eq!(events, vec!["x".to_string()]);
    }

    #[test]
    fn test_multibyte_text_split_mid_character() {
        let text = "data: नमस्ते\n\n".as_bytes();
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(&text[..8]).is_empty());
        assert_eq!(decoder.push(&text[8..]), vec!["नमस्ते".to_string()]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }
}
