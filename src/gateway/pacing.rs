//! Token pacing for streamed replies

use std::time::Duration;

/// How reply text is split into `token_stream` events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamPacing {
    /// Characters per chunk, at least 1
    pub chunk_size: usize,

    /// Pause after each chunk
    pub delay: Duration,
}

impl Default for StreamPacing {
    fn default() -> Self {
        Self {
            chunk_size: 1,
            delay: Duration::from_millis(20),
        }
    }
}

impl StreamPacing {
    pub fn new(chunk_size: usize, delay: Duration) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            delay,
        }
    }

    /// No delay between chunks
    pub fn immediate() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Split `text` into chunks of `chunk_size` characters
    ///
    /// Never splits inside a UTF-8 character. Concatenating the chunks
    /// yields `text` exactly.
    pub fn chunks<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let size = self.chunk_size.max(1);
        let mut chunks = Vec::with_capacity(text.len() / size + 1);
        let mut start = 0;

        for (count, (idx, _)) in text.char_indices().enumerate() {
            if count > 0 && count % size == 0 {
                chunks.push(&text[start..idx]);
                start = idx;
            }
        }
        if start < text.len() {
            chunks.push(&text[start..]);
        }
        chunks
    }

    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
