use std::collections::VecDeque;

/// Number of status messages kept
pub const STATUS_CAPACITY: usize = 16;

/// Longest message stored, in bytes
pub const MAX_STATUS_LEN: usize = 255;

/// Most recent status messages, oldest dropped first
#[derive(Debug, Clone, Default)]
pub struct StatusLog {
    messages: VecDeque<String>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self {
            messages: VecDeque::with_capacity(STATUS_CAPACITY),
        }
    }

    pub fn push(&mut self, message: impl Into<String>) {
        let mut message = message.into();
        if message.len() > MAX_STATUS_LEN {
            let mut end = MAX_STATUS_LEN;
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            message.truncate(end);
        }
        if self.messages.len() == STATUS_CAPACITY {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    pub fn latest(&self) -> Option<&str> {
        self.messages.back().map(String::as_str)
    }

    /// Messages from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
