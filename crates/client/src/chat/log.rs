//! The message log and the composition buffer.

use std::collections::VecDeque;

use cinecart_core::ChatMessage;

/// Messages ordered newest first.
///
/// Messages only ever enter at the head, so once inserted their relative
/// order never changes.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
}

impl ChatLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A log holding a single greeting.
    #[must_use]
    pub fn with_greeting(greeting: ChatMessage) -> Self {
        let mut log = Self::new();
        log.prepend(greeting);
        log
    }

    /// Insert `message` as the newest entry.
    pub fn prepend(&mut self, message: ChatMessage) {
        self.messages.push_front(message);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The newest message.
    #[must_use]
    pub fn first(&self) -> Option<&ChatMessage> {
        self.messages.front()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    /// Messages from newest to oldest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ChatMessage> + ExactSizeIterator {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a ChatLog {
    type Item = &'a ChatMessage;
    type IntoIter = std::collections::vec_deque::Iter<'a, ChatMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

/// What the user is typing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    text: String,
}

impl Composer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Whether there is anything worth sending.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Take the trimmed text and clear the buffer.
    ///
    /// A blank buffer yields `None` and is left exactly as it was.
    pub fn take_trimmed(&mut self) -> Option<String> {
        if self.is_blank() {
            return None;
        }
        let text = self.text.trim().to_string();
        self.text.clear();
        Some(text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cinecart_core::SenderId;

    use super::*;

    fn message(text: &str) -> ChatMessage {
        ChatMessage::local(text, SenderId::local_user()).unwrap()
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let mut log = ChatLog::new();
        log.prepend(message("one"));
        log.prepend(message("two"));
        log.prepend(message("three"));

        let texts: Vec<_> = log.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["three", "two", "one"]);
        assert_eq!(log.first().unwrap().text, "three");
    }

    #[test]
    fn test_with_greeting() {
        let log = ChatLog::with_greeting(message("hello"));
        assert_eq!(log.len(), 1);
        assert_eq!(log.get(0).unwrap().text, "hello");
    }

    #[test]
    fn test_take_trimmed_clears_buffer() {
        let mut composer = Composer::new();
        composer.set_text("  hi there ");
        assert_eq!(composer.take_trimmed().as_deref(), Some("hi there"));
        assert_eq!(composer.text(), "");
    }

    #[test]
    fn test_take_trimmed_blank_leaves_buffer() {
        let mut composer = Composer::new();
        composer.set_text("   ");
        assert!(composer.take_trimmed().is_none());
        assert_eq!(composer.text(), "   ");
    }
}
